//! Replays recorded test results.
//!
//! A recording is a JSON document:
//!
//! ```json
//! {
//!   "modules": [
//!     {
//!       "name": "math",
//!       "tests": [
//!         { "name": "addsNumbers", "assertions": [{}] },
//!         {
//!           "name": "dividesByZero",
//!           "assertions": [
//!             { "error": { "kind": "generic", "message": "unexpected exception" } }
//!           ]
//!         }
//!       ]
//!     }
//!   ],
//!   "duration_ms": 12
//! }
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use serde::Deserialize;

use crate::{
    assertion::{Assertion, AssertionList},
    builder::RunListener,
    engine::{TestEngine, TestSpec},
    error::{Error, Result},
};

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("could not read recorded results from {origin}")]
    Read {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid recorded results in {origin}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Recording {
    modules: Vec<RecordedModule>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RecordedModule {
    name: String,
    #[serde(default)]
    tests: Vec<RecordedTest>,
}

#[derive(Debug, Deserialize)]
struct RecordedTest {
    name: String,
    #[serde(default)]
    assertions: Vec<Assertion>,
}

/// A [`TestEngine`] that replays recordings.
///
/// `run_files` reads one recording per file, `run_modules` reads a single
/// recording from `reader`. Recordings are replayed in order and the whole run
/// ends with one `done`.
#[derive(Debug)]
pub struct ReplayEngine<R: io::Read> {
    reader: R,
}

impl Default for ReplayEngine<io::Stdin> {
    fn default() -> Self {
        Self { reader: io::stdin() }
    }
}

impl<R: io::Read> ReplayEngine<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

fn read_file(path: &Path) -> Result<Recording, ReplayError> {
    let origin = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ReplayError::Read {
        origin: origin.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ReplayError::Parse { origin, source })
}

fn read_reader(reader: &mut impl io::Read) -> Result<Recording, ReplayError> {
    const ORIGIN: &str = "<input>";
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .map_err(|source| ReplayError::Read {
            origin: ORIGIN.into(),
            source,
        })?;
    serde_json::from_str(&contents).map_err(|source| ReplayError::Parse {
        origin: ORIGIN.into(),
        source,
    })
}

fn replay(
    recordings: impl IntoIterator<Item = Result<Recording, ReplayError>>,
    spec: &TestSpec,
    listener: &mut dyn RunListener,
) -> Result<()> {
    let now = Instant::now();
    let mut all = Vec::new();
    let mut recorded_duration = None;

    for recording in recordings {
        let recording = recording.map_err(Error::engine)?;
        if let Some(ms) = recording.duration_ms {
            *recorded_duration.get_or_insert(Duration::ZERO) += Duration::from_millis(ms);
        }

        for module in recording.modules {
            listener.module_start(&module.name)?;
            for test in module.tests {
                if !spec.matches(&test.name) {
                    tracing::trace!(module = %module.name, test = %test.name, "filtered out");
                    continue;
                }
                listener.test_done(&test.name, &test.assertions)?;
                all.extend(test.assertions);
            }
        }
    }

    let duration = recorded_duration.unwrap_or_else(|| now.elapsed());
    listener.done(&AssertionList::new(all, duration))
}

impl<R: io::Read> TestEngine for ReplayEngine<R> {
    fn run_files(
        &mut self,
        files: &[PathBuf],
        spec: &TestSpec,
        listener: &mut dyn RunListener,
    ) -> Result<()> {
        tracing::debug!(files = files.len(), "replaying recorded files");
        replay(files.iter().map(|path| read_file(path)), spec, listener)
    }

    fn run_modules(&mut self, spec: &TestSpec, listener: &mut dyn RunListener) -> Result<()> {
        tracing::debug!("replaying recording from reader");
        replay([read_reader(&mut self.reader)], spec, listener)
    }
}
