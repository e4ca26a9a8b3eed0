//! Naming and parallel writing of report files.

use std::{
    cmp,
    collections::HashSet,
    num::NonZeroUsize,
    path::{Path, PathBuf},
    thread,
};

use crate::{
    error::{Error, Result},
    fs::ReportFs,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFile {
    pub path: PathBuf,
    pub contents: String,
}

/// File stem for a module name.
///
/// Path separators, characters reserved on common filesystems and control
/// characters become `_`, so a module name can never escape the output
/// directory.
pub fn file_stem(module: &str) -> String {
    let stem: String = module
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => stem.replace('.', "_") + "_",
        _ => stem,
    }
}

/// Report paths for `modules`, in the given order.
///
/// Names that collide after [`file_stem`] get `-1`, `-2`, ... appended in
/// order of appearance, so callers passing modules sorted by name get the
/// same paths on every run. Stems are compared exactly, `Math` and `math`
/// keep their own names.
pub fn report_paths<'a>(dir: &Path, modules: impl IntoIterator<Item = &'a str>) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    modules
        .into_iter()
        .map(|module| {
            let stem = file_stem(module);
            let unique = (0..)
                .map(|n| match n {
                    0 => stem.clone(),
                    n => format!("{stem}-{n}"),
                })
                .find(|candidate| !taken.contains(candidate))
                .unwrap_or_default();
            taken.insert(unique.clone());
            dir.join(format!("{unique}.xml"))
        })
        .collect()
}

/// Writes report files with up to `threads` writers at once.
#[derive(Debug)]
pub struct ParallelWriter {
    threads: NonZeroUsize,
}

impl Default for ParallelWriter {
    fn default() -> Self {
        Self {
            threads: thread::available_parallelism().unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ParallelWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread_count(self, count: NonZeroUsize) -> Self {
        Self { threads: count }
    }

    pub fn worker_count(&self, file_count: usize) -> NonZeroUsize {
        NonZeroUsize::new(cmp::min(self.threads.get(), file_count)).unwrap_or(NonZeroUsize::MIN)
    }

    /// Write every file, even if some of them fail.
    ///
    /// Returns the error of the first failed file in `files` order.
    pub fn write_all(&self, fs: &impl ReportFs, files: &[ReportFile]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let worker_count = self.worker_count(files.len());
        let mut outcomes = thread::scope(|scope| {
            let (jtx, jrx) = crossbeam_channel::bounded::<(usize, &ReportFile)>(worker_count.get());
            let (otx, orx) = crossbeam_channel::unbounded();

            for _ in 0..worker_count.get() {
                let jrx = jrx.clone();
                let otx = otx.clone();
                scope.spawn(move || {
                    while let Ok((idx, file)) = jrx.recv() {
                        let written = fs.write_report(&file.path, file.contents.as_bytes());
                        if otx.send((idx, written)).is_err() {
                            // Receiver gone, nobody is interested in the result anymore.
                            return;
                        }
                    }
                });
            }
            drop(otx);
            drop(jrx);

            for job in files.iter().enumerate() {
                if jtx.send(job).is_err() {
                    break;
                }
            }
            drop(jtx);

            orx.iter().collect::<Vec<_>>()
        });

        outcomes.sort_by_key(|(idx, _)| *idx);
        match outcomes
            .into_iter()
            .find_map(|(idx, written)| written.err().map(|err| (idx, err)))
        {
            None => Ok(()),
            Some((idx, source)) => Err(Error::Write {
                path: files[idx].path.clone(),
                source,
            }),
        }
    }
}
