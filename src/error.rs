use std::{io, path::PathBuf, string::FromUtf8Error};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "no output directory defined\n\
         \teither add an \"output\" property to your junit-reporter.json config file, or\n\
         \tuse the --output command line option"
    )]
    NoOutput,

    #[error("could not read config file {}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}", path.display())]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("result for test `{test}` arrived before any module was started")]
    NoCurrentModule { test: String },

    #[error("report is already finalized, got `{event}` after `done`")]
    Finalized { event: &'static str },

    #[error("`done` was signaled more than once")]
    AlreadyDone,

    #[error("test engine returned without signaling `done`")]
    Incomplete,

    #[error("could not determine the working directory")]
    WorkingDir(#[source] io::Error),

    #[error("could not create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not render report for module `{module}`")]
    Render {
        module: String,
        #[source]
        source: RenderError,
    },

    #[error("could not write report {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("test engine failed")]
    Engine(#[source] BoxedError),

    #[error("we have got test failures: {failed}/{total} assertions failed")]
    TestFailures { failed: usize, total: usize },
}

impl Error {
    pub fn engine(err: impl Into<BoxedError>) -> Self {
        Error::Engine(err.into())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("rendered report is not valid utf-8")]
    Utf8(#[from] FromUtf8Error),
}
