//! JUnit XML reports for test runs, one file per test module.
//!
//! A [`TestEngine`](engine::TestEngine) runs the tests and reports lifecycle
//! events to a [`RunListener`](builder::RunListener). The
//! [`JUnitReporter`] collects those events into a
//! [`ModuleReport`](model::ModuleReport) per module and, once the engine
//! signals `done`, writes `<output>/<module>.xml` for each of them.

pub mod assertion;
pub mod builder;
pub mod config;
pub mod console;
pub mod engine;
pub mod fs;
pub mod model;
pub mod path;
pub mod render;
pub mod writer;

mod error;
pub use error::*;

mod reporter;
pub use reporter::*;

pub mod prelude {
    pub use crate::{
        Error, JUnitReporter,
        assertion::{Assertion, AssertionError, AssertionList, ErrorKind},
        builder::{ReportBuilder, RunListener},
        config::ReporterOptions,
        console::{ColorSetting, Decorations, LogSink, WriteSink},
        engine::{TestEngine, TestSpec, replay::ReplayEngine},
        model::{Failure, ModuleReport, TestCaseReport},
    };
}
