//! The seam to the component that actually runs tests.
//!
//! A [`TestEngine`] discovers and runs tests and reports their results to a
//! [`RunListener`]. Executing tests is not this crate's business; the bundled
//! [`replay::ReplayEngine`] feeds recorded results instead.

use std::path::PathBuf;

use crate::{builder::RunListener, error::Result};

pub mod replay;

pub trait TestEngine {
    /// Run the tests found in `files`.
    fn run_files(
        &mut self,
        files: &[PathBuf],
        spec: &TestSpec,
        listener: &mut dyn RunListener,
    ) -> Result<()>;

    /// Run every module the engine discovers on its own.
    fn run_modules(&mut self, spec: &TestSpec, listener: &mut dyn RunListener) -> Result<()>;
}

impl<E: TestEngine + ?Sized> TestEngine for &mut E {
    fn run_files(
        &mut self,
        files: &[PathBuf],
        spec: &TestSpec,
        listener: &mut dyn RunListener,
    ) -> Result<()> {
        (**self).run_files(files, spec, listener)
    }

    fn run_modules(&mut self, spec: &TestSpec, listener: &mut dyn RunListener) -> Result<()> {
        (**self).run_modules(spec, listener)
    }
}

/// Selects which tests run.
///
/// Test names are paths of group segments joined by [`TestSpec::SEPARATOR`],
/// e.g. `"math - division - by zero"`. `testspec` keeps tests that have a
/// segment equal to it, `test_full_spec` keeps the test whose whole name equals
/// it. When both are set a test has to satisfy both.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TestSpec {
    pub testspec: Option<String>,
    pub test_full_spec: Option<String>,
}

impl TestSpec {
    pub const SEPARATOR: &'static str = " - ";

    pub fn matches(&self, name: &str) -> bool {
        let in_full_spec = self
            .test_full_spec
            .as_deref()
            .is_none_or(|full_spec| name == full_spec);
        let in_name = self
            .testspec
            .as_deref()
            .is_none_or(|spec| name.split(Self::SEPARATOR).any(|segment| segment == spec));
        in_full_spec && in_name
    }
}
