//! Collects lifecycle events into per-module reports.

use std::collections::BTreeMap;

use crate::{
    assertion::{Assertion, AssertionList, better_failure},
    error::{Error, Result},
    model::{ModuleReport, TestCaseReport},
};

/// The callbacks a test engine drives over the course of one run.
///
/// Engines call `module_start` and `test_done` serially, in zero or more
/// `(module_start, test_done*)` groups, followed by exactly one `done`. An
/// error returned from any callback should stop the engine and be passed back
/// to its caller.
pub trait RunListener {
    fn module_start(&mut self, name: &str) -> Result<()>;

    fn test_done(&mut self, name: &str, assertions: &[Assertion]) -> Result<()>;

    fn done(&mut self, assertions: &AssertionList) -> Result<()>;
}

impl<L: RunListener + ?Sized> RunListener for &mut L {
    fn module_start(&mut self, name: &str) -> Result<()> {
        (**self).module_start(name)
    }

    fn test_done(&mut self, name: &str, assertions: &[Assertion]) -> Result<()> {
        (**self).test_done(name, assertions)
    }

    fn done(&mut self, assertions: &AssertionList) -> Result<()> {
        (**self).done(assertions)
    }
}

/// State machine behind the report model.
///
/// Results of `test_done` are attributed to the module most recently started.
/// Starting a module under a name that was seen before replaces the earlier
/// report instead of merging into it.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    modules: BTreeMap<String, ModuleReport>,
    current: Option<String>,
    finalized: bool,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn current_module(&self) -> Option<&ModuleReport> {
        self.modules.get(self.current.as_deref()?)
    }

    pub fn module(&self, name: &str) -> Option<&ModuleReport> {
        self.modules.get(name)
    }

    /// Reports ordered by module name.
    pub fn modules(&self) -> impl ExactSizeIterator<Item = &ModuleReport> {
        self.modules.values()
    }

    /// Consume the builder, yielding reports ordered by module name.
    pub fn into_modules(self) -> Vec<ModuleReport> {
        self.modules.into_values().collect()
    }

    fn check_open(&self, event: &'static str) -> Result<()> {
        match self.finalized {
            true => Err(Error::Finalized { event }),
            false => Ok(()),
        }
    }
}

impl RunListener for ReportBuilder {
    fn module_start(&mut self, name: &str) -> Result<()> {
        self.check_open("module_start")?;
        tracing::debug!(module = name, "module started");

        let previous = self
            .modules
            .insert(name.to_owned(), ModuleReport::new(name));
        if let Some(previous) = previous {
            tracing::warn!(
                module = name,
                discarded_tests = previous.tests,
                "module started twice, discarding its earlier results"
            );
        }
        self.current = Some(name.to_owned());
        Ok(())
    }

    fn test_done(&mut self, name: &str, assertions: &[Assertion]) -> Result<()> {
        self.check_open("test_done")?;
        let module = self
            .current
            .as_deref()
            .and_then(|current| self.modules.get_mut(current))
            .ok_or_else(|| Error::NoCurrentModule {
                test: name.to_owned(),
            })?;

        let first_failed = assertions.iter().find(|assertion| assertion.failed());
        let testcase = match first_failed.and_then(|a| Some((a, better_failure(a)?))) {
            None => TestCaseReport::passed(name),
            Some((assertion, failure)) => {
                match assertion.error.as_ref().is_some_and(|err| err.is_mismatch()) {
                    true => module.failure_count += 1,
                    false => module.error_count += 1,
                }
                TestCaseReport::failed(name, failure)
            }
        };

        tracing::debug!(
            module = module.name.as_str(),
            test = name,
            failed = testcase.failure.is_some(),
            "test done"
        );
        module.tests += 1;
        module.testcases.push(testcase);
        Ok(())
    }

    fn done(&mut self, assertions: &AssertionList) -> Result<()> {
        if self.finalized {
            return Err(Error::AlreadyDone);
        }
        tracing::debug!(
            modules = self.modules.len(),
            assertions = assertions.len(),
            failures = assertions.failures(),
            "run done"
        );
        self.finalized = true;
        self.current = None;
        Ok(())
    }
}
