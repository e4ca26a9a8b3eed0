//! In-memory report model, one [`ModuleReport`] per test module.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct ModuleReport {
    pub name: String,
    /// Tests whose first failing assertion was not a mismatch.
    pub error_count: usize,
    /// Tests whose first failing assertion was a mismatch.
    pub failure_count: usize,
    pub tests: usize,
    /// In the order the tests completed.
    pub testcases: Vec<TestCaseReport>,
}

impl ModuleReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct TestCaseReport {
    pub name: String,
    pub failure: Option<Failure>,
}

impl TestCaseReport {
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            failure: None,
        }
    }

    pub fn failed(name: impl Into<String>, failure: Failure) -> Self {
        Self {
            name: name.into(),
            failure: Some(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub backtrace: String,
}
