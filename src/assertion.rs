use std::{borrow::Cow, ops::Deref, time::Duration};

use serde::Deserialize;

use crate::model::Failure;

/// A single pass/fail check performed inside a test.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct Assertion {
    /// Message given by the test author, if any.
    #[serde(default)]
    pub message: Option<String>,

    /// The error the check produced, present only if it failed.
    #[serde(default)]
    pub error: Option<AssertionError>,
}

impl Assertion {
    pub fn passed() -> Self {
        Self::default()
    }

    pub fn failed_with(error: AssertionError) -> Self {
        Self {
            message: None,
            error: Some(error),
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }

    /// The author's message, falling back to the message of the error.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or_else(|| self.error.as_ref().map(|err| err.message.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[non_exhaustive]
pub struct AssertionError {
    #[serde(flatten)]
    pub kind: ErrorKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub stack: String,
}

/// What produced a failing assertion.
///
/// This decides whether a failed test is reported as a `failure` or as an
/// `error`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorKind {
    /// A comparison helper found that `actual` does not relate to `expected`
    /// by `operator`.
    Mismatch {
        actual: String,
        expected: String,
        operator: String,
    },

    /// Anything else: a thrown exception, a timeout, a programming error.
    Generic {
        #[serde(default = "ErrorKind::default_name")]
        name: String,
    },
}

impl ErrorKind {
    fn default_name() -> String {
        String::from("Error")
    }
}

impl AssertionError {
    pub fn mismatch(
        actual: impl Into<String>,
        expected: impl Into<String>,
        operator: impl Into<String>,
    ) -> Self {
        Self {
            kind: ErrorKind::Mismatch {
                actual: actual.into(),
                expected: expected.into(),
                operator: operator.into(),
            },
            message: String::new(),
            stack: String::new(),
        }
    }

    pub fn generic(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Generic { name: name.into() },
            message: message.into(),
            stack: String::new(),
        }
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..self
        }
    }

    pub fn with_stack(self, stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            ..self
        }
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::Mismatch { .. })
    }

    /// The stack with its first line replaced by a readable comparison for
    /// mismatches.
    ///
    /// Other kinds return the stack as is.
    pub fn backtrace(&self) -> Cow<'_, str> {
        let ErrorKind::Mismatch {
            actual,
            expected,
            operator,
        } = &self.kind
        else {
            return Cow::Borrowed(&self.stack);
        };

        let spacing = match actual.contains('\n') || expected.contains('\n') {
            true => "\n",
            false => " ",
        };
        let mut backtrace =
            format!("AssertionError:{spacing}{actual}{spacing}{operator}{spacing}{expected}");
        for frame in self.stack.lines().skip(1) {
            backtrace.push('\n');
            backtrace.push_str(frame);
        }
        Cow::Owned(backtrace)
    }
}

/// Turn a failed assertion into the failure stored on a test case.
///
/// Returns `None` for passing assertions.
pub fn better_failure(assertion: &Assertion) -> Option<Failure> {
    let error = assertion.error.as_ref()?;
    Some(Failure {
        message: assertion.message().unwrap_or_default().to_owned(),
        backtrace: error.backtrace().into_owned(),
    })
}

/// All assertions of a run, as handed over with `done`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssertionList {
    pub assertions: Vec<Assertion>,
    pub duration: Duration,
}

impl AssertionList {
    pub fn new(assertions: Vec<Assertion>, duration: Duration) -> Self {
        Self {
            assertions,
            duration,
        }
    }

    pub fn failures(&self) -> usize {
        self.assertions.iter().filter(|a| a.failed()).count()
    }
}

impl Deref for AssertionList {
    type Target = [Assertion];

    fn deref(&self) -> &Self::Target {
        &self.assertions
    }
}
