//! Outcome records: the terminal result of running one test unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{AssertionFailure, Tag};

/// Lifecycle status of an outcome record.
///
/// A record starts as `Pending` and settles exactly once into one of the three
/// terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Passed,
    Failed,
    Errored,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Pending)
    }

    /// True for `Failed` and `Errored`.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::Errored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::Passed => "PASS",
            Status::Failed => "FAIL",
            Status::Errored => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured data attached to a record next to its message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsilon: Option<f64>,
    /// Informational value returned by a passing unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returned: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Tag>,
}

impl OutcomeContext {
    pub fn is_empty(&self) -> bool {
        self == &OutcomeContext::default()
    }

    fn from_assertion(failure: &AssertionFailure) -> Self {
        Self {
            expected: failure.expected.clone(),
            actual: failure.actual.clone(),
            epsilon: failure.epsilon,
            returned: None,
            location: failure.tag.clone(),
        }
    }
}

/// The result of one execution of one test unit.
///
/// Only the unit that owns a record can settle it; once terminal it is
/// read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    name: String,
    status: Status,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<OutcomeContext>,
}

impl OutcomeRecord {
    pub(crate) fn pending(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: Status::Pending,
            message: String::new(),
            context: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> Option<&OutcomeContext> {
        self.context.as_ref()
    }

    pub(crate) fn pass(&mut self, returned: Option<String>) {
        let context = returned.map(|value| OutcomeContext {
            returned: Some(value),
            ..OutcomeContext::default()
        });
        self.settle(Status::Passed, String::new(), context);
    }

    pub(crate) fn fail(&mut self, failure: &AssertionFailure) {
        let context = OutcomeContext::from_assertion(failure);
        let context = (!context.is_empty()).then_some(context);
        self.settle(Status::Failed, failure.to_string(), context);
    }

    pub(crate) fn error(&mut self, message: String) {
        self.settle(Status::Errored, message, None);
    }

    fn settle(&mut self, status: Status, message: String, context: Option<OutcomeContext>) {
        debug_assert!(status.is_terminal());
        if self.status.is_terminal() {
            tracing::warn!(unit = %self.name, "outcome already settled; ignoring {}", status);
            return;
        }
        self.status = status;
        self.message = message;
        self.context = context;
    }
}
