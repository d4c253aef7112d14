//! Failure signals and registration errors for the Topcheck harness.
//!
//! There are exactly three kinds of things that can go wrong:
//!
//! - [`AssertionFailure`]: an assertion's predicate did not hold. The unit that
//!   raised it ends as `Failed`.
//! - [`Failure::Fault`]: anything else a unit's body reports (a bad precondition,
//!   a foreign error bubbled up with `?`, an invalid assertion call). The unit
//!   ends as `Errored`. Panics are treated the same way by the unit boundary.
//! - [`RegistrationError`]: returned straight from `TestRunner::register`, never
//!   stored in an outcome record.
//!
//! All of them are `miette` diagnostics so a caller can render them with codes
//! and help text.

use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type returned by test bodies and assertions.
pub type TestResult<T = ()> = Result<T, Failure>;

// ============================================================================
// CONTEXT TAG
// ============================================================================

/// Where an assertion was made.
///
/// The assertion engine never computes this itself. The `check_*` macros fill
/// in the file and line, and the unit boundary fills in the unit name when the
/// caller left it empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Tag {
    /// A tag pointing at a source location.
    pub fn here(file: &str, line: u32) -> Self {
        Self {
            unit: None,
            file: Some(file.to_string()),
            line: Some(line),
        }
    }

    /// A tag naming only the unit.
    pub fn unit(name: impl Into<String>) -> Self {
        Self {
            unit: Some(name.into()),
            file: None,
            line: None,
        }
    }

    pub fn with_unit(mut self, name: impl Into<String>) -> Self {
        self.unit = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.unit.is_none() && self.file.is_none() && self.line.is_none()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(unit) = &self.unit {
            parts.push(format!("unit {}", unit));
        }
        if let Some(file) = &self.file {
            parts.push(format!("file {}", file));
        }
        if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        write!(f, "{}", parts.join(", "))
    }
}

fn location_suffix(tag: &Option<Tag>) -> String {
    match tag {
        Some(tag) if !tag.is_empty() => format!(" ({})", tag),
        _ => String::new(),
    }
}

// ============================================================================
// ASSERTION FAILURE
// ============================================================================

/// Raised by the assertion engine when a predicate does not hold.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
#[error("Assertion failed: {detail}{}", location_suffix(.tag))]
#[diagnostic(code(topcheck::assertion))]
pub struct AssertionFailure {
    /// What the predicate saw, without location information.
    pub detail: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub epsilon: Option<f64>,
    pub tag: Option<Tag>,
}

impl AssertionFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            expected: None,
            actual: None,
            epsilon: None,
            tag: None,
        }
    }

    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn with_tag(mut self, tag: Option<&Tag>) -> Self {
        self.tag = tag.cloned();
        self
    }

    /// Fills in the unit name unless the caller already supplied one.
    pub fn attach_unit(mut self, name: &str) -> Self {
        let tag = self.tag.get_or_insert_with(Tag::default);
        if tag.unit.is_none() {
            tag.unit = Some(name.to_string());
        }
        self
    }
}

// ============================================================================
// FAILURE SIGNAL
// ============================================================================

/// The error half of a test body's result.
#[derive(Debug, Error, Diagnostic)]
pub enum Failure {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Assertion(#[from] AssertionFailure),
    #[error("{message}")]
    #[diagnostic(
        code(topcheck::unit_fault),
        help("this fault is unrelated to assertions; the unit is reported as errored")
    )]
    Fault {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl Failure {
    /// A fault that is not an assertion failure.
    pub fn fault(message: impl Into<String>) -> Self {
        Failure::Fault {
            message: message.into(),
            source: None,
        }
    }

    /// A fault wrapping an underlying error.
    pub fn caused_by(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Failure::Fault {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn is_assertion(&self) -> bool {
        matches!(self, Failure::Assertion(_))
    }
}

impl From<Box<dyn std::error::Error + Send + Sync + 'static>> for Failure {
    fn from(err: Box<dyn std::error::Error + Send + Sync + 'static>) -> Self {
        Failure::Fault {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<std::io::Error> for Failure {
    fn from(err: std::io::Error) -> Self {
        Failure::caused_by(format!("I/O error: {}", err), err)
    }
}

// ============================================================================
// REGISTRATION ERRORS
// ============================================================================

/// Raised synchronously by `TestRunner::register`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum RegistrationError {
    #[error("test unit name must not be empty")]
    #[diagnostic(
        code(topcheck::registration::invalid_name),
        help("give every test unit a non-empty name")
    )]
    InvalidName,
    #[error("a test unit named `{name}` is already registered")]
    #[diagnostic(
        code(topcheck::registration::duplicate_name),
        help("test unit names must be unique within a runner")
    )]
    DuplicateName { name: String },
}
