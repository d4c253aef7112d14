//! Topcheck: a small unit-testing harness.
//!
//! Register named units on a [`TestRunner`], run them in order, and inspect the
//! [`OutcomeRecord`]s. Every unit runs under isolation: assertion failures,
//! faults and panics all end up as records, never as a crashed run.
//!
//! ```rust
//! use topcheck::prelude::*;
//!
//! let mut runner = TestRunner::new();
//! runner.register("add", || check_eq!(4, 2 + 2)).unwrap();
//! runner.register("bad", || check_eq!(4, 5)).unwrap();
//! runner.run_all();
//!
//! let statuses: Vec<_> = runner.results().map(|r| r.status()).collect();
//! assert_eq!(statuses, [Status::Passed, Status::Failed]);
//! assert!(runner.has_failures());
//! ```

pub use crate::diagnostics::{AssertionFailure, Failure, RegistrationError, Tag, TestResult};
pub use crate::outcome::{OutcomeContext, OutcomeRecord, Status};
pub use crate::runner::{Results, Summary, TestRunner};
pub use crate::unit::{TestOutput, TestUnit};

pub mod assert;
pub mod cli;
pub mod diagnostics;
pub mod message;
pub mod outcome;
pub mod report;
pub mod runner;
pub mod unit;

pub mod prelude {
    pub use crate::assert::{
        assert_almost_equal, assert_equal, assert_false, assert_not_equal, assert_true,
    };
    pub use crate::report::{ConsoleReporter, JsonReporter, LogReporter, ReportConfig, Reporter};
    pub use crate::{check_close, check_eq, check_false, check_ne, check_true};
    pub use crate::{Failure, OutcomeRecord, Status, Tag, TestResult, TestRunner};
}
