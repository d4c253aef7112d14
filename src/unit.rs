//! Test units: a name bound to a callable, run under failure isolation.
//!
//! A unit's body returns a [`TestResult`]. Whatever it does, including
//! panicking, [`TestUnit::run`] settles exactly one [`OutcomeRecord`] and never
//! lets the failure escape.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::diagnostics::{Failure, TestResult};
use crate::outcome::OutcomeRecord;

/// Values a test body may return on success.
///
/// `()` means "nothing to report". Anything else is kept on the passing record
/// as informational context and never affects the status.
pub trait TestOutput {
    fn describe(self) -> Option<String>;
}

impl TestOutput for () {
    fn describe(self) -> Option<String> {
        None
    }
}

impl TestOutput for &str {
    fn describe(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T: TestOutput> TestOutput for Option<T> {
    fn describe(self) -> Option<String> {
        self.and_then(TestOutput::describe)
    }
}

macro_rules! impl_test_output {
    ($($ty:ty),*) => {
        $(
            impl TestOutput for $ty {
                fn describe(self) -> Option<String> {
                    Some(self.to_string())
                }
            }
        )*
    };
}

impl_test_output!(
    bool, char, String, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

type Body = Box<dyn FnMut() -> Result<Option<String>, Failure>>;

/// A named, independently executable piece of test logic.
pub struct TestUnit {
    name: String,
    body: Body,
    last_outcome: Option<OutcomeRecord>,
}

impl TestUnit {
    pub fn new<F, T>(name: impl Into<String>, mut body: F) -> Self
    where
        F: FnMut() -> TestResult<T> + 'static,
        T: TestOutput,
    {
        Self {
            name: name.into(),
            body: Box::new(move || body().map(TestOutput::describe)),
            last_outcome: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The record of the most recent execution, if any.
    pub fn last_outcome(&self) -> Option<&OutcomeRecord> {
        self.last_outcome.as_ref()
    }

    /// Runs the body once and settles a fresh record.
    pub fn run(&mut self) -> &OutcomeRecord {
        debug!(unit = %self.name, "running test unit");
        let mut record = OutcomeRecord::pending(&self.name);

        match panic::catch_unwind(AssertUnwindSafe(|| (self.body)())) {
            Ok(Ok(returned)) => record.pass(returned),
            Ok(Err(Failure::Assertion(failure))) => {
                record.fail(&failure.attach_unit(&self.name));
            }
            Ok(Err(Failure::Fault { message, source })) => record.error(format!(
                "Test {} failed with a fault: {}{}",
                self.name,
                message,
                cause_chain(source.as_deref())
            )),
            Err(payload) => record.error(format!(
                "Test {} panicked: {}",
                self.name,
                panic_message(payload.as_ref())
            )),
        }

        debug!(unit = %self.name, status = %record.status(), "test unit finished");
        self.last_outcome.insert(record)
    }

    /// Forgets the last outcome.
    pub fn reset(&mut self) {
        self.last_outcome = None;
    }
}

impl fmt::Debug for TestUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestUnit")
            .field("name", &self.name)
            .field("last_outcome", &self.last_outcome)
            .finish_non_exhaustive()
    }
}

/// `": cause: inner cause"` for every error below the fault, or empty.
fn cause_chain(source: Option<&(dyn Error + Send + Sync + 'static)>) -> String {
    let mut chain = String::new();
    let mut next = source.map(|err| err as &(dyn Error + 'static));
    while let Some(err) = next {
        chain.push_str(&format!(": {}", err));
        next = err.source();
    }
    chain
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::assert::assert_equal;
    use crate::outcome::Status;

    #[test]
    fn test_normal_return_passes() {
        let mut unit = TestUnit::new("ok", || Ok(()));
        let record = unit.run();
        assert_eq!(record.status(), Status::Passed);
        assert!(record.message().is_empty());
        assert!(record.context().is_none());
    }

    #[test]
    fn test_assertion_failure_is_failed() {
        let mut unit = TestUnit::new("bad", || assert_equal(&4, &5, None));
        let record = unit.run();
        assert_eq!(record.status(), Status::Failed);
        assert!(record.message().contains("unit bad"));
        let location = record.context().and_then(|c| c.location.as_ref()).unwrap();
        assert_eq!(location.unit.as_deref(), Some("bad"));
    }

    #[test]
    fn test_fault_is_errored() {
        let mut unit = TestUnit::new("fault", || -> TestResult {
            Err(Failure::fault("precondition violated"))
        });
        let record = unit.run();
        assert_eq!(record.status(), Status::Errored);
        assert!(record.message().contains("precondition violated"));
    }

    #[test]
    fn test_fault_message_includes_cause_chain() {
        use std::io;

        let mut unit = TestUnit::new("load", || -> TestResult {
            Err(Failure::caused_by(
                "could not load fixture",
                io::Error::new(io::ErrorKind::NotFound, "fixture.json missing"),
            ))
        });
        let record = unit.run();
        assert_eq!(record.status(), Status::Errored);
        assert_eq!(
            record.message(),
            "Test load failed with a fault: could not load fixture: fixture.json missing"
        );
    }

    #[test]
    fn test_panic_is_errored_and_contained() {
        let mut unit = TestUnit::new("boom", || -> TestResult {
            panic!("kaboom");
        });
        let record = unit.run();
        assert_eq!(record.status(), Status::Errored);
        assert!(record.message().contains("kaboom"));
    }

    #[test]
    fn test_formatted_panic_payload() {
        let mut unit = TestUnit::new("boom", || -> TestResult {
            let index = 7;
            panic!("index {} out of range", index);
        });
        assert!(unit.run().message().contains("index 7 out of range"));
    }

    #[test]
    fn test_returned_value_is_recorded() {
        let mut unit = TestUnit::new("answer", || Ok(42));
        let record = unit.run();
        assert_eq!(record.status(), Status::Passed);
        assert_eq!(record.context().unwrap().returned.as_deref(), Some("42"));
    }

    #[test]
    fn test_rerun_starts_from_fresh_record() {
        let mut calls = 0;
        let mut unit = TestUnit::new("flaky", move || {
            calls += 1;
            assert_equal(&calls, &1, None)
        });
        assert_eq!(unit.run().status(), Status::Passed);
        assert_eq!(unit.run().status(), Status::Failed);
        unit.reset();
        assert!(unit.last_outcome().is_none());
    }

    #[test]
    fn test_execution_stops_at_first_failed_assertion() {
        use std::cell::Cell;
        use std::rc::Rc;

        let reached = Rc::new(Cell::new(false));
        let flag = Rc::clone(&reached);
        let mut unit = TestUnit::new("fail-fast", move || {
            assert_equal(&1, &2, None)?;
            flag.set(true);
            Ok(())
        });
        assert_eq!(unit.run().status(), Status::Failed);
        assert!(!reached.get());
    }
}
