//! The test registry and runner.
//!
//! Units run one at a time, in registration order, and every unit runs even
//! when earlier ones failed. `run_all` takes `&mut self`, so a run can never be
//! re-entered while it is in progress.

use std::fmt;
use std::slice;

use serde::Serialize;
use tracing::{debug, info};

use crate::diagnostics::{RegistrationError, TestResult};
use crate::outcome::{OutcomeRecord, Status};
use crate::unit::{TestOutput, TestUnit};

/// Ordered collection of test units plus the driver that runs them.
#[derive(Debug, Default)]
pub struct TestRunner {
    units: Vec<TestUnit>,
    ran: bool,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `body` under `name`.
    ///
    /// Fails without touching the registry when the name is empty or already
    /// taken.
    pub fn register<F, T>(
        &mut self,
        name: impl Into<String>,
        body: F,
    ) -> Result<(), RegistrationError>
    where
        F: FnMut() -> TestResult<T> + 'static,
        T: TestOutput,
    {
        self.add_unit(TestUnit::new(name, body))
    }

    /// Registers an already built unit, with the same checks as [`register`].
    ///
    /// [`register`]: TestRunner::register
    pub fn add_unit(&mut self, unit: TestUnit) -> Result<(), RegistrationError> {
        if unit.name().is_empty() {
            return Err(RegistrationError::InvalidName);
        }
        if self.get(unit.name()).is_some() {
            return Err(RegistrationError::DuplicateName {
                name: unit.name().to_string(),
            });
        }
        debug!(unit = %unit.name(), position = self.units.len(), "registered test unit");
        self.units.push(unit);
        Ok(())
    }

    /// Runs every unit in registration order.
    pub fn run_all(&mut self) {
        info!(units = self.units.len(), "running test units");
        for unit in &mut self.units {
            unit.run();
        }
        self.ran = true;
        let summary = self.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            errored = summary.errored,
            "test run finished"
        );
    }

    /// Terminal records in registration order.
    ///
    /// The sequence is lazy and can be iterated again (or cloned) without
    /// running anything. Units that have never run contribute no record.
    pub fn results(&self) -> Results<'_> {
        Results {
            units: self.units.iter(),
        }
    }

    /// True iff any record is `Failed` or `Errored`.
    pub fn has_failures(&self) -> bool {
        self.results().any(|record| record.status().is_failure())
    }

    /// Aggregate status of the last run.
    ///
    /// `Errored` dominates `Failed`; `Pending` means some unit has no record
    /// yet and nothing has failed. A finished run over no units is `Passed`.
    pub fn status(&self) -> Status {
        let summary = self.summary();
        if self.ran && summary.total == 0 {
            return Status::Passed;
        }
        summary.status()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::from_records(self.results());
        summary.pending += self.units.len() - summary.total;
        summary.total = self.units.len();
        summary
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.units.iter().map(TestUnit::name)
    }

    pub fn get(&self, name: &str) -> Option<&TestUnit> {
        self.units.iter().find(|unit| unit.name() == name)
    }

    /// Clears every recorded outcome so the next run starts fresh.
    pub fn reset(&mut self) {
        self.units.iter_mut().for_each(TestUnit::reset);
        self.ran = false;
    }
}

/// Lazy, re-iterable view over a runner's outcome records.
#[derive(Debug, Clone)]
pub struct Results<'a> {
    units: slice::Iter<'a, TestUnit>,
}

impl<'a> Iterator for Results<'a> {
    type Item = &'a OutcomeRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.units.by_ref().find_map(|unit| unit.last_outcome())
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub pending: usize,
}

impl Summary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a OutcomeRecord>) -> Self {
        let mut summary = Summary::default();
        for record in records {
            summary.record(record.status());
        }
        summary
    }

    pub fn record(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Pending => self.pending += 1,
            Status::Passed => self.passed += 1,
            Status::Failed => self.failed += 1,
            Status::Errored => self.errored += 1,
        }
    }

    pub fn status(&self) -> Status {
        if self.errored > 0 {
            Status::Errored
        } else if self.failed > 0 {
            Status::Failed
        } else if self.pending > 0 || self.total == 0 {
            Status::Pending
        } else {
            Status::Passed
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total {}, passed {}, failed {}, errored {}",
            self.total, self.passed, self.failed, self.errored
        )?;
        if self.pending > 0 {
            write!(f, ", pending {}", self.pending)?;
        }
        Ok(())
    }
}
