//! The Topcheck demo command-line interface.
//!
//! Registers the example units, runs them, and hands the records to the
//! reporter selected on the command line.

use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::args::TopcheckArgs;
use crate::diagnostics::{Failure, TestResult};
use crate::report::reporter_for;
use crate::runner::TestRunner;
use crate::{check_close, check_eq, check_true};

pub mod args;

/// The main entry point for the CLI.
pub fn run() -> ExitCode {
    let args = TopcheckArgs::parse();
    if let Err(report) = init_tracing(args.verbose) {
        eprintln!("{:?}", report);
        return ExitCode::from(2);
    }

    match execute(&args) {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(report) => {
            eprintln!("{:?}", report);
            ExitCode::from(2)
        }
    }
}

/// Runs the demo suite; `Ok(true)` means some unit failed or errored.
pub fn execute(args: &TopcheckArgs) -> miette::Result<bool> {
    let mut runner = TestRunner::new();
    register_examples(&mut runner, args.include_failing)?;
    runner.run_all();

    let mut reporter = reporter_for(&args.report_config());
    reporter.report(&mut runner.results()).into_diagnostic()?;
    Ok(runner.has_failures())
}

/// The example suite. `include_failing` adds units that fail, fault, or panic.
pub fn register_examples(runner: &mut TestRunner, include_failing: bool) -> miette::Result<()> {
    runner.register("testAddition", test_addition)?;
    runner.register("testSubtraction", test_subtraction)?;
    runner.register("testFloatSum", || check_close!(0.3, 0.1 + 0.2, 1e-9))?;

    if include_failing {
        runner.register("testWrongSum", || check_eq!(4, 5))?;
        runner.register("testPrecondition", || -> TestResult {
            Err(Failure::fault("precondition violated: empty input"))
        })?;
        runner.register("testEmptyInput", || {
            let values: Vec<i32> = Vec::new();
            check_true!(!values.is_empty())
        })?;
        runner.register("testOutOfBounds", || {
            let values: Vec<i32> = Vec::new();
            let first = values[0];
            check_eq!(0, first)
        })?;
    }
    Ok(())
}

fn test_addition() -> TestResult {
    let sum = 2 + 2;
    check_eq!(4, sum)
}

fn test_subtraction() -> TestResult {
    let diff = 5 - 3;
    check_eq!(2, diff)
}

fn init_tracing(verbose: bool) -> miette::Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).into_diagnostic()?;
    Ok(())
}
