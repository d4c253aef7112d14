//! Rendering outcome records for humans and machines.
//!
//! Reporters are pure consumers: they take the ordered records a runner
//! produced and write them somewhere. Nothing here can change an outcome.

use std::io::{self, Write};

use clap::ValueEnum;
use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::message::Message;
use crate::outcome::{OutcomeRecord, Status};
use crate::runner::Summary;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable lines plus a summary.
    #[default]
    Text,
    /// A single JSON document with every record and the summary.
    Json,
    /// One timestamped message line per record.
    Log,
}

/// How results are rendered.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub use_colors: bool,
    /// Also show context for passing units.
    pub verbose: bool,
    pub format: OutputFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stdout),
            verbose: false,
            format: OutputFormat::Text,
        }
    }
}

impl ReportConfig {
    pub fn color_choice(&self) -> ColorChoice {
        if self.use_colors {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        }
    }
}

// ============================================================================
// REPORTER TRAIT
// ============================================================================

pub trait Reporter {
    fn report(&mut self, records: &mut dyn Iterator<Item = &OutcomeRecord>) -> io::Result<()>;
}

/// Picks a stdout reporter for `config.format`.
pub fn reporter_for(config: &ReportConfig) -> Box<dyn Reporter> {
    match config.format {
        OutputFormat::Text => Box::new(ConsoleReporter::stdout(config)),
        OutputFormat::Json => Box::new(JsonReporter::new(io::stdout())),
        OutputFormat::Log => Box::new(LogReporter::new(io::stdout())),
    }
}

// ============================================================================
// CONSOLE
// ============================================================================

pub struct ConsoleReporter<W> {
    out: W,
    verbose: bool,
}

impl ConsoleReporter<StandardStream> {
    pub fn stdout(config: &ReportConfig) -> Self {
        Self::new(StandardStream::stdout(config.color_choice()), config.verbose)
    }
}

impl<W: WriteColor> ConsoleReporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_status(&mut self, status: Status) -> io::Result<()> {
        let color = match status {
            Status::Passed => Color::Green,
            Status::Failed => Color::Red,
            Status::Errored => Color::Magenta,
            Status::Pending => Color::Yellow,
        };
        self.out
            .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
        write!(self.out, "{:<5}", status.as_str())?;
        self.out.reset()
    }

    fn write_record(&mut self, record: &OutcomeRecord) -> io::Result<()> {
        self.write_status(record.status())?;
        writeln!(self.out, " {}", record.name())?;

        if !record.message().is_empty() {
            writeln!(self.out, "      {}", record.message())?;
        }

        let Some(context) = record.context() else {
            return Ok(());
        };
        if record.status() == Status::Passed && !self.verbose {
            return Ok(());
        }
        if let Some(returned) = &context.returned {
            writeln!(self.out, "      returned: {}", returned)?;
        }
        if let (Some(expected), Some(actual)) = (&context.expected, &context.actual) {
            if expected.contains('\n') || actual.contains('\n') {
                let changeset = Changeset::new(expected, actual, "\n");
                self.write_diff(&changeset.diffs)?;
            }
        }
        Ok(())
    }

    fn write_diff(&mut self, diffs: &[Difference]) -> io::Result<()> {
        for diff in diffs {
            match diff {
                Difference::Same(x) => {
                    self.out.reset()?;
                    writeln!(self.out, "       {}", x)?;
                }
                Difference::Add(x) => {
                    self.out
                        .set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                    writeln!(self.out, "      +{}", x)?;
                }
                Difference::Rem(x) => {
                    self.out
                        .set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                    writeln!(self.out, "      -{}", x)?;
                }
            }
        }
        self.out.reset()
    }
}

impl<W: WriteColor> Reporter for ConsoleReporter<W> {
    fn report(&mut self, records: &mut dyn Iterator<Item = &OutcomeRecord>) -> io::Result<()> {
        let mut summary = Summary::default();
        let mut failed = Vec::new();
        for record in records {
            summary.record(record.status());
            if record.status().is_failure() {
                failed.push(record.name().to_string());
            }
            self.write_record(record)?;
        }

        writeln!(self.out)?;
        write!(self.out, "Test summary: ")?;
        self.write_status(summary.status())?;
        writeln!(self.out, " {}", summary)?;

        if !failed.is_empty() {
            writeln!(self.out, "Failed tests:")?;
            for name in failed {
                writeln!(self.out, "  - {}", name)?;
            }
        }
        self.out.flush()
    }
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct JsonReport<'a> {
    results: Vec<&'a OutcomeRecord>,
    summary: Summary,
}

pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, records: &mut dyn Iterator<Item = &OutcomeRecord>) -> io::Result<()> {
        let results: Vec<&OutcomeRecord> = records.collect();
        let summary = Summary::from_records(results.iter().copied());
        serde_json::to_writer_pretty(&mut self.out, &JsonReport { results, summary })?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

// ============================================================================
// LOG
// ============================================================================

pub struct LogReporter<W> {
    out: W,
}

impl<W: Write> LogReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for LogReporter<W> {
    fn report(&mut self, records: &mut dyn Iterator<Item = &OutcomeRecord>) -> io::Result<()> {
        for record in records {
            writeln!(self.out, "{}", Message::from_record(record))?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod report_tests {
    use termcolor::NoColor;

    use super::*;
    use crate::assert::assert_equal;
    use crate::diagnostics::TestResult;
    use crate::runner::TestRunner;

    fn sample_runner() -> TestRunner {
        let mut runner = TestRunner::new();
        runner.register("add", || assert_equal(&4, &(2 + 2), None)).unwrap();
        runner.register("bad", || assert_equal(&4, &5, None)).unwrap();
        runner
            .register("boom", || -> TestResult { panic!("kaboom") })
            .unwrap();
        runner.run_all();
        runner
    }

    #[test]
    fn test_console_lists_every_record_and_summary() {
        let runner = sample_runner();
        let mut reporter = ConsoleReporter::new(NoColor::new(Vec::new()), false);
        reporter.report(&mut runner.results()).unwrap();
        let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();

        assert!(text.contains("PASS  add"));
        assert!(text.contains("FAIL  bad"));
        assert!(text.contains("ERROR boom"));
        assert!(text.contains("kaboom"));
        assert!(text.contains("Test summary: ERROR total 3, passed 1, failed 1, errored 1"));
        assert!(text.contains("  - bad"));
        assert!(text.find("add").unwrap() < text.find("bad").unwrap());
    }

    #[test]
    fn test_console_shows_multiline_diff() {
        let mut runner = TestRunner::new();
        runner
            .register("lists", || assert_equal(&vec![1, 2, 3], &vec![1, 2, 4], None))
            .unwrap();
        runner.run_all();

        let mut reporter = ConsoleReporter::new(NoColor::new(Vec::new()), false);
        reporter.report(&mut runner.results()).unwrap();
        let text = String::from_utf8(reporter.into_inner().into_inner()).unwrap();
        assert!(text.contains("FAIL  lists"));
        assert!(text.contains("-    3,"));
        assert!(text.contains("+    4,"));
    }

    #[test]
    fn test_verbose_console_shows_returned_value() {
        let mut runner = TestRunner::new();
        runner.register("answer", || Ok(42)).unwrap();
        runner.run_all();

        let mut quiet = ConsoleReporter::new(NoColor::new(Vec::new()), false);
        quiet.report(&mut runner.results()).unwrap();
        let quiet = String::from_utf8(quiet.into_inner().into_inner()).unwrap();
        assert!(!quiet.contains("returned: 42"));

        let mut verbose = ConsoleReporter::new(NoColor::new(Vec::new()), true);
        verbose.report(&mut runner.results()).unwrap();
        let verbose = String::from_utf8(verbose.into_inner().into_inner()).unwrap();
        assert!(verbose.contains("returned: 42"));
    }

    #[test]
    fn test_json_report_round_trips_records() {
        let runner = sample_runner();
        let mut reporter = JsonReporter::new(Vec::new());
        reporter.report(&mut runner.results()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&reporter.into_inner()).unwrap();

        let records: Vec<OutcomeRecord> =
            serde_json::from_value(value["results"].clone()).unwrap();
        let expected: Vec<OutcomeRecord> = runner.results().cloned().collect();
        assert_eq!(records, expected);
        assert_eq!(value["summary"]["failed"], 1);
        assert_eq!(value["results"][1]["status"], "failed");
    }

    #[test]
    fn test_log_report_one_line_per_record() {
        let runner = sample_runner();
        let mut reporter = LogReporter::new(Vec::new());
        reporter.report(&mut runner.results()).unwrap();
        let text = String::from_utf8(reporter.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("[SUCCESS] add: PASS"));
        assert!(lines[1].contains("[FAIL] bad: FAIL"));
        assert!(lines[2].contains("[FAIL] boom: ERROR"));
    }
}
