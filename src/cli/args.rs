//! Command-line arguments for the Topcheck demo runner.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::Parser;

use crate::report::{OutputFormat, ReportConfig};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "topcheck-demo",
    version,
    about = "Runs the bundled Topcheck example units and reports their outcomes."
)]
pub struct TopcheckArgs {
    /// How to render the results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable colored output.
    #[arg(long)]
    pub no_color: bool,

    /// Show context for passing units and emit debug logs on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Also register units that fail and error, to exercise every outcome.
    #[arg(long)]
    pub include_failing: bool,
}

impl TopcheckArgs {
    pub fn report_config(&self) -> ReportConfig {
        let defaults = ReportConfig::default();
        ReportConfig {
            use_colors: defaults.use_colors && !self.no_color,
            verbose: self.verbose,
            format: self.format,
        }
    }
}
