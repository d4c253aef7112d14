// Topcheck demo runner: registers the example units and reports them.
// Usage: cargo run --bin topcheck-demo -- [--format text|json|log] [--include-failing]

use std::process::ExitCode;

fn main() -> ExitCode {
    topcheck::cli::run()
}
