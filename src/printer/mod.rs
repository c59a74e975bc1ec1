//! Terminal rendering of evaluation outcomes.

use owo_colors::OwoColorize;

use crate::playground::EvalOutcome;
use crate::runner::RunnerError;

pub struct OutcomePrinter {
    pub color: bool,
}

impl OutcomePrinter {
    /// Program output prints plain (the playground embeds its own ANSI
    /// when color was requested); compiler text goes to stderr under a
    /// red header.
    pub fn print(&self, outcome: &EvalOutcome) {
        match outcome {
            EvalOutcome::Success { stdout } => {
                print!("{}", stdout);
                if !stdout.ends_with('\n') {
                    println!();
                }
            }
            EvalOutcome::Failure { compiler } => {
                if self.color {
                    eprintln!("{}", "error: compilation failed".red());
                } else {
                    eprintln!("error: compilation failed");
                }
                eprintln!("{}", compiler);
            }
        }
    }

    pub fn print_error(&self, err: &RunnerError) {
        if self.color {
            eprintln!("{} {}", "error:".red(), err);
        } else {
            eprintln!("error: {}", err);
        }
    }

    /// Route a failed run: classified runner errors render under the
    /// red header and count as handled; anything else passes through
    /// for the caller to report.
    pub fn render_failure(&self, err: anyhow::Error) -> Result<(), anyhow::Error> {
        match err.downcast::<RunnerError>() {
            Ok(classified) => {
                self.print_error(&classified);
                Ok(())
            }
            Err(other) => Err(other),
        }
    }
}
