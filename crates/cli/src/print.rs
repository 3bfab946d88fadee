//! The print trigger.
//!
//! Printing is fire-and-forget: nothing returns to the caller, failures are logged.

use std::io::Write;
use std::process::{Command, Stdio};

pub trait Printer {
    /// Hand the rendered receipt to the host.
    fn print(&self, document: &str);
}

/// Writes the receipt to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&self, document: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(err) = out.write_all(document.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!("failed to write receipt to stdout: {err}");
        }
    }
}

/// Pipes the receipt into a host command such as `lp`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPrinter {
    program: String,
    args: Vec<String>,
}

impl CommandPrinter {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line. `None` if it is blank.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Printer for CommandPrinter {
    fn print(&self, document: &str) {
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(program = %self.program, "failed to start print command: {err}");
                return;
            }
        };

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(document.as_bytes()) {
                tracing::warn!(
                    program = %self.program,
                    "failed to send receipt to print command: {err}"
                );
            }
        }

        tracing::info!(program = %self.program, "receipt sent to print command");

        // Reap the job off-thread; the shell never waits on the printer.
        let program = self.program.clone();
        std::thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                tracing::warn!(%program, %status, "print command exited unsuccessfully");
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(%program, "failed to wait for print command: {err}"),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_command_lines() {
        let printer = CommandPrinter::parse("lp -d  kitchen").unwrap();
        assert_eq!(printer.program(), "lp");
        assert_eq!(printer.args(), ["-d".to_string(), "kitchen".to_string()]);
        assert!(CommandPrinter::parse("   ").is_none());
    }

    #[test]
    fn missing_program_does_not_panic() {
        CommandPrinter::new("receipt-printer-that-does-not-exist", Vec::new()).print("x");
    }
}
