//! User facing console output.
//!
//! The reporter never prints directly, every line goes through a [`LogSink`].
//! Diagnostics that are not meant for the user go through `tracing` instead.

use std::io::{self, IsTerminal};

use crate::assertion::AssertionList;

pub mod color;

pub use color::{ColorSetting, Decorations, SupportsColor};

pub trait LogSink {
    fn log(&mut self, line: &str);

    /// Whether lines end up on a terminal, decides automatic coloring.
    fn is_terminal(&self) -> bool {
        false
    }
}

impl SupportsColor for dyn LogSink + '_ {
    fn supports_color(&self) -> bool {
        LogSink::is_terminal(self)
    }
}

impl<F: FnMut(&str)> LogSink for F {
    fn log(&mut self, line: &str) {
        self(line)
    }
}

/// Writes each line, newline terminated, to an [`io::Write`] target.
///
/// Write errors are dropped, console output is best effort.
#[derive(Debug)]
pub struct WriteSink<W: io::Write> {
    target: W,
    terminal: bool,
}

impl Default for WriteSink<io::Stdout> {
    fn default() -> Self {
        let target = io::stdout();
        Self {
            terminal: IsTerminal::is_terminal(&target),
            target,
        }
    }
}

impl<W: io::Write> WriteSink<W> {
    /// A sink that is not treated as a terminal.
    pub fn new(target: W) -> Self {
        Self {
            target,
            terminal: false,
        }
    }

    pub fn with_terminal(self, terminal: bool) -> Self {
        Self { terminal, ..self }
    }

    pub fn into_inner(self) -> W {
        self.target
    }
}

impl<W: io::Write> LogSink for WriteSink<W> {
    fn log(&mut self, line: &str) {
        if let Err(err) = writeln!(self.target, "{line}") {
            tracing::warn!(%err, "could not write console line");
        }
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}

/// The closing line of a run.
///
/// Starts with an empty line so it stands apart from the `Writing ...` lines.
pub fn summary_line(decorations: &Decorations, assertions: &AssertionList) -> String {
    let duration = assertions.duration.as_millis();
    match assertions.failures() {
        0 => format!(
            "\n{}{} assertions ({duration}ms)",
            decorations.bold(&decorations.ok("OK: ")),
            assertions.len()
        ),
        failures => format!(
            "\n{}{failures}/{} assertions failed ({duration}ms)",
            decorations.bold(&decorations.error("FAILURES: ")),
            assertions.len()
        ),
    }
}
