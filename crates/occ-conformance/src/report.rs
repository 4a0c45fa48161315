//! Human-readable run reporting.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;

use crate::runner::{Outcome, RunRecord};

/// Width the captured tool output is wrapped to.
pub const WRAP_WIDTH: usize = 70;

/// Left indent for wrapped tool output.
pub const INDENT: &str = "    ";

/// Column the verdict is padded to with dots.
pub const VERDICT_COLUMN: usize = 40;

/// Aggregate counters for one harness run.
///
/// Returned from the run function rather than held in process-global state,
/// so callers can thread the result wherever they need it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub passed: u32,
    pub failed: u32,
    pub timed_out: u32,
}

impl RunSummary {
    /// Count one invocation outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass => self.passed += 1,
            Outcome::Fail { .. } => self.failed += 1,
            Outcome::Timeout => self.timed_out += 1,
        }
    }

    /// Total invocations counted.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.passed + self.failed + self.timed_out
    }
}

impl fmt::Display for RunSummary {
    /// Summary line: `<passed> passed, <failed> failed`, with timeouts
    /// appended only when any occurred.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} passed, {} failed", self.passed, self.failed)?;
        if self.timed_out > 0 {
            write!(f, ", {} timed out", self.timed_out)?;
        }
        Ok(())
    }
}

/// Writes the per-vector report lines to an injected sink.
pub struct Reporter<W: Write> {
    out: W,
    verbose: bool,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, verbose: bool) -> Self {
        Self { out, verbose }
    }

    /// One verdict line: the vector name, dot padding to column 40, then
    /// `pass`, `error <code>` or `timeout`. Failures and timeouts also
    /// render the captured streams; a pass renders its stdout only in
    /// verbose mode.
    ///
    /// # Errors
    ///
    /// Propagates write failures on the report sink.
    pub fn record(&mut self, name: &str, record: &RunRecord) -> io::Result<()> {
        let dots = ".".repeat(VERDICT_COLUMN.saturating_sub(name.len()));
        match record.outcome {
            Outcome::Pass => {
                writeln!(self.out, "{name} {dots} pass")?;
                if self.verbose {
                    self.wrapped(&record.stdout)?;
                }
            }
            Outcome::Fail { code } => {
                writeln!(self.out, "{name} {dots} error {code}")?;
                self.streams(record)?;
            }
            Outcome::Timeout => {
                writeln!(self.out, "{name} {dots} timeout")?;
                self.streams(record)?;
            }
        }
        Ok(())
    }

    /// Blank line, then the summary.
    ///
    /// # Errors
    ///
    /// Propagates write failures on the report sink.
    pub fn summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{summary}")
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn streams(&mut self, record: &RunRecord) -> io::Result<()> {
        writeln!(self.out, "{INDENT}stdout:")?;
        self.wrapped(&record.stdout)?;
        writeln!(self.out, "{INDENT}stderr:")?;
        self.wrapped(&record.stderr)
    }

    /// Indent each line of `text`, wrapped to 70 columns. Splitting on the
    /// existing line breaks first preserves the tool's own paragraph
    /// structure.
    fn wrapped(&mut self, text: &str) -> io::Result<()> {
        for para in text.lines() {
            for line in textwrap::wrap(para, WRAP_WIDTH) {
                writeln!(self.out, "{INDENT}{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(record: &RunRecord, verbose: bool) -> String {
        let mut reporter = Reporter::new(Vec::new(), verbose);
        reporter.record("basic.vlt", record).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn pass_line_pads_to_column_40() {
        let record = RunRecord {
            outcome: Outcome::Pass,
            stdout: String::new(),
            stderr: String::new(),
        };
        let line = format!("basic.vlt {} pass\n", ".".repeat(31));
        assert_eq!(render(&record, false), line);
    }

    #[test]
    fn long_names_get_no_dots() {
        let mut reporter = Reporter::new(Vec::new(), false);
        let name = "a".repeat(48);
        reporter
            .record(
                &name,
                &RunRecord {
                    outcome: Outcome::Pass,
                    stdout: String::new(),
                    stderr: String::new(),
                },
            )
            .unwrap();
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(output, format!("{name}  pass\n"));
    }

    #[test]
    fn failure_renders_both_streams_indented() {
        let record = RunRecord {
            outcome: Outcome::Fail { code: 3 },
            stdout: "sent 5 packets\nreceived 4 packets".to_string(),
            stderr: "timeout waiting for echo".to_string(),
        };
        let output = render(&record, false);
        assert!(output.contains("error 3"));
        assert!(output.contains("    stdout:\n    sent 5 packets\n    received 4 packets\n"));
        assert!(output.contains("    stderr:\n    timeout waiting for echo\n"));
    }

    #[test]
    fn long_output_is_wrapped_per_paragraph() {
        let para = "word ".repeat(40);
        let record = RunRecord {
            outcome: Outcome::Fail { code: 1 },
            stdout: format!("{para}\nshort line"),
            stderr: String::new(),
        };
        let output = render(&record, false);
        for line in output.lines() {
            assert!(
                line.len() <= INDENT.len() + WRAP_WIDTH,
                "line too long: {line:?}"
            );
        }
        assert!(output.contains("    short line\n"));
    }

    #[test]
    fn verbose_pass_renders_stdout() {
        let record = RunRecord {
            outcome: Outcome::Pass,
            stdout: "all packets echoed".to_string(),
            stderr: String::new(),
        };
        assert!(render(&record, true).contains("    all packets echoed"));
        assert!(!render(&record, false).contains("all packets echoed"));
    }

    #[test]
    fn summary_line_format() {
        let mut summary = RunSummary::default();
        summary.record(Outcome::Pass);
        summary.record(Outcome::Pass);
        summary.record(Outcome::Fail { code: 2 });
        assert_eq!(summary.to_string(), "2 passed, 1 failed");

        summary.record(Outcome::Timeout);
        assert_eq!(summary.to_string(), "2 passed, 1 failed, 1 timed out");
        assert_eq!(summary.total(), 4);
    }
}
