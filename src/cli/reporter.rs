//! Reporters
//!
//! - `ConsoleReporter` prints `name:` followed by `PASS` / `FAILED`; a failure also dumps the fixture source, the
//!   golden output and the actual output (or the stage diagnostic when nothing ran to completion).
//! - `JsonReporter` prints one JSON object per line, for CI tooling.
//!
//! Both render into strings first so the output can be tested without capturing stdout.

use std::io::{self, IsTerminal, Write};

use serde_json::{Value, json};

use crate::harness::{FixtureOutcome, FixturePair, Reporter, RunSummary, Verdict};
use crate::version::GOLDRUN_VERSION;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const MAGENTA: &str = "\x1b[35m";
const BOLD: &str = "\x1b[1m";
const BOLD_RED: &str = "\x1b[1;31m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// Colors on unless disabled by flag, by `NO_COLOR`, or because stdout is not a terminal
pub fn use_color(no_color_flag: bool) -> bool {
    !no_color_flag && std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

// ============================================================================
// Console
// ============================================================================

/// Human-readable reporter
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    pub color: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool, color: bool) -> Self {
        Self { verbose, color }
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{}{}{}", style, text, RESET)
        } else {
            text.to_string()
        }
    }

    /// Text printed when a fixture completes
    pub fn render_fixture(&self, pair: &FixturePair, outcome: &FixtureOutcome) -> String {
        let mut out = format!("{}\n", self.paint(BOLD, &format!("{}:", pair.fixture.name)));

        let status = if outcome.verdict.passed() {
            self.paint(GREEN, "PASS")
        } else {
            self.paint(RED, "FAILED")
        };
        if self.verbose {
            out.push_str(&format!("{} ({}ms)\n", status, outcome.duration.as_millis()));
        } else {
            out.push_str(&status);
            out.push('\n');
        }

        if !outcome.verdict.passed() {
            out.push('\n');
            self.push_section(&mut out, "Source code:", &pair.source);
            self.push_section(&mut out, "Expected output:", &pair.expected);
            let actual = match &outcome.verdict {
                Verdict::Aborted(failure) => self.paint(YELLOW, &failure.to_string()),
                other => other.detail(),
            };
            self.push_section(&mut out, "Actual output:", &actual);
        }
        out
    }

    fn push_section(&self, out: &mut String, heading: &str, body: &str) {
        out.push_str(&self.paint(MAGENTA, heading));
        out.push('\n');
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }

    /// Closing summary line
    pub fn render_summary(&self, summary: &RunSummary) -> String {
        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        if summary.not_run() > 0 {
            parts.push(format!("{} not run", summary.not_run()));
        }
        if summary.deselected > 0 {
            parts.push(format!("{} deselected", summary.deselected));
        }
        if summary.unpaired > 0 {
            parts.push(format!("{} without golden output", summary.unpaired));
        }
        if parts.is_empty() {
            parts.push("no fixtures ran".to_string());
        }

        let line = format!(
            "=================== {} in {:.2}s ===================",
            parts.join(", "),
            summary.duration.as_secs_f64()
        );
        let style = if summary.success() { BOLD_GREEN } else { BOLD_RED };
        format!("{}\n", self.paint(style, &line))
    }
}

impl Reporter for ConsoleReporter {
    fn on_collection_complete(&mut self, collected: usize, unpaired: usize) {
        if collected == 0 {
            eprintln!("No fixtures collected");
        } else if self.verbose {
            println!("collected {} fixture(s), {} without golden output", collected, unpaired);
            println!();
        }
    }

    fn on_fixture_complete(&mut self, pair: &FixturePair, outcome: &FixtureOutcome) {
        print!("{}", self.render_fixture(pair, outcome));
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        println!();
        print!("{}", self.render_summary(summary));
    }
}

// ============================================================================
// JSON lines
// ============================================================================

/// One JSON object per line: a `fixture` event per fixture and a final `summary`
pub struct JsonReporter<W: Write> {
    out: W,
}

impl JsonReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, value: &Value) {
        if let Err(e) = writeln!(self.out, "{}", value) {
            tracing::warn!(error = %e, "failed to write report line");
        }
    }
}

pub fn fixture_event(pair: &FixturePair, outcome: &FixtureOutcome) -> Value {
    let mut event = json!({
        "event": "fixture",
        "name": pair.fixture.name,
        "path": pair.fixture.path.display().to_string(),
        "passed": outcome.verdict.passed(),
        "outcome": outcome.verdict.label(),
        "detail": outcome.verdict.detail(),
        "duration_ms": outcome.duration.as_millis() as u64,
    });
    if let Verdict::Aborted(failure) = &outcome.verdict {
        event["stage"] = json!(failure.stage().to_string().to_lowercase());
    }
    event
}

pub fn summary_event(summary: &RunSummary) -> Value {
    json!({
        "event": "summary",
        "version": GOLDRUN_VERSION,
        "collected": summary.collected,
        "passed": summary.passed,
        "failed": summary.failed,
        "not_run": summary.not_run(),
        "deselected": summary.deselected,
        "unpaired": summary.unpaired,
        "duration_ms": summary.duration.as_millis() as u64,
    })
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_fixture_complete(&mut self, pair: &FixturePair, outcome: &FixtureOutcome) {
        let event = fixture_event(pair, outcome);
        self.emit(&event);
    }

    fn on_run_complete(&mut self, summary: &RunSummary) {
        let event = summary_event(summary);
        self.emit(&event);
    }
}
