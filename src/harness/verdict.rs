//! Verdicts
//!
//! Comparison is trim-only: leading and trailing whitespace is ignored on both sides, everything in between (internal
//! whitespace, line endings, number formatting) must match exactly.

use super::stages::StageFailure;

/// Outcome of one fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Output matched; carries the raw interpreter output
    Pass(String),
    /// Output differed; carries the raw, untrimmed interpreter output
    Mismatch(String),
    /// A stage failed before there was anything to compare
    Aborted(StageFailure),
}

impl Verdict {
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass(_))
    }

    /// Actual output for compared fixtures, the stage diagnostic for aborted ones
    pub fn detail(&self) -> String {
        match self {
            Verdict::Pass(actual) | Verdict::Mismatch(actual) => actual.clone(),
            Verdict::Aborted(failure) => failure.to_string(),
        }
    }

    /// Short machine-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass(_) => "pass",
            Verdict::Mismatch(_) => "mismatch",
            Verdict::Aborted(failure) => failure.kind(),
        }
    }
}

impl From<StageFailure> for Verdict {
    fn from(failure: StageFailure) -> Self {
        Verdict::Aborted(failure)
    }
}

/// Compare interpreter output against the golden text.
pub fn judge(actual: &str, expected: &str) -> Verdict {
    if actual.trim() == expected.trim() {
        Verdict::Pass(actual.to_string())
    } else {
        Verdict::Mismatch(actual.to_string())
    }
}
