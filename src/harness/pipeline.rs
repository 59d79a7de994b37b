//! Sequential run loop
//!
//! ## Reporter Trait
//!
//! The loop reports through the [`Reporter`] trait so rendering (console, JSON lines) stays out of the core. Calls
//! arrive in discovery order, one fixture completing before the next starts.

use std::time::{Duration, Instant};

use super::config::HarnessConfig;
use super::discovery::{Discovery, Fixture, FixturePair};
use super::stages::{CompileStage, ExecuteStage, ProcessCompiler, ProcessInterpreter};
use super::verdict::{Verdict, judge};

/// Receives run progress.
pub trait Reporter {
    /// Called once, after filtering, before the first fixture runs
    fn on_collection_complete(&mut self, _collected: usize, _unpaired: usize) {}

    /// Called when a fixture begins
    fn on_fixture_start(&mut self, _fixture: &Fixture) {}

    /// Called when a fixture has a verdict
    fn on_fixture_complete(&mut self, pair: &FixturePair, outcome: &FixtureOutcome);

    /// Called when the run ends (normally or after `exit_first`)
    fn on_run_complete(&mut self, summary: &RunSummary);
}

/// Verdict plus timing for one fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureOutcome {
    pub verdict: Verdict,
    pub duration: Duration,
}

/// Run selection and early-exit policy
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Only run fixtures whose name contains this keyword
    pub filter: Option<String>,
    /// Stop after the first failed fixture
    pub exit_first: bool,
}

impl RunOptions {
    pub fn selects(&self, fixture: &Fixture) -> bool {
        self.filter.as_deref().is_none_or(|keyword| fixture.name.contains(keyword))
    }
}

/// Totals for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Fixtures selected to run
    pub collected: usize,
    pub passed: usize,
    pub failed: usize,
    /// Fixtures without a golden output
    pub unpaired: usize,
    /// Paired fixtures excluded by the filter
    pub deselected: usize,
    pub duration: Duration,
}

impl RunSummary {
    /// Selected fixtures that never ran because of `exit_first`
    pub fn not_run(&self) -> usize {
        self.collected.saturating_sub(self.passed + self.failed)
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Compile -> execute -> judge, over a set of fixture pairs
pub struct Pipeline<C, E> {
    compiler: C,
    interpreter: E,
}

impl Pipeline<ProcessCompiler, ProcessInterpreter> {
    /// Pipeline driving the configured binaries
    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(ProcessCompiler::from_config(config), ProcessInterpreter::from_config(config))
    }
}

impl<C: CompileStage, E: ExecuteStage> Pipeline<C, E> {
    pub fn new(compiler: C, interpreter: E) -> Self {
        Self { compiler, interpreter }
    }

    /// Judge a single fixture. A stage failure short-circuits to `Verdict::Aborted`.
    pub fn judge_fixture(&self, pair: &FixturePair) -> Verdict {
        let assembly = match self.compiler.compile(&pair.fixture.path) {
            Ok(assembly) => assembly,
            Err(failure) => return Verdict::Aborted(failure),
        };
        match self.interpreter.execute(&assembly) {
            Ok(actual) => judge(&actual, &pair.expected),
            Err(failure) => Verdict::Aborted(failure),
        }
    }

    pub fn run_fixture(&self, pair: &FixturePair) -> FixtureOutcome {
        let start = Instant::now();
        let verdict = self.judge_fixture(pair);
        let duration = start.elapsed();
        tracing::debug!(fixture = %pair.fixture.name, outcome = verdict.label(), ?duration, "fixture done");
        FixtureOutcome { verdict, duration }
    }

    /// Run every selected fixture in discovery order.
    pub fn run(&self, discovery: &Discovery, options: &RunOptions, reporter: &mut dyn Reporter) -> RunSummary {
        let start = Instant::now();

        let selected: Vec<&FixturePair> = discovery.pairs.iter().filter(|p| options.selects(&p.fixture)).collect();
        let mut summary = RunSummary {
            collected: selected.len(),
            unpaired: discovery.unpaired.len(),
            deselected: discovery.pairs.len() - selected.len(),
            ..RunSummary::default()
        };

        reporter.on_collection_complete(summary.collected, summary.unpaired);

        for pair in selected {
            reporter.on_fixture_start(&pair.fixture);
            let outcome = self.run_fixture(pair);
            let passed = outcome.verdict.passed();
            if passed {
                summary.passed += 1;
            } else {
                summary.failed += 1;
            }
            reporter.on_fixture_complete(pair, &outcome);

            if options.exit_first && !passed {
                tracing::debug!(fixture = %pair.fixture.name, "stopping after first failure");
                break;
            }
        }

        summary.duration = start.elapsed();
        reporter.on_run_complete(&summary);
        summary
    }
}
