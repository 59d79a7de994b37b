//! End-to-end tests for the harness pipeline, driven by fake compiler and interpreter scripts
#![cfg(unix)]

mod common;

use std::time::{Duration, Instant};

use common::{Collector, Suite, toolchain};
use goldrun::{Pipeline, RunOptions, Stage, StageFailure, Verdict, discover};

fn run(suite: &Suite) -> Collector {
    run_with(suite, &RunOptions::default())
}

fn run_with(suite: &Suite, options: &RunOptions) -> Collector {
    let discovery = discover(&suite.config).unwrap();
    let pipeline = Pipeline::from_config(&suite.config);
    let mut collector = Collector::default();
    pipeline.run(&discovery, options, &mut collector);
    collector
}

#[test]
fn test_end_to_end_pass() {
    let suite = Suite::new();
    suite.case("add", "1+1\n", "2");

    let report = run(&suite);

    assert_eq!(report.verdict("add"), &Verdict::Pass("2\n".to_string()));
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_end_to_end_mismatch() {
    let mut suite = Suite::new();
    suite.config.interpreter = toolchain().vm_exact.clone();
    suite.case("bug", "2+2\n", "5");

    let report = run(&suite);

    let verdict = report.verdict("bug");
    assert!(!verdict.passed());
    assert_eq!(verdict.detail(), "4");
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_golden_output_is_trimmed() {
    let suite = Suite::new();
    suite.case("mul", "6*7\n", "\n  42  \n\n");

    assert!(run(&suite).verdict("mul").passed());
}

#[test]
fn test_unpaired_fixture_produces_no_verdict() {
    let suite = Suite::new();
    suite.case("add", "1+1\n", "2").fixture("draft", "3+3\n").golden("stale", "0");

    let report = run(&suite);

    assert_eq!(report.names(), vec!["add"]);
    assert_eq!(report.collected, Some((1, 1)));
}

#[test]
fn test_natural_run_order() {
    let suite = Suite::new();
    for (name, expr) in [("test10", "10"), ("test2", "2"), ("Test1", "1"), ("test1b", "1")] {
        suite.case(name, &format!("{expr}\n"), expr);
    }

    let report = run(&suite);

    assert_eq!(report.names(), vec!["Test1", "test1b", "test2", "test10"]);
}

#[test]
fn test_missing_compiler_is_contained() {
    let mut suite = Suite::new();
    suite.config.compiler = suite.root.path().join("ifjcompiler");
    suite.case("a", "1\n", "1").case("b", "2\n", "2");

    let report = run(&suite);

    assert_eq!(report.names(), vec!["a", "b"]);
    for (_, verdict) in &report.verdicts {
        assert!(matches!(
            verdict,
            Verdict::Aborted(StageFailure::MissingBinary {
                stage: Stage::Compiler,
                ..
            })
        ));
        assert!(verdict.detail().contains("ifjcompiler"));
    }
    // Interpreter stage never reached, so no assembly was ever written
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_missing_interpreter_cleans_up() {
    let mut suite = Suite::new();
    suite.config.interpreter = suite.root.path().join("ic23int");
    suite.case("add", "1+1\n", "2");

    let report = run(&suite);

    assert_eq!(report.verdict("add").detail(), format!("Interpreter \"{}\" not found", suite.config.interpreter.display()));
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_compiler_timeout_does_not_stop_the_run() {
    let suite = Suite::new();
    suite.case("a_hang", "hang\n", "0").case("b_add", "1+1\n", "2");

    let start = Instant::now();
    let report = run(&suite);

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(report.verdict("a_hang").detail(), "Compiler timeout");
    assert!(report.verdict("b_add").passed());
}

#[test]
fn test_compiler_timeout_covers_processes_it_started() {
    let suite = Suite::new();
    suite.case("a_nested", "nested\n", "0").case("b_add", "1+1\n", "2");

    let start = Instant::now();
    let report = run(&suite);

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(report.verdict("a_nested").detail(), "Compiler timeout");
    assert!(report.verdict("b_add").passed());
}

#[test]
fn test_background_process_holding_stdout_times_out() {
    let suite = Suite::new();
    suite.case("a_linger", "linger\n", "1").case("b_add", "1+1\n", "2");

    let start = Instant::now();
    let report = run(&suite);

    // The compiler itself exits at once; its background child keeps stdout open
    assert!(start.elapsed() < Duration::from_secs(10));
    assert!(matches!(
        report.verdict("a_linger"),
        Verdict::Aborted(StageFailure::Timeout {
            stage: Stage::Compiler,
            ..
        })
    ));
    assert!(report.verdict("b_add").passed());
}

#[test]
fn test_interpreter_timeout_cleans_up() {
    let suite = Suite::new();
    suite.case("spin", "spin\n", "0");

    let report = run(&suite);

    assert!(matches!(
        report.verdict("spin"),
        Verdict::Aborted(StageFailure::Timeout {
            stage: Stage::Interpreter,
            ..
        })
    ));
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_spawn_error_is_contained() {
    let mut suite = Suite::new();
    suite.config.interpreter = toolchain().vm_locked.clone();
    suite.case("add", "1+1\n", "2").case("sub", "3-1\n", "2");

    let report = run(&suite);

    assert_eq!(report.names(), vec!["add", "sub"]);
    let detail = report.verdict("add").detail();
    assert!(detail.starts_with("Interpreter error: "), "got {detail}");
    assert!(suite.leftovers().is_empty());
}

#[test]
fn test_empty_compiler_output_is_not_missing() {
    let suite = Suite::new();
    suite.case("silent", "silent\n", "");

    assert!(run(&suite).verdict("silent").passed());
}

#[test]
fn test_exit_status_ignored_by_default() {
    let suite = Suite::new();
    suite.case("fail", "fail\n", "0");

    assert!(run(&suite).verdict("fail").passed());
}

#[test]
fn test_exit_status_checked_on_request() {
    let mut suite = Suite::new();
    suite.config.check_exit_status = true;
    suite.case("fail", "fail\n", "0");

    let report = run(&suite);

    match report.verdict("fail") {
        Verdict::Aborted(StageFailure::ExitStatus { stage, stderr, .. }) => {
            assert_eq!(*stage, Stage::Compiler);
            assert_eq!(stderr, "syntax error\n");
        }
        other => panic!("expected exit status failure, got {other:?}"),
    }
}

#[test]
fn test_runs_are_deterministic() {
    let suite = Suite::new();
    suite
        .case("t1", "1+1\n", "2")
        .case("t2", "2+2\n", "5")
        .case("t3", "hang\n", "0")
        .case("t10", "5*5\n", "25");

    let first = run(&suite);
    let second = run(&suite);

    assert_eq!(first.verdicts, second.verdicts);
    assert_eq!(first.names(), vec!["t1", "t2", "t3", "t10"]);
}

#[test]
fn test_exit_first_and_filter() {
    let suite = Suite::new();
    suite
        .case("if_1", "1\n", "1")
        .case("while_1", "1\n", "9")
        .case("while_2", "2\n", "2");

    let report = run_with(
        &suite,
        &RunOptions {
            filter: Some("while".to_string()),
            exit_first: true,
        },
    );

    assert_eq!(report.names(), vec!["while_1"]);
    let summary = report.summary.unwrap();
    assert_eq!(summary.collected, 2);
    assert_eq!(summary.deselected, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.not_run(), 1);
}
