//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::io::{self, Write};

use crate::harness::discovery::{self, Located};
use crate::harness::{Pipeline, Reporter, RunOptions, RunSummary};

use super::reporter::{ConsoleReporter, JsonReporter, use_color};
use super::{CliError, CliResult, ConfigArgs, ExitCode, ReportFormat, RunArgs};

/// Run the suite and map the summary to an exit code.
///
/// ## Errors
///
/// - Exit code 2 when discovery fails (directory or file unreadable)
/// - Exit code 1 when any fixture failed (the report has already been printed)
pub fn run_suite(args: &RunArgs) -> CliResult<ExitCode> {
    let config = args.config.to_config();
    tracing::debug!(?config, "starting run");

    if !config.compiler.is_file() {
        tracing::warn!(compiler = %config.compiler.display(), "compiler not found; every fixture will fail");
    }
    if !config.interpreter.is_file() {
        tracing::warn!(interpreter = %config.interpreter.display(), "interpreter not found; every fixture will fail");
    }

    let discovery = discovery::discover(&config).map_err(CliError::fatal)?;
    let pipeline = Pipeline::from_config(&config);
    let options = RunOptions {
        filter: args.filter.clone(),
        exit_first: args.exit_first,
    };

    let mut reporter: Box<dyn Reporter> = match args.format {
        ReportFormat::Console => Box::new(ConsoleReporter::new(args.verbose, use_color(args.no_color))),
        ReportFormat::Json => Box::new(JsonReporter::stdout()),
    };
    let summary = pipeline.run(&discovery, &options, reporter.as_mut());

    exit_code_for(&summary)
}

fn exit_code_for(summary: &RunSummary) -> CliResult<ExitCode> {
    if summary.success() {
        Ok(ExitCode::SUCCESS)
    } else {
        // Report already printed - return error with empty message
        Err(CliError::failure(""))
    }
}

/// Print paired fixtures in run order, then the fixtures skipped for lack of golden output.
pub fn list_fixtures(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = args.to_config();
    let located = discovery::locate(&config).map_err(CliError::fatal)?;

    write_listing(&located, &mut io::stdout().lock(), &mut io::stderr().lock())
        .map_err(|e| CliError::failure(format!("cannot write fixture list: {e}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Pairs go to `out` as `name<TAB>source<TAB>expected`; counts and unpaired names go to `err`.
fn write_listing(located: &Located, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    for (fixture, expected) in &located.pairs {
        writeln!(out, "{}\t{}\t{}", fixture.name, fixture.path.display(), expected.display())?;
    }

    writeln!(
        err,
        "{} fixture(s) paired, {} without golden output",
        located.pairs.len(),
        located.unpaired.len()
    )?;
    for fixture in &located.unpaired {
        writeln!(err, "  skipped: {}", fixture.path.display())?;
    }
    Ok(())
}
