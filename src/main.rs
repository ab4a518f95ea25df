//! King Crab CLI

use std::{
    io::{self, Write},
    process::ExitCode,
    time::Instant,
};

use humanize_duration::{Truncate, prelude::DurationExt};
use thiserror::Error;
use tracing::{error, info};

use kingcrab::{
    fixtures::{Fixture, FixtureError},
    plan::{PlanError, plan_order},
    report::{Report, ReportError},
    solvers::milp::MILPSolver,
};

use crate::config::Config;

mod config;
mod logging;

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// King Crab CLI entry point
fn main() -> ExitCode {
    // Load configuration from .env and CLI arguments
    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => err.exit(),
    };

    if let Err(err) = logging::init(&config) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("Logging error: {err}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), RunError> {
    let fixture = Fixture::with_base_path(&config.fixtures);
    let catalog = fixture.load_catalog(&config.catalog)?;
    let order = fixture.load_order(&config.order)?;

    let solver = config
        .solver_timeout()
        .map_or_else(MILPSolver::new, MILPSolver::with_timeout);

    let start = Instant::now();
    let plan = plan_order(&catalog, &order, &solver)?;
    let elapsed = start.elapsed();

    info!(
        catalog = %config.catalog,
        order = %config.order,
        elapsed_us = elapsed.as_micros(),
        "order planned"
    );

    let report = Report::new(&catalog, &order, &plan)?;
    let mut out = io::stdout().lock();

    report.write_to(&mut out)?;

    writeln!(out, " Solved in {}", elapsed.human(Truncate::Nano))?;

    Ok(())
}
