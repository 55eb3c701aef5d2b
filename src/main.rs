//! Command-line driver: load the three CSV feeds, optimize, print the plan.
//!
//! Usage: `maint-sched <orders.csv> <availability.csv> <history.csv>`
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=maint_sched=debug`).

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use maint_sched::ga::{GaConfig, GaRunner, ScheduleProblem};
use maint_sched::ingest::{load_tasks, load_workers};
use maint_sched::validation::validate_input;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let [orders, availability, history] = args.as_slice() else {
        eprintln!("usage: maint-sched <orders.csv> <availability.csv> <history.csv>");
        return ExitCode::FAILURE;
    };

    let workers = match load_workers(&PathBuf::from(availability), &PathBuf::from(history)) {
        Ok(loaded) => loaded.records,
        Err(err) => {
            error!(%err, "cannot load worker roster");
            return ExitCode::FAILURE;
        }
    };
    let tasks = match load_tasks(&PathBuf::from(orders)) {
        Ok(loaded) => loaded.records,
        Err(err) => {
            error!(%err, "cannot load work orders");
            return ExitCode::FAILURE;
        }
    };
    info!(workers = workers.len(), orders = tasks.len(), "input loaded");

    if let Err(errors) = validate_input(&tasks, &workers) {
        for error in &errors {
            eprintln!("invalid input: {}", error.message);
        }
        return ExitCode::FAILURE;
    }

    let problem = ScheduleProblem::new(tasks, workers);
    let result = GaRunner::run(&problem, &GaConfig::new());
    info!(
        best_fitness = result.best_fitness,
        generations = result.generations_run,
        "optimization done"
    );

    print!("{}", problem.plan_for(&result.best).render());
    ExitCode::SUCCESS
}
