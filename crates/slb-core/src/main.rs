//! `service-list-builder` command line entry point

use slb_catalog::SnapshotStore;
use slb_core::cli::{CliArgs, Mode};
use slb_core::{query_dependencies, run_plan, RunConfig, RunError, RunOutcome, VERSION};
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    println!("service-list-builder Version {VERSION} - GPLv3\n");

    let args = CliArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RunError>() {
                Some(run_error) => {
                    error!("{run_error}");
                    if let Some(hint) = run_error.hint() {
                        info!("{hint}");
                    }
                    ExitCode::from(run_error.exit_code())
                }
                None => {
                    error!("{e:#}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(args: CliArgs) -> anyhow::Result<()> {
    let store = SnapshotStore::from_path(&args.snapshot).map_err(RunError::from)?;

    match args.mode {
        Mode::Dependencies {
            service,
            kernel_mode,
        } => {
            let report = query_dependencies(&store, &Default::default(), &service, kernel_mode)?;
            println!("{}", report.summary());
            for line in report.tree.render() {
                println!("{line}");
            }
        }
        Mode::Build { config, options } => {
            let config = RunConfig::from_path(&config).map_err(RunError::from)?;

            if let RunOutcome::Written { plan, .. } = run_plan(&store, &config, &options)? {
                debug!(
                    forward = plan.forward().len(),
                    rollback = plan.rollback().len(),
                    "plan rendered"
                );
            }
        }
    }

    Ok(())
}
