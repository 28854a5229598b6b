//! Network test job
//!
//! Runs the connection check, the interface/MAC export, the version export
//! and the interface error check against one testbed, prints every script's
//! results followed by the job summary, and exits non-zero if any script
//! did not pass.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nettest_checks::cli::{self, CommonArgs};
use nettest_checks::harness::Harness;
use nettest_checks::job;
use nettest_common::driver::SnapshotDriver;
use nettest_common::report;

#[derive(Parser, Debug)]
#[command(name = "network-test-job", about = "Run every network check against a testbed")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Interface/MAC report file.
    #[arg(long)]
    interface_csv: Option<PathBuf>,

    /// Software version report file.
    #[arg(long)]
    version_csv: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.common.init_tracing();

    let mut config = cli.common.load_config()?;
    if let Some(path) = cli.interface_csv {
        config.interface_csv = path;
    }
    if let Some(path) = cli.version_csv {
        config.version_csv = path;
    }

    tracing::info!(
        testbed = ?cli.common.testbed,
        snapshots = %config.snapshot_dir.display(),
        "network-test-job starting"
    );

    let mut driver = SnapshotDriver::new(&config.snapshot_dir);
    let mut harness = Harness::new(cli.common.source(), &mut driver, config);
    let results = job::run(&mut harness, job::tasks());

    for task in &results {
        print!("{}", task.report.render());
    }
    print!("{}", job::render_summary(&results));

    if let Some(path) = &cli.common.results {
        let reports: Vec<_> = results.iter().map(|t| t.report.clone()).collect();
        report::write_json(path, &reports)?;
    }

    let outcome = job::result(&results);
    tracing::info!(result = %outcome, "network-test-job finished");
    Ok(cli::exit_code(outcome.is_success()))
}
