//! Arguments and process plumbing shared by the check binaries.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{ArgAction, Args};
use nettest_common::CheckConfig;
use nettest_common::driver::SnapshotDriver;
use nettest_common::report::{self, ScriptReport};
use tracing_subscriber::EnvFilter;

use crate::harness::{Check, Harness, TestbedSource};

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Testbed topology file (YAML).
    #[arg(long)]
    pub testbed: Option<PathBuf>,

    /// Check configuration (TOML).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Snapshot directory served by the device driver.
    #[arg(long)]
    pub snapshots: Option<PathBuf>,

    /// Write the results as JSON to this file.
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl CommonArgs {
    /// Install the stderr log subscriber for this process.
    pub fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
            )
            .init();
    }

    /// Config file (or defaults) with command-line overrides applied.
    pub fn load_config(&self) -> anyhow::Result<CheckConfig> {
        let mut config = match &self.config {
            Some(path) => CheckConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => CheckConfig::default(),
        };
        if let Some(dir) = &self.snapshots {
            config.snapshot_dir = dir.clone();
        }
        Ok(config)
    }

    pub fn source(&self) -> TestbedSource {
        self.testbed.clone().into()
    }
}

/// Run one check against the snapshot driver and report it.
pub fn run_single(common: &CommonArgs, config: CheckConfig, check: &mut dyn Check) -> anyhow::Result<ExitCode> {
    tracing::info!(
        testbed = ?common.testbed,
        snapshots = %config.snapshot_dir.display(),
        "{} starting",
        check.name()
    );
    let mut driver = SnapshotDriver::new(&config.snapshot_dir);
    let mut harness = Harness::new(common.source(), &mut driver, config);
    let report = harness.run(check);
    finish(&[report], common.results.as_deref())
}

/// Print the detailed results, save them if asked, and map the aggregate
/// result to the process exit code.
pub fn finish(reports: &[ScriptReport], results: Option<&Path>) -> anyhow::Result<ExitCode> {
    for script in reports {
        print!("{}", script.render());
    }
    if let Some(path) = results {
        report::write_json(path, reports)?;
    }
    Ok(exit_code(report::aggregate(reports).is_success()))
}

pub fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
