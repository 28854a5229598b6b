//! Append the software version of every supported device to CSV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nettest_checks::cli::{self, CommonArgs};
use nettest_checks::version_check::VersionCheck;

#[derive(Parser, Debug)]
#[command(name = "version-check", about = "Append Device/Version rows to CSV")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Report file; rows are appended across runs.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.common.init_tracing();

    let mut config = cli.common.load_config()?;
    if let Some(output) = cli.output {
        config.version_csv = output;
    }
    cli::run_single(&cli.common, config, &mut VersionCheck::new())
}
