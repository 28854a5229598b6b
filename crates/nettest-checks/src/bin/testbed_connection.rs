//! Verify that every testbed device can be connected to.

use std::process::ExitCode;

use clap::Parser;
use nettest_checks::cli::{self, CommonArgs};
use nettest_checks::connection::VerifyConnected;

#[derive(Parser, Debug)]
#[command(name = "testbed-connection", about = "Verify every testbed device connects")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.common.init_tracing();

    let config = cli.common.load_config()?;
    cli::run_single(&cli.common, config, &mut VerifyConnected::new())
}
