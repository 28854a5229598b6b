//! Fail every interface that reports a non-zero error counter.

use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;
use nettest_checks::cli::{self, CommonArgs};
use nettest_checks::interface_errors::InterfaceErrors;

/// Check interface error counters on every supported testbed device.
#[derive(Parser, Debug)]
#[command(name = "interface-errors", about = "Check interface error counters")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Counter keys to check, replacing the configured list.
    #[arg(long = "counter", value_name = "KEY")]
    counters: Vec<String>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.common.init_tracing();

    let mut config = cli.common.load_config()?;
    if !cli.counters.is_empty() {
        config
            .set_error_counters(cli.counters)
            .context("invalid --counter list")?;
    }
    cli::run_single(&cli.common, config, &mut InterfaceErrors::new())
}
