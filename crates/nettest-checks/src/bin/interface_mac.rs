//! Export the interfaces and MAC addresses of every supported device to CSV.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use nettest_checks::cli::{self, CommonArgs};
use nettest_checks::interface_mac::InterfaceMac;

#[derive(Parser, Debug)]
#[command(name = "interface-mac", about = "Write Device/Interface/MAC Address rows to CSV")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Report file, rewritten on every run.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    cli.common.init_tracing();

    let mut config = cli.common.load_config()?;
    if let Some(output) = cli.output {
        config.interface_csv = output;
    }
    cli::run_single(&cli.common, config, &mut InterfaceMac::new())
}
