//! TEL CLI - Command line tool for building heat wave and cold snap libraries.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "tel-cli",
    version,
    about = "Thermal event library toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: tel_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    tel_cmd::run(cli.command)
}
