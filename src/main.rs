use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use parprog::cli::{self, Cli};

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        parprog::logging::init(path)?;
    }
    cli::run(cli)
}
