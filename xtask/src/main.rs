//! Developer tasks: `cargo run -p xtask -- gen-docs`

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
struct Xtask {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the CLI reference as markdown
    GenDocs {
        #[arg(long, default_value = "docs/cli-reference.md")]
        out: PathBuf,
    },
}

fn main() -> std::io::Result<()> {
    match Xtask::parse().command {
        Command::GenDocs { out } => {
            if let Some(dir) = out.parent() {
                fs::create_dir_all(dir)?;
            }
            let markdown = clap_markdown::help_markdown::<parprog::cli::Cli>();
            fs::write(&out, markdown)?;
            println!("wrote {}", out.display());
            Ok(())
        }
    }
}
