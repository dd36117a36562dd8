//! Command-line interface for the `parprog` binary

mod ingest;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::Config;
use crate::registry::{HeadlessSurface, Registry};

pub use ingest::{display_names, hash_file, Outcome};

/// Width and height of the in-memory screen used with `--plain`.
const PLAIN_SIZE: (u16, u16) = (120, 40);

#[derive(Parser, Debug)]
#[command(name = "parprog", version, about = "Hash files in parallel with a live progress display")]
pub struct Cli {
    /// Files to read
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Maximum number of files read at once
    #[arg(short, long, env = "PARPROG_JOBS")]
    pub jobs: Option<usize>,

    /// Milliseconds between redraws
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Config file (defaults to <config dir>/parprog/config.toml)
    #[arg(long, env = "PARPROG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Don't take over the terminal; only print the summary
    #[arg(long)]
    pub plain: bool,

    /// Write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Pause after every chunk read, to watch progress on small files
    #[arg(long, value_name = "MS", default_value_t = 0)]
    pub throttle_ms: u64,
}

impl Cli {
    /// Config file values with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if let Some(ms) = self.interval_ms {
            config.refresh_interval_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli.resolve_config()?;
    let names = display_names(&cli.files);
    let throttle = std::time::Duration::from_millis(cli.throttle_ms);

    let outcomes = if cli.plain {
        let (w, h) = PLAIN_SIZE;
        let surface = HeadlessSurface::new(w, h).context("Failed to create headless surface")?;
        let registry = Registry::start(surface, None, &config.registry_config());
        let outcomes = ingest::ingest(&registry, config.jobs, &cli.files, &names, throttle);
        registry.stop()?;
        outcomes
    } else {
        let registry = Registry::start_terminal(&config.registry_config())
            .context("Failed to initialize terminal")?;
        let outcomes = ingest::ingest(&registry, config.jobs, &cli.files, &names, throttle);
        registry.stop()?;
        outcomes
    };

    let mut failed = false;
    for (path, outcome) in cli.files.iter().zip(&outcomes) {
        match outcome {
            Outcome::Digest(hex) => println!("{}  {}", hex, path.display()),
            Outcome::Failed(err) => {
                failed = true;
                println!("error  {}: {}", path.display(), err);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
