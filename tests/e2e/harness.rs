use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

pub struct Harness {
    dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    /// Run `parprog --plain` with an empty config so user settings never leak in.
    pub fn run(&self, args: &[&str]) -> Output {
        let config = self.write_file("config.toml", b"refresh_interval_ms = 20\n");
        Command::new(env!("CARGO_BIN_EXE_parprog"))
            .arg("--plain")
            .arg("--config")
            .arg(&config)
            .args(args)
            .env_remove("PARPROG_JOBS")
            .env_remove("PARPROG_CONFIG")
            .env_remove("RUST_LOG")
            .output()
            .expect("run parprog")
    }
}
