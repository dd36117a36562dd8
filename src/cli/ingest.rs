//! Parallel file hashing, one progress line per file

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dispatch::bounded_exec;
use crate::registry::{Registry, Surface};
use crate::source::ProgressHandle;

const CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Digest(String),
    Failed(String),
}

/// Progress line names: the file name, or the whole path when two files
/// share a file name.
pub fn display_names(files: &[PathBuf]) -> Vec<String> {
    let base = |p: &PathBuf| {
        p.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| p.display().to_string())
    };

    let mut counts: HashMap<String, usize> = HashMap::new();
    for path in files {
        *counts.entry(base(path)).or_default() += 1;
    }

    files
        .iter()
        .map(|path| {
            let name = base(path);
            if counts[&name] > 1 {
                path.display().to_string()
            } else {
                name
            }
        })
        .collect()
}

/// SHA-256 of everything left in `reader`, as lowercase hex.
pub fn hash_file(mut reader: impl Read, throttle: Duration) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        if !throttle.is_zero() {
            thread::sleep(throttle);
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn ingest_one<S: Surface>(
    registry: &Registry<S>,
    name: &str,
    path: &Path,
    throttle: Duration,
) -> Outcome {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            // Still show a line so the failure is visible.
            registry.add(name, ProgressHandle::Untracked);
            registry.complete(name, Some(anyhow::anyhow!("{}", e)));
            return Outcome::Failed(e.to_string());
        }
    };

    registry.add(name, &file);
    match hash_file(&file, throttle) {
        Ok(hex) => {
            debug!("{}: sha256 {}", name, hex);
            registry.complete(name, None);
            Outcome::Digest(hex)
        }
        Err(e) => {
            debug!("{}: read failed: {}", name, e);
            registry.complete(name, Some(anyhow::anyhow!("{}", e)));
            Outcome::Failed(e.to_string())
        }
    }
}

/// Hash every file with at most `jobs` running at once. Outcomes are
/// returned in the order of `files`.
pub(crate) fn ingest<S: Surface>(
    registry: &Registry<S>,
    jobs: usize,
    files: &[PathBuf],
    names: &[String],
    throttle: Duration,
) -> Vec<Outcome> {
    let outcomes = Mutex::new(vec![None; files.len()]);

    bounded_exec(jobs, files.iter().zip(names).enumerate(), |(i, (path, name))| {
        let outcome = ingest_one(registry, name, path, throttle);
        outcomes.lock().unwrap_or_else(|e| e.into_inner())[i] = Some(outcome);
    });

    outcomes
        .into_inner()
        .unwrap_or_else(|e| e.into_inner())
        .into_iter()
        .map(|o| o.unwrap_or_else(|| Outcome::Failed("not processed".to_string())))
        .collect()
}
