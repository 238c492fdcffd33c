// Identity store: a flat text file with one Apple ID per line. The file is
// opened and closed inside each call; nothing is cached between calls.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        IdentityStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the known identities, sorted with duplicates and blank lines
    /// removed. A missing file simply means nobody has been saved yet.
    pub fn load(&self) -> Result<Vec<String>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no identity file yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read identity file {}", self.path.display())
                })
            }
        };

        let ids: BTreeSet<String> = data
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        Ok(ids.into_iter().collect())
    }

    /// Append `id` unless the file already lists it. Returns `true` when a
    /// line was written.
    pub fn save(&self, id: &str) -> Result<bool> {
        let id = id.trim();
        if self.load()?.iter().any(|known| known == id) {
            return Ok(false);
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        writeln!(file, "{}", id)
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        debug!(path = %self.path.display(), id, "saved identity");
        Ok(true)
    }
}
