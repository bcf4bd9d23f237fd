use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

// @module: Append-only archive of processed subtitle track IDs

/// Download archive file, one decimal track ID per line.
///
/// The file is opened and closed on every call so no handle outlives a
/// single lookup or append. A missing file behaves as an empty archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArchive {
    path: PathBuf,
}

impl DownloadArchive {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check whether a track ID has been recorded
    pub fn contains(&self, id: &str) -> Result<bool> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to open archive: {:?}", self.path));
            }
        };

        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("Failed to read archive: {:?}", self.path))?;
            if line == id {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Append a track ID, creating the archive if needed
    pub fn add(&self, id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            FileManager::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open archive: {:?}", self.path))?;

        writeln!(file, "{}", id)
            .with_context(|| format!("Failed to write to archive: {:?}", self.path))?;

        Ok(())
    }

    /// Append a track ID unless it is already recorded
    pub fn record(&self, id: &str) -> Result<bool> {
        if self.contains(id)? {
            return Ok(false);
        }
        self.add(id)?;
        Ok(true)
    }
}
