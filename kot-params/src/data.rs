//! Bundled data files (`servers*.json`, `checkpoints*.json`)
//!
//! Files are looked up in an optional override directory first and then in
//! the copies compiled into the crate. A missing or malformed file degrades
//! to the empty default.

use crate::Result;
use std::path::{Path, PathBuf};

const BUNDLED: &[(&str, &str)] = &[
    ("servers.json", include_str!("../data/servers.json")),
    ("servers_testnet.json", include_str!("../data/servers_testnet.json")),
    ("servers_regtest.json", include_str!("../data/servers_regtest.json")),
    ("servers_signet.json", include_str!("../data/servers_signet.json")),
    ("checkpoints.json", include_str!("../data/checkpoints.json")),
    ("checkpoints_testnet.json", include_str!("../data/checkpoints_testnet.json")),
];

/// Where profile data files are read from
#[derive(Debug, Clone, Default)]
pub struct DataSource {
    dir: Option<PathBuf>,
}

impl DataSource {
    /// Compiled-in copies only
    pub fn bundled() -> Self {
        Self { dir: None }
    }

    /// Prefer files from `dir`, falling back to the compiled-in copies
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Override directory, if any
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    fn read(&self, file: &str) -> Option<String> {
        if let Some(dir) = &self.dir {
            let path = dir.join(file);
            match std::fs::read_to_string(&path) {
                Ok(contents) => {
                    tracing::debug!("Loaded {} from {}", file, path.display());
                    return Some(contents);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", path.display(), e);
                    return None;
                }
            }
        }

        BUNDLED
            .iter()
            .find(|(name, _)| *name == file)
            .map(|(_, contents)| contents.to_string())
    }

    /// Load and parse a data file, degrading to `T::default()` on any failure
    pub fn load<T, F>(&self, file: &str, parse: F) -> T
    where
        T: Default,
        F: FnOnce(&str) -> Result<T>,
    {
        let Some(contents) = self.read(file) else {
            tracing::debug!("No data file {}, using empty default", file);
            return T::default();
        };

        match parse(&contents) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring malformed {}: {}", file, e);
                T::default()
            }
        }
    }
}
