//! Parameter configuration
//!
//! Chooses the startup network and an optional directory whose
//! `servers*.json` / `checkpoints*.json` files replace the bundled copies.

use crate::data::DataSource;
use crate::network::NetworkKind;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable selecting the startup network
pub const NETWORK_ENV: &str = "KOT_NETWORK";
/// Environment variable pointing at a data override directory
pub const DATA_DIR_ENV: &str = "KOT_DATA_DIR";

/// Parameter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    /// Network selected at startup
    pub network: NetworkKind,
    /// Directory with data file overrides
    pub data_dir: Option<PathBuf>,
}

impl ParamsConfig {
    /// Read `KOT_NETWORK` and `KOT_DATA_DIR`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ParamsConfig::from_env`] with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(name) = lookup(NETWORK_ENV).filter(|v| !v.trim().is_empty()) {
            config.network = name.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        Ok(config)
    }

    /// Load from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Data source described by this configuration
    pub fn data_source(&self) -> DataSource {
        match &self.data_dir {
            Some(dir) => DataSource::with_dir(dir),
            None => DataSource::bundled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ParamsConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ParamsConfig::default());
        assert_eq!(config.network, NetworkKind::Mainnet);
        assert!(config.data_source().dir().is_none());
    }

    #[test]
    fn test_env_values() {
        let config =
            ParamsConfig::from_lookup(lookup(&[(NETWORK_ENV, "Testnet"), (DATA_DIR_ENV, "/tmp/kot")]))
                .unwrap();
        assert_eq!(config.network, NetworkKind::Testnet);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/kot")));
    }

    #[test]
    fn test_invalid_network() {
        let result = ParamsConfig::from_lookup(lookup(&[(NETWORK_ENV, "moonnet")]));
        assert!(matches!(result, Err(Error::InvalidNetwork(_))));
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        std::fs::write(&path, r#"{"network": "signet"}"#).unwrap();

        let config = ParamsConfig::from_json_file(&path).unwrap();
        assert_eq!(config.network, NetworkKind::Signet);
        assert!(config.data_dir.is_none());

        assert!(ParamsConfig::from_json_file(dir.path().join("missing.json")).is_err());
    }
}
