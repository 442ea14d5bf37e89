//! Blockchain checkpoints for faster sync

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A verified blockchain checkpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Block height
    pub height: u32,
    /// Block hash (hex)
    pub hash: String,
}

/// Raw checkpoint value as it appears in the bundled JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum CheckpointValue {
    Hash(String),
    Placeholder(u64),
}

impl CheckpointValue {
    fn verified_hash(&self) -> Option<&str> {
        match self {
            CheckpointValue::Hash(h) if !h.is_empty() && !h.bytes().all(|b| b == b'0') => {
                Some(h.as_str())
            }
            _ => None,
        }
    }
}

/// Sparse height -> hash table
///
/// Entries whose hash is empty, all zeros, or numeric are placeholders and
/// never count as verified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckpointTable {
    entries: BTreeMap<u32, CheckpointValue>,
}

impl CheckpointTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(height, hash)` pairs
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(height, hash)| (height, CheckpointValue::Hash(hash.into())))
                .collect(),
        }
    }

    /// Parse the bundled JSON shape: `{"<height>": "<hash>" | 0, ...}`
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, CheckpointValue> = serde_json::from_str(json)
            .map_err(|e| Error::MalformedData(format!("checkpoints: {e}")))?;

        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let height = key
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::MalformedData(format!("checkpoint height '{key}'")))?;
            entries.insert(height, value);
        }

        Ok(Self { entries })
    }

    /// Highest height carrying a non-zero hash, or 0 when nothing is verified
    pub fn max_checkpoint(&self) -> u32 {
        self.entries
            .iter()
            .rev()
            .find(|(_, value)| value.verified_hash().is_some())
            .map(|(height, _)| *height)
            .unwrap_or(0)
    }

    /// Verified hash at exactly this height
    pub fn hash_at(&self, height: u32) -> Option<&str> {
        self.entries.get(&height).and_then(CheckpointValue::verified_hash)
    }

    /// Latest verified checkpoint at or below the given height
    pub fn checkpoint_at_height(&self, height: u32) -> Result<Checkpoint> {
        self.entries
            .range(..=height)
            .rev()
            .find_map(|(h, value)| {
                value.verified_hash().map(|hash| Checkpoint {
                    height: *h,
                    hash: hash.to_string(),
                })
            })
            .ok_or(Error::CheckpointNotFound(height))
    }

    /// Verified checkpoints in ascending height order
    pub fn verified(&self) -> impl Iterator<Item = Checkpoint> + '_ {
        self.entries.iter().filter_map(|(height, value)| {
            value.verified_hash().map(|hash| Checkpoint {
                height: *height,
                hash: hash.to_string(),
            })
        })
    }

    /// Number of entries, placeholders included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZERO: &str = "0000000000000000000000000000000000000000000000000000000000000000";
    const HASH: &str = "abc0000000000000000000000000000000000000000000000000000000000000";

    #[test]
    fn test_empty_table() {
        let table = CheckpointTable::new();
        assert!(table.is_empty());
        assert_eq!(table.max_checkpoint(), 0);
    }

    #[test]
    fn test_max_checkpoint_skips_placeholders() {
        let table = CheckpointTable::from_entries([(100, ZERO), (200, HASH), (50, ZERO)]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.max_checkpoint(), 200);
    }

    #[test]
    fn test_only_placeholders() {
        let table = CheckpointTable::from_entries([(100, ZERO), (300, "")]);
        assert_eq!(table.max_checkpoint(), 0);
        assert_eq!(table.verified().count(), 0);
    }

    #[test]
    fn test_from_json() {
        let json = format!(r#"{{"100": "{ZERO}", "200": "{HASH}", "300": 0}}"#);
        let table = CheckpointTable::from_json(&json).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.max_checkpoint(), 200);
        assert_eq!(table.hash_at(200), Some(HASH));
        assert_eq!(table.hash_at(300), None);
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        assert!(CheckpointTable::from_json("[]").is_err());
        assert!(CheckpointTable::from_json(r#"{"tip": "00"}"#).is_err());
        assert!(CheckpointTable::from_json("not json").is_err());
    }

    #[test]
    fn test_checkpoint_at_height() {
        let table = CheckpointTable::from_entries([(100, HASH), (200, ZERO), (300, HASH)]);

        let cp = table.checkpoint_at_height(250).unwrap();
        assert_eq!(cp.height, 100);

        let cp = table.checkpoint_at_height(300).unwrap();
        assert_eq!(cp.height, 300);

        assert!(matches!(
            table.checkpoint_at_height(99),
            Err(Error::CheckpointNotFound(99))
        ));
    }
}
