//! Default server hints for peer discovery
//!
//! These are passed through to the connection layer untouched.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One server entry as listed in `servers*.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerEntry {
    /// Pruning level advertised by the server ("-" for none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pruning: Option<String>,
    /// SSL port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,
    /// TCP port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
    /// Protocol version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Host -> server entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerList(BTreeMap<String, ServerEntry>);

impl ServerList {
    /// Parse a `servers*.json` document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::MalformedData(format!("servers: {e}")))
    }

    /// Entry for a host
    pub fn get(&self, host: &str) -> Option<&ServerEntry> {
        self.0.get(host)
    }

    /// Hosts in sorted order
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of servers
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Default ports used when a server entry omits them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPorts {
    /// Plain TCP port
    pub tcp: Option<u16>,
    /// SSL port
    pub ssl: Option<u16>,
}
