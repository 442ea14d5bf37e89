//! Kotia network parameters and constants
//!
//! This crate provides the per-network parameter bundles (address version
//! bytes, HRPs, extended-key headers, genesis, checkpoints, consensus
//! thresholds), the registry of all networks, and the process-wide active
//! network selection that address and key code reads from.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod checkpoints;
pub mod config;
pub mod consensus;
pub mod data;
pub mod headers;
pub mod network;
pub mod registry;
pub mod servers;

pub use checkpoints::{Checkpoint, CheckpointTable};
pub use config::ParamsConfig;
pub use consensus::{ConsensusParams, StakeRules, Target};
pub use data::DataSource;
pub use headers::{HeaderTable, KeyKind, XKeyScheme};
pub use network::{genesis_hex, parse_genesis, NetworkKind, NetworkProfile, ProfileOverrides};
pub use registry::{
    active, active_kind, decode_xkey_header, encode_xkey_header, genesis_bytes, init,
    max_checkpoint, register_all, select, select_by_name, set_mainnet, set_regtest, set_signet,
    set_simnet, set_testnet, with_active, ProfileRegistry,
};
pub use servers::{DefaultPorts, ServerEntry, ServerList};

/// Error types for parameter operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid network specified
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    /// Derivation scheme tag not known on this network
    #[error("Unknown derivation scheme: {0}")]
    UnknownScheme(String),

    /// Extended-key version not registered on this network
    #[error("Unrecognized extended key version: {0:#010x}")]
    UnrecognizedVersion(u32),

    /// Two schemes share a version within a header table
    #[error("Duplicate header {version:#010x} in {table} table")]
    DuplicateHeader {
        /// Table in which the duplicate was found
        table: &'static str,
        /// Duplicated version
        version: u32,
    },

    /// Genesis hash is not 64 hex characters
    #[error("Invalid genesis hash: {0}")]
    InvalidGenesis(String),

    /// Profile violates an invariant
    #[error("Invalid {network} profile: {reason}")]
    InvalidProfile {
        /// Network name
        network: String,
        /// Violated invariant
        reason: String,
    },

    /// Checkpoint not found
    #[error("No checkpoint found for height {0}")]
    CheckpointNotFound(u32),

    /// Bundled or override data could not be parsed
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for parameter operations
pub type Result<T> = std::result::Result<T, Error>;
