//! Kotia address and key core
//!
//! Address, WIF and extended-key encoding plus HD derivation. Every routine
//! takes its network parameters from a `kot_params::NetworkProfile`, either
//! passed explicitly or pinned in a [`NetworkContext`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod address;
pub mod context;
pub mod derivation;
pub mod error;
pub mod hash;
pub mod wif;
pub mod xkey;

pub use address::{is_address, Address};
pub use context::NetworkContext;
pub use derivation::{
    account_path, account_xprv, account_xpub, address_path, derive_address, generate_mnemonic,
    master_from_seed, purpose, seed_from_mnemonic, DerivationPath, HARDENED,
};
pub use error::{Error, ErrorCategory, Result};
pub use wif::{ScriptType, WifKey};
pub use xkey::{ExtendedKey, XKEY_LEN};
