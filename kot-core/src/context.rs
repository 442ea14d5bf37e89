//! Explicit network context
//!
//! A `NetworkContext` pins one profile snapshot. Every operation made through
//! it sees the same parameters even if the process-wide active network is
//! switched halfway through.

use crate::address::Address;
use crate::derivation;
use crate::wif::WifKey;
use crate::xkey::ExtendedKey;
use crate::Result;
use kot_params::{KeyKind, NetworkKind, NetworkProfile, XKeyScheme};
use std::sync::Arc;

/// Address/key operations bound to a single network profile
#[derive(Debug, Clone)]
pub struct NetworkContext {
    profile: Arc<NetworkProfile>,
}

impl NetworkContext {
    /// Snapshot of the active network
    pub fn active() -> Self {
        Self::from_profile(kot_params::active())
    }

    /// Context for a registered network
    pub fn for_network(kind: NetworkKind) -> Self {
        Self::from_profile(kot_params::register_all().get(kind))
    }

    /// Context for an arbitrary profile
    pub fn from_profile(profile: Arc<NetworkProfile>) -> Self {
        Self { profile }
    }

    /// The pinned profile
    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    /// Network kind of the pinned profile
    pub fn kind(&self) -> NetworkKind {
        self.profile.kind
    }

    /// Encode an address
    pub fn encode_address(&self, address: &Address) -> Result<String> {
        address.encode(&self.profile)
    }

    /// Decode an address
    pub fn parse_address(&self, s: &str) -> Result<Address> {
        Address::parse(s, &self.profile)
    }

    /// Whether `s` is a valid address on this network
    pub fn is_address(&self, s: &str) -> bool {
        crate::address::is_address(s, &self.profile)
    }

    /// Encode a private key
    pub fn encode_wif(&self, key: &WifKey) -> String {
        key.encode(&self.profile)
    }

    /// Decode a private key
    pub fn decode_wif(&self, s: &str) -> Result<WifKey> {
        WifKey::decode(s, &self.profile)
    }

    /// Version header for a scheme tag
    pub fn xkey_header(&self, kind: KeyKind, tag: &str) -> Result<u32> {
        Ok(self.profile.headers(kind).encode_tag(tag)?)
    }

    /// Serialize an extended key
    pub fn encode_xkey(&self, key: &ExtendedKey) -> String {
        key.to_base58(&self.profile)
    }

    /// Parse an extended key
    pub fn decode_xkey(&self, s: &str) -> Result<ExtendedKey> {
        ExtendedKey::from_base58(s, &self.profile)
    }

    /// Account public key for a seed
    pub fn account_xpub(
        &self,
        seed: &[u8],
        scheme: XKeyScheme,
        account: u32,
    ) -> Result<ExtendedKey> {
        derivation::account_xpub(&self.profile, seed, scheme, account)
    }

    /// Address below an account key
    pub fn derive_address(
        &self,
        account: &ExtendedKey,
        change: bool,
        index: u32,
    ) -> Result<String> {
        derivation::derive_address(&self.profile, account, change, index)
    }
}
