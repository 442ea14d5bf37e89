//! Serialized BIP-32 extended keys
//!
//! The 78-byte layout is the usual one (version, depth, parent fingerprint,
//! child number, chain code, key data). The version is looked up in the
//! profile's header codec, so the same key serializes as `xpub`, `zpub` or
//! `vpub` depending on its scheme and network, and a header from another
//! network is rejected instead of guessed.

use crate::derivation::{DerivationPath, HARDENED};
use crate::hash::{base58check_decode, base58check_encode, hash160};
use crate::{Error, Result};
use bip32::{ChildNumber, ExtendedKeyAttrs, Prefix, XPrv, XPub};
use kot_params::{KeyKind, NetworkProfile, XKeyScheme};
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use zeroize::Zeroize;

/// Serialized length without checksum
pub const XKEY_LEN: usize = 78;

/// Network-independent extended key tagged with its scheme
#[derive(Clone, PartialEq, Eq)]
pub struct ExtendedKey {
    /// Private or public
    pub kind: KeyKind,
    /// Scheme selecting the version header
    pub scheme: XKeyScheme,
    /// Depth below the master key
    pub depth: u8,
    /// First four bytes of the parent's key identifier
    pub parent_fingerprint: [u8; 4],
    /// Child number, hardened ones carrying the high bit
    pub child_number: u32,
    /// Chain code
    pub chain_code: [u8; 32],
    /// `0x00 || secret` for private keys, compressed point for public keys
    pub key_data: [u8; 33],
}

impl ExtendedKey {
    pub(crate) fn from_xprv(xprv: &XPrv, scheme: XKeyScheme) -> Self {
        Self::from_bip32(xprv.to_extended_key(Prefix::XPRV), KeyKind::Private, scheme)
    }

    fn from_xpub(xpub: &XPub, scheme: XKeyScheme) -> Self {
        Self::from_bip32(xpub.to_extended_key(Prefix::XPUB), KeyKind::Public, scheme)
    }

    fn from_bip32(key: bip32::ExtendedKey, kind: KeyKind, scheme: XKeyScheme) -> Self {
        Self {
            kind,
            scheme,
            depth: key.attrs.depth,
            parent_fingerprint: key.attrs.parent_fingerprint,
            child_number: u32::from(key.attrs.child_number),
            chain_code: key.attrs.chain_code,
            key_data: key.key_bytes,
        }
    }

    // bip32 only checks the prefix's prv/pub suffix; the real header lives in
    // the profile, so the generic one is fine here.
    fn to_bip32(&self) -> bip32::ExtendedKey {
        bip32::ExtendedKey {
            prefix: match self.kind {
                KeyKind::Private => Prefix::XPRV,
                KeyKind::Public => Prefix::XPUB,
            },
            attrs: ExtendedKeyAttrs {
                depth: self.depth,
                parent_fingerprint: self.parent_fingerprint,
                child_number: ChildNumber::from(self.child_number),
                chain_code: self.chain_code,
            },
            key_bytes: self.key_data,
        }
    }

    fn xprv(&self) -> Result<XPrv> {
        Ok(XPrv::try_from(self.to_bip32())?)
    }

    fn xpub(&self) -> Result<XPub> {
        Ok(XPub::try_from(self.to_bip32())?)
    }

    /// Whether this key holds a secret
    pub fn is_private(&self) -> bool {
        self.kind == KeyKind::Private
    }

    /// Version header on `profile`
    pub fn header(&self, profile: &NetworkProfile) -> u32 {
        profile.headers(self.kind).encode(self.scheme)
    }

    /// 78-byte serialization for `profile`
    pub fn to_bytes(&self, profile: &NetworkProfile) -> [u8; XKEY_LEN] {
        let mut out = [0u8; XKEY_LEN];
        out[0..4].copy_from_slice(&self.header(profile).to_be_bytes());
        out[4] = self.depth;
        out[5..9].copy_from_slice(&self.parent_fingerprint);
        out[9..13].copy_from_slice(&self.child_number.to_be_bytes());
        out[13..45].copy_from_slice(&self.chain_code);
        out[45..78].copy_from_slice(&self.key_data);
        out
    }

    /// Base58check string for `profile`
    pub fn to_base58(&self, profile: &NetworkProfile) -> String {
        let mut bytes = self.to_bytes(profile);
        let encoded = base58check_encode(&bytes);
        bytes.zeroize();
        encoded
    }

    /// Parse a 78-byte serialization whose header must belong to `profile`
    pub fn from_bytes(bytes: &[u8], profile: &NetworkProfile) -> Result<Self> {
        if bytes.len() != XKEY_LEN {
            return Err(Error::InvalidKey(format!(
                "extended key must be {XKEY_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let version = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let (kind, scheme) = profile.classify_xkey_header(version).map_err(|e| {
            tracing::debug!("Rejected extended key header {:#010x} on {}", version, profile.name);
            e
        })?;

        let mut key = Self {
            kind,
            scheme,
            depth: bytes[4],
            parent_fingerprint: [0; 4],
            child_number: u32::from_be_bytes([bytes[9], bytes[10], bytes[11], bytes[12]]),
            chain_code: [0; 32],
            key_data: [0; 33],
        };
        key.parent_fingerprint.copy_from_slice(&bytes[5..9]);
        key.chain_code.copy_from_slice(&bytes[13..45]);
        key.key_data.copy_from_slice(&bytes[45..78]);
        key.check()?;
        Ok(key)
    }

    /// Parse a base58check string whose header must belong to `profile`
    pub fn from_base58(s: &str, profile: &NetworkProfile) -> Result<Self> {
        let mut bytes = base58check_decode(s.trim()).map_err(|e| match e {
            Error::InvalidAddress(m) => Error::InvalidKey(m),
            other => other,
        })?;
        let key = Self::from_bytes(&bytes, profile);
        bytes.zeroize();
        key
    }

    fn check(&self) -> Result<()> {
        if self.depth == 0 && (self.parent_fingerprint != [0; 4] || self.child_number != 0) {
            return Err(Error::InvalidKey(
                "master key with non-zero parent fingerprint or child number".to_string(),
            ));
        }
        match self.kind {
            KeyKind::Private => {
                if self.key_data[0] != 0 {
                    return Err(Error::InvalidKey("private key data must start with 0x00".to_string()));
                }
                SecretKey::from_slice(&self.key_data[1..])?;
            }
            KeyKind::Public => {
                PublicKey::from_slice(&self.key_data)?;
            }
        }
        Ok(())
    }

    /// Public counterpart with the same scheme
    pub fn neuter(&self) -> Result<Self> {
        match self.kind {
            KeyKind::Public => Ok(self.clone()),
            KeyKind::Private => Ok(Self::from_xpub(&self.xprv()?.public_key(), self.scheme)),
        }
    }

    /// Compressed public key
    pub fn public_key_bytes(&self) -> Result<[u8; 33]> {
        match self.kind {
            KeyKind::Public => Ok(self.key_data),
            KeyKind::Private => {
                let secret = SecretKey::from_slice(&self.key_data[1..])?;
                Ok(PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret).serialize())
            }
        }
    }

    /// Identifier fingerprint used as the children's parent fingerprint
    pub fn fingerprint(&self) -> Result<[u8; 4]> {
        let id = hash160(&self.public_key_bytes()?);
        Ok([id[0], id[1], id[2], id[3]])
    }

    /// Child key at `index` (hardened if the high bit is set)
    pub fn derive_child(&self, index: u32) -> Result<Self> {
        let child = ChildNumber::from(index);
        match self.kind {
            KeyKind::Private => Ok(Self::from_xprv(&self.xprv()?.derive_child(child)?, self.scheme)),
            KeyKind::Public if index >= HARDENED => Err(Error::KeyDerivation(format!(
                "cannot derive hardened child {}' from a public key",
                index & !HARDENED
            ))),
            KeyKind::Public => Ok(Self::from_xpub(&self.xpub()?.derive_child(child)?, self.scheme)),
        }
    }

    /// Descendant along a path relative to this key
    pub fn derive_path(&self, path: &DerivationPath) -> Result<Self> {
        path.indexes()
            .iter()
            .try_fold(self.clone(), |key, &index| key.derive_child(index))
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ExtendedKey");
        s.field("kind", &self.kind)
            .field("scheme", &self.scheme)
            .field("depth", &self.depth)
            .field("parent_fingerprint", &hex::encode(self.parent_fingerprint))
            .field("child_number", &self.child_number);
        match self.kind {
            KeyKind::Private => s.field("key_data", &"<redacted>"),
            KeyKind::Public => s.field("key_data", &hex::encode(self.key_data)),
        };
        s.finish()
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        if self.kind == KeyKind::Private {
            self.key_data.zeroize();
            self.chain_code.zeroize();
        }
    }
}
