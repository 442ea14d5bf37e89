//! WIF private keys
//!
//! Keys are written as `base58check(wif_prefix || secret || [0x01])`, with the
//! trailing byte present only for compressed keys. Segwit keys carry a textual
//! script-type prefix (`p2wpkh:...`) so the address type survives an
//! export/import round trip.

use crate::address::{networks_with, Address};
use crate::hash::{base58check_decode, base58check_encode};
use crate::{Error, Result};
use kot_params::{NetworkProfile, XKeyScheme};
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Output script a single key pays to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptType {
    /// Legacy pay-to-pubkey-hash
    #[default]
    #[serde(rename = "p2pkh")]
    P2pkh,
    /// P2WPKH nested in P2SH
    #[serde(rename = "p2wpkh-p2sh")]
    P2wpkhP2sh,
    /// Native P2WPKH
    #[serde(rename = "p2wpkh")]
    P2wpkh,
}

impl ScriptType {
    /// All single-key script types
    pub const ALL: [ScriptType; 3] = [ScriptType::P2pkh, ScriptType::P2wpkhP2sh, ScriptType::P2wpkh];

    /// Textual name
    pub const fn as_str(self) -> &'static str {
        match self {
            ScriptType::P2pkh => "p2pkh",
            ScriptType::P2wpkhP2sh => "p2wpkh-p2sh",
            ScriptType::P2wpkh => "p2wpkh",
        }
    }

    /// Extended-key scheme producing addresses of this type
    pub const fn xkey_scheme(self) -> XKeyScheme {
        match self {
            ScriptType::P2pkh => XKeyScheme::Standard,
            ScriptType::P2wpkhP2sh => XKeyScheme::P2wpkhP2sh,
            ScriptType::P2wpkh => XKeyScheme::P2wpkh,
        }
    }

    /// Script type of a single-key scheme; multisig schemes have none
    pub const fn from_xkey_scheme(scheme: XKeyScheme) -> Option<Self> {
        match scheme {
            XKeyScheme::Standard => Some(ScriptType::P2pkh),
            XKeyScheme::P2wpkhP2sh => Some(ScriptType::P2wpkhP2sh),
            XKeyScheme::P2wpkh => Some(ScriptType::P2wpkh),
            XKeyScheme::P2wshP2sh | XKeyScheme::P2wsh => None,
        }
    }

    /// Whether the script spends through a witness
    pub const fn is_segwit(self) -> bool {
        !matches!(self, ScriptType::P2pkh)
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScriptType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::Params(kot_params::Error::UnknownScheme(s.to_string())))
    }
}

/// A single private key with its address type
#[derive(Clone, PartialEq, Eq)]
pub struct WifKey {
    secret: Zeroizing<[u8; 32]>,
    compressed: bool,
    script_type: ScriptType,
}

impl WifKey {
    /// Wrap a secret, checking it is a valid secp256k1 scalar
    pub fn new(secret: [u8; 32], compressed: bool, script_type: ScriptType) -> Result<Self> {
        let secret = Zeroizing::new(secret);
        SecretKey::from_slice(&secret[..])?;
        if script_type.is_segwit() && !compressed {
            return Err(Error::InvalidKey(format!(
                "{script_type} keys must be compressed"
            )));
        }
        Ok(Self {
            secret,
            compressed,
            script_type,
        })
    }

    /// Fresh random compressed key
    pub fn generate(script_type: ScriptType) -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut secret = Zeroizing::new([0u8; 32]);
            rng.fill_bytes(&mut secret[..]);
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(key) = Self::new(*secret, true, script_type) {
                return key;
            }
        }
    }

    /// Raw 32-byte secret
    pub fn secret_bytes(&self) -> &[u8; 32] {
        &self.secret
    }

    /// Whether the public key is serialized compressed
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Script type of the derived address
    pub fn script_type(&self) -> ScriptType {
        self.script_type
    }

    /// Encode with the profile's WIF prefix
    pub fn encode(&self, profile: &NetworkProfile) -> String {
        let mut payload = Zeroizing::new(Vec::with_capacity(34));
        payload.push(profile.wif_prefix);
        payload.extend_from_slice(&self.secret[..]);
        if self.compressed {
            payload.push(0x01);
        }
        let encoded = base58check_encode(&payload);
        match self.script_type {
            ScriptType::P2pkh => encoded,
            other => format!("{other}:{encoded}"),
        }
    }

    /// Decode a key that must belong to `profile`
    pub fn decode(s: &str, profile: &NetworkProfile) -> Result<Self> {
        let s = s.trim();
        let (script_type, body) = match s.split_once(':') {
            Some((tag, body)) => (tag.parse()?, body),
            None => (ScriptType::P2pkh, s),
        };

        let payload = Zeroizing::new(base58check_decode(body).map_err(|e| match e {
            Error::InvalidAddress(m) => Error::InvalidKey(m),
            other => other,
        })?);

        let compressed = match payload.len() {
            33 => false,
            34 if payload[33] == 0x01 => true,
            34 => {
                return Err(Error::InvalidKey(format!(
                    "bad compression flag {:#04x}",
                    payload[33]
                )))
            }
            n => return Err(Error::InvalidKey(format!("unexpected WIF length {n}"))),
        };

        let prefix = payload[0];
        if prefix != profile.wif_prefix {
            return Err(match networks_with(|p| p.wif_prefix == prefix) {
                Some(owners) => {
                    Error::WrongNetwork(format!("WIF prefix {prefix:#04x} belongs to {owners}"))
                }
                None => Error::InvalidKey(format!("unknown WIF prefix {prefix:#04x}")),
            });
        }

        let mut secret = [0u8; 32];
        secret.copy_from_slice(&payload[1..33]);
        Self::new(secret, compressed, script_type)
    }

    /// Public key in the key's serialization (33 or 65 bytes)
    pub fn public_key(&self) -> Result<Vec<u8>> {
        let secret = SecretKey::from_slice(&self.secret[..])?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(if self.compressed {
            public.serialize().to_vec()
        } else {
            public.serialize_uncompressed().to_vec()
        })
    }

    /// Address of this key's script type
    pub fn to_address(&self) -> Result<Address> {
        Address::from_pubkey(&self.public_key()?, self.script_type)
    }

    /// Encoded address of this key on `profile`
    pub fn address(&self, profile: &NetworkProfile) -> Result<String> {
        self.to_address()?.encode(profile)
    }
}

impl fmt::Debug for WifKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifKey")
            .field("secret", &"<redacted>")
            .field("compressed", &self.compressed)
            .field("script_type", &self.script_type)
            .finish()
    }
}
