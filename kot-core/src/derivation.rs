//! HD derivation paths and seed handling
//!
//! Account paths follow BIP-44/49/84 for single-key schemes and BIP-48 for
//! multisig schemes, with the coin type taken from the profile:
//!
//! - m/44'/coin'/account'        standard
//! - m/49'/coin'/account'        p2wpkh-p2sh
//! - m/84'/coin'/account'        p2wpkh
//! - m/48'/coin'/account'/1'     p2wsh-p2sh
//! - m/48'/coin'/account'/2'     p2wsh

use crate::address::Address;
use crate::wif::ScriptType;
use crate::xkey::ExtendedKey;
use crate::{Error, Result};
use bip39::{Language, Mnemonic};
use kot_params::{NetworkProfile, XKeyScheme};
use rand::RngCore;
use std::fmt;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Hardened index offset
pub const HARDENED: u32 = 0x8000_0000;

/// Purpose level of a scheme's account path
pub const fn purpose(scheme: XKeyScheme) -> u32 {
    match scheme {
        XKeyScheme::Standard => 44,
        XKeyScheme::P2wpkhP2sh => 49,
        XKeyScheme::P2wpkh => 84,
        XKeyScheme::P2wshP2sh | XKeyScheme::P2wsh => 48,
    }
}

/// BIP-48 script type index, for multisig schemes only
pub const fn script_index(scheme: XKeyScheme) -> Option<u32> {
    match scheme {
        XKeyScheme::P2wshP2sh => Some(1),
        XKeyScheme::P2wsh => Some(2),
        _ => None,
    }
}

/// Sequence of child indexes, hardened ones carrying the high bit
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// Empty path (`m`)
    pub fn master() -> Self {
        Self::default()
    }

    /// Append a normal child
    pub fn child(mut self, index: u32) -> Result<Self> {
        if index >= HARDENED {
            return Err(Error::InvalidPath(format!("index {index} out of range")));
        }
        self.0.push(index);
        Ok(self)
    }

    /// Append a hardened child
    pub fn hardened(mut self, index: u32) -> Result<Self> {
        if index >= HARDENED {
            return Err(Error::InvalidPath(format!("index {index}' out of range")));
        }
        self.0.push(index | HARDENED);
        Ok(self)
    }

    /// Raw child numbers
    pub fn indexes(&self) -> &[u32] {
        &self.0
    }

    /// Path of `other` appended to this one
    pub fn join(&self, other: &DerivationPath) -> Self {
        let mut indexes = self.0.clone();
        indexes.extend_from_slice(&other.0);
        Self(indexes)
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the master path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for index in &self.0 {
            if index & HARDENED != 0 {
                write!(f, "/{}'", index & !HARDENED)?;
            } else {
                write!(f, "/{index}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().split('/');
        match parts.next() {
            Some("m") | Some("M") => {}
            _ => return Err(Error::InvalidPath(format!("'{s}' must start with m"))),
        }

        parts.try_fold(Self::master(), |path, part| {
            let (digits, hardened) = match part.strip_suffix(is_hardened_marker) {
                Some(digits) => (digits, true),
                None => (part, false),
            };
            let index: u32 = digits
                .parse()
                .map_err(|_| Error::InvalidPath(format!("bad component '{part}' in '{s}'")))?;
            if hardened {
                path.hardened(index)
            } else {
                path.child(index)
            }
        })
    }
}

fn is_hardened_marker(c: char) -> bool {
    matches!(c, '\'' | 'h' | 'H')
}

/// Account-level path for a scheme on a network
pub fn account_path(
    profile: &NetworkProfile,
    scheme: XKeyScheme,
    account: u32,
) -> Result<DerivationPath> {
    let path = DerivationPath::master()
        .hardened(purpose(scheme))?
        .hardened(profile.bip44_coin_type)?
        .hardened(account)?;
    match script_index(scheme) {
        Some(index) => path.hardened(index),
        None => Ok(path),
    }
}

/// Path of an address below its account key
pub fn address_path(change: bool, index: u32) -> Result<DerivationPath> {
    DerivationPath::master().child(u32::from(change))?.child(index)
}

/// BIP-39 seed for an English mnemonic. Phrase and passphrase are both
/// NFKD-normalized first.
pub fn seed_from_mnemonic(phrase: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = Mnemonic::parse_in(Language::English, phrase)
        .map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Generate new random mnemonic
///
/// # Arguments
/// * `word_count` - 12, 18 or 24 words
pub fn generate_mnemonic(word_count: usize) -> Result<String> {
    let entropy_size = match word_count {
        12 => 16,
        18 => 24,
        24 => 32,
        n => return Err(Error::InvalidMnemonic(format!("unsupported word count {n}"))),
    };

    let mut entropy = Zeroizing::new(vec![0u8; entropy_size]);
    rand::thread_rng().fill_bytes(&mut entropy[..]);
    let mnemonic =
        Mnemonic::from_entropy(&entropy).map_err(|e| Error::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_string())
}

/// Master private key of a seed, tagged with the scheme it will serialize as
pub fn master_from_seed(seed: &[u8], scheme: XKeyScheme) -> Result<ExtendedKey> {
    let xprv = bip32::XPrv::new(seed)?;
    Ok(ExtendedKey::from_xprv(&xprv, scheme))
}

/// Account private key
pub fn account_xprv(
    profile: &NetworkProfile,
    seed: &[u8],
    scheme: XKeyScheme,
    account: u32,
) -> Result<ExtendedKey> {
    let path = account_path(profile, scheme, account)?;
    tracing::debug!("Deriving {} account key at {} on {}", scheme, path, profile.name);
    master_from_seed(seed, scheme)?.derive_path(&path)
}

/// Account public key
pub fn account_xpub(
    profile: &NetworkProfile,
    seed: &[u8],
    scheme: XKeyScheme,
    account: u32,
) -> Result<ExtendedKey> {
    account_xprv(profile, seed, scheme, account)?.neuter()
}

/// Encoded address at `change/index` below an account key.
///
/// Only single-key schemes have a standalone address; multisig schemes need
/// the whole cosigner set.
pub fn derive_address(
    profile: &NetworkProfile,
    account: &ExtendedKey,
    change: bool,
    index: u32,
) -> Result<String> {
    let script_type = ScriptType::from_xkey_scheme(account.scheme).ok_or_else(|| {
        Error::KeyDerivation(format!(
            "{} addresses require every cosigner key",
            account.scheme
        ))
    })?;
    let key = account.derive_path(&address_path(change, index)?)?;
    Address::from_pubkey(&key.public_key_bytes()?, script_type)?.encode(profile)
}
