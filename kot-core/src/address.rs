//! Address encoding and decoding
//!
//! Base58 addresses use the profile's P2PKH/P2SH version bytes and segwit
//! addresses use its HRP. Nothing here hardcodes a network constant, so the
//! same code produces mainnet or testnet addresses depending on the profile it
//! is handed.

use crate::hash::{base58check_decode, base58check_encode, hash160, sha256};
use crate::wif::ScriptType;
use crate::{Error, Result};
use bech32::{Fe32, Hrp};
use kot_params::NetworkProfile;
use std::fmt;

/// A decoded address, independent of any network
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Pay to public key hash
    P2pkh([u8; 20]),
    /// Pay to script hash
    P2sh([u8; 20]),
    /// Native segwit output
    Segwit {
        /// Witness version (0-16)
        version: u8,
        /// Witness program (2-40 bytes)
        program: Vec<u8>,
    },
}

impl Address {
    /// P2PKH address of a compressed or uncompressed public key
    pub fn p2pkh_from_pubkey(pubkey: &[u8]) -> Result<Self> {
        check_pubkey(pubkey)?;
        Ok(Address::P2pkh(hash160(pubkey)))
    }

    /// Native P2WPKH address of a compressed public key
    pub fn p2wpkh_from_pubkey(pubkey: &[u8]) -> Result<Self> {
        check_compressed(pubkey)?;
        Ok(Address::Segwit {
            version: 0,
            program: hash160(pubkey).to_vec(),
        })
    }

    /// P2WPKH nested in P2SH
    pub fn p2wpkh_p2sh_from_pubkey(pubkey: &[u8]) -> Result<Self> {
        check_compressed(pubkey)?;
        let mut redeem_script = vec![0x00, 0x14];
        redeem_script.extend_from_slice(&hash160(pubkey));
        Ok(Self::p2sh_from_script(&redeem_script))
    }

    /// P2SH address of a redeem script
    pub fn p2sh_from_script(script: &[u8]) -> Self {
        Address::P2sh(hash160(script))
    }

    /// Native P2WSH address of a witness script
    pub fn p2wsh_from_script(script: &[u8]) -> Self {
        Address::Segwit {
            version: 0,
            program: sha256(script).to_vec(),
        }
    }

    /// P2WSH nested in P2SH
    pub fn p2wsh_p2sh_from_script(script: &[u8]) -> Self {
        let mut redeem_script = vec![0x00, 0x20];
        redeem_script.extend_from_slice(&sha256(script));
        Self::p2sh_from_script(&redeem_script)
    }

    /// Single-key address of the given script type
    pub fn from_pubkey(pubkey: &[u8], script_type: ScriptType) -> Result<Self> {
        match script_type {
            ScriptType::P2pkh => Self::p2pkh_from_pubkey(pubkey),
            ScriptType::P2wpkhP2sh => Self::p2wpkh_p2sh_from_pubkey(pubkey),
            ScriptType::P2wpkh => Self::p2wpkh_from_pubkey(pubkey),
        }
    }

    /// Encode for a network
    pub fn encode(&self, profile: &NetworkProfile) -> Result<String> {
        match self {
            Address::P2pkh(hash) => Ok(encode_base58(profile.p2pkh_version, hash)),
            Address::P2sh(hash) => Ok(encode_base58(profile.p2sh_version, hash)),
            Address::Segwit { version, program } => {
                let hrp = Hrp::parse(profile.segwit_hrp)
                    .map_err(|e| Error::InvalidAddress(format!("hrp {}: {e}", profile.segwit_hrp)))?;
                let version = Fe32::try_from(*version)
                    .map_err(|e| Error::InvalidAddress(format!("witness version: {e}")))?;
                bech32::segwit::encode(hrp, version, program)
                    .map_err(|e| Error::InvalidAddress(e.to_string()))
            }
        }
    }

    /// Decode an address that must belong to `profile`
    pub fn parse(s: &str, profile: &NetworkProfile) -> Result<Self> {
        let s = s.trim();
        match bech32::segwit::decode(s) {
            Ok((hrp, version, program)) => {
                let hrp = hrp.to_lowercase();
                if hrp != profile.segwit_hrp {
                    return Err(match networks_with(|p| p.segwit_hrp == hrp) {
                        Some(owners) => Error::WrongNetwork(format!(
                            "segwit prefix '{hrp}' belongs to {owners}, expected '{}'",
                            profile.segwit_hrp
                        )),
                        None => Error::InvalidAddress(format!("unknown segwit prefix '{hrp}'")),
                    });
                }
                tracing::trace!("Parsed segwit v{} address on {}", version.to_u8(), profile.name);
                Address::segwit(version.to_u8(), program)
            }
            // Base58 addresses may start with the segwit prefix in either case.
            Err(segwit_err) => parse_base58(s, profile).map_err(|base58_err| {
                if looks_like_segwit(s, profile.segwit_hrp) {
                    Error::InvalidAddress(format!("segwit: {segwit_err}"))
                } else {
                    base58_err
                }
            }),
        }
    }

    /// Native segwit address with a checked version and program
    pub fn segwit(version: u8, program: Vec<u8>) -> Result<Self> {
        check_witness(version, &program)?;
        Ok(Address::Segwit { version, program })
    }

    /// Locking script paying to this address.
    ///
    /// Fails for a hand-built `Segwit` value whose version or program length
    /// no witness output can carry.
    pub fn script_pubkey(&self) -> Result<Vec<u8>> {
        match self {
            Address::P2pkh(hash) => {
                let mut script = vec![0x76, 0xa9, 0x14]; // OP_DUP OP_HASH160 PUSH20
                script.extend_from_slice(hash);
                script.extend_from_slice(&[0x88, 0xac]); // OP_EQUALVERIFY OP_CHECKSIG
                Ok(script)
            }
            Address::P2sh(hash) => {
                let mut script = vec![0xa9, 0x14]; // OP_HASH160 PUSH20
                script.extend_from_slice(hash);
                script.push(0x87); // OP_EQUAL
                Ok(script)
            }
            Address::Segwit { version, program } => {
                check_witness(*version, program)?;
                // OP_0 or OP_1..OP_16, then a direct push of at most 40 bytes
                let op_version = if *version == 0 { 0x00 } else { 0x50 + version };
                let mut script = Vec::with_capacity(program.len() + 2);
                script.push(op_version);
                script.push(program.len() as u8);
                script.extend_from_slice(program);
                Ok(script)
            }
        }
    }

    /// Whether this is a native segwit output
    pub fn is_segwit(&self) -> bool {
        matches!(self, Address::Segwit { .. })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::P2pkh(hash) => write!(f, "p2pkh:{}", hex::encode(hash)),
            Address::P2sh(hash) => write!(f, "p2sh:{}", hex::encode(hash)),
            Address::Segwit { version, program } => {
                write!(f, "witness-v{}:{}", version, hex::encode(program))
            }
        }
    }
}

/// Whether `s` is a valid address on `profile`
pub fn is_address(s: &str, profile: &NetworkProfile) -> bool {
    Address::parse(s, profile).is_ok()
}

fn parse_base58(s: &str, profile: &NetworkProfile) -> Result<Address> {
    let payload = base58check_decode(s)?;
    if payload.len() != 21 {
        return Err(Error::InvalidAddress(format!(
            "expected 21-byte payload, got {}",
            payload.len()
        )));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    match payload[0] {
        v if v == profile.p2pkh_version => Ok(Address::P2pkh(hash)),
        v if v == profile.p2sh_version => Ok(Address::P2sh(hash)),
        v => match networks_with(|p| p.p2pkh_version == v || p.p2sh_version == v) {
            Some(owners) => Err(Error::WrongNetwork(format!(
                "version byte {v} belongs to {owners}"
            ))),
            None => Err(Error::InvalidAddress(format!("unknown version byte {v}"))),
        },
    }
}

/// Single-case input carrying the segwit prefix of `hrp`
fn looks_like_segwit(s: &str, hrp: &str) -> bool {
    let single_case = s == s.to_ascii_lowercase() || s == s.to_ascii_uppercase();
    single_case && s.to_ascii_lowercase().starts_with(&format!("{hrp}1"))
}

fn check_witness(version: u8, program: &[u8]) -> Result<()> {
    if version > 16 {
        return Err(Error::InvalidAddress(format!("witness version {version} above 16")));
    }
    if !(2..=40).contains(&program.len()) {
        return Err(Error::InvalidAddress(format!(
            "witness program of {} bytes",
            program.len()
        )));
    }
    if version == 0 && program.len() != 20 && program.len() != 32 {
        return Err(Error::InvalidAddress(format!(
            "v0 witness program of {} bytes",
            program.len()
        )));
    }
    Ok(())
}

fn encode_base58(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash);
    base58check_encode(&payload)
}

fn check_pubkey(pubkey: &[u8]) -> Result<()> {
    secp256k1::PublicKey::from_slice(pubkey)?;
    Ok(())
}

fn check_compressed(pubkey: &[u8]) -> Result<()> {
    if pubkey.len() != 33 {
        return Err(Error::InvalidKey(
            "segwit outputs require a compressed public key".to_string(),
        ));
    }
    check_pubkey(pubkey)
}

/// Names of registered networks matching a predicate, for error messages
pub(crate) fn networks_with(pred: impl Fn(&NetworkProfile) -> bool) -> Option<String> {
    let names: Vec<&str> = kot_params::register_all()
        .iter()
        .filter(|p| pred(p))
        .map(|p| p.name)
        .collect();
    (!names.is_empty()).then(|| names.join("/"))
}
