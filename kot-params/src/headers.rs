//! Extended-key version headers
//!
//! Every network carries two tables (private and public) mapping a
//! derivation scheme to the 32-bit version prefix of a serialized BIP-32 key.
//! Lookups are always scoped to a single table: a version that belongs to a
//! different network is reported as unrecognized, never guessed.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Derivation scheme encoded by an extended-key header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum XKeyScheme {
    /// Legacy P2PKH (xpub/tpub)
    #[serde(rename = "standard")]
    Standard,
    /// P2WPKH nested in P2SH (ypub/upub)
    #[serde(rename = "p2wpkh-p2sh")]
    P2wpkhP2sh,
    /// P2WSH nested in P2SH (Ypub/Upub)
    #[serde(rename = "p2wsh-p2sh")]
    P2wshP2sh,
    /// Native P2WPKH (zpub/vpub)
    #[serde(rename = "p2wpkh")]
    P2wpkh,
    /// Native P2WSH (Zpub/Vpub)
    #[serde(rename = "p2wsh")]
    P2wsh,
}

impl XKeyScheme {
    /// All schemes in canonical order
    pub const ALL: [XKeyScheme; 5] = [
        XKeyScheme::Standard,
        XKeyScheme::P2wpkhP2sh,
        XKeyScheme::P2wshP2sh,
        XKeyScheme::P2wpkh,
        XKeyScheme::P2wsh,
    ];

    /// Textual tag used in wallet files and on the command line
    pub const fn as_str(self) -> &'static str {
        match self {
            XKeyScheme::Standard => "standard",
            XKeyScheme::P2wpkhP2sh => "p2wpkh-p2sh",
            XKeyScheme::P2wshP2sh => "p2wsh-p2sh",
            XKeyScheme::P2wpkh => "p2wpkh",
            XKeyScheme::P2wsh => "p2wsh",
        }
    }

    /// Whether outputs of this scheme carry a witness
    pub const fn is_segwit(self) -> bool {
        !matches!(self, XKeyScheme::Standard)
    }

    /// Whether this scheme is a script-hash (multisig) scheme
    pub const fn is_multisig(self) -> bool {
        matches!(self, XKeyScheme::P2wshP2sh | XKeyScheme::P2wsh)
    }
}

impl fmt::Display for XKeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for XKeyScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        XKeyScheme::ALL
            .into_iter()
            .find(|scheme| scheme.as_str() == s)
            .ok_or_else(|| Error::UnknownScheme(s.to_string()))
    }
}

/// Private or public half of an extended key pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Extended private key (xprv)
    Private,
    /// Extended public key (xpub)
    Public,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Private => write!(f, "private"),
            KeyKind::Public => write!(f, "public"),
        }
    }
}

/// Bijective scheme <-> version table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTable {
    forward: [u32; 5],
    inverse: HashMap<u32, XKeyScheme>,
}

impl HeaderTable {
    /// Build a table from `(scheme, version)` pairs.
    ///
    /// Every scheme must appear exactly once and no two schemes may share a
    /// version, otherwise decoding would be ambiguous.
    pub fn new(table: &'static str, entries: &[(XKeyScheme, u32)]) -> Result<Self> {
        let mut forward: [Option<u32>; 5] = [None; 5];
        let mut inverse = HashMap::with_capacity(entries.len());

        for &(scheme, version) in entries {
            let slot = &mut forward[scheme_index(scheme)];
            if slot.is_some() {
                return Err(Error::InvalidProfile {
                    network: table.to_string(),
                    reason: format!("scheme {} listed twice", scheme),
                });
            }
            *slot = Some(version);

            if inverse.insert(version, scheme).is_some() {
                return Err(Error::DuplicateHeader { table, version });
            }
        }

        let mut resolved = [0u32; 5];
        for (i, slot) in forward.iter().enumerate() {
            resolved[i] = slot.ok_or_else(|| Error::InvalidProfile {
                network: table.to_string(),
                reason: format!("missing header for scheme {}", XKeyScheme::ALL[i]),
            })?;
        }

        Ok(Self {
            forward: resolved,
            inverse,
        })
    }

    /// Version prefix for a scheme
    pub fn encode(&self, scheme: XKeyScheme) -> u32 {
        self.forward[scheme_index(scheme)]
    }

    /// Version prefix for a textual scheme tag
    pub fn encode_tag(&self, tag: &str) -> Result<u32> {
        Ok(self.encode(tag.parse()?))
    }

    /// Scheme registered for a version prefix
    pub fn decode(&self, version: u32) -> Result<XKeyScheme> {
        self.inverse
            .get(&version)
            .copied()
            .ok_or(Error::UnrecognizedVersion(version))
    }

    /// Whether the version belongs to this table
    pub fn contains(&self, version: u32) -> bool {
        self.inverse.contains_key(&version)
    }

    /// `(scheme, version)` pairs in canonical scheme order
    pub fn entries(&self) -> impl Iterator<Item = (XKeyScheme, u32)> + '_ {
        XKeyScheme::ALL.into_iter().zip(self.forward.iter().copied())
    }
}

const fn scheme_index(scheme: XKeyScheme) -> usize {
    match scheme {
        XKeyScheme::Standard => 0,
        XKeyScheme::P2wpkhP2sh => 1,
        XKeyScheme::P2wshP2sh => 2,
        XKeyScheme::P2wpkh => 3,
        XKeyScheme::P2wsh => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HeaderTable {
        HeaderTable::new(
            "sample",
            &[
                (XKeyScheme::Standard, 0x0488b21e),
                (XKeyScheme::P2wpkhP2sh, 0x049d7cb2),
                (XKeyScheme::P2wshP2sh, 0x0295b43f),
                (XKeyScheme::P2wpkh, 0x04b24746),
                (XKeyScheme::P2wsh, 0x02aa7ed3),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_encode_decode() {
        let table = sample();
        for scheme in XKeyScheme::ALL {
            assert_eq!(table.decode(table.encode(scheme)).unwrap(), scheme);
        }
        assert_eq!(table.encode_tag("p2wpkh").unwrap(), 0x04b24746);
    }

    #[test]
    fn test_unknown_tag() {
        let err = sample().encode_tag("p2tr").unwrap_err();
        assert!(matches!(err, Error::UnknownScheme(tag) if tag == "p2tr"));
    }

    #[test]
    fn test_unrecognized_version() {
        let err = sample().decode(0x043587cf).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedVersion(0x043587cf)));
    }

    #[test]
    fn test_duplicate_version_rejected() {
        let result = HeaderTable::new(
            "broken",
            &[
                (XKeyScheme::Standard, 1),
                (XKeyScheme::P2wpkhP2sh, 2),
                (XKeyScheme::P2wshP2sh, 3),
                (XKeyScheme::P2wpkh, 4),
                (XKeyScheme::P2wsh, 1),
            ],
        );
        assert!(matches!(
            result,
            Err(Error::DuplicateHeader { table: "broken", version: 1 })
        ));
    }

    #[test]
    fn test_missing_scheme_rejected() {
        let result = HeaderTable::new("short", &[(XKeyScheme::Standard, 1)]);
        assert!(matches!(result, Err(Error::InvalidProfile { .. })));
    }

    #[test]
    fn test_scheme_parsing() {
        assert_eq!("p2wsh-p2sh".parse::<XKeyScheme>().unwrap(), XKeyScheme::P2wshP2sh);
        assert!("Standard".parse::<XKeyScheme>().is_err());
        assert!(XKeyScheme::P2wsh.is_multisig());
        assert!(!XKeyScheme::Standard.is_segwit());
    }
}
