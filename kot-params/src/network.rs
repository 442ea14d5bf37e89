//! Kotia network definitions
//!
//! Mainnet and testnet are defined in full. Regtest, simnet and signet are
//! materialized from the testnet profile plus a list of overrides, and every
//! resulting profile is validated on its own.

use crate::checkpoints::CheckpointTable;
use crate::consensus::ConsensusParams;
use crate::data::DataSource;
use crate::headers::{HeaderTable, KeyKind, XKeyScheme};
use crate::servers::{DefaultPorts, ServerList};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Network type enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Mainnet
    #[default]
    Mainnet,
    /// Public testnet
    Testnet,
    /// Regtest (local development)
    Regtest,
    /// Simnet (lightning simulation network)
    Simnet,
    /// Signet
    Signet,
}

impl NetworkKind {
    /// Every network, in registration order
    pub const ALL: [NetworkKind; 5] = [
        NetworkKind::Mainnet,
        NetworkKind::Testnet,
        NetworkKind::Regtest,
        NetworkKind::Simnet,
        NetworkKind::Signet,
    ];

    /// Canonical lowercase name
    pub const fn name(self) -> &'static str {
        match self {
            NetworkKind::Mainnet => "mainnet",
            NetworkKind::Testnet => "testnet",
            NetworkKind::Regtest => "regtest",
            NetworkKind::Simnet => "simnet",
            NetworkKind::Signet => "signet",
        }
    }

    /// Everything except mainnet is a test network
    pub const fn is_test_network(self) -> bool {
        !matches!(self, NetworkKind::Mainnet)
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        NetworkKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| Error::InvalidNetwork(s.to_string()))
    }
}

/// Complete parameter bundle for one chain variant
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    /// Network type
    pub kind: NetworkKind,
    /// Human-readable name
    pub name: &'static str,
    /// Test/dev network flag
    pub is_test_network: bool,
    /// Version byte of WIF-encoded private keys
    pub wif_prefix: u8,
    /// Version byte of P2PKH addresses
    pub p2pkh_version: u8,
    /// Version byte of P2SH addresses
    pub p2sh_version: u8,
    /// Bech32 prefix of segwit addresses
    pub segwit_hrp: &'static str,
    /// Bech32 prefix of BOLT-11 invoices
    pub bolt11_hrp: &'static str,
    /// Genesis block hash, display (big-endian) hex
    pub genesis_hash_hex: &'static str,
    /// Default server ports
    pub default_ports: DefaultPorts,
    /// Default servers
    pub default_servers: ServerList,
    /// Checkpoints
    pub checkpoints: CheckpointTable,
    /// Consensus thresholds
    pub consensus: ConsensusParams,
    /// Extended private key headers
    pub xprv_headers: HeaderTable,
    /// Extended public key headers
    pub xpub_headers: HeaderTable,
    /// Coin type (BIP-44)
    pub bip44_coin_type: u32,
    /// Lightning realm byte
    pub lightning_realm_byte: u8,
    /// Lightning DNS seeds
    pub lightning_dns_seeds: Vec<String>,
    /// First height at which lightning channels are considered
    pub block_height_first_lightning_channels: u32,
}

/// Field overrides applied on top of a base profile
///
/// `None` keeps the base value.
#[derive(Debug, Clone, Default)]
pub struct ProfileOverrides {
    /// Test/dev network flag
    pub is_test_network: Option<bool>,
    /// WIF version byte
    pub wif_prefix: Option<u8>,
    /// P2PKH version byte
    pub p2pkh_version: Option<u8>,
    /// P2SH version byte
    pub p2sh_version: Option<u8>,
    /// Segwit HRP
    pub segwit_hrp: Option<&'static str>,
    /// BOLT-11 HRP
    pub bolt11_hrp: Option<&'static str>,
    /// Genesis hash hex
    pub genesis_hash_hex: Option<&'static str>,
    /// Default ports
    pub default_ports: Option<DefaultPorts>,
    /// Default servers
    pub default_servers: Option<ServerList>,
    /// Checkpoints
    pub checkpoints: Option<CheckpointTable>,
    /// Consensus thresholds
    pub consensus: Option<ConsensusParams>,
    /// Extended private key headers
    pub xprv_headers: Option<HeaderTable>,
    /// Extended public key headers
    pub xpub_headers: Option<HeaderTable>,
    /// BIP-44 coin type
    pub bip44_coin_type: Option<u32>,
    /// Lightning realm byte
    pub lightning_realm_byte: Option<u8>,
    /// Lightning DNS seeds
    pub lightning_dns_seeds: Option<Vec<String>>,
}

const KOT_GENESIS: &str = "000008e4586479cd9dc5832b262414a60f152381e371cf7940ffe9f5aa4b80a0";
const REGTEST_GENESIS: &str = "0000724595fb3b9609d441cbfb9577615c292abf07d996d3edabc48de843642d";
const SIMNET_GENESIS: &str = "683e86bd5c6d110d91b94b97137ba6bfe02dbbdb8e3dff722a669b5d69d77af6";
const SIGNET_GENESIS: &str = "00000008819873e925422c1ff0f99f7cc9bbb232af63a077a480a3633bee1ef6";

fn mainnet_xprv_headers() -> Result<HeaderTable> {
    HeaderTable::new(
        "mainnet xprv",
        &[
            (XKeyScheme::Standard, 0x0488_ade4),   // xprv
            (XKeyScheme::P2wpkhP2sh, 0x049d_7878), // yprv
            (XKeyScheme::P2wshP2sh, 0x0295_b005),  // Yprv
            (XKeyScheme::P2wpkh, 0x04b2_430c),     // zprv
            (XKeyScheme::P2wsh, 0x02aa_7a99),      // Zprv
        ],
    )
}

fn mainnet_xpub_headers() -> Result<HeaderTable> {
    HeaderTable::new(
        "mainnet xpub",
        &[
            (XKeyScheme::Standard, 0x0488_b21e),   // xpub
            (XKeyScheme::P2wpkhP2sh, 0x049d_7cb2), // ypub
            (XKeyScheme::P2wshP2sh, 0x0295_b43f),  // Ypub
            (XKeyScheme::P2wpkh, 0x04b2_4746),     // zpub
            (XKeyScheme::P2wsh, 0x02aa_7ed3),      // Zpub
        ],
    )
}

fn testnet_xprv_headers() -> Result<HeaderTable> {
    HeaderTable::new(
        "testnet xprv",
        &[
            (XKeyScheme::Standard, 0x0435_8394),   // tprv
            (XKeyScheme::P2wpkhP2sh, 0x044a_4e28), // uprv
            (XKeyScheme::P2wshP2sh, 0x0242_85b5),  // Uprv
            (XKeyScheme::P2wpkh, 0x045f_18bc),     // vprv
            (XKeyScheme::P2wsh, 0x0257_5048),      // Vprv
        ],
    )
}

fn testnet_xpub_headers() -> Result<HeaderTable> {
    HeaderTable::new(
        "testnet xpub",
        &[
            (XKeyScheme::Standard, 0x0435_87cf),   // tpub
            (XKeyScheme::P2wpkhP2sh, 0x044a_5262), // upub
            (XKeyScheme::P2wshP2sh, 0x0242_89ef),  // Upub
            (XKeyScheme::P2wpkh, 0x045f_1cf6),     // vpub
            (XKeyScheme::P2wsh, 0x0257_5483),      // Vpub
        ],
    )
}

impl NetworkProfile {
    /// Get mainnet parameters
    pub fn mainnet(data: &DataSource) -> Result<Self> {
        let profile = Self {
            kind: NetworkKind::Mainnet,
            name: NetworkKind::Mainnet.name(),
            is_test_network: false,
            wif_prefix: 0x99,
            p2pkh_version: 25,
            p2sh_version: 85,
            segwit_hrp: "kot",
            bolt11_hrp: "kot",
            genesis_hash_hex: KOT_GENESIS,
            default_ports: DefaultPorts {
                tcp: None,
                ssl: Some(50001),
            },
            default_servers: data.load("servers.json", ServerList::from_json),
            checkpoints: data.load("checkpoints.json", CheckpointTable::from_json),
            consensus: ConsensusParams::mainnet(),
            xprv_headers: mainnet_xprv_headers()?,
            xpub_headers: mainnet_xpub_headers()?,
            bip44_coin_type: 10,
            lightning_realm_byte: 0,
            lightning_dns_seeds: Vec::new(),
            block_height_first_lightning_channels: 0,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Get testnet parameters
    pub fn testnet(data: &DataSource) -> Result<Self> {
        let profile = Self {
            kind: NetworkKind::Testnet,
            name: NetworkKind::Testnet.name(),
            is_test_network: true,
            wif_prefix: 0xef,
            p2pkh_version: 111,
            p2sh_version: 196,
            segwit_hrp: "tkot",
            bolt11_hrp: "tkot",
            genesis_hash_hex: KOT_GENESIS,
            default_ports: DefaultPorts {
                tcp: Some(51001),
                ssl: Some(51002),
            },
            default_servers: data.load("servers_testnet.json", ServerList::from_json),
            checkpoints: data.load("checkpoints_testnet.json", CheckpointTable::from_json),
            consensus: ConsensusParams::testnet(),
            xprv_headers: testnet_xprv_headers()?,
            xpub_headers: testnet_xpub_headers()?,
            bip44_coin_type: 1,
            lightning_realm_byte: 1,
            lightning_dns_seeds: Vec::new(),
            block_height_first_lightning_channels: 0,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Get regtest parameters
    pub fn regtest(data: &DataSource) -> Result<Self> {
        Self::testnet(data)?.with_overrides(
            NetworkKind::Regtest,
            ProfileOverrides {
                segwit_hrp: Some("blrt"),
                bolt11_hrp: Some("blrt"),
                genesis_hash_hex: Some(REGTEST_GENESIS),
                default_servers: Some(data.load("servers_regtest.json", ServerList::from_json)),
                checkpoints: Some(CheckpointTable::new()),
                lightning_dns_seeds: Some(Vec::new()),
                ..Default::default()
            },
        )
    }

    /// Get simnet parameters
    pub fn simnet(data: &DataSource) -> Result<Self> {
        Self::testnet(data)?.with_overrides(
            NetworkKind::Simnet,
            ProfileOverrides {
                wif_prefix: Some(0x64),
                p2pkh_version: Some(0x3f),
                p2sh_version: Some(0x7b),
                segwit_hrp: Some("sb"),
                bolt11_hrp: Some("sb"),
                genesis_hash_hex: Some(SIMNET_GENESIS),
                default_servers: Some(data.load("servers_regtest.json", ServerList::from_json)),
                checkpoints: Some(CheckpointTable::new()),
                lightning_dns_seeds: Some(Vec::new()),
                ..Default::default()
            },
        )
    }

    /// Get signet parameters
    pub fn signet(data: &DataSource) -> Result<Self> {
        Self::testnet(data)?.with_overrides(
            NetworkKind::Signet,
            ProfileOverrides {
                bolt11_hrp: Some("tbs"),
                genesis_hash_hex: Some(SIGNET_GENESIS),
                default_servers: Some(data.load("servers_signet.json", ServerList::from_json)),
                checkpoints: Some(CheckpointTable::new()),
                lightning_dns_seeds: Some(Vec::new()),
                ..Default::default()
            },
        )
    }

    /// Get network by type
    pub fn build(kind: NetworkKind, data: &DataSource) -> Result<Self> {
        match kind {
            NetworkKind::Mainnet => Self::mainnet(data),
            NetworkKind::Testnet => Self::testnet(data),
            NetworkKind::Regtest => Self::regtest(data),
            NetworkKind::Simnet => Self::simnet(data),
            NetworkKind::Signet => Self::signet(data),
        }
    }

    /// Materialize a new profile from this one plus overrides
    pub fn with_overrides(self, kind: NetworkKind, o: ProfileOverrides) -> Result<Self> {
        let profile = Self {
            kind,
            name: kind.name(),
            is_test_network: o.is_test_network.unwrap_or(self.is_test_network),
            wif_prefix: o.wif_prefix.unwrap_or(self.wif_prefix),
            p2pkh_version: o.p2pkh_version.unwrap_or(self.p2pkh_version),
            p2sh_version: o.p2sh_version.unwrap_or(self.p2sh_version),
            segwit_hrp: o.segwit_hrp.unwrap_or(self.segwit_hrp),
            bolt11_hrp: o.bolt11_hrp.unwrap_or(self.bolt11_hrp),
            genesis_hash_hex: o.genesis_hash_hex.unwrap_or(self.genesis_hash_hex),
            default_ports: o.default_ports.unwrap_or(self.default_ports),
            default_servers: o.default_servers.unwrap_or(self.default_servers),
            checkpoints: o.checkpoints.unwrap_or(self.checkpoints),
            consensus: o.consensus.unwrap_or(self.consensus),
            xprv_headers: o.xprv_headers.unwrap_or(self.xprv_headers),
            xpub_headers: o.xpub_headers.unwrap_or(self.xpub_headers),
            bip44_coin_type: o.bip44_coin_type.unwrap_or(self.bip44_coin_type),
            lightning_realm_byte: o.lightning_realm_byte.unwrap_or(self.lightning_realm_byte),
            lightning_dns_seeds: o.lightning_dns_seeds.unwrap_or(self.lightning_dns_seeds),
            block_height_first_lightning_channels: self.block_height_first_lightning_channels,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Check every profile invariant
    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| {
            Err(Error::InvalidProfile {
                network: self.name.to_string(),
                reason,
            })
        };

        if self.name != self.kind.name() {
            return fail(format!("name '{}' does not match kind {}", self.name, self.kind));
        }
        if self.is_test_network != self.kind.is_test_network() {
            return fail(format!("test-network flag must be {}", self.kind.is_test_network()));
        }
        if self.p2pkh_version == self.p2sh_version {
            return fail("P2PKH and P2SH share a version byte".to_string());
        }
        for hrp in [self.segwit_hrp, self.bolt11_hrp] {
            if !is_valid_hrp(hrp) {
                return fail(format!("invalid human-readable part '{hrp}'"));
            }
        }
        parse_genesis(self.genesis_hash_hex)?;

        // A version may not be both private and public, or classification is ambiguous.
        if let Some((_, version)) = self
            .xpub_headers
            .entries()
            .find(|(_, version)| self.xprv_headers.contains(*version))
        {
            return Err(Error::DuplicateHeader {
                table: "xprv/xpub",
                version,
            });
        }

        Ok(())
    }

    /// Genesis hash in internal (little-endian) byte order
    pub fn genesis_bytes(&self) -> Result<[u8; 32]> {
        parse_genesis(self.genesis_hash_hex)
    }

    /// Highest verified checkpoint height
    pub fn max_checkpoint(&self) -> u32 {
        self.checkpoints.max_checkpoint()
    }

    /// Header table for private or public keys
    pub fn headers(&self, kind: KeyKind) -> &HeaderTable {
        match kind {
            KeyKind::Private => &self.xprv_headers,
            KeyKind::Public => &self.xpub_headers,
        }
    }

    /// Identify a serialized extended-key header on this network only
    pub fn classify_xkey_header(&self, version: u32) -> Result<(KeyKind, XKeyScheme)> {
        if let Ok(scheme) = self.xpub_headers.decode(version) {
            return Ok((KeyKind::Public, scheme));
        }
        self.xprv_headers
            .decode(version)
            .map(|scheme| (KeyKind::Private, scheme))
    }
}

/// Decode a 64-character display hash into internal byte order
pub fn parse_genesis(hex_str: &str) -> Result<[u8; 32]> {
    if hex_str.len() != 64 {
        return Err(Error::InvalidGenesis(format!(
            "expected 64 hex characters, got {}",
            hex_str.len()
        )));
    }
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hex_str, &mut bytes)
        .map_err(|e| Error::InvalidGenesis(format!("{hex_str}: {e}")))?;
    bytes.reverse();
    Ok(bytes)
}

/// Inverse of [`parse_genesis`]
pub fn genesis_hex(bytes: &[u8; 32]) -> String {
    let mut display = *bytes;
    display.reverse();
    hex::encode(display)
}

fn is_valid_hrp(hrp: &str) -> bool {
    (1..=83).contains(&hrp.len())
        && hrp
            .bytes()
            .all(|b| (33..=126).contains(&b) && !b.is_ascii_uppercase())
}
