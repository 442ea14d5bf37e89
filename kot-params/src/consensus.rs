//! Consensus thresholds for Kotia's hybrid proof-of-work / proof-of-stake chain

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 256-bit difficulty target, big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target([u8; 32]);

impl Target {
    /// Target whose top `bits` bits are zero and the rest one
    pub const fn with_leading_zero_bits(bits: u32) -> Self {
        let mut bytes = [0xffu8; 32];
        let mut i = 0;
        while i < 32 {
            let start = (i as u32) * 8;
            if start + 8 <= bits {
                bytes[i] = 0;
            } else if start < bits {
                bytes[i] = 0xff >> (bits - start);
            }
            i += 1;
        }
        Self(bytes)
    }

    /// Parse a big-endian hex string of at most 64 characters
    pub fn from_hex(s: &str) -> Result<Self> {
        let s = s.trim_start_matches("0x");
        if s.len() > 64 {
            return Err(Error::MalformedData(format!("target longer than 256 bits: {s}")));
        }
        let padded = format!("{s:0>64}");
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(&padded, &mut bytes)
            .map_err(|e| Error::MalformedData(format!("target hex: {e}")))?;
        Ok(Self(bytes))
    }

    /// Big-endian hex (64 characters)
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Big-endian bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compact "nBits" representation
    pub fn to_compact(&self) -> u32 {
        let first = match self.0.iter().position(|b| *b != 0) {
            Some(i) => i,
            None => return 0,
        };
        let byte = |i: usize| self.0.get(i).copied().unwrap_or(0) as u32;

        let mut size = (32 - first) as u32;
        let mut mantissa = (byte(first) << 16) | (byte(first + 1) << 8) | byte(first + 2);
        // The sign bit of the mantissa must stay clear.
        if mantissa & 0x0080_0000 != 0 {
            mantissa >>= 8;
            size += 1;
        }
        (size << 24) | mantissa
    }

    /// Whether a big-endian block hash satisfies this target
    pub fn meets(&self, hash_be: &[u8; 32]) -> bool {
        hash_be <= &self.0
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Target(0x{})", self.to_hex())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Target {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Target {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Target::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Proof-of-stake rule set in force at a given block
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StakeRules {
    /// Original stake modifier rules
    V1,
    /// V1 with the reward fix
    V1Rf,
    /// Second-generation kernel
    V2,
    /// Third-generation kernel
    V3,
    /// V3 with the time-activated amendments
    V3_1,
}

/// Consensus parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Easiest allowed proof-of-work target
    pub pow_limit: Target,
    /// Easiest allowed stake target before V2
    pub pos_limit: Target,
    /// Easiest allowed stake target from V2 on
    pub pos_limit_v2: Target,
    /// Last height at which proof-of-work blocks are accepted
    pub last_pow_block: u32,
    /// First height using the V1 reward fix
    pub first_posv1rf_block: u32,
    /// First height using stake rules V2
    pub first_posv2_block: u32,
    /// First height using stake rules V3
    pub first_posv3_block: u32,
    /// Block time (Unix epoch) activating V3.1, `None` if never scheduled
    pub first_posv3_1_block_time: Option<u64>,
    /// Coinbase maturity (blocks)
    pub coinbase_maturity: u32,
}

impl ConsensusParams {
    /// Create consensus params for mainnet
    pub const fn mainnet() -> Self {
        Self {
            pow_limit: Target::with_leading_zero_bits(20),
            pos_limit: Target::with_leading_zero_bits(20),
            pos_limit_v2: Target::with_leading_zero_bits(48),
            last_pow_block: 1_000_000,
            first_posv1rf_block: 0,
            first_posv2_block: 0,
            first_posv3_block: 0,
            first_posv3_1_block_time: None,
            coinbase_maturity: 20,
        }
    }

    /// Create consensus params for testnet and its derivatives
    pub const fn testnet() -> Self {
        Self {
            pow_limit: Target::with_leading_zero_bits(16),
            pos_limit: Target::with_leading_zero_bits(20),
            pos_limit_v2: Target::with_leading_zero_bits(48),
            last_pow_block: 0x7fff_ffff,
            first_posv1rf_block: 38_425,
            first_posv2_block: 319_002,
            first_posv3_block: 872_456,
            first_posv3_1_block_time: Some(1_667_779_200),
            coinbase_maturity: 10,
        }
    }

    /// Whether a proof-of-work block is acceptable at this height
    pub const fn is_pow_allowed(&self, height: u32) -> bool {
        height <= self.last_pow_block
    }

    /// Stake rules in force for a block at `height` with timestamp `block_time`
    pub fn stake_rules_at(&self, height: u32, block_time: u64) -> StakeRules {
        if height < self.first_posv1rf_block {
            StakeRules::V1
        } else if height < self.first_posv2_block {
            StakeRules::V1Rf
        } else if height < self.first_posv3_block {
            StakeRules::V2
        } else if self
            .first_posv3_1_block_time
            .is_some_and(|activation| block_time >= activation)
        {
            StakeRules::V3_1
        } else {
            StakeRules::V3
        }
    }

    /// Easiest stake target allowed under the given rules
    pub fn stake_limit(&self, rules: StakeRules) -> &Target {
        match rules {
            StakeRules::V1 | StakeRules::V1Rf => &self.pos_limit,
            StakeRules::V2 | StakeRules::V3 | StakeRules::V3_1 => &self.pos_limit_v2,
        }
    }

    /// V3.1 activation as a UTC timestamp
    pub fn posv3_1_activation(&self) -> Option<DateTime<Utc>> {
        self.first_posv3_1_block_time
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_zero_targets() {
        assert_eq!(
            Target::with_leading_zero_bits(20).to_hex(),
            "00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(
            Target::with_leading_zero_bits(48).to_hex(),
            "000000000000ffffffffffffffffffffffffffffffffffffffffffffffffffff"
        );
        assert_eq!(Target::with_leading_zero_bits(0).as_bytes(), &[0xff; 32]);
        assert_eq!(Target::with_leading_zero_bits(256).as_bytes(), &[0; 32]);
    }

    #[test]
    fn test_from_hex_pads() {
        let t = Target::from_hex("0x0fffff").unwrap();
        assert_eq!(t.as_bytes()[29..], [0x0f, 0xff, 0xff]);
        assert!(Target::from_hex(&"f".repeat(65)).is_err());
        assert!(Target::from_hex("zz").is_err());
    }

    #[test]
    fn test_compact_encoding() {
        assert_eq!(Target::with_leading_zero_bits(20).to_compact(), 0x1e0f_ffff);
        assert_eq!(Target::with_leading_zero_bits(16).to_compact(), 0x1f00_ffff);
        assert_eq!(Target::with_leading_zero_bits(48).to_compact(), 0x1b00_ffff);
        assert_eq!(Target::with_leading_zero_bits(256).to_compact(), 0);
    }

    #[test]
    fn test_meets() {
        let target = Target::with_leading_zero_bits(20);
        let mut hash = [0u8; 32];
        hash[2] = 0x0f;
        assert!(target.meets(&hash));
        hash[2] = 0x10;
        assert!(!target.meets(&hash));
    }

    #[test]
    fn test_mainnet_stake_rules() {
        let params = ConsensusParams::mainnet();
        assert_eq!(params.stake_rules_at(0, 0), StakeRules::V3);
        assert_eq!(params.stake_rules_at(5_000_000, u64::MAX), StakeRules::V3);
        assert!(params.is_pow_allowed(1_000_000));
        assert!(!params.is_pow_allowed(1_000_001));
        assert!(params.posv3_1_activation().is_none());
    }

    #[test]
    fn test_testnet_stake_rules() {
        let params = ConsensusParams::testnet();
        assert_eq!(params.stake_rules_at(100, 0), StakeRules::V1);
        assert_eq!(params.stake_rules_at(38_425, 0), StakeRules::V1Rf);
        assert_eq!(params.stake_rules_at(319_002, 0), StakeRules::V2);
        assert_eq!(params.stake_rules_at(900_000, 1_667_779_199), StakeRules::V3);
        assert_eq!(params.stake_rules_at(900_000, 1_667_779_200), StakeRules::V3_1);

        assert_eq!(params.stake_limit(StakeRules::V1), &params.pos_limit);
        assert_eq!(params.stake_limit(StakeRules::V3_1), &params.pos_limit_v2);
        assert_eq!(
            params.posv3_1_activation().unwrap().timestamp(),
            1_667_779_200
        );
    }
}
