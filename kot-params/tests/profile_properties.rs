//! Property-based tests for kot-params
//!
//! Uses proptest to verify profile invariants across randomized inputs

use kot_params::{
    genesis_hex, parse_genesis, CheckpointTable, KeyKind, NetworkKind, ProfileRegistry,
    XKeyScheme,
};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Property Test Strategies
// ============================================================================

fn network_strategy() -> impl Strategy<Value = NetworkKind> {
    prop::sample::select(NetworkKind::ALL.to_vec())
}

fn scheme_strategy() -> impl Strategy<Value = XKeyScheme> {
    prop::sample::select(XKeyScheme::ALL.to_vec())
}

fn key_kind_strategy() -> impl Strategy<Value = KeyKind> {
    prop::sample::select(vec![KeyKind::Private, KeyKind::Public])
}

fn registry() -> ProfileRegistry {
    ProfileRegistry::bundled().expect("bundled profiles are valid")
}

// ============================================================================
// Header Codec Properties
// ============================================================================

proptest! {
    /// Property: decode(encode(tag)) == tag on every network
    #[test]
    fn prop_header_round_trip(
        network in network_strategy(),
        scheme in scheme_strategy(),
        kind in key_kind_strategy()
    ) {
        let profile = registry().get(network);
        let table = profile.headers(kind);
        let version = table.encode_tag(scheme.as_str()).unwrap();
        prop_assert_eq!(table.decode(version).unwrap(), scheme);
        prop_assert_eq!(profile.classify_xkey_header(version).unwrap(), (kind, scheme));
    }

    /// Property: arbitrary versions either decode to a scheme that encodes back, or fail
    #[test]
    fn prop_decode_is_consistent(network in network_strategy(), version in any::<u32>()) {
        let profile = registry().get(network);
        if let Ok(scheme) = profile.xpub_headers.decode(version) {
            prop_assert_eq!(profile.xpub_headers.encode(scheme), version);
        }
    }

    /// Property: genesis hex -> bytes -> hex is the identity
    #[test]
    fn prop_genesis_round_trip(bytes in any::<[u8; 32]>()) {
        let hex = genesis_hex(&bytes);
        prop_assert_eq!(hex.len(), 64);
        prop_assert_eq!(parse_genesis(&hex).unwrap(), bytes);
    }

    /// Property: max_checkpoint is the highest height with a non-zero hash
    #[test]
    fn prop_max_checkpoint(entries in prop::collection::btree_map(0u32..1_000_000, any::<bool>(), 0..20)) {
        let zero = "0".repeat(64);
        let hash = format!("{}1", "0".repeat(63));
        let table = CheckpointTable::from_entries(
            entries.iter().map(|(h, real)| (*h, if *real { hash.clone() } else { zero.clone() })),
        );
        let expected = entries
            .iter()
            .filter(|(_, real)| **real)
            .map(|(h, _)| *h)
            .max()
            .unwrap_or(0);
        prop_assert_eq!(table.max_checkpoint(), expected);
    }
}

// ============================================================================
// Registry Invariants
// ============================================================================

#[test]
fn test_header_tables_have_no_duplicates() {
    for profile in registry().iter() {
        for kind in [KeyKind::Private, KeyKind::Public] {
            let versions: HashSet<u32> = profile.headers(kind).entries().map(|(_, v)| v).collect();
            assert_eq!(versions.len(), XKeyScheme::ALL.len(), "{} {}", profile.name, kind);
        }
    }
}

#[test]
fn test_genesis_strings_round_trip() {
    for profile in registry().iter() {
        let bytes = profile.genesis_bytes().unwrap();
        assert_eq!(genesis_hex(&bytes), profile.genesis_hash_hex);
    }
}

#[test]
fn test_foreign_header_rejected() {
    let registry = registry();
    let mainnet = registry.get(NetworkKind::Mainnet);
    let testnet = registry.get(NetworkKind::Testnet);

    let tpub = testnet.xpub_headers.encode(XKeyScheme::Standard);
    assert_eq!(tpub, 0x0435_87cf);
    assert!(matches!(
        mainnet.xpub_headers.decode(tpub),
        Err(kot_params::Error::UnrecognizedVersion(0x0435_87cf))
    ));
    assert!(mainnet.classify_xkey_header(tpub).is_err());
}

#[test]
fn test_max_checkpoint_examples() {
    assert_eq!(CheckpointTable::new().max_checkpoint(), 0);

    let zero = "0".repeat(64);
    let table = CheckpointTable::from_entries([
        (100, zero.clone()),
        (200, format!("abc{}", "0".repeat(61))),
        (50, zero),
    ]);
    assert_eq!(table.max_checkpoint(), 200);
}

#[test]
fn test_concurrent_reads_see_one_profile() {
    kot_params::set_testnet();
    let expected = kot_params::active();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                (0..1_000)
                    .map(|_| kot_params::active())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        for seen in handle.join().unwrap() {
            assert!(Arc::ptr_eq(&seen, &expected));
            assert_eq!(seen.wif_prefix, 0xef);
            assert_eq!(seen.segwit_hrp, "tkot");
        }
    }
}
