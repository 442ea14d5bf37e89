//! Property-based tests for kot-core
//!
//! Uses proptest to verify invariants across randomized inputs

use kot_core::{
    account_xpub, derive_address, seed_from_mnemonic, Address, DerivationPath, Error,
    ExtendedKey, ScriptType, WifKey, HARDENED,
};
use kot_params::{NetworkKind, NetworkProfile, ProfileRegistry, XKeyScheme};
use proptest::prelude::*;
use std::sync::Arc;

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

// ============================================================================
// Property Test Strategies
// ============================================================================

fn network_strategy() -> impl Strategy<Value = NetworkKind> {
    prop::sample::select(NetworkKind::ALL.to_vec())
}

fn scheme_strategy() -> impl Strategy<Value = XKeyScheme> {
    prop::sample::select(XKeyScheme::ALL.to_vec())
}

fn script_type_strategy() -> impl Strategy<Value = ScriptType> {
    prop::sample::select(ScriptType::ALL.to_vec())
}

/// Any address shape
fn address_strategy() -> impl Strategy<Value = Address> {
    prop_oneof![
        any::<[u8; 20]>().prop_map(Address::P2pkh),
        any::<[u8; 20]>().prop_map(Address::P2sh),
        prop::collection::vec(any::<u8>(), 20..=20)
            .prop_map(|program| Address::Segwit { version: 0, program }),
        prop::collection::vec(any::<u8>(), 32..=32)
            .prop_map(|program| Address::Segwit { version: 0, program }),
        prop::collection::vec(any::<u8>(), 32..=32)
            .prop_map(|program| Address::Segwit { version: 1, program }),
    ]
}

/// Valid secp256k1 secrets (non-zero, well below the group order)
fn secret_strategy() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>().prop_map(|mut secret| {
        secret[0] &= 0x7f;
        secret[31] |= 0x01;
        secret
    })
}

fn profile(kind: NetworkKind) -> Arc<NetworkProfile> {
    kot_params::register_all().get(kind)
}

// ============================================================================
// Address Properties
// ============================================================================

proptest! {
    /// Property: an encoded address parses back on its own network
    #[test]
    fn prop_address_encode_decode(
        address in address_strategy(),
        kind in network_strategy()
    ) {
        let profile = profile(kind);
        let encoded = address.encode(&profile).unwrap();
        prop_assert_eq!(Address::parse(&encoded, &profile).unwrap(), address);
    }

    /// Property: mainnet never accepts an address encoded for another network
    #[test]
    fn prop_foreign_address_rejected(
        address in address_strategy(),
        kind in network_strategy()
    ) {
        prop_assume!(kind != NetworkKind::Mainnet);
        let encoded = address.encode(&profile(kind)).unwrap();
        let err = Address::parse(&encoded, &profile(NetworkKind::Mainnet)).unwrap_err();
        prop_assert!(err.is_foreign_network(), "{}", err);
    }

    /// Property: garbage strings never panic the parser
    #[test]
    fn prop_parse_never_panics(s in "\\PC{0,100}", kind in network_strategy()) {
        let _ = Address::parse(&s, &profile(kind));
    }
}

// ============================================================================
// WIF Properties
// ============================================================================

proptest! {
    /// Property: WIF round trip keeps secret and script type
    #[test]
    fn prop_wif_roundtrip(
        secret in secret_strategy(),
        script_type in script_type_strategy(),
        kind in network_strategy()
    ) {
        let profile = profile(kind);
        let key = WifKey::new(secret, true, script_type).unwrap();
        let decoded = WifKey::decode(&key.encode(&profile), &profile).unwrap();
        prop_assert_eq!(decoded.secret_bytes(), &secret);
        prop_assert_eq!(decoded.script_type(), script_type);
    }

    /// Property: a key's address is valid on the same network
    #[test]
    fn prop_wif_address_valid(
        secret in secret_strategy(),
        script_type in script_type_strategy()
    ) {
        let profile = profile(NetworkKind::Mainnet);
        let key = WifKey::new(secret, true, script_type).unwrap();
        let address = key.address(&profile).unwrap();
        prop_assert!(kot_core::is_address(&address, &profile));
    }
}

// ============================================================================
// Extended Key Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Property: serialization round trip keeps kind and scheme on every network
    #[test]
    fn prop_xkey_roundtrip(
        seed in any::<[u8; 32]>(),
        scheme in scheme_strategy(),
        kind in network_strategy(),
        private in any::<bool>()
    ) {
        let profile = profile(kind);
        let master = kot_core::master_from_seed(&seed, scheme).unwrap();
        let key = if private { master } else { master.neuter().unwrap() };

        let encoded = key.to_base58(&profile);
        let decoded = ExtendedKey::from_base58(&encoded, &profile).unwrap();
        prop_assert_eq!(decoded.kind, key.kind);
        prop_assert_eq!(decoded.scheme, scheme);
        prop_assert_eq!(decoded, key);
    }

    /// Property: same seed + path = same address; index changes it
    #[test]
    fn prop_deterministic_address_derivation(
        index in 0u32..1000,
        account in 0u32..4
    ) {
        let profile = profile(NetworkKind::Mainnet);
        let seed = seed_from_mnemonic(PHRASE, "").unwrap();
        let xpub = account_xpub(&profile, &seed[..], XKeyScheme::P2wpkhP2sh, account).unwrap();

        let first = derive_address(&profile, &xpub, false, index).unwrap();
        let again = derive_address(&profile, &xpub, false, index).unwrap();
        let next = derive_address(&profile, &xpub, false, index + 1).unwrap();
        prop_assert_eq!(&first, &again);
        prop_assert_ne!(&first, &next);
    }

    /// Property: path display/parse round trip
    #[test]
    fn prop_path_roundtrip(indexes in prop::collection::vec(any::<u32>(), 0..6)) {
        let text = indexes.iter().fold(String::from("m"), |mut acc, index| {
            if index & HARDENED != 0 {
                acc.push_str(&format!("/{}'", index & !HARDENED));
            } else {
                acc.push_str(&format!("/{index}"));
            }
            acc
        });
        let path: DerivationPath = text.parse().unwrap();
        prop_assert_eq!(path.indexes(), &indexes[..]);
        prop_assert_eq!(path.to_string(), text);
    }
}

// ============================================================================
// Cross-network examples
// ============================================================================

#[test]
fn test_mainnet_rejects_tpub() {
    let registry = ProfileRegistry::bundled().unwrap();
    let seed = seed_from_mnemonic(PHRASE, "").unwrap();
    let tpub = account_xpub(&registry.get(NetworkKind::Testnet), &seed[..], XKeyScheme::Standard, 0)
        .unwrap()
        .to_base58(&registry.get(NetworkKind::Testnet));
    assert!(tpub.starts_with("tpub"));

    let err = ExtendedKey::from_base58(&tpub, &registry.get(NetworkKind::Mainnet)).unwrap_err();
    assert!(matches!(
        err,
        Error::Params(kot_params::Error::UnrecognizedVersion(0x0435_87cf))
    ));
}

#[test]
fn test_signet_shares_testnet_encodings() {
    let registry = ProfileRegistry::bundled().unwrap();
    let address = Address::p2wsh_from_script(&[0x51]);
    assert_eq!(
        address.encode(&registry.get(NetworkKind::Testnet)).unwrap(),
        address.encode(&registry.get(NetworkKind::Signet)).unwrap()
    );
    assert_ne!(
        address.encode(&registry.get(NetworkKind::Testnet)).unwrap(),
        address.encode(&registry.get(NetworkKind::Regtest)).unwrap()
    );
}

#[test]
fn test_simnet_base58_sweep_round_trips() {
    use sha2::{Digest, Sha256};

    // Roughly one simnet base58 address in a few thousand starts with "Sb1",
    // which shares its spelling with the simnet segwit prefix.
    let simnet = profile(NetworkKind::Simnet);
    let mut segwit_lookalikes = 0;
    for i in 0u32..50_000 {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&Sha256::digest(i.to_le_bytes())[..20]);
        for address in [Address::P2pkh(hash), Address::P2sh(hash)] {
            let encoded = address.encode(&simnet).unwrap();
            if encoded.to_ascii_lowercase().starts_with("sb1") {
                segwit_lookalikes += 1;
            }
            assert_eq!(Address::parse(&encoded, &simnet).unwrap(), address, "{encoded}");
        }
    }
    assert!(segwit_lookalikes > 0);
}
