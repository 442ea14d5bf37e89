//! Fuzz test for WIF decoding

#![no_main]

use kot_core::WifKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let profile = kot_params::register_all().get(kot_params::NetworkKind::Mainnet);
        if let Ok(key) = WifKey::decode(s, &profile) {
            // A decoded key always has a public key
            assert!(key.public_key().is_ok());
        }
    }
});
