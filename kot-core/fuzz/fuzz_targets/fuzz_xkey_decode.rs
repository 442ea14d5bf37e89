//! Fuzz test for extended key decoding
//!
//! Raw bytes go through the 78-byte parser directly so the fuzzer does not
//! have to find valid base58check checksums.

#![no_main]

use kot_core::ExtendedKey;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for profile in kot_params::register_all().iter() {
        if let Ok(key) = ExtendedKey::from_bytes(data, profile) {
            let _ = key.neuter();
            let _ = key.derive_child(0);
        }
    }

    if let Ok(s) = std::str::from_utf8(data) {
        let profile = kot_params::active();
        let _ = ExtendedKey::from_base58(s, &profile);
    }
});
