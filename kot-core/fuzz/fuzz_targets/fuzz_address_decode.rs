//! Fuzz test for address decoding
//!
//! Ensures address parser handles malformed input gracefully on every network

#![no_main]

use kot_core::Address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for profile in kot_params::register_all().iter() {
            // Should never panic, only return Err for invalid input
            if let Ok(address) = Address::parse(s, profile) {
                let _ = address.encode(profile);
                let _ = address.script_pubkey();
            }
        }
    }
});
