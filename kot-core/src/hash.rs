//! Hash helpers and base58check

use crate::{Error, Result};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// SHA-256
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of SHA-256
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(sha256(data)).into()
}

fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = sha256d(data);
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Base58 encoding of `payload || checksum`
pub fn base58check_encode(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 4);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    bs58::encode(data).into_string()
}

/// Decode base58check and return the payload without its checksum
pub fn base58check_decode(s: &str) -> Result<Vec<u8>> {
    let mut data = bs58::decode(s)
        .into_vec()
        .map_err(|e| Error::InvalidAddress(format!("base58: {e}")))?;
    if data.len() < 4 {
        return Err(Error::InvalidAddress("base58 payload too short".to_string()));
    }

    let split = data.len() - 4;
    if data[split..] != checksum(&data[..split]) {
        return Err(Error::InvalidChecksum(s.to_string()));
    }
    data.truncate(split);
    Ok(data)
}
