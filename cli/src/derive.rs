//! Public key decompression and Ethereum address derivation
//!
//! Only the secp256k1/Ethereum path needs this: the Keccak precompile
//! verifies against a 20-byte address, so a compressed key must be
//! expanded to the full point and hashed down. The P-256/WebAuthn path
//! verifies directly against the compressed key.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::PublicKey as K256PublicKey;
use sha3::{Digest, Keccak256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeriveError {
    #[error("invalid compressed public key length: expected 33 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("x coordinate has no corresponding point on secp256k1")]
    InvalidPoint,
}

/// SEC1 point decompression: 0x02/0x03 + x -> 0x04 + x + y.
pub fn decompress_public_key(compressed: &[u8]) -> Result<[u8; 65], DeriveError> {
    if compressed.len() != 33 {
        return Err(DeriveError::InvalidKeyLength(compressed.len()));
    }
    let key = K256PublicKey::from_sec1_bytes(compressed).map_err(|_| DeriveError::InvalidPoint)?;
    let point = key.to_encoded_point(false);

    let mut uncompressed = [0u8; 65];
    uncompressed.copy_from_slice(point.as_bytes());
    Ok(uncompressed)
}

/// `keccak256(uncompressed[1..])[12..]` - a pure function of the public
/// key, recomputed rather than stored.
pub fn eth_address_from_uncompressed(uncompressed: &[u8; 65]) -> [u8; 20] {
    let mut address = [0u8; 20];
    address.copy_from_slice(&Keccak256::digest(&uncompressed[1..])[12..]);
    address
}

pub fn eth_address_from_compressed(compressed: &[u8]) -> Result<[u8; 20], DeriveError> {
    let uncompressed = decompress_public_key(compressed)?;
    Ok(eth_address_from_uncompressed(&uncompressed))
}
