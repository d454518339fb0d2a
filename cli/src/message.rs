//! Canonical message construction
//!
//! Reproduces exactly the bytes each ecosystem hashes before signing. One
//! byte of divergence from what the signer's wallet hashed makes
//! verification fail (as a boolean, not an error), so nothing here may
//! re-serialize, trim or re-encode its inputs.

use sha2::{Digest, Sha256};
use sha3::Keccak256;

pub const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// `prefix || decimal byte length || payload` - the personal-sign
/// envelope. The length is written as unpadded ASCII decimal digits.
pub fn eth_signed_message(payload: &[u8]) -> Vec<u8> {
    let length = payload.len().to_string();
    let mut message =
        Vec::with_capacity(ETH_MESSAGE_PREFIX.len() + length.len() + payload.len());
    message.extend_from_slice(ETH_MESSAGE_PREFIX);
    message.extend_from_slice(length.as_bytes());
    message.extend_from_slice(payload);
    message
}

/// keccak256 of the personal-sign envelope; the digest Ethereum wallets
/// actually sign.
pub fn eth_message_hash(payload: &[u8]) -> [u8; 32] {
    Keccak256::digest(eth_signed_message(payload)).into()
}

/// `authenticatorData || SHA256(clientDataJSON)`.
///
/// Concatenation only - the Secp256r1SigVerify precompile hashes the full
/// message itself before curve verification. `client_data_json` is used
/// byte for byte as received; even a whitespace difference changes the
/// hash.
pub fn webauthn_message(authenticator_data: &[u8], client_data_json: &str) -> Vec<u8> {
    let client_data_hash = Sha256::digest(client_data_json.as_bytes());
    let mut message = Vec::with_capacity(authenticator_data.len() + 32);
    message.extend_from_slice(authenticator_data);
    message.extend_from_slice(&client_data_hash);
    message
}
