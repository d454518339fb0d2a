//! Signature parsing and canonicalization
//!
//! Raw hex signatures arrive in two layouts (64 bytes of r||s, or 65 with
//! a trailing recovery byte) and, worse, two conventions for what the
//! trailing byte means. Call sites in the wild disagree on whether it is
//! the legacy Ethereum `v` (27/28) or already a raw recovery id (0/1), so
//! the convention is an explicit parameter here rather than a guess - a
//! `v % 2` shortcut would silently miscompute the recovery id for any
//! byte outside {0,1,2,3}.

use p256::ecdsa::Signature as P256Signature;
use thiserror::Error;

/// The two curves this repo verifies against. Not interchangeable:
/// different orders, different canonical-form rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Curve {
    Secp256k1,
    Secp256r1,
}

/// Convention for the trailing byte of a 65-byte signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VEncoding {
    /// v in {27, 28}; recovery id = v - 27
    EthereumLegacy,
    /// the byte is already a recovery id in {0, 1}
    RawRecovery,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid recovery byte {0:#04x} for {1:?}")]
    InvalidRecoveryByte(u8, VEncoding),
}

/// A parsed, not-yet-normalized signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// present only for 65-byte encodings
    pub recovery_id: Option<u8>,
}

impl ParsedSignature {
    pub fn rs_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}

/// Parses a hex signature (optional `0x` prefix) into its components.
///
/// Length decides whether a recovery byte is present; anything other than
/// 64 or 65 raw bytes, or non-hex input, is a hard error - malformed
/// input is never reported as a boolean rejection.
pub fn parse_signature(
    hex_signature: &str,
    curve: Curve,
    v_encoding: VEncoding,
) -> Result<ParsedSignature, CodecError> {
    let stripped = hex_signature
        .strip_prefix("0x")
        .unwrap_or(hex_signature);
    let bytes = hex::decode(stripped)
        .map_err(|err| CodecError::MalformedSignature(format!("not hex: {err}")))?;

    let (rs, recovery_id) = match bytes.len() {
        64 => (&bytes[..64], None),
        65 => {
            let recovery_id = recovery_id_from_byte(bytes[64], v_encoding)?;
            (&bytes[..64], Some(recovery_id))
        }
        n => {
            return Err(CodecError::MalformedSignature(format!(
                "expected 64 or 65 bytes, got {n}"
            )))
        }
    };

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&rs[..32]);
    s.copy_from_slice(&rs[32..]);

    let parsed = ParsedSignature { r, s, recovery_id };
    if curve == Curve::Secp256r1 {
        // scalar range check; rejects r or s of zero or >= n
        P256Signature::from_slice(&parsed.rs_bytes())
            .map_err(|err| CodecError::MalformedSignature(format!("invalid P-256 scalar: {err}")))?;
    }
    Ok(parsed)
}

fn recovery_id_from_byte(byte: u8, v_encoding: VEncoding) -> Result<u8, CodecError> {
    match v_encoding {
        VEncoding::EthereumLegacy => match byte {
            27 | 28 => Ok(byte - 27),
            _ => Err(CodecError::InvalidRecoveryByte(byte, v_encoding)),
        },
        VEncoding::RawRecovery => match byte {
            0 | 1 => Ok(byte),
            _ => Err(CodecError::InvalidRecoveryByte(byte, v_encoding)),
        },
    }
}

/// Rewrites `s` into the curve's canonical form.
///
/// For P-256 a high `s` becomes `n - s` - the same signature, in the only
/// encoding the Secp256r1SigVerify precompile accepts. This must happen
/// before instruction construction, never after. secp256k1 verification
/// here goes through address recovery, which accepts either encoding, so
/// the K1 path is returned unchanged.
pub fn normalize(
    signature: &ParsedSignature,
    curve: Curve,
) -> Result<ParsedSignature, CodecError> {
    match curve {
        Curve::Secp256k1 => Ok(signature.clone()),
        Curve::Secp256r1 => {
            let parsed = P256Signature::from_slice(&signature.rs_bytes())
                .map_err(|err| CodecError::MalformedSignature(format!("invalid P-256 scalar: {err}")))?;
            let canonical = parsed.normalize_s().unwrap_or(parsed);
            let bytes = canonical.to_bytes();

            let mut r = [0u8; 32];
            let mut s = [0u8; 32];
            r.copy_from_slice(&bytes[..32]);
            s.copy_from_slice(&bytes[32..]);
            Ok(ParsedSignature {
                r,
                s,
                recovery_id: signature.recovery_id,
            })
        }
    }
}
