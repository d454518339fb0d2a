//! Byte layout of the Secp256r1SigVerify native program instruction
//!
//! ```text
//! [0]      num_signatures: u8
//! [1]      padding: u8
//! [2..16]  Secp256r1SignatureOffsets (little-endian):
//!            signature_offset: u16
//!            signature_instruction_index: u16
//!            public_key_offset: u16
//!            public_key_instruction_index: u16
//!            message_data_offset: u16
//!            message_data_size: u16
//!            message_instruction_index: u16
//! [16..]   payload addressed by the offsets table
//! ```
//!
//! Index fields use the sentinel `u16::MAX` for "this instruction". The
//! precompile SHA-256-hashes the message segment before curve
//! verification and requires the signature's `s` in low-s canonical form,
//! so the client normalizes before building and this check normalizes the
//! caller-supplied `s` the same way before comparing.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::pubkey;

use super::{read_u16_le, segment};
use crate::error::ChainAuthError;

pub const SECP256R1_PROGRAM_ID: Pubkey = pubkey!("Secp256r1SigVerify1111111111111111111111111");

pub const COMPRESSED_PUBKEY_SERIALIZED_SIZE: usize = 33;
pub const SIGNATURE_SERIALIZED_SIZE: usize = 64;
pub const SIGNATURE_OFFSETS_SERIALIZED_SIZE: usize = 14;
pub const SIGNATURE_OFFSETS_START: usize = 2;
pub const DATA_START: usize = SIGNATURE_OFFSETS_START + SIGNATURE_OFFSETS_SERIALIZED_SIZE;

const FIELD_SIZE: usize = 32;

// Order as defined in SEC2: 2.7.2 Recommended Parameters secp256r1
pub const SECP256R1_ORDER: [u8; FIELD_SIZE] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xBC, 0xE6, 0xFA, 0xAD, 0xA7, 0x17, 0x9E, 0x84, 0xF3, 0xB9, 0xCA, 0xC2, 0xFC, 0x63,
    0x25, 0x51,
];

// Computed half order
pub const SECP256R1_HALF_ORDER: [u8; FIELD_SIZE] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0x80, 0x00, 0x00, 0x00, 0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xDE, 0x73, 0x7D, 0x56, 0xD3, 0x8B, 0xCF, 0x42, 0x79, 0xDC, 0xE5, 0x61, 0x7E, 0x31,
    0x92, 0xA8,
];

/// Big-endian `s > n/2`
pub fn is_high_s(s: &[u8; FIELD_SIZE]) -> bool {
    for i in 0..FIELD_SIZE {
        match s[i].cmp(&SECP256R1_HALF_ORDER[i]) {
            core::cmp::Ordering::Greater => return true,
            core::cmp::Ordering::Less => return false,
            core::cmp::Ordering::Equal => {}
        }
    }
    false
}

/// Replaces a high `s` with `n - s`, the value-preserving canonical form
/// the precompile requires. A low `s` is returned unchanged, which also
/// makes the transform idempotent.
pub fn normalize_s(s: &[u8; FIELD_SIZE]) -> [u8; FIELD_SIZE] {
    if !is_high_s(s) {
        return *s;
    }
    let mut out = [0u8; FIELD_SIZE];
    let mut borrow = 0u16;
    for i in (0..FIELD_SIZE).rev() {
        let minuend = SECP256R1_ORDER[i] as u16;
        let subtrahend = s[i] as u16 + borrow;
        if minuend >= subtrahend {
            out[i] = (minuend - subtrahend) as u8;
            borrow = 0;
        } else {
            out[i] = (minuend + 0x100 - subtrahend) as u8;
            borrow = 1;
        }
    }
    out
}

struct Secp256r1SignatureOffsets {
    signature_offset: u16,
    signature_instruction_index: u16,
    public_key_offset: u16,
    public_key_instruction_index: u16,
    message_data_offset: u16,
    message_data_size: u16,
    message_instruction_index: u16,
}

impl Secp256r1SignatureOffsets {
    fn parse(table: &[u8]) -> Self {
        Self {
            signature_offset: read_u16_le(table, 0),
            signature_instruction_index: read_u16_le(table, 2),
            public_key_offset: read_u16_le(table, 4),
            public_key_instruction_index: read_u16_le(table, 6),
            message_data_offset: read_u16_le(table, 8),
            message_data_size: read_u16_le(table, 10),
            message_instruction_index: read_u16_le(table, 12),
        }
    }

    fn self_contained(&self, own_index: usize) -> bool {
        let own = own_index as u16;
        [
            self.signature_instruction_index,
            self.public_key_instruction_index,
            self.message_instruction_index,
        ]
        .iter()
        .all(|&index| index == u16::MAX || index == own)
    }
}

/// Checks that a Secp256r1SigVerify instruction found at transaction
/// index `own_index` commits to exactly the given compressed key,
/// signature (after low-s normalization of `s`) and message.
pub fn matches_expected(
    data: &[u8],
    own_index: usize,
    compressed_pubkey: &[u8; COMPRESSED_PUBKEY_SERIALIZED_SIZE],
    signature: &[u8; SIGNATURE_SERIALIZED_SIZE],
    message: &[u8],
) -> Result<bool> {
    if data.len() < DATA_START {
        return err!(ChainAuthError::MalformedVerificationInstruction);
    }
    if data[0] != 1 {
        return Ok(false);
    }

    let offsets = Secp256r1SignatureOffsets::parse(&data[SIGNATURE_OFFSETS_START..DATA_START]);
    if !offsets.self_contained(own_index) {
        return Ok(false);
    }
    if offsets.message_data_size as usize != message.len() {
        return Ok(false);
    }

    let sig_segment = segment(data, offsets.signature_offset, SIGNATURE_SERIALIZED_SIZE)?;
    let key_segment = segment(
        data,
        offsets.public_key_offset,
        COMPRESSED_PUBKEY_SERIALIZED_SIZE,
    )?;
    let message_segment = segment(data, offsets.message_data_offset, message.len())?;

    let mut expected = [0u8; SIGNATURE_SERIALIZED_SIZE];
    expected[..FIELD_SIZE].copy_from_slice(&signature[..FIELD_SIZE]);
    let mut s = [0u8; FIELD_SIZE];
    s.copy_from_slice(&signature[FIELD_SIZE..]);
    expected[FIELD_SIZE..].copy_from_slice(&normalize_s(&s));

    Ok(key_segment == compressed_pubkey
        && sig_segment == expected
        && message_segment == message)
}
