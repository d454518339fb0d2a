//! Byte layout of the Keccak-secp256k1 native program instruction
//!
//! ```text
//! [0]      num_signatures: u8
//! [1..12]  SecpSignatureOffsets (little-endian):
//!            signature_offset: u16
//!            signature_instruction_index: u8
//!            eth_address_offset: u16
//!            eth_address_instruction_index: u8
//!            message_data_offset: u16
//!            message_data_size: u16
//!            message_instruction_index: u8
//! [12..]   payload addressed by the offsets table
//! ```
//!
//! The signature segment is 65 bytes: 64 bytes of r||s followed by the
//! recovery id. The precompile keccak-hashes the message segment and
//! recovers an Ethereum address from it, so a matching instruction is a
//! proof that `eth_address` signed exactly `message`.

use anchor_lang::prelude::*;

use super::{read_u16_le, segment};
use crate::error::ChainAuthError;

pub const HASHED_PUBKEY_SERIALIZED_SIZE: usize = 20;
pub const SIGNATURE_SERIALIZED_SIZE: usize = 64;
pub const SIGNATURE_OFFSETS_SERIALIZED_SIZE: usize = 11;
pub const DATA_START: usize = SIGNATURE_OFFSETS_SERIALIZED_SIZE + 1;

struct SecpSignatureOffsets {
    signature_offset: u16,
    signature_instruction_index: u8,
    eth_address_offset: u16,
    eth_address_instruction_index: u8,
    message_data_offset: u16,
    message_data_size: u16,
    message_instruction_index: u8,
}

impl SecpSignatureOffsets {
    /// Parses the 11-byte offsets table that follows the count byte.
    fn parse(table: &[u8]) -> Self {
        Self {
            signature_offset: read_u16_le(table, 0),
            signature_instruction_index: table[2],
            eth_address_offset: read_u16_le(table, 3),
            eth_address_instruction_index: table[5],
            message_data_offset: read_u16_le(table, 6),
            message_data_size: read_u16_le(table, 8),
            message_instruction_index: table[10],
        }
    }

    /// The u8 index fields name the transaction instruction holding each
    /// segment; there is no "this instruction" sentinel in the k1 layout,
    /// so all three must name the instruction the table lives in.
    fn self_contained(&self, own_index: usize) -> bool {
        let own = own_index as u8;
        self.signature_instruction_index == own
            && self.eth_address_instruction_index == own
            && self.message_instruction_index == own
    }
}

/// Checks that a Keccak-secp256k1 instruction found at transaction index
/// `own_index` commits to exactly the given address, signature, recovery
/// id and message.
///
/// Structural problems (truncated header, offsets outside the buffer) are
/// hard errors; a well-formed instruction committing to different bytes
/// is an ordinary `false`.
pub fn matches_expected(
    data: &[u8],
    own_index: usize,
    eth_address: &[u8; HASHED_PUBKEY_SERIALIZED_SIZE],
    signature: &[u8; SIGNATURE_SERIALIZED_SIZE],
    recovery_id: u8,
    message: &[u8],
) -> Result<bool> {
    if data.len() < DATA_START {
        return err!(ChainAuthError::MalformedVerificationInstruction);
    }
    if data[0] != 1 {
        // multi-signature batches are not produced by this protocol
        return Ok(false);
    }

    let offsets = SecpSignatureOffsets::parse(&data[1..DATA_START]);
    if !offsets.self_contained(own_index) {
        return Ok(false);
    }
    if offsets.message_data_size as usize != message.len() {
        return Ok(false);
    }

    let sig_segment = segment(
        data,
        offsets.signature_offset,
        SIGNATURE_SERIALIZED_SIZE + 1,
    )?;
    let address_segment = segment(data, offsets.eth_address_offset, HASHED_PUBKEY_SERIALIZED_SIZE)?;
    let message_segment = segment(data, offsets.message_data_offset, message.len())?;

    Ok(address_segment == eth_address
        && &sig_segment[..SIGNATURE_SERIALIZED_SIZE] == signature
        && sig_segment[SIGNATURE_SERIALIZED_SIZE] == recovery_id
        && message_segment == message)
}
