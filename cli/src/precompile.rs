//! Builders for the native signature-verification instructions
//!
//! The precompile programs consume a fixed-offset binary header followed
//! by the payload segments. Offsets are absolute positions within this
//! instruction's own data buffer, so they are computed bottom-up: fixed
//! header size first, then each segment's start as the running total of
//! everything placed before it. Segment lengths are validated before any
//! bytes are written - a malformed instruction must never be emitted.

use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

use crate::derive::{eth_address_from_compressed, DeriveError};
use crate::signature::ParsedSignature;

// Keccak-secp256k1 layout
pub const HASHED_PUBKEY_SERIALIZED_SIZE: usize = 20;
pub const SIGNATURE_SERIALIZED_SIZE: usize = 64;
pub const K1_SIGNATURE_OFFSETS_SERIALIZED_SIZE: usize = 11;
pub const K1_DATA_START: usize = K1_SIGNATURE_OFFSETS_SERIALIZED_SIZE + 1;

// Secp256r1SigVerify layout
pub const COMPRESSED_PUBKEY_SERIALIZED_SIZE: usize = 33;
pub const R1_SIGNATURE_OFFSETS_SERIALIZED_SIZE: usize = 14;
pub const R1_SIGNATURE_OFFSETS_START: usize = 2;
pub const R1_DATA_START: usize =
    R1_SIGNATURE_OFFSETS_START + R1_SIGNATURE_OFFSETS_SERIALIZED_SIZE;

/// Which precompile to target and what key material it expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// secp256k1 against a 20-byte Ethereum address
    K1Address,
    /// secp256k1 against a 33-byte compressed key (address derived here)
    K1Pubkey,
    /// secp256r1 against a 33-byte compressed key
    R1Pubkey,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("signature must be {expected} bytes for this scheme, got {actual}")]
    BadSignatureLength { expected: usize, actual: usize },

    #[error("signature scheme requires a recovery id but none was parsed")]
    MissingRecoveryId,

    #[error("key or address must be {expected} bytes for this scheme, got {actual}")]
    BadKeyLength { expected: usize, actual: usize },

    #[error(transparent)]
    Derive(#[from] DeriveError),

    #[error("message of {0} bytes does not fit a single instruction")]
    MessageTooLarge(usize),
}

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
    fn to_bytes(&self) -> [u8; K1_SIGNATURE_OFFSETS_SERIALIZED_SIZE] {
        let mut bytes = [0u8; K1_SIGNATURE_OFFSETS_SERIALIZED_SIZE];
        bytes[0..2].copy_from_slice(&self.signature_offset.to_le_bytes());
        bytes[2] = self.signature_instruction_index;
        bytes[3..5].copy_from_slice(&self.eth_address_offset.to_le_bytes());
        bytes[5] = self.eth_address_instruction_index;
        bytes[6..8].copy_from_slice(&self.message_data_offset.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.message_data_size.to_le_bytes());
        bytes[10] = self.message_instruction_index;
        bytes
    }
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
    fn to_bytes(&self) -> [u8; R1_SIGNATURE_OFFSETS_SERIALIZED_SIZE] {
        let mut bytes = [0u8; R1_SIGNATURE_OFFSETS_SERIALIZED_SIZE];
        bytes[0..2].copy_from_slice(&self.signature_offset.to_le_bytes());
        bytes[2..4].copy_from_slice(&self.signature_instruction_index.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.public_key_offset.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.public_key_instruction_index.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.message_data_offset.to_le_bytes());
        bytes[10..12].copy_from_slice(&self.message_data_size.to_le_bytes());
        bytes[12..14].copy_from_slice(&self.message_instruction_index.to_le_bytes());
        bytes
    }
}

/// Keccak-secp256k1 instruction: header, then eth_address ++ signature ++
/// recovery_id ++ message.
///
/// The k1 offsets table has u8 instruction-index fields and no "this
/// instruction" sentinel, so `instruction_index` must be the transaction
/// position this instruction will actually occupy. Guessing 0 breaks as
/// soon as anything (a compute-budget request, say) is prepended.
pub fn new_secp256k1_instruction(
    program_id: &Pubkey,
    signature: &[u8],
    recovery_id: u8,
    eth_address: &[u8],
    message: &[u8],
    instruction_index: u8,
) -> Result<Instruction, BuildError> {
    if signature.len() != SIGNATURE_SERIALIZED_SIZE {
        return Err(BuildError::BadSignatureLength {
            expected: SIGNATURE_SERIALIZED_SIZE,
            actual: signature.len(),
        });
    }
    if eth_address.len() != HASHED_PUBKEY_SERIALIZED_SIZE {
        return Err(BuildError::BadKeyLength {
            expected: HASHED_PUBKEY_SERIALIZED_SIZE,
            actual: eth_address.len(),
        });
    }

    let eth_address_offset = K1_DATA_START;
    let signature_offset = eth_address_offset + HASHED_PUBKEY_SERIALIZED_SIZE;
    let recovery_offset = signature_offset + SIGNATURE_SERIALIZED_SIZE;
    let message_data_offset = recovery_offset + 1;
    check_message_fits(message_data_offset, message.len())?;

    let offsets = SecpSignatureOffsets {
        signature_offset: signature_offset as u16,
        signature_instruction_index: instruction_index,
        eth_address_offset: eth_address_offset as u16,
        eth_address_instruction_index: instruction_index,
        message_data_offset: message_data_offset as u16,
        message_data_size: message.len() as u16,
        message_instruction_index: instruction_index,
    };

    let mut data = Vec::with_capacity(message_data_offset + message.len());
    data.push(1); // num_signatures
    data.extend_from_slice(&offsets.to_bytes());
    data.extend_from_slice(eth_address);
    data.extend_from_slice(signature);
    data.push(recovery_id);
    data.extend_from_slice(message);

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![],
        data,
    })
}

/// Secp256r1SigVerify instruction: header, then signature ++
/// compressed_pubkey ++ message, with 0xFFFF "this instruction"
/// sentinels. The signature must already be in low-s canonical form.
pub fn new_secp256r1_instruction(
    program_id: &Pubkey,
    signature: &[u8],
    compressed_pubkey: &[u8],
    message: &[u8],
) -> Result<Instruction, BuildError> {
    if signature.len() != SIGNATURE_SERIALIZED_SIZE {
        return Err(BuildError::BadSignatureLength {
            expected: SIGNATURE_SERIALIZED_SIZE,
            actual: signature.len(),
        });
    }
    if compressed_pubkey.len() != COMPRESSED_PUBKEY_SERIALIZED_SIZE {
        return Err(BuildError::BadKeyLength {
            expected: COMPRESSED_PUBKEY_SERIALIZED_SIZE,
            actual: compressed_pubkey.len(),
        });
    }

    let signature_offset = R1_DATA_START;
    let public_key_offset = signature_offset + SIGNATURE_SERIALIZED_SIZE;
    let message_data_offset = public_key_offset + COMPRESSED_PUBKEY_SERIALIZED_SIZE;
    check_message_fits(message_data_offset, message.len())?;

    let offsets = Secp256r1SignatureOffsets {
        signature_offset: signature_offset as u16,
        signature_instruction_index: u16::MAX,
        public_key_offset: public_key_offset as u16,
        public_key_instruction_index: u16::MAX,
        message_data_offset: message_data_offset as u16,
        message_data_size: message.len() as u16,
        message_instruction_index: u16::MAX,
    };

    let mut data = Vec::with_capacity(message_data_offset + message.len());
    data.push(1); // num_signatures
    data.push(0); // padding
    data.extend_from_slice(&offsets.to_bytes());
    data.extend_from_slice(signature);
    data.extend_from_slice(compressed_pubkey);
    data.extend_from_slice(message);

    Ok(Instruction {
        program_id: *program_id,
        accounts: vec![],
        data,
    })
}

/// Scheme-dispatching entry point: validates the key material for the
/// scheme, derives the Ethereum address when given a compressed k1 key,
/// and emits the matching precompile instruction.
pub fn build_verification_instruction(
    program_id: &Pubkey,
    scheme: SignatureScheme,
    signature: &ParsedSignature,
    key_or_address: &[u8],
    message: &[u8],
    instruction_index: u8,
) -> Result<Instruction, BuildError> {
    match scheme {
        SignatureScheme::K1Address => {
            let recovery_id = signature.recovery_id.ok_or(BuildError::MissingRecoveryId)?;
            new_secp256k1_instruction(
                program_id,
                &signature.rs_bytes(),
                recovery_id,
                key_or_address,
                message,
                instruction_index,
            )
        }
        SignatureScheme::K1Pubkey => {
            let recovery_id = signature.recovery_id.ok_or(BuildError::MissingRecoveryId)?;
            let eth_address = eth_address_from_compressed(key_or_address)?;
            new_secp256k1_instruction(
                program_id,
                &signature.rs_bytes(),
                recovery_id,
                &eth_address,
                message,
                instruction_index,
            )
        }
        SignatureScheme::R1Pubkey => new_secp256r1_instruction(
            program_id,
            &signature.rs_bytes(),
            key_or_address,
            message,
        ),
    }
}

fn check_message_fits(message_data_offset: usize, message_len: usize) -> Result<(), BuildError> {
    // every offset and the message size must fit a u16
    if message_data_offset + message_len > u16::MAX as usize {
        return Err(BuildError::MessageTooLarge(message_len));
    }
    Ok(())
}
