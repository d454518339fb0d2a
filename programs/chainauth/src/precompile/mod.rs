//! Introspection of the native signature-verification instructions
//!
//! The precompile programs (Keccak-secp256k1 and Secp256r1SigVerify) do
//! the actual curve math during transaction verification. This module
//! locates the precompile instruction in the current transaction through
//! the instructions sysvar and checks, byte for byte, that it commits to
//! the address/key, signature and message this program was asked about.
//! If the precompile instruction is present the platform has already
//! proven the signature valid; what remains is proving it valid *for the
//! caller's request* rather than for some other payload.

pub mod secp256k1;
pub mod secp256r1;

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::error::ChainAuthError;

/// Finds the first instruction before the currently executing one that is
/// addressed to `program_id`, returning it with its transaction index.
///
/// The index matters: the precompile offset tables reference instruction
/// positions, and a table pointing at a different instruction than the
/// one it lives in must not be accepted as a commitment.
pub fn find_preceding_instruction(
    instructions_sysvar: &AccountInfo,
    program_id: &Pubkey,
) -> Result<Option<(usize, Instruction)>> {
    let current_index = load_current_index_checked(instructions_sysvar)? as usize;
    for index in 0..current_index {
        let instruction = load_instruction_at_checked(index, instructions_sysvar)?;
        if instruction.program_id == *program_id {
            return Ok(Some((index, instruction)));
        }
    }
    Ok(None)
}

/// Bounds-checked slice of an instruction data buffer. Offsets come from
/// the untrusted offsets table, so out-of-range is a malformed
/// instruction, not a panic.
pub(crate) fn segment(data: &[u8], offset: u16, len: usize) -> Result<&[u8]> {
    let start = offset as usize;
    let end = start
        .checked_add(len)
        .ok_or(ChainAuthError::MalformedVerificationInstruction)?;
    if end > data.len() {
        return err!(ChainAuthError::MalformedVerificationInstruction);
    }
    Ok(&data[start..end])
}

pub(crate) fn read_u16_le(data: &[u8], pos: usize) -> u16 {
    u16::from_le_bytes([data[pos], data[pos + 1]])
}
