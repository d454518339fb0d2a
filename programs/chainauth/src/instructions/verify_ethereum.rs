//! Ethereum Signature Verification
//!
//! The caller supplies the raw payload their wallet displayed, the
//! 65-byte personal-sign signature and the signer's 20-byte address. The
//! curve math itself happened in the Keccak-secp256k1 precompile
//! instruction earlier in this transaction; this handler reconstructs the
//! exact canonical message the wallet hashed and checks the precompile
//! instruction committed to precisely that address/signature/message
//! triple.
//!
//! ## Flow
//! 1. Client builds the precompile instruction from the same request
//! 2. Client submits [compute budget, precompile, this call] atomically
//! 3. Precompile proves the signature; this handler binds the proof to
//!    the request and returns the verdict
//!
//! A missing precompile instruction is a caller wiring bug and surfaces
//! as a distinguished error, never as a quiet `false`.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::secp256k1_program;
use anchor_lang::solana_program::sysvar::instructions::ID as INSTRUCTIONS_SYSVAR_ID;

use crate::error::ChainAuthError;
use crate::precompile::{find_preceding_instruction, secp256k1};

/// Signature material for an Ethereum-style verification request.
///
/// `message` is the raw payload, without the personal-sign prefix; the
/// prefix is applied here so both sides agree on the exact bytes the
/// precompile keccak-hashes.
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct EthereumValidationData {
    pub signature: String,
    pub message: String,
}

#[derive(Accounts)]
pub struct VerifyEthereumSignature<'info> {
    /// CHECK: constrained to the instructions sysvar address
    #[account(address = INSTRUCTIONS_SYSVAR_ID)]
    pub instructions_sysvar: AccountInfo<'info>,
}

pub fn verify_ethereum_signature(
    ctx: Context<VerifyEthereumSignature>,
    eth_data: EthereumValidationData,
    eth_address: String,
) -> Result<bool> {
    let signature_bytes = decode_hex(&eth_data.signature)?;
    if signature_bytes.len() != 65 {
        return err!(ChainAuthError::InvalidSignatureLength);
    }
    let mut signature = [0u8; 64];
    signature.copy_from_slice(&signature_bytes[..64]);
    let recovery_id = recovery_from_v(signature_bytes[64])?;

    let address_bytes = decode_hex(&eth_address)?;
    let eth_address_arr: [u8; 20] = address_bytes
        .try_into()
        .map_err(|_| error!(ChainAuthError::InvalidAddressLength))?;

    let message = prefixed_message(eth_data.message.as_bytes());

    let (index, instruction) =
        find_preceding_instruction(&ctx.accounts.instructions_sysvar, &secp256k1_program::ID)?
            .ok_or_else(|| error!(ChainAuthError::MissingSecp256k1Instruction))?;

    let accepted = secp256k1::matches_expected(
        &instruction.data,
        index,
        &eth_address_arr,
        &signature,
        recovery_id,
        &message,
    )?;

    if accepted {
        msg!("ethereum signature accepted for {}", eth_address);
    } else {
        msg!("ethereum signature rejected");
    }
    Ok(accepted)
}

/// Both trailing-byte conventions seen across wallets are accepted: the
/// legacy Ethereum offset (27/28) and a raw recovery id (0/1). Anything
/// else is rejected outright instead of being reduced mod 2.
pub(crate) fn recovery_from_v(v: u8) -> Result<u8> {
    let recovery_id = if v >= 27 { v - 27 } else { v };
    if recovery_id > 1 {
        return err!(ChainAuthError::InvalidRecoveryId);
    }
    Ok(recovery_id)
}

/// `"\x19Ethereum Signed Message:\n" || decimal byte length || payload`,
/// the exact bytes personal-sign wallets hash.
pub(crate) fn prefixed_message(payload: &[u8]) -> Vec<u8> {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", payload.len());
    let mut message = Vec::with_capacity(prefix.len() + payload.len());
    message.extend_from_slice(prefix.as_bytes());
    message.extend_from_slice(payload);
    message
}

pub(crate) fn decode_hex(input: &str) -> Result<Vec<u8>> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|_| error!(ChainAuthError::InvalidHexEncoding))
}
