//! WebAuthn Signature Verification
//!
//! The canonical message for a WebAuthn assertion is
//! `authenticatorData || SHA256(clientDataJSON)`. Only the client-data
//! hash is computed here; the concatenation is NOT hashed again at this
//! stage, because the Secp256r1SigVerify precompile hashes the full
//! message itself before curve verification. The clientDataJSON is used
//! byte for byte as received - re-serializing it, even changing
//! whitespace, would change the hash and fail verification.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar::instructions::ID as INSTRUCTIONS_SYSVAR_ID;
use sha2::{Digest, Sha256};

use crate::error::ChainAuthError;
use crate::instructions::verify_ethereum::decode_hex;
use crate::precompile::{find_preceding_instruction, secp256r1};

/// Signature material for a WebAuthn-style verification request
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct WebauthnValidationData {
    pub signature: String,
    pub authenticator_data: String,
    pub client_data: String,
}

#[derive(Accounts)]
pub struct VerifyWebauthnSignature<'info> {
    /// CHECK: constrained to the instructions sysvar address
    #[account(address = INSTRUCTIONS_SYSVAR_ID)]
    pub instructions_sysvar: AccountInfo<'info>,
}

pub fn verify_webauthn_signature(
    ctx: Context<VerifyWebauthnSignature>,
    webauthn_data: WebauthnValidationData,
    compressed_public_key: String,
) -> Result<bool> {
    let signature_bytes = decode_hex(&webauthn_data.signature)?;
    let signature: [u8; 64] = signature_bytes
        .try_into()
        .map_err(|_| error!(ChainAuthError::InvalidSignatureLength))?;

    let pubkey_bytes = decode_hex(&compressed_public_key)?;
    let compressed_pubkey: [u8; 33] = pubkey_bytes
        .try_into()
        .map_err(|_| error!(ChainAuthError::InvalidPublicKeyLength))?;

    let authenticator_data = decode_hex(&webauthn_data.authenticator_data)?;
    let client_data_hash = Sha256::digest(webauthn_data.client_data.as_bytes());

    let mut message = Vec::with_capacity(authenticator_data.len() + 32);
    message.extend_from_slice(&authenticator_data);
    message.extend_from_slice(&client_data_hash);

    let (index, instruction) = find_preceding_instruction(
        &ctx.accounts.instructions_sysvar,
        &secp256r1::SECP256R1_PROGRAM_ID,
    )?
    .ok_or_else(|| error!(ChainAuthError::MissingSecp256r1Instruction))?;

    let accepted = secp256r1::matches_expected(
        &instruction.data,
        index,
        &compressed_pubkey,
        &signature,
        &message,
    )?;

    if accepted {
        msg!("webauthn signature accepted");
    } else {
        msg!("webauthn signature rejected");
    }
    Ok(accepted)
}
