//! Verify a WebAuthn assertion signature on-chain

use anyhow::Result;
use colored::Colorize;

use crate::config::{load_solana_keypair, VerifierConfig};
use crate::orchestrator::{
    RejectReason, VerificationClient, VerifyError, VerifyOptions, VerifyOutcome,
    WebauthnVerifyRequest,
};

pub struct VerifyWebauthnOptions {
    pub signature: String,
    pub authenticator_data: String,
    pub client_data: String,
    pub key: String,
    pub skip_verification_instruction: bool,
}

pub async fn run(
    rpc_url: &str,
    keypair_path: Option<&str>,
    options: VerifyWebauthnOptions,
) -> Result<()> {
    println!("{}", "Verifying WebAuthn signature...".cyan());

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    let request = WebauthnVerifyRequest {
        signature: options.signature,
        authenticator_data: options.authenticator_data,
        client_data: options.client_data,
        compressed_public_key: options.key,
    };
    let verify_options = VerifyOptions {
        include_verification_instruction: !options.skip_verification_instruction,
    };

    match client.verify_webauthn(&request, &verify_options) {
        Ok(VerifyOutcome::Accepted) => {
            println!();
            println!("{}", "Signature accepted".green().bold());
        }
        Ok(VerifyOutcome::Rejected(reason)) => {
            println!();
            println!("{}", "Signature rejected".red().bold());
            match reason {
                RejectReason::InvalidSignature => {
                    println!("The precompile refused the signature itself.");
                }
                RejectReason::PayloadMismatch => {
                    println!("The verification instruction did not match this request.");
                }
            }
        }
        Err(VerifyError::MissingVerificationInstruction) => {
            println!();
            println!("{}", "Caller wiring error".yellow().bold());
            println!("The transaction omitted the secp256r1 verification instruction.");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
