//! Verify an Ethereum personal-sign signature on-chain

use anyhow::{bail, Result};
use colored::Colorize;

use crate::config::{load_solana_keypair, VerifierConfig};
use crate::orchestrator::{
    EthereumVerifyRequest, RejectReason, VerificationClient, VerifyError, VerifyOptions,
    VerifyOutcome,
};
use crate::signature::VEncoding;

pub struct VerifyEthOptions {
    pub message: String,
    pub signature: String,
    pub key: String,
    pub v_encoding: String,
    pub skip_verification_instruction: bool,
}

pub async fn run(rpc_url: &str, keypair_path: Option<&str>, options: VerifyEthOptions) -> Result<()> {
    let v_encoding = match options.v_encoding.as_str() {
        "legacy" => VEncoding::EthereumLegacy,
        "raw" => VEncoding::RawRecovery,
        other => bail!("unknown v-encoding '{other}' (expected 'legacy' or 'raw')"),
    };

    println!("{}", "Verifying Ethereum signature...".cyan());

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    let request = EthereumVerifyRequest {
        signature: options.signature,
        message: options.message,
        public_key_or_address: options.key,
        v_encoding,
    };
    let verify_options = VerifyOptions {
        include_verification_instruction: !options.skip_verification_instruction,
    };

    match client.verify_ethereum(&request, &verify_options) {
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
            println!("The transaction omitted the secp256k1 verification instruction.");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(())
}
