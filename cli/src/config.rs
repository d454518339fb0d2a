//! Platform configuration for the verifier client
//!
//! Program ids and the compute budget are injected at client construction
//! instead of being read from hard-coded module globals, so tests can
//! point the client at a mock verifier or a local deployment.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;

/// Deployed chainauth program
pub const DEFAULT_PROGRAM_ID: &str = "Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS";

/// Native precompile programs
pub const SECP256K1_PROGRAM_ID: &str = "KeccakSecp256k11111111111111111111111111111";
pub const SECP256R1_PROGRAM_ID: &str = "Secp256r1SigVerify1111111111111111111111111";

/// Curve verification plus the surrounding instructions exceeds the
/// default per-transaction budget, which truncates mid-verification with
/// a generic failure. Request the platform maximum explicitly.
pub const VERIFICATION_COMPUTE_UNITS: u32 = 1_400_000;

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub program_id: Pubkey,
    pub secp256k1_program_id: Pubkey,
    pub secp256r1_program_id: Pubkey,
    pub compute_unit_limit: u32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            program_id: Pubkey::from_str(DEFAULT_PROGRAM_ID).unwrap(),
            secp256k1_program_id: Pubkey::from_str(SECP256K1_PROGRAM_ID).unwrap(),
            secp256r1_program_id: Pubkey::from_str(SECP256R1_PROGRAM_ID).unwrap(),
            compute_unit_limit: VERIFICATION_COMPUTE_UNITS,
        }
    }
}

impl VerifierConfig {
    pub fn with_program_id(program_id: Pubkey) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }
}

/// Loads the fee-payer keypair, defaulting to the standard Solana CLI
/// location.
pub fn load_solana_keypair(path: Option<&str>) -> Result<Keypair> {
    let keypair_path = match path {
        Some(p) => PathBuf::from(p),
        None => dirs::home_dir()
            .context("Could not find home directory")?
            .join(".config")
            .join("solana")
            .join("id.json"),
    };

    if !keypair_path.exists() {
        bail!(
            "Solana keypair not found at {:?}. Generate one with 'solana-keygen new' or specify path with --keypair",
            keypair_path
        );
    }

    let keypair_json = std::fs::read_to_string(&keypair_path)?;
    let bytes: Vec<u8> = serde_json::from_str(&keypair_json)?;
    let keypair = Keypair::from_bytes(&bytes)
        .map_err(|err| anyhow::anyhow!("invalid keypair file: {err}"))?;

    Ok(keypair)
}

/// Parses a 32-byte hex dataset id (optional `0x` prefix).
pub fn parse_dataset_id(input: &str) -> Result<[u8; 32]> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).context("dataset id is not valid hex")?;
    let id: [u8; 32] = bytes
        .try_into()
        .map_err(|_| anyhow::anyhow!("dataset id must be exactly 32 bytes"))?;
    Ok(id)
}
