//! Retrieve, hash-verify and write back a stored dataset

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{load_solana_keypair, parse_dataset_id, VerifierConfig};
use crate::orchestrator::VerificationClient;

pub async fn run(
    rpc_url: &str,
    keypair_path: Option<&str>,
    dataset_id: &str,
    output: &str,
) -> Result<()> {
    let dataset_id = parse_dataset_id(dataset_id)?;

    println!("{}", "Downloading dataset...".cyan());

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    // download() refuses incomplete datasets and discards data whose
    // reassembled hash does not match the one recorded at init
    let data = client.download(&dataset_id)?;

    std::fs::write(output, &data).with_context(|| format!("Failed to write {output}"))?;

    println!();
    println!("{}", "Download complete".green().bold());
    println!("Wrote {} bytes to {}", data.len(), output);
    println!();
    println!(
        "{}",
        "Integrity verified. Run 'chainauth close' to reclaim the storage rent.".dimmed()
    );

    Ok(())
}
