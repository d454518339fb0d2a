//! Show upload progress for a dataset

use anyhow::Result;
use colored::Colorize;

use crate::config::{load_solana_keypair, parse_dataset_id, VerifierConfig};
use crate::orchestrator::VerificationClient;

pub async fn run(rpc_url: &str, keypair_path: Option<&str>, dataset_id: &str) -> Result<()> {
    let dataset_id = parse_dataset_id(dataset_id)?;

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    let metadata = client.get_data_metadata(&dataset_id)?;

    println!();
    println!("{}", "Dataset Status".yellow().bold());
    println!();
    println!("Dataset id:   {}", hex::encode(metadata.dataset_id));
    println!("Dataset hash: {}", hex::encode(metadata.dataset_hash));
    println!(
        "Chunks:       {}/{} stored",
        metadata.chunks_stored, metadata.total_chunks
    );
    println!("Storage:      {}", client.storage_address(&dataset_id));

    if metadata.is_complete() {
        println!();
        println!("{}", "Complete - ready for download".green());
    }

    Ok(())
}
