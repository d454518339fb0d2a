//! Split a file into chunks and upload it

use anyhow::{Context, Result};
use colored::Colorize;

use crate::chunker::{ChunkedPayload, MAX_CHUNK_SIZE};
use crate::config::{load_solana_keypair, parse_dataset_id, VerifierConfig};
use crate::orchestrator::VerificationClient;

pub async fn run(
    rpc_url: &str,
    keypair_path: Option<&str>,
    file: &str,
    dataset_id: Option<&str>,
) -> Result<()> {
    let data = std::fs::read(file).with_context(|| format!("Failed to read {file}"))?;

    let payload = match dataset_id {
        Some(id) => ChunkedPayload::split_with_id(&data, parse_dataset_id(id)?)?,
        None => ChunkedPayload::split(&data)?,
    };

    println!(
        "{}",
        format!(
            "Uploading {} bytes as {} chunk(s) of <= {} bytes...",
            data.len(),
            payload.total_chunks(),
            MAX_CHUNK_SIZE
        )
        .cyan()
    );
    println!("Dataset id:   {}", hex::encode(payload.dataset_id));
    println!("Dataset hash: {}", hex::encode(payload.dataset_hash));

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    client.upload(&payload)?;

    let metadata = client.get_data_metadata(&payload.dataset_id)?;
    println!();
    println!("{}", "Upload complete".green().bold());
    println!(
        "Stored {}/{} chunks at {}",
        metadata.chunks_stored,
        metadata.total_chunks,
        client.storage_address(&payload.dataset_id)
    );

    Ok(())
}
