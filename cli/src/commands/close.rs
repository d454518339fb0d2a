//! Reclaim a dataset's storage account

use anyhow::Result;
use colored::Colorize;

use crate::config::{load_solana_keypair, parse_dataset_id, VerifierConfig};
use crate::orchestrator::VerificationClient;

pub async fn run(rpc_url: &str, keypair_path: Option<&str>, dataset_id: &str) -> Result<()> {
    let dataset_id = parse_dataset_id(dataset_id)?;

    println!("{}", "Closing chunk storage...".cyan());
    println!(
        "{}",
        "Any chunks not yet retrieved are lost once the account closes.".dimmed()
    );

    let payer = load_solana_keypair(keypair_path)?;
    let client = VerificationClient::new(rpc_url, VerifierConfig::default(), payer);

    client.close_storage(&dataset_id)?;

    println!();
    println!("{}", "Storage closed, rent reclaimed".green().bold());

    Ok(())
}
