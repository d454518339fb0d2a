//! chainauth CLI - cross-chain signature verification on Solana

#![allow(dead_code)] // Public API items may not be used internally

use anyhow::Result;
use clap::{Parser, Subcommand};

mod chunker;
mod commands;
mod config;
mod derive;
mod message;
mod orchestrator;
mod precompile;
mod signature;


#[cfg(test)]
mod test_vectors;


use commands::*;

#[derive(Parser)]
#[command(name = "chainauth")]
#[command(version = "0.1.0")]
#[command(about = "Verify Ethereum and WebAuthn signatures through Solana's native precompiles")]
#[command(long_about = r#"
chainauth proves that an Ethereum (secp256k1) or WebAuthn (P-256)
signature was produced by a specific external key, using Solana's native
signature-verification precompiles. Payloads too large for one
transaction travel through hash-verified chunked storage.

Quick Start:
  1. chainauth verify-eth --message '...' --signature 0x... --key 0x...
  2. chainauth upload --file payload.bin
  3. chainauth download --dataset-id <hex> --output payload.bin
  4. chainauth close --dataset-id <hex>
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Solana RPC URL
    #[arg(long, global = true, default_value = "https://api.devnet.solana.com")]
    rpc_url: String,

    /// Path to fee-payer keypair file
    #[arg(long, global = true)]
    keypair: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify an Ethereum personal-sign signature
    VerifyEth {
        /// Raw message payload (without the personal-sign prefix)
        #[arg(short, long)]
        message: String,

        /// 65-byte signature as hex (0x + 130 chars)
        #[arg(short, long)]
        signature: String,

        /// Signer: 20-byte address or 33-byte compressed key, hex
        #[arg(short, long)]
        key: String,

        /// Trailing-byte convention: "legacy" (v in 27/28) or "raw" (0/1)
        #[arg(long, default_value = "legacy")]
        v_encoding: String,

        /// Omit the precompile instruction (negative-path testing)
        #[arg(long)]
        skip_verification_instruction: bool,
    },

    /// Verify a WebAuthn assertion signature
    VerifyWebauthn {
        /// 64-byte signature as hex (0x + 128 chars)
        #[arg(short, long)]
        signature: String,

        /// Authenticator data as hex
        #[arg(short, long)]
        authenticator_data: String,

        /// Raw clientDataJSON, exactly as the authenticator returned it
        #[arg(short, long)]
        client_data: String,

        /// 33-byte compressed P-256 public key, hex
        #[arg(short, long)]
        key: String,

        /// Omit the precompile instruction (negative-path testing)
        #[arg(long)]
        skip_verification_instruction: bool,
    },

    /// Split a file into chunks and upload it to chunk storage
    Upload {
        /// File to upload
        #[arg(short, long)]
        file: String,

        /// 32-byte dataset id as hex (random if omitted)
        #[arg(short, long)]
        dataset_id: Option<String>,
    },

    /// Retrieve, hash-verify and write back a stored dataset
    Download {
        /// 32-byte dataset id as hex
        #[arg(short, long)]
        dataset_id: String,

        /// Output file path
        #[arg(short, long)]
        output: String,
    },

    /// Show upload progress for a dataset
    Status {
        /// 32-byte dataset id as hex
        #[arg(short, long)]
        dataset_id: String,
    },

    /// Reclaim a dataset's storage account (finish all reads first)
    Close {
        /// 32-byte dataset id as hex
        #[arg(short, long)]
        dataset_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::VerifyEth {
            message,
            signature,
            key,
            v_encoding,
            skip_verification_instruction,
        } => {
            verify_eth::run(
                &cli.rpc_url,
                cli.keypair.as_deref(),
                verify_eth::VerifyEthOptions {
                    message,
                    signature,
                    key,
                    v_encoding,
                    skip_verification_instruction,
                },
            )
            .await?;
        }
        Commands::VerifyWebauthn {
            signature,
            authenticator_data,
            client_data,
            key,
            skip_verification_instruction,
        } => {
            verify_webauthn::run(
                &cli.rpc_url,
                cli.keypair.as_deref(),
                verify_webauthn::VerifyWebauthnOptions {
                    signature,
                    authenticator_data,
                    client_data,
                    key,
                    skip_verification_instruction,
                },
            )
            .await?;
        }
        Commands::Upload { file, dataset_id } => {
            upload::run(
                &cli.rpc_url,
                cli.keypair.as_deref(),
                &file,
                dataset_id.as_deref(),
            )
            .await?;
        }
        Commands::Download { dataset_id, output } => {
            download::run(&cli.rpc_url, cli.keypair.as_deref(), &dataset_id, &output).await?;
        }
        Commands::Status { dataset_id } => {
            status::run(&cli.rpc_url, cli.keypair.as_deref(), &dataset_id).await?;
        }
        Commands::Close { dataset_id } => {
            close::run(&cli.rpc_url, cli.keypair.as_deref(), &dataset_id).await?;
        }
    }

    Ok(())
}
