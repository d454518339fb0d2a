//! Cross-chain signature verification for Solana
//!
//! Proves that an Ethereum-style (secp256k1) or WebAuthn-style
//! (secp256r1/P-256) signature was produced by a specific external key,
//! without doing any curve math on-chain: the caller places the platform's
//! native signature-verification instruction in the same transaction, and
//! this program introspects it through the instructions sysvar to confirm
//! it commits to exactly the expected key, signature and canonical message.
//!
//! Payloads larger than one transaction travel through the chunked storage
//! protocol: a PDA per `(owner, dataset_id)` accumulates bounded chunks
//! tagged with a dataset-wide SHA-256 hash, retrieved and reassembled by
//! the client.

use anchor_lang::prelude::*;

pub mod error;
pub mod instructions;
pub mod precompile;
pub mod state;

#[cfg(test)]
mod tests;

use instructions::*;
use state::DataMetadata;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod chainauth {
    use super::*;

    /// Verifies an Ethereum personal-sign signature against a 20-byte
    /// address. Requires a matching Keccak-secp256k1 instruction earlier
    /// in the transaction; returns the verdict as a boolean rather than
    /// erroring on a well-formed but non-matching payload.
    pub fn verify_ethereum_signature(
        ctx: Context<VerifyEthereumSignature>,
        eth_data: EthereumValidationData,
        eth_address: String,
    ) -> Result<bool> {
        instructions::verify_ethereum::verify_ethereum_signature(ctx, eth_data, eth_address)
    }

    /// Verifies a WebAuthn assertion signature against a compressed P-256
    /// public key. Requires a matching Secp256r1SigVerify instruction
    /// earlier in the transaction.
    pub fn verify_webauthn_signature(
        ctx: Context<VerifyWebauthnSignature>,
        webauthn_data: WebauthnValidationData,
        compressed_public_key: String,
    ) -> Result<bool> {
        instructions::verify_webauthn::verify_webauthn_signature(
            ctx,
            webauthn_data,
            compressed_public_key,
        )
    }

    /// Allocates the chunk storage account for a dataset and writes
    /// chunk 0.
    pub fn init_storage(
        ctx: Context<InitStorage>,
        dataset_id: [u8; 32],
        total_chunks: u32,
        dataset_hash: [u8; 32],
        chunk: Vec<u8>,
    ) -> Result<()> {
        instructions::init_storage::init_storage(ctx, dataset_id, total_chunks, dataset_hash, chunk)
    }

    /// Writes one chunk into an already-allocated dataset. The metadata
    /// arguments must match what was recorded at init.
    pub fn store_chunk(
        ctx: Context<StoreChunk>,
        dataset_id: [u8; 32],
        chunk_index: u32,
        total_chunks: u32,
        dataset_hash: [u8; 32],
        chunk: Vec<u8>,
    ) -> Result<()> {
        instructions::store_chunk::store_chunk(
            ctx,
            dataset_id,
            chunk_index,
            total_chunks,
            dataset_hash,
            chunk,
        )
    }

    /// Returns the exact bytes stored at `chunk_index`.
    pub fn retrieve_chunk(ctx: Context<RetrieveChunk>, chunk_index: u32) -> Result<Vec<u8>> {
        instructions::retrieve_chunk::retrieve_chunk(ctx, chunk_index)
    }

    /// Returns the dataset's recorded metadata and upload progress.
    pub fn get_data_metadata(ctx: Context<GetDataMetadata>) -> Result<DataMetadata> {
        instructions::get_data_metadata::get_data_metadata(ctx)
    }

    /// Reclaims the storage account. The protocol does not track read
    /// completion; callers must finish retrieving before closing.
    pub fn close_storage(ctx: Context<CloseStorage>) -> Result<()> {
        instructions::close_storage::close_storage(ctx)
    }
}
