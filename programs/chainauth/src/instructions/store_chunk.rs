//! Write one chunk into an allocated dataset

use anchor_lang::prelude::*;

use crate::error::{ChainAuthError, MAX_CHUNK_SIZE};
use crate::state::ChunkStorage;

#[derive(Accounts)]
#[instruction(dataset_id: [u8; 32])]
pub struct StoreChunk<'info> {
    #[account(
        mut,
        seeds = [
            ChunkStorage::SEED,
            owner.key().as_ref(),
            &dataset_id,
        ],
        bump = storage.bump,
    )]
    pub storage: Account<'info, ChunkStorage>,

    pub owner: Signer<'info>,
}

/// Chunks for one dataset may arrive in any order; each write lands in a
/// disjoint slot. The metadata arguments are repeated on every call and
/// must agree with what init recorded - a mismatch leaves the dataset
/// unchanged.
pub fn store_chunk(
    ctx: Context<StoreChunk>,
    dataset_id: [u8; 32],
    chunk_index: u32,
    total_chunks: u32,
    dataset_hash: [u8; 32],
    chunk: Vec<u8>,
) -> Result<()> {
    let storage = &mut ctx.accounts.storage;

    require!(
        storage.metadata_matches(&dataset_id, total_chunks, &dataset_hash),
        ChainAuthError::InconsistentDatasetMetadata
    );
    require!(
        chunk_index < storage.total_chunks,
        ChainAuthError::InvalidChunkIndex
    );
    require!(chunk.len() <= MAX_CHUNK_SIZE, ChainAuthError::ChunkTooLarge);

    let chunk_len = chunk.len();
    storage.write_chunk(chunk_index, chunk);

    msg!(
        "stored chunk {}/{} ({} bytes)",
        chunk_index + 1,
        storage.total_chunks,
        chunk_len
    );
    Ok(())
}
