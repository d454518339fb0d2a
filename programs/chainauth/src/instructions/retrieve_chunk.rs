//! Read back one stored chunk

use anchor_lang::prelude::*;

use crate::error::ChainAuthError;
use crate::state::ChunkStorage;

#[derive(Accounts)]
pub struct RetrieveChunk<'info> {
    #[account(
        seeds = [
            ChunkStorage::SEED,
            owner.key().as_ref(),
            &storage.dataset_id,
        ],
        bump = storage.bump,
    )]
    pub storage: Account<'info, ChunkStorage>,

    pub owner: Signer<'info>,
}

/// Returns the exact bytes stored at `chunk_index` through the return
/// data channel. An out-of-range or never-stored index is a hard error,
/// not an empty result.
pub fn retrieve_chunk(ctx: Context<RetrieveChunk>, chunk_index: u32) -> Result<Vec<u8>> {
    let storage = &ctx.accounts.storage;

    require!(
        chunk_index < storage.total_chunks,
        ChainAuthError::InvalidChunkIndex
    );
    let slot = &storage.chunks[chunk_index as usize];
    require!(slot.is_stored, ChainAuthError::ChunkNotStored);

    Ok(slot.data.clone())
}
