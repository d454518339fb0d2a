//! Report upload progress for a dataset

use anchor_lang::prelude::*;

use crate::state::{ChunkStorage, DataMetadata};

#[derive(Accounts)]
pub struct GetDataMetadata<'info> {
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

/// Callers must see `chunks_stored == total_chunks` here before
/// attempting reassembly.
pub fn get_data_metadata(ctx: Context<GetDataMetadata>) -> Result<DataMetadata> {
    let storage = &ctx.accounts.storage;

    Ok(DataMetadata {
        dataset_id: storage.dataset_id,
        total_chunks: storage.total_chunks,
        chunks_stored: storage.chunks_stored,
        dataset_hash: storage.dataset_hash,
    })
}
