//! Allocate chunk storage for a dataset and write chunk 0

use anchor_lang::prelude::*;

use crate::error::{ChainAuthError, MAX_CHUNK_SIZE};
use crate::state::{ChunkData, ChunkStorage};

#[derive(Accounts)]
#[instruction(dataset_id: [u8; 32], total_chunks: u32)]
pub struct InitStorage<'info> {
    #[account(
        init,
        payer = owner,
        space = ChunkStorage::space(total_chunks),
        seeds = [
            ChunkStorage::SEED,
            owner.key().as_ref(),
            &dataset_id,
        ],
        bump
    )]
    pub storage: Account<'info, ChunkStorage>,

    #[account(mut)]
    pub owner: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn init_storage(
    ctx: Context<InitStorage>,
    dataset_id: [u8; 32],
    total_chunks: u32,
    dataset_hash: [u8; 32],
    chunk: Vec<u8>,
) -> Result<()> {
    require!(total_chunks > 0, ChainAuthError::EmptyDataset);
    require!(chunk.len() <= MAX_CHUNK_SIZE, ChainAuthError::ChunkTooLarge);

    let storage = &mut ctx.accounts.storage;
    storage.dataset_id = dataset_id;
    storage.total_chunks = total_chunks;
    storage.chunks_stored = 0;
    storage.dataset_hash = dataset_hash;
    storage.bump = ctx.bumps.storage;
    storage.chunks = vec![ChunkData::default(); total_chunks as usize];
    storage.write_chunk(0, chunk);

    msg!(
        "initialized storage for dataset {} with {} chunk slots",
        hex::encode(dataset_id),
        total_chunks
    );
    Ok(())
}
