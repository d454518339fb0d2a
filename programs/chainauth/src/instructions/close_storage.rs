//! Reclaim a dataset's storage account

use anchor_lang::prelude::*;

use crate::state::ChunkStorage;

#[derive(Accounts)]
pub struct CloseStorage<'info> {
    #[account(
        mut,
        seeds = [
            ChunkStorage::SEED,
            owner.key().as_ref(),
            &storage.dataset_id,
        ],
        bump = storage.bump,
        close = owner
    )]
    pub storage: Account<'info, ChunkStorage>,

    #[account(mut)]
    pub owner: Signer<'info>,
}

/// The protocol does not track which chunks have been read. Closing
/// before every needed retrieve has completed loses the data with no
/// protocol-level detection - finishing reads first is the caller's
/// responsibility.
pub fn close_storage(ctx: Context<CloseStorage>) -> Result<()> {
    msg!(
        "closed storage for dataset {} ({} chunks freed)",
        hex::encode(ctx.accounts.storage.dataset_id),
        ctx.accounts.storage.chunks_stored
    );
    Ok(())
}
