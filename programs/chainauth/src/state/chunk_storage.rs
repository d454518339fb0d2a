use anchor_lang::prelude::*;

use crate::error::MAX_CHUNK_SIZE;

/// Chunked storage for one dataset
///
/// A dataset is a byte payload too large for a single transaction, split
/// client-side into chunks of at most [`MAX_CHUNK_SIZE`] bytes. Each
/// `(owner, dataset_id)` pair owns a disjoint PDA, so concurrent uploads
/// of different datasets never race.
///
/// The `dataset_hash` is the SHA-256 digest of the full payload, recorded
/// at init and checked again by the client after reassembly. The account
/// itself never hashes anything; integrity is the reader's final check.
#[account]
#[derive(Default)]
pub struct ChunkStorage {
    /// Unique identifier for this dataset
    pub dataset_id: [u8; 32],

    /// Total number of chunks in this dataset, fixed at init
    pub total_chunks: u32,

    /// Number of distinct chunk indices stored so far
    pub chunks_stored: u32,

    /// SHA-256 of the full reassembled payload
    pub dataset_hash: [u8; 32],

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Chunk slots, indexed 0..total_chunks
    pub chunks: Vec<ChunkData>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Default)]
pub struct ChunkData {
    /// Index of this chunk (0-based)
    pub index: u32,

    /// Whether this slot has been written
    pub is_stored: bool,

    /// Chunk payload
    pub data: Vec<u8>,
}

impl ChunkStorage {
    pub const SEED: &'static [u8] = b"chunk_storage";

    /// Account discriminator (8) + dataset_id (32) + total_chunks (4)
    /// + chunks_stored (4) + dataset_hash (32) + bump (1) + vec length (4)
    /// + per chunk: index (4) + is_stored (1) + data vec length (4)
    /// + MAX_CHUNK_SIZE
    pub fn space(total_chunks: u32) -> usize {
        8 + 32 + 4 + 4 + 32 + 1 + 4 + total_chunks as usize * (4 + 1 + 4 + MAX_CHUNK_SIZE)
    }

    /// Checks a store call against the metadata recorded at init. A
    /// mismatch on any field means the caller is mixing datasets and the
    /// write must be rejected with the account left unchanged.
    pub fn metadata_matches(
        &self,
        dataset_id: &[u8; 32],
        total_chunks: u32,
        dataset_hash: &[u8; 32],
    ) -> bool {
        self.dataset_id == *dataset_id
            && self.total_chunks == total_chunks
            && self.dataset_hash == *dataset_hash
    }

    /// Writes `data` into the slot at `index`. Re-storing an index
    /// overwrites the slot without counting it twice, so `chunks_stored`
    /// is always the number of distinct indices present.
    ///
    /// The caller must have bounds-checked `index` already.
    pub fn write_chunk(&mut self, index: u32, data: Vec<u8>) {
        let slot = &mut self.chunks[index as usize];
        if !slot.is_stored {
            self.chunks_stored = self.chunks_stored.saturating_add(1);
        }
        *slot = ChunkData {
            index,
            is_stored: true,
            data,
        };
    }

    pub fn is_complete(&self) -> bool {
        self.chunks_stored == self.total_chunks
    }
}

/// Upload progress snapshot returned to the client
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct DataMetadata {
    pub dataset_id: [u8; 32],
    pub total_chunks: u32,
    pub chunks_stored: u32,
    pub dataset_hash: [u8; 32],
}
