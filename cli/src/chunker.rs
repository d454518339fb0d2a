//! Client half of the chunked storage protocol
//!
//! Splits a payload into chunks small enough for one transaction each and
//! records the SHA-256 digest of the whole payload. Reassembly is the
//! reader's responsibility: concatenate in index order, hash, and compare
//! against the digest recorded at init - a mismatch means the data must
//! be discarded.

use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Must match the on-chain bound. Driven by the transaction size ceiling
/// minus instruction and account-metadata overhead.
pub const MAX_CHUNK_SIZE: usize = 900;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("cannot split an empty payload")]
    EmptyPayload,

    #[error("chunk {index} is {actual} bytes, limit is {MAX_CHUNK_SIZE}")]
    ChunkTooLarge { index: u32, actual: usize },

    #[error("reassembled digest does not match the recorded dataset hash")]
    DataIntegrityFailure,
}

/// A payload prepared for upload
#[derive(Debug, Clone)]
pub struct ChunkedPayload {
    pub dataset_id: [u8; 32],
    pub dataset_hash: [u8; 32],
    pub chunks: Vec<Vec<u8>>,
}

impl ChunkedPayload {
    /// Splits with a random dataset id.
    pub fn split(data: &[u8]) -> Result<Self, ChunkError> {
        let mut dataset_id = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut dataset_id);
        Self::split_with_id(data, dataset_id)
    }

    pub fn split_with_id(data: &[u8], dataset_id: [u8; 32]) -> Result<Self, ChunkError> {
        if data.is_empty() {
            return Err(ChunkError::EmptyPayload);
        }
        let chunks = data
            .chunks(MAX_CHUNK_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(Self {
            dataset_id,
            dataset_hash: Sha256::digest(data).into(),
            chunks,
        })
    }

    pub fn total_chunks(&self) -> u32 {
        self.chunks.len() as u32
    }
}

/// Concatenates retrieved chunks (already in index order) and verifies
/// the digest. On mismatch the reassembled bytes are dropped, not
/// returned.
pub fn reassemble(chunks: &[Vec<u8>], expected_hash: &[u8; 32]) -> Result<Vec<u8>, ChunkError> {
    for (index, chunk) in chunks.iter().enumerate() {
        if chunk.len() > MAX_CHUNK_SIZE {
            return Err(ChunkError::ChunkTooLarge {
                index: index as u32,
                actual: chunk.len(),
            });
        }
    }

    let mut data = Vec::with_capacity(chunks.iter().map(Vec::len).sum());
    for chunk in chunks {
        data.extend_from_slice(chunk);
    }

    let digest: [u8; 32] = Sha256::digest(&data).into();
    if digest != *expected_hash {
        return Err(ChunkError::DataIntegrityFailure);
    }
    Ok(data)
}
