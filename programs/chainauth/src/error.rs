use anchor_lang::prelude::*;

/// Largest chunk payload accepted by the storage protocol. Bounded by the
/// transaction size ceiling minus instruction and account-metadata
/// overhead; must match the client-side splitter.
pub const MAX_CHUNK_SIZE: usize = 900;

#[error_code]
pub enum ChainAuthError {
    // ==========================================
    // SIGNATURE VERIFICATION ERRORS
    // ==========================================

    #[msg("Invalid hex encoding in signature, public key or address")]
    InvalidHexEncoding,

    #[msg("Invalid signature length for this scheme")]
    InvalidSignatureLength,

    #[msg("Invalid recovery ID - expected v in {27,28} or {0,1}")]
    InvalidRecoveryId,

    #[msg("Invalid public key length - expected 33 bytes")]
    InvalidPublicKeyLength,

    #[msg("Invalid Ethereum address length - expected 20 bytes")]
    InvalidAddressLength,

    #[msg("Missing secp256k1 verification instruction")]
    MissingSecp256k1Instruction,

    #[msg("Missing secp256r1 verification instruction")]
    MissingSecp256r1Instruction,

    #[msg("Malformed verification instruction data")]
    MalformedVerificationInstruction,

    // ==========================================
    // CHUNKED STORAGE ERRORS
    // ==========================================

    #[msg("Chunk index out of range for this dataset")]
    InvalidChunkIndex,

    #[msg("Chunk not stored")]
    ChunkNotStored,

    #[msg("Chunk data exceeds the maximum chunk size")]
    ChunkTooLarge,

    #[msg("Dataset must contain at least one chunk")]
    EmptyDataset,

    #[msg("Chunk metadata disagrees with the dataset recorded at init")]
    InconsistentDatasetMetadata,
}
