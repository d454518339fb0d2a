pub mod chunk_storage;

pub use chunk_storage::*;
