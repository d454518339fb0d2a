pub mod close_storage;
pub mod get_data_metadata;
pub mod init_storage;
pub mod retrieve_chunk;
pub mod store_chunk;
pub mod verify_ethereum;
pub mod verify_webauthn;

pub use close_storage::*;
pub use get_data_metadata::*;
pub use init_storage::*;
pub use retrieve_chunk::*;
pub use store_chunk::*;
pub use verify_ethereum::*;
pub use verify_webauthn::*;
