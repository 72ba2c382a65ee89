pub mod error;
pub mod keys;
pub mod kv;
pub mod redb_store;

pub use error::{Result, StoreError};
pub use kv::{read_json, write_json, KeyValueStore, MemoryStore};
pub use redb_store::RedbStore;
