//! Persistence layer.
//!
//! - [`KvStore`]: key-value store with consistent multi-key reads and atomic
//!   batch writes, implemented over SQLite by [`SqliteStore`]
//! - [`AssetSource`]: fetches the raw ZIP code CSV from disk or over HTTP

mod asset;
mod kv;
mod migrations;
mod pool;
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used items
pub use asset::AssetSource;
pub(crate) use kv::decode_json;
pub use kv::{get_json, list_all_keys, KeyInfo, KeyPage, KvEntry, KvStore, SqliteStore};
pub use migrations::run_migrations;
pub use pool::{init_db_pool_in_memory, init_db_pool_with_path};
