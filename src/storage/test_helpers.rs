//! Shared test helpers for storage-backed tests.

use crate::storage::{init_db_pool_in_memory, run_migrations, SqliteStore};

/// Creates an in-memory store with migrations applied.
pub(crate) async fn create_test_store() -> SqliteStore {
    let pool = init_db_pool_in_memory()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    SqliteStore::new(pool)
}
