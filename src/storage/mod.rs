//! State store for monitor configuration, storage records and notifications
//!
//! ## Design
//!
//! - **Trait-based**: `StateStore` lets the monitor run against any backend
//! - **Async**: All operations are async for compatibility with Tokio tasks
//! - **Identity-keyed**: storages upsert by (name, mount path), notifications
//!   get sequential ids from the store
//!
//! ## Backends
//!
//! - **In-Memory**: No persistence, used for tests and `{"backend": "none"}`
//! - **SQLite** (default): Embedded database behind the `storage-sqlite` feature
//!
//! ## Usage
//!
//! ```no_run
//! use storage_monitoring::storage::{StateStore, sqlite::SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = SqliteStore::new("./monitor.db").await?;
//!     let storages = store.list_storages().await?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod error;
pub mod memory;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

pub use backend::{HealthStatus, StateStore};
pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
