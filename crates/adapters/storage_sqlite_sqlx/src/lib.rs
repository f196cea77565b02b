//! # livefeed-adapter-storage-sqlite-sqlx
//!
//! Document log store persisted in `SQLite` using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the [`LogStore`](livefeed_app::ports::LogStore) port as a
//!   collection of documents, one row per record
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `livefeed-app` (for port traits) and `livefeed-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod document_store;
pub mod error;
pub mod pool;

pub use document_store::DocumentLogStore;
pub use error::StorageError;
pub use pool::{Config, Database};
