//! Storage layer for notewatch
//!
//! Persists which items have already been seen, per monitored subject.
//! `SQLite` is the durable backend; `MemoryStore` backs tests.

mod error;
mod memory;
mod migrations;
mod sqlite_async;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use memory::MemoryStore;
pub use storage::Storage;
pub use traits::SeenStore;
