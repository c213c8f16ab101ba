//! Persistence for completed device analyses.

pub mod sqlite_store;
pub mod store;

pub use sqlite_store::SqliteDeviceStore;
pub use store::InMemoryDeviceStore;
