//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the WalletApi port
//! - JSON file (locked, atomically replaced) for the SessionStorage port
//! - In-memory map for the SessionStorage port
//! - Mock wallet backend server for testing

pub mod file_storage;
pub mod http;
pub mod memory_storage;

#[cfg(test)]
pub mod mock_backend;

pub use file_storage::FileSessionStorage;
pub use http::{Endpoint, HttpWalletApi, DEFAULT_API_BASE_URL};
pub use memory_storage::MemorySessionStorage;
