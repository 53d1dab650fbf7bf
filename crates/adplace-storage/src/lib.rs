//! Storage seams for adplace
//!
//! The engine never owns persistence. This crate provides:
//! - The `AdStore` and `SessionStore` traits the host implements
//! - In-memory reference stores (tests, simulation)
//! - A file-backed session store with per-visitor expiry

pub mod ads;
pub mod error;
pub mod session;

pub use ads::{AdStore, MemoryAdStore};
pub use error::{Result, StorageError};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, visitor_key};
