//! SQLite backend for the TCEQ water-system store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on the connection's
//! dedicated thread without blocking the async runtime. That thread also
//! serialises every write, so concurrent callers see last-call-wins ordering.

mod encode;
mod queries;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
