//! Core types and trait definitions for the TCEQ water-system store.
//!
//! This crate is free of database dependencies. The SQLite backend and the
//! ingest binary both depend on it.

// Native `async fn` in traits; silence the advisory lint about `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod record;
pub mod relationship;
pub mod store;
pub mod water_system;

pub use error::{Error, Result};
