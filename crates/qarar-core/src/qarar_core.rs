//! Qarar Core - shared types for query analysis
//!
//! This crate provides:
//! - The `QueryRecord` type produced by query logging
//! - The `QueryLogSource` trait and an in-memory `QueryLog` recorder
//! - The core error type

pub mod error;
pub mod query_log;
pub mod record;

pub use error::*;
pub use query_log::*;
pub use record::*;
