//! Qarar Analyzer - Query log analysis and optimization suggestions
//!
//! This crate provides functionality for:
//! - Normalizing SQL into grouping patterns
//! - Flagging per-query issues (full scans, `SELECT *`, leading wildcards)
//! - Aggregate analysis of a query log: slow queries, duplicates, N+1
//!   patterns, missing indexes and expensive operations
//! - Scoped analysis sessions and profilers over a query log source
//! - Model and app scoped analysis with index suggestions

pub mod analyzer;
pub mod catalog;
pub mod error;
pub mod issues;
pub mod normalize;
pub mod optimizer;
pub mod report;
pub mod session;
pub mod settings;

pub use analyzer::*;
pub use catalog::*;
pub use error::*;
pub use issues::*;
pub use normalize::*;
pub use optimizer::*;
pub use report::*;
pub use session::*;
pub use settings::*;
