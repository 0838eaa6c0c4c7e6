//! Analysis report types
//!
//! Everything here serializes to the nested JSON structure consumed by the
//! CLI and by anything that stores reports.

use serde::Serialize;

use crate::{AnalyzerResult, QueryIssue};

/// Message carried by the report for an empty query list
pub const NO_QUERIES_MESSAGE: &str = "No queries to analyze";

/// A query slower than the slow-query threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlowQuery {
    /// Position in the analyzed query list
    pub index: usize,
    /// SQL text, truncated to 200 characters
    pub sql: String,
    /// Execution time in seconds
    pub time: f64,
    pub issues: Vec<QueryIssue>,
}

/// A normalized pattern executed more than once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateQuery {
    /// Normalized pattern, truncated to 100 characters
    pub pattern: String,
    pub count: usize,
    pub total_time: f64,
    /// Positions of every member query
    pub queries: Vec<usize>,
}

/// A pattern repeated often enough to look like an N+1 loop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NPlusOnePattern {
    pub pattern: String,
    pub query_count: usize,
    pub total_time: f64,
    pub average_time: f64,
    pub suggestion: String,
}

/// A slow filtered query whose filter columns may lack an index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingIndex {
    pub sql: String,
    pub time: f64,
    pub tables: Vec<String>,
    pub columns: Vec<String>,
    pub suggestion: String,
}

/// A query containing costly operations
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpensiveOperation {
    pub sql: String,
    pub time: f64,
    pub operations: Vec<String>,
}

/// Result of analyzing a list of query records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub query_count: usize,
    /// Sum of execution times in seconds
    pub total_time: f64,
    pub average_time: f64,
    pub slow_queries: Vec<SlowQuery>,
    pub duplicate_queries: Vec<DuplicateQuery>,
    pub n_plus_one_patterns: Vec<NPlusOnePattern>,
    pub missing_indexes: Vec<MissingIndex>,
    pub expensive_operations: Vec<ExpensiveOperation>,
    pub optimization_suggestions: Vec<String>,
    /// Set only when there was nothing to analyze
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

impl AnalysisReport {
    /// Report for an empty query list
    pub fn empty() -> Self {
        Self {
            query_count: 0,
            total_time: 0.0,
            average_time: 0.0,
            slow_queries: Vec::new(),
            duplicate_queries: Vec::new(),
            n_plus_one_patterns: Vec::new(),
            missing_indexes: Vec::new(),
            expensive_operations: Vec::new(),
            optimization_suggestions: Vec::new(),
            analysis: Some(NO_QUERIES_MESSAGE.to_string()),
        }
    }

    /// Returns true if any diagnostic list is non-empty
    pub fn has_findings(&self) -> bool {
        !self.slow_queries.is_empty()
            || !self.duplicate_queries.is_empty()
            || !self.n_plus_one_patterns.is_empty()
            || !self.missing_indexes.is_empty()
            || !self.expensive_operations.is_empty()
    }
}

/// Serializable result of an analysis session: a report or an error message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Report(AnalysisReport),
    Error { error: String },
}

impl AnalysisOutcome {
    /// The report, if analysis succeeded
    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Error { .. } => None,
        }
    }

    /// The error message, if analysis failed
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Report(_) => None,
            Self::Error { error } => Some(error),
        }
    }
}

impl From<AnalyzerResult<AnalysisReport>> for AnalysisOutcome {
    fn from(result: AnalyzerResult<AnalysisReport>) -> Self {
        match result {
            Ok(report) => Self::Report(report),
            Err(err) => Self::Error {
                error: err.to_string(),
            },
        }
    }
}

/// Truncates to `max` characters, appending `...` when anything was cut
pub(crate) fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
