//! Executed query records
//!
//! A `QueryRecord` is what a query-logging facility captures for every
//! statement it sees: the SQL text and how long it took to run.

use serde::{Deserialize, Deserializer, Serialize, de};
use std::time::Duration;

use crate::{QararError, Result};

/// A single executed query as captured by a query log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// The SQL text as sent to the database
    pub sql: String,
    /// Execution time in seconds
    #[serde(deserialize_with = "deserialize_seconds")]
    pub time: f64,
}

impl QueryRecord {
    /// Creates a record from SQL text and a duration in seconds
    pub fn new(sql: impl Into<String>, time: f64) -> Self {
        Self {
            sql: sql.into(),
            time,
        }
    }

    /// Creates a record from SQL text and a measured duration
    pub fn from_duration(sql: impl Into<String>, duration: Duration) -> Self {
        Self::new(sql, duration.as_secs_f64())
    }

    /// Execution time in milliseconds
    pub fn time_ms(&self) -> f64 {
        self.time * 1000.0
    }
}

/// Parses a JSON array of query records.
///
/// Times may be numbers or numeric strings (`"0.002"`), the form Django's
/// `connection.queries` uses.
pub fn parse_query_log(json: &str) -> Result<Vec<QueryRecord>> {
    let records: Vec<QueryRecord> = serde_json::from_str(json)?;
    tracing::debug!(records = records.len(), "parsed query log");
    Ok(records)
}

/// Reads and parses a query log file
pub fn read_query_log(path: &std::path::Path) -> Result<Vec<QueryRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        QararError::Configuration(format!(
            "Failed to read query log {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_query_log(&content)
}

fn deserialize_seconds<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(n) => Ok(n),
        Seconds::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("invalid query time: {:?}", s))),
    }
}
