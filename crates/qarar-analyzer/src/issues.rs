//! Per-query issue detection
//!
//! Cheap textual checks run against a single SQL string. Every check is
//! independent; all matching issues are reported.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

static SUBQUERY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s*select\b").expect("valid regex"));

/// Number of ` join ` occurrences above which a query counts as complex
pub const COMPLEX_JOIN_THRESHOLD: usize = 3;

/// A potential problem found in a single query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryIssue {
    /// SELECT without WHERE or LIMIT
    MissingWhere,
    /// `SELECT *`
    SelectStar,
    /// SELECT without LIMIT that is not a count
    MissingLimit,
    /// More than three joins; carries the join count
    ComplexJoin(usize),
    /// A parenthesised SELECT
    Subquery,
    /// `LIKE '%...`
    LeadingWildcard,
}

impl QueryIssue {
    /// Human-readable description of the issue
    pub fn message(&self) -> String {
        match self {
            Self::MissingWhere => "Missing WHERE clause - potential full table scan".to_string(),
            Self::SelectStar => "Using SELECT * - consider selecting specific columns".to_string(),
            Self::MissingLimit => "Missing LIMIT clause - potential large result set".to_string(),
            Self::ComplexJoin(count) => format!("Complex query with {} JOINs", count),
            Self::Subquery => "Contains subqueries - consider optimization".to_string(),
            Self::LeadingWildcard => {
                "LIKE with leading wildcard - cannot use indexes effectively".to_string()
            }
        }
    }
}

impl fmt::Display for QueryIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Serialize for QueryIssue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifies potential issues in a SQL query.
///
/// Matching is substring based on the lower-cased text, so keywords inside
/// string literals or identifiers can produce false positives.
pub fn identify_query_issues(sql: &str) -> Vec<QueryIssue> {
    let mut issues = Vec::new();
    let sql_lower = sql.to_lowercase();

    let has_select = sql_lower.contains("select");
    let has_where = sql_lower.contains("where");
    let has_limit = sql_lower.contains("limit");

    if has_select && !has_where && !has_limit {
        issues.push(QueryIssue::MissingWhere);
    }

    if sql_lower.contains("select *") {
        issues.push(QueryIssue::SelectStar);
    }

    if has_select && !has_limit && !sql_lower.contains("count(") {
        issues.push(QueryIssue::MissingLimit);
    }

    let join_count = sql_lower.matches(" join ").count();
    if join_count > COMPLEX_JOIN_THRESHOLD {
        issues.push(QueryIssue::ComplexJoin(join_count));
    }

    if SUBQUERY_REGEX.is_match(&sql_lower) {
        issues.push(QueryIssue::Subquery);
    }

    if sql_lower.contains("like '%") {
        issues.push(QueryIssue::LeadingWildcard);
    }

    issues
}
