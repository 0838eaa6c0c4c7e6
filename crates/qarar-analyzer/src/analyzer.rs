//! Query Analyzer - Aggregate analysis of a query log
//!
//! Groups executed queries by normalized pattern and runs a fixed set of
//! heuristics over them: slow queries, duplicates, N+1 candidates, missing
//! indexes and expensive operations. The checks are regex and substring
//! based; CTEs, window functions and other dialect-specific syntax are not
//! understood and may be misreported.

use indexmap::IndexMap;
use qarar_core::QueryRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::report::truncate;
use crate::{
    AnalysisReport, DuplicateQuery, ExpensiveOperation, MissingIndex, NPlusOnePattern, SlowQuery,
    identify_query_issues, normalize_query,
};

const SQL_PREVIEW_CHARS: usize = 200;
const PATTERN_PREVIEW_CHARS: usize = 100;

/// Remediation attached to every N+1 pattern
pub const N_PLUS_ONE_SUGGESTION: &str = "Consider using select_related() or prefetch_related()";

static TABLE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)from\s+["`]?(\w+)["`]?"#).expect("valid regex"));

static WHERE_COLUMN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)where.*?["`]?(\w+)["`]?\s*[=<>!]"#).expect("valid regex")
});

/// Configuration for the query analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Queries slower than this (seconds) are reported as slow
    pub slow_query_threshold: f64,
    /// Filtered queries slower than this (seconds) are index candidates
    pub index_candidate_threshold: f64,
    /// Pattern groups larger than this are reported as N+1
    pub n_plus_one_threshold: usize,
    /// GROUP BY queries slower than this (seconds) are expensive
    pub slow_group_by_threshold: f64,
    /// DISTINCT queries slower than this (seconds) are expensive
    pub slow_distinct_threshold: f64,
    /// LIKE queries slower than this (seconds) are expensive
    pub slow_like_threshold: f64,
    /// Query counts above this add a global suggestion
    pub high_query_count: usize,
    /// Total times above this (seconds) add a global suggestion
    pub high_total_time: f64,
    /// Profilers warn when a session runs more queries than this
    pub profile_query_warning: usize,
    /// Profilers warn when a session's total time (seconds) exceeds this
    pub profile_time_warning: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            slow_query_threshold: 0.1,
            index_candidate_threshold: 0.05,
            n_plus_one_threshold: 5,
            slow_group_by_threshold: 0.1,
            slow_distinct_threshold: 0.1,
            slow_like_threshold: 0.05,
            high_query_count: 50,
            high_total_time: 1.0,
            profile_query_warning: 20,
            profile_time_warning: 0.5,
        }
    }
}

impl AnalyzerConfig {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the slow query threshold in seconds
    pub fn with_slow_query_threshold(mut self, seconds: f64) -> Self {
        self.slow_query_threshold = seconds.max(0.0);
        self
    }

    /// Sets the missing-index candidate threshold in seconds
    pub fn with_index_candidate_threshold(mut self, seconds: f64) -> Self {
        self.index_candidate_threshold = seconds.max(0.0);
        self
    }

    /// Sets the group size above which a pattern counts as N+1
    pub fn with_n_plus_one_threshold(mut self, count: usize) -> Self {
        self.n_plus_one_threshold = count;
        self
    }

    /// Sets the global query count threshold
    pub fn with_high_query_count(mut self, count: usize) -> Self {
        self.high_query_count = count;
        self
    }

    /// Sets the global total time threshold in seconds
    pub fn with_high_total_time(mut self, seconds: f64) -> Self {
        self.high_total_time = seconds.max(0.0);
        self
    }

    /// Sets the profiler warning thresholds
    pub fn with_profile_warnings(mut self, queries: usize, seconds: f64) -> Self {
        self.profile_query_warning = queries;
        self.profile_time_warning = seconds.max(0.0);
        self
    }
}

/// A query's position and timing inside its pattern group
#[derive(Debug, Clone, Copy)]
struct GroupMember {
    index: usize,
    time: f64,
}

/// Query analyzer that turns a query log into a report
#[derive(Debug, Clone, Default)]
pub struct QueryAnalyzer {
    config: AnalyzerConfig,
}

impl QueryAnalyzer {
    /// Creates a new analyzer with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new analyzer with custom config
    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Returns the analyzer config
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyzes a list of executed queries
    pub fn analyze(&self, queries: &[QueryRecord]) -> AnalysisReport {
        if queries.is_empty() {
            return AnalysisReport::empty();
        }

        let total_time: f64 = queries.iter().map(|q| q.time).sum();
        let mut report = AnalysisReport {
            query_count: queries.len(),
            total_time,
            average_time: total_time / queries.len() as f64,
            slow_queries: Vec::new(),
            duplicate_queries: Vec::new(),
            n_plus_one_patterns: Vec::new(),
            missing_indexes: Vec::new(),
            expensive_operations: Vec::new(),
            optimization_suggestions: Vec::new(),
            analysis: None,
        };

        let groups = group_by_pattern(queries);

        report.slow_queries = self.find_slow_queries(queries);
        report.duplicate_queries = find_duplicates(&groups);
        report.n_plus_one_patterns = self.find_n_plus_one(&groups);
        report.missing_indexes = self.find_missing_indexes(queries);
        report.expensive_operations = self.find_expensive_operations(queries);
        report.optimization_suggestions = self.generate_suggestions(&report);

        tracing::debug!(
            query_count = report.query_count,
            total_time = report.total_time,
            slow = report.slow_queries.len(),
            duplicates = report.duplicate_queries.len(),
            n_plus_one = report.n_plus_one_patterns.len(),
            "query analysis complete"
        );

        report
    }

    fn find_slow_queries(&self, queries: &[QueryRecord]) -> Vec<SlowQuery> {
        queries
            .iter()
            .enumerate()
            .filter(|(_, q)| q.time > self.config.slow_query_threshold)
            .map(|(index, q)| SlowQuery {
                index,
                sql: truncate(&q.sql, SQL_PREVIEW_CHARS),
                time: q.time,
                issues: identify_query_issues(&q.sql),
            })
            .collect()
    }

    fn find_n_plus_one(&self, groups: &IndexMap<String, Vec<GroupMember>>) -> Vec<NPlusOnePattern> {
        groups
            .iter()
            .filter(|(_, members)| members.len() > self.config.n_plus_one_threshold)
            .map(|(pattern, members)| {
                let total_time: f64 = members.iter().map(|m| m.time).sum();
                NPlusOnePattern {
                    pattern: truncate(pattern, PATTERN_PREVIEW_CHARS),
                    query_count: members.len(),
                    total_time,
                    average_time: total_time / members.len() as f64,
                    suggestion: N_PLUS_ONE_SUGGESTION.to_string(),
                }
            })
            .collect()
    }

    fn find_missing_indexes(&self, queries: &[QueryRecord]) -> Vec<MissingIndex> {
        let mut missing = Vec::new();

        for query in queries {
            let sql = query.sql.to_lowercase();
            if query.time <= self.config.index_candidate_threshold || !sql.contains("where") {
                continue;
            }

            let tables = extract_tables(&sql);
            let columns = extract_where_columns(&sql);
            if tables.is_empty() || columns.is_empty() {
                continue;
            }

            let suggestion = format!("Consider adding indexes on: {}", columns.join(", "));
            missing.push(MissingIndex {
                sql: truncate(&query.sql, SQL_PREVIEW_CHARS),
                time: query.time,
                tables,
                columns,
                suggestion,
            });
        }

        missing
    }

    fn find_expensive_operations(&self, queries: &[QueryRecord]) -> Vec<ExpensiveOperation> {
        let mut expensive = Vec::new();

        for query in queries {
            let sql = query.sql.to_lowercase();
            let mut operations = Vec::new();

            if sql.contains("order by") && !sql.contains("limit") {
                operations.push("ORDER BY without LIMIT".to_string());
            }
            if sql.contains("group by") && query.time > self.config.slow_group_by_threshold {
                operations.push("Slow GROUP BY operation".to_string());
            }
            if sql.contains("distinct") && query.time > self.config.slow_distinct_threshold {
                operations.push("Slow DISTINCT operation".to_string());
            }
            if sql.contains("like") && query.time > self.config.slow_like_threshold {
                operations.push("Slow LIKE operation".to_string());
            }

            if !operations.is_empty() {
                expensive.push(ExpensiveOperation {
                    sql: truncate(&query.sql, SQL_PREVIEW_CHARS),
                    time: query.time,
                    operations,
                });
            }
        }

        expensive
    }

    fn generate_suggestions(&self, report: &AnalysisReport) -> Vec<String> {
        let mut suggestions = Vec::new();

        if !report.slow_queries.is_empty() {
            suggestions.push(format!(
                "Found {} slow queries. Review and optimize.",
                report.slow_queries.len()
            ));
        }

        if !report.duplicate_queries.is_empty() {
            suggestions.push(
                "Detected duplicate queries. Consider caching or query optimization.".to_string(),
            );
        }

        if !report.n_plus_one_patterns.is_empty() {
            suggestions.push(
                "Detected N+1 query patterns. Use select_related() or prefetch_related()."
                    .to_string(),
            );
        }

        if !report.missing_indexes.is_empty() {
            suggestions.push(
                "Potential missing indexes detected. Consider adding database indexes.".to_string(),
            );
        }

        if !report.expensive_operations.is_empty() {
            suggestions.push(format!(
                "Detected {} expensive operations. Review ORDER BY, GROUP BY, DISTINCT and LIKE usage.",
                report.expensive_operations.len()
            ));
        }

        if report.query_count > self.config.high_query_count {
            suggestions.push(
                "High query count detected. Consider query optimization and caching.".to_string(),
            );
        }

        if report.total_time > self.config.high_total_time {
            suggestions.push("Total query time is high. Review database performance.".to_string());
        }

        suggestions
    }
}

/// Groups queries by normalized pattern, in order of first occurrence
fn group_by_pattern(queries: &[QueryRecord]) -> IndexMap<String, Vec<GroupMember>> {
    let mut groups: IndexMap<String, Vec<GroupMember>> = IndexMap::new();
    for (index, query) in queries.iter().enumerate() {
        groups
            .entry(normalize_query(&query.sql))
            .or_default()
            .push(GroupMember {
                index,
                time: query.time,
            });
    }
    groups
}

fn find_duplicates(groups: &IndexMap<String, Vec<GroupMember>>) -> Vec<DuplicateQuery> {
    groups
        .iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(pattern, members)| DuplicateQuery {
            pattern: truncate(pattern, PATTERN_PREVIEW_CHARS),
            count: members.len(),
            total_time: members.iter().map(|m| m.time).sum(),
            queries: members.iter().map(|m| m.index).collect(),
        })
        .collect()
}

/// Extracts table names following `FROM` (best effort)
pub fn extract_tables(sql: &str) -> Vec<String> {
    TABLE_REGEX
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Extracts the first compared column after each `WHERE` (best effort)
pub fn extract_where_columns(sql: &str) -> Vec<String> {
    WHERE_COLUMN_REGEX
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests;
