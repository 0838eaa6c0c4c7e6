//! SQL normalization
//!
//! Masks literal values so that structurally identical queries map to the
//! same pattern. The pattern is only a grouping key; it is never executed.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+\b").expect("valid regex"));

static SINGLE_QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'").expect("valid regex"));

static DOUBLE_QUOTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("valid regex"));

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Normalizes a SQL string into its pattern.
///
/// Integer literals become `?`, quoted strings and identifiers become `'?'`
/// and `"?"`, whitespace runs collapse to one space, and the result is
/// trimmed and lower-cased.
///
/// ```
/// use qarar_analyzer::normalize_query;
///
/// assert_eq!(
///     normalize_query("SELECT * FROM t WHERE id=5"),
///     normalize_query("SELECT * FROM t WHERE id=9"),
/// );
/// assert_eq!(normalize_query("SELECT * FROM t WHERE id=5"), "select * from t where id=?");
/// ```
pub fn normalize_query(sql: &str) -> String {
    let sql = NUMBER_REGEX.replace_all(sql, "?");
    let sql = SINGLE_QUOTED_REGEX.replace_all(&sql, "'?'");
    let sql = DOUBLE_QUOTED_REGEX.replace_all(&sql, "\"?\"");
    let sql = WHITESPACE_REGEX.replace_all(&sql, " ");
    sql.trim().to_lowercase()
}
