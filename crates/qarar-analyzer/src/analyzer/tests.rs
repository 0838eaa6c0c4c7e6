//! Tests for the aggregate query analyzer

use super::*;

fn record(sql: &str, time: f64) -> QueryRecord {
    QueryRecord::new(sql, time)
}

fn analyze(queries: &[QueryRecord]) -> AnalysisReport {
    QueryAnalyzer::new().analyze(queries)
}

mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert!((config.slow_query_threshold - 0.1).abs() < f64::EPSILON);
        assert!((config.index_candidate_threshold - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.n_plus_one_threshold, 5);
        assert_eq!(config.high_query_count, 50);
        assert!((config.high_total_time - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.profile_query_warning, 20);
    }

    #[test]
    fn test_builder_methods() {
        let config = AnalyzerConfig::new()
            .with_slow_query_threshold(0.5)
            .with_n_plus_one_threshold(10)
            .with_high_query_count(100)
            .with_high_total_time(-1.0)
            .with_profile_warnings(5, -0.5);

        assert!((config.slow_query_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.n_plus_one_threshold, 10);
        assert_eq!(config.high_query_count, 100);
        assert!(config.high_total_time.abs() < f64::EPSILON);
        assert_eq!(config.profile_query_warning, 5);
        assert!(config.profile_time_warning.abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"slow_query_threshold": 0.25}"#).unwrap();
        assert!((config.slow_query_threshold - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.n_plus_one_threshold, 5);
    }
}

mod aggregate_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        let report = analyze(&[]);

        assert_eq!(report.query_count, 0);
        assert_eq!(report.analysis.as_deref(), Some("No queries to analyze"));
        assert!(report.slow_queries.is_empty());
        assert!(report.duplicate_queries.is_empty());
        assert!(report.n_plus_one_patterns.is_empty());
        assert!(report.missing_indexes.is_empty());
        assert!(report.expensive_operations.is_empty());
        assert!(report.optimization_suggestions.is_empty());
        assert!(!report.has_findings());
    }

    #[test]
    fn test_totals_and_average() {
        let queries = vec![
            record("SELECT id FROM a WHERE id = 1 LIMIT 1", 0.010),
            record("SELECT id FROM b WHERE id = 1 LIMIT 1", 0.020),
            record("SELECT id FROM c WHERE id = 1 LIMIT 1", 0.033),
        ];
        let report = analyze(&queries);

        assert_eq!(report.query_count, 3);
        assert!((report.total_time - 0.063).abs() < 1e-9);
        assert!((report.average_time - report.total_time / 3.0).abs() < 1e-9);
        assert!(report.analysis.is_none());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let queries = vec![
            record("SELECT * FROM users WHERE id = 1", 0.2),
            record("SELECT * FROM users WHERE id = 2", 0.2),
            record("SELECT title FROM content_post ORDER BY created_at", 0.01),
        ];
        assert_eq!(analyze(&queries), analyze(&queries));
    }
}

mod slow_query_tests {
    use super::*;
    use crate::QueryIssue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_threshold() {
        let queries = vec![
            record("SELECT id FROM a WHERE id = 1 LIMIT 1", 0.15),
            record("SELECT id FROM b WHERE id = 1 LIMIT 1", 0.05),
        ];
        let report = analyze(&queries);

        assert_eq!(report.slow_queries.len(), 1);
        assert_eq!(report.slow_queries[0].index, 0);
        assert!((report.slow_queries[0].time - 0.15).abs() < f64::EPSILON);
    }

    #[test]
    fn test_slow_query_carries_issues() {
        let report = analyze(&[record("SELECT * FROM users", 0.3)]);

        assert_eq!(
            report.slow_queries[0].issues,
            vec![
                QueryIssue::MissingWhere,
                QueryIssue::SelectStar,
                QueryIssue::MissingLimit,
            ]
        );
    }

    #[test]
    fn test_long_sql_is_truncated() {
        let sql = format!("SELECT {} FROM wide WHERE id = 1", "col, ".repeat(60));
        let report = analyze(&[record(&sql, 0.5)]);

        let shown = &report.slow_queries[0].sql;
        assert_eq!(shown.chars().count(), 203);
        assert!(shown.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let sql = format!("SELECT * FROM t WHERE name = '{}'", "é".repeat(250));
        let report = analyze(&[record(&sql, 0.5)]);
        assert_eq!(report.slow_queries[0].sql.chars().count(), 203);
    }
}

mod grouping_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicates_report_indices_and_time() {
        let queries = vec![
            record("SELECT id FROM users_user WHERE id = 1", 0.01),
            record("SELECT id FROM content_post LIMIT 5", 0.02),
            record("SELECT id FROM users_user WHERE id = 2", 0.03),
        ];
        let report = analyze(&queries);

        assert_eq!(
            report.duplicate_queries,
            vec![DuplicateQuery {
                pattern: "select id from users_user where id = ?".to_string(),
                count: 2,
                total_time: 0.01 + 0.03,
                queries: vec![0, 2],
            }]
        );
        assert!(report.n_plus_one_patterns.is_empty());
    }

    #[test]
    fn test_six_identical_queries_form_one_n_plus_one() {
        let queries: Vec<_> = (1..=6)
            .map(|id| {
                record(
                    &format!("SELECT name FROM producers_producer WHERE id = {}", id),
                    0.002,
                )
            })
            .collect();
        let report = analyze(&queries);

        assert_eq!(report.n_plus_one_patterns.len(), 1);
        let pattern = &report.n_plus_one_patterns[0];
        assert_eq!(pattern.query_count, 6);
        assert_eq!(pattern.pattern, "select name from producers_producer where id = ?");
        assert!((pattern.average_time - 0.002).abs() < 1e-12);
        assert_eq!(pattern.suggestion, N_PLUS_ONE_SUGGESTION);
        assert_eq!(report.duplicate_queries.len(), 1);
    }

    #[test]
    fn test_five_identical_queries_are_not_n_plus_one() {
        let queries: Vec<_> = (1..=5)
            .map(|id| record(&format!("SELECT 1 FROM t WHERE id = {}", id), 0.001))
            .collect();
        assert!(analyze(&queries).n_plus_one_patterns.is_empty());
    }

    #[test]
    fn test_groups_reported_in_first_occurrence_order() {
        let queries = vec![
            record("SELECT b FROM t2 WHERE x = 1", 0.001),
            record("SELECT a FROM t1 WHERE x = 1", 0.001),
            record("SELECT a FROM t1 WHERE x = 2", 0.001),
            record("SELECT b FROM t2 WHERE x = 2", 0.001),
        ];
        let patterns: Vec<_> = analyze(&queries)
            .duplicate_queries
            .into_iter()
            .map(|d| d.pattern)
            .collect();
        assert_eq!(
            patterns,
            vec!["select b from t2 where x = ?", "select a from t1 where x = ?"]
        );
    }
}

mod missing_index_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_tables_and_columns() {
        let sql = r#"select "content_post"."id" from "content_post" where "content_post"."status" = 'published'"#;
        assert_eq!(extract_tables(sql), vec!["content_post"]);
        assert_eq!(extract_where_columns(sql), vec!["status"]);
    }

    #[test]
    fn test_extraction_on_malformed_sql_is_empty() {
        assert!(extract_tables("where id = 1").is_empty());
        assert!(extract_where_columns("select from where").is_empty());
    }

    #[test]
    fn test_slow_filtered_query_suggests_index() {
        let report = analyze(&[record(
            "SELECT id FROM content_post WHERE slug = 'x' LIMIT 1",
            0.08,
        )]);

        assert_eq!(
            report.missing_indexes,
            vec![MissingIndex {
                sql: "SELECT id FROM content_post WHERE slug = 'x' LIMIT 1".to_string(),
                time: 0.08,
                tables: vec!["content_post".to_string()],
                columns: vec!["slug".to_string()],
                suggestion: "Consider adding indexes on: slug".to_string(),
            }]
        );
    }

    #[test]
    fn test_fast_or_unfiltered_queries_are_skipped() {
        let report = analyze(&[
            record("SELECT id FROM content_post WHERE slug = 'x'", 0.05),
            record("SELECT id FROM content_post LIMIT 10", 0.5),
        ]);
        assert!(report.missing_indexes.is_empty());
    }
}

mod expensive_operation_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_order_by_without_limit_regardless_of_time() {
        let report = analyze(&[record("SELECT id FROM t ORDER BY created_at", 0.001)]);
        assert_eq!(
            report.expensive_operations[0].operations,
            vec!["ORDER BY without LIMIT"]
        );
    }

    #[test]
    fn test_time_gated_operations() {
        let sql = "SELECT DISTINCT author_id, COUNT(*) FROM content_post WHERE title LIKE '%x%' GROUP BY author_id LIMIT 10";

        let fast = analyze(&[record(sql, 0.01)]);
        assert!(fast.expensive_operations.is_empty());

        let medium = analyze(&[record(sql, 0.07)]);
        assert_eq!(
            medium.expensive_operations[0].operations,
            vec!["Slow LIKE operation"]
        );

        let slow = analyze(&[record(sql, 0.2)]);
        assert_eq!(
            slow.expensive_operations[0].operations,
            vec![
                "Slow GROUP BY operation",
                "Slow DISTINCT operation",
                "Slow LIKE operation",
            ]
        );
    }
}

mod suggestion_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_log_has_no_suggestions() {
        let report = analyze(&[record("SELECT id FROM t WHERE id = 1 LIMIT 1", 0.001)]);
        assert!(report.optimization_suggestions.is_empty());
    }

    #[test]
    fn test_suggestions_follow_findings() {
        let mut queries: Vec<_> = (0..6)
            .map(|id| record(&format!("SELECT * FROM t WHERE id = {}", id), 0.001))
            .collect();
        queries.push(record("SELECT id FROM big WHERE owner = 3", 1.2));

        let report = analyze(&queries);
        assert_eq!(
            report.optimization_suggestions,
            vec![
                "Found 1 slow queries. Review and optimize.",
                "Detected duplicate queries. Consider caching or query optimization.",
                "Detected N+1 query patterns. Use select_related() or prefetch_related().",
                "Potential missing indexes detected. Consider adding database indexes.",
                "Total query time is high. Review database performance.",
            ]
        );
    }

    #[test]
    fn test_high_query_count() {
        let queries: Vec<_> = (0..51)
            .map(|i| record(&format!("SELECT id FROM t{} WHERE id = 1 LIMIT 1", i), 0.0001))
            .collect();

        let report = analyze(&queries);
        assert_eq!(
            report.optimization_suggestions,
            vec!["High query count detected. Consider query optimization and caching."]
        );
    }

    #[test]
    fn test_expensive_operation_suggestion() {
        let report = analyze(&[record("SELECT id FROM t WHERE id > 1 ORDER BY id", 0.001)]);
        assert_eq!(
            report.optimization_suggestions,
            vec!["Detected 1 expensive operations. Review ORDER BY, GROUP BY, DISTINCT and LIKE usage."]
        );
    }
}

mod serialization_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_report_keys() {
        let report = analyze(&[record("SELECT * FROM users", 0.2)]);
        let json = serde_json::to_value(&report).unwrap();

        for key in [
            "query_count",
            "total_time",
            "average_time",
            "slow_queries",
            "duplicate_queries",
            "n_plus_one_patterns",
            "missing_indexes",
            "expensive_operations",
            "optimization_suggestions",
        ] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        assert!(json.get("analysis").is_none());
        assert_eq!(
            json["slow_queries"][0]["issues"][1],
            "Using SELECT * - consider selecting specific columns"
        );
    }

    #[test]
    fn test_empty_report_carries_message() {
        let json = serde_json::to_value(analyze(&[])).unwrap();
        assert_eq!(json["query_count"], 0);
        assert_eq!(json["analysis"], "No queries to analyze");
    }
}
