//! Model-scoped optimization
//!
//! Runs a fixed set of probe queries against each model's table inside a
//! profiler, and derives index suggestions from the model's fields.

use indexmap::IndexMap;
use qarar_core::{QueryLogSource, Result};
use serde::{Deserialize, Serialize};

use crate::{AnalysisOutcome, ModelCatalog, ModelInfo, QueryAnalyzer, QueryProfiler};

/// Fields commonly used in filters that usually deserve an index
pub const COMMON_FILTER_FIELDS: [&str; 4] = ["status", "is_active", "created_at", "updated_at"];

/// Model-level suggestion when no index spans more than one column
pub const COMPOSITE_INDEX_SUGGESTION: &str = "Consider adding composite indexes in Meta.indexes";

/// Executes probe queries and records them in a query log
pub trait ProbeExecutor {
    /// Executes a statement, consuming any rows it returns
    fn execute(&self, sql: &str) -> Result<()>;

    /// The log every executed statement is recorded in
    fn query_log(&self) -> &dyn QueryLogSource;
}

/// What an index suggestion is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexSuggestionKind {
    ForeignKey,
    FilterField,
    Composite,
}

impl IndexSuggestionKind {
    /// Returns the kind as a display string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForeignKey => "foreign_key",
            Self::FilterField => "filter_field",
            Self::Composite => "composite",
        }
    }
}

/// A suggested index for a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSuggestion {
    #[serde(rename = "type")]
    pub kind: IndexSuggestionKind,
    pub fields: Vec<String>,
    pub suggestion: String,
    pub impact: String,
}

/// Probe results and index suggestions for one model of an app
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelAnalysis {
    pub query_analysis: AnalysisOutcome,
    pub index_suggestions: Vec<IndexSuggestion>,
    pub model_suggestions: Vec<String>,
    pub field_count: usize,
    pub relationship_count: usize,
}

/// Analysis of a single model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    /// `app.model`
    pub model: String,
    pub analysis: AnalysisOutcome,
    pub suggestions: Vec<IndexSuggestion>,
    pub model_suggestions: Vec<String>,
}

/// Runs model and app scoped analysis through a probe executor
pub struct DatabaseOptimizer<'a> {
    executor: &'a dyn ProbeExecutor,
    analyzer: &'a QueryAnalyzer,
}

impl<'a> DatabaseOptimizer<'a> {
    pub fn new(executor: &'a dyn ProbeExecutor, analyzer: &'a QueryAnalyzer) -> Self {
        Self { executor, analyzer }
    }

    /// Probe queries for a model, in execution order
    pub fn probe_queries(model: &ModelInfo) -> Vec<String> {
        let table = quote_ident(&model.table);
        let mut probes = vec![
            format!("SELECT * FROM {} LIMIT 10", table),
            format!("SELECT COUNT(*) FROM {}", table),
        ];
        if let Some(first) = model.fields.first() {
            probes.push(format!(
                "SELECT * FROM {} WHERE {} IS NOT NULL LIMIT 5",
                table,
                quote_ident(&first.column)
            ));
        }
        probes
    }

    /// Runs the probe queries for a model inside a profiler.
    ///
    /// Probe failures are logged and skipped; the outcome covers whatever
    /// did run.
    pub fn analyze_model_queries(&self, model: &ModelInfo) -> AnalysisOutcome {
        let profiler = QueryProfiler::new(
            format!("Model Analysis: {}", model.name),
            self.executor.query_log(),
            self.analyzer,
        );

        for sql in Self::probe_queries(model) {
            if let Err(err) = self.executor.execute(&sql) {
                tracing::warn!(model = %model.label(), sql = %sql, error = %err, "probe query failed");
            }
        }

        profiler.finish()
    }

    /// Suggests indexes for a model based on its fields
    pub fn suggest_indexes(model: &ModelInfo) -> Vec<IndexSuggestion> {
        let mut suggestions = Vec::new();

        for field in model.foreign_keys().filter(|f| !f.db_index) {
            suggestions.push(IndexSuggestion {
                kind: IndexSuggestionKind::ForeignKey,
                fields: vec![field.name.clone()],
                suggestion: format!("Add db_index=True to {}", field.name),
                impact: "High - improves JOIN performance".to_string(),
            });
        }

        for name in COMMON_FILTER_FIELDS {
            let Some(field) = model.field(name) else {
                continue;
            };
            if field.db_index || field.primary_key {
                continue;
            }
            suggestions.push(IndexSuggestion {
                kind: IndexSuggestionKind::FilterField,
                fields: vec![name.to_string()],
                suggestion: format!("Consider adding db_index=True to {}", name),
                impact: "Medium - improves filtering performance".to_string(),
            });
        }

        if model.field("status").is_some() && model.field("created_at").is_some() {
            suggestions.push(IndexSuggestion {
                kind: IndexSuggestionKind::Composite,
                fields: vec!["status".to_string(), "created_at".to_string()],
                suggestion: "Consider adding composite index on (status, created_at)".to_string(),
                impact: "Medium - improves filtered ordering".to_string(),
            });
        }

        suggestions
    }

    /// Model-level optimization hints: unindexed foreign keys, and a missing
    /// composite index
    pub fn suggest_model_optimizations(model: &ModelInfo) -> Vec<String> {
        let mut suggestions: Vec<String> = model
            .foreign_keys()
            .filter(|f| !f.db_index)
            .map(|f| format!("Add db_index=True to {}", f.name))
            .collect();

        if !model.has_composite_index() {
            suggestions.push(COMPOSITE_INDEX_SUGGESTION.to_string());
        }

        suggestions
    }

    /// Analyzes one model looked up in the catalog
    pub fn analyze_model(
        &self,
        catalog: &ModelCatalog,
        app_label: &str,
        model_name: &str,
    ) -> Result<ModelReport> {
        let model = catalog.model(app_label, model_name)?;
        Ok(ModelReport {
            model: format!("{}.{}", app_label, model_name),
            analysis: self.analyze_model_queries(model),
            suggestions: Self::suggest_indexes(model),
            model_suggestions: Self::suggest_model_optimizations(model),
        })
    }

    /// Analyzes every model of an app, keyed by model name
    pub fn analyze_app_models(
        &self,
        catalog: &ModelCatalog,
        app_label: &str,
    ) -> Result<IndexMap<String, ModelAnalysis>> {
        let models = catalog.app(app_label)?;
        tracing::info!(app = %app_label, models = models.len(), "analyzing app models");

        let mut analyses = IndexMap::new();
        for model in models {
            analyses.insert(
                model.name.clone(),
                ModelAnalysis {
                    query_analysis: self.analyze_model_queries(model),
                    index_suggestions: Self::suggest_indexes(model),
                    model_suggestions: Self::suggest_model_optimizations(model),
                    field_count: model.fields.len(),
                    relationship_count: model.relationship_count(),
                },
            );
        }
        Ok(analyses)
    }
}

/// Quotes an identifier for SQL, doubling embedded quotes
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}
