//! Report rendering: console text, JSON, or a timestamped JSON file

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use comfy_table::{Table, presets::UTF8_FULL};
use indexmap::IndexMap;
use qarar_analyzer::{AnalysisOutcome, AnalysisReport, IndexSuggestion, ModelAnalysis, ModelReport};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// How results are written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
    File,
}

/// Anything the CLI can report
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnalysisOutput {
    /// Analysis of a captured query log
    Log(AnalysisReport),
    /// Analysis of a single model
    Model(ModelReport),
    /// Analysis of every model in an app, keyed by model name
    App(IndexMap<String, ModelAnalysis>),
}

/// Writes results in the requested format.
///
/// Returns the path of the written file for `OutputFormat::File`.
pub fn write_output(
    output: &AnalysisOutput,
    format: OutputFormat,
    output_dir: &Path,
    out: &mut impl Write,
) -> Result<Option<PathBuf>> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, output)?;
            writeln!(out)?;
            Ok(None)
        }
        OutputFormat::File => {
            let path = output_dir.join(report_file_name(Utc::now()));
            std::fs::create_dir_all(output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
            let content = serde_json::to_string_pretty(output)?;
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "analysis saved");
            writeln!(out, "Analysis saved to {}", path.display())?;
            Ok(Some(path))
        }
        OutputFormat::Console => {
            render_console(output, out)?;
            Ok(None)
        }
    }
}

/// `query_analysis_YYYYmmdd_HHMMSS.json`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("query_analysis_{}.json", now.format("%Y%m%d_%H%M%S"))
}

fn render_console(output: &AnalysisOutput, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Database Query Analysis Results")?;
    writeln!(out, "{}", "=".repeat(50))?;

    match output {
        AnalysisOutput::Log(report) => {
            writeln!(out, "\nQUERY LOG:")?;
            write_report_summary(report, out)?;
            writeln!(out, "{}", findings_table(report))?;
        }
        AnalysisOutput::Model(model) => {
            writeln!(out, "\nMODEL: {}", model.model)?;
            writeln!(out, "\nANALYSIS:")?;
            write_outcome_summary(&model.analysis, out)?;
            writeln!(out, "\nSUGGESTIONS:")?;
            write_index_suggestions(&model.suggestions, out)?;
            write_model_suggestions(&model.model_suggestions, out)?;
        }
        AnalysisOutput::App(models) => {
            if models.is_empty() {
                writeln!(out, "\nNo models found")?;
            }
            for (name, analysis) in models {
                writeln!(out, "\n{}:", name.to_uppercase())?;
                writeln!(
                    out,
                    "  Fields: {} ({} relationships)",
                    analysis.field_count, analysis.relationship_count
                )?;
                write_outcome_summary(&analysis.query_analysis, out)?;
                write_index_suggestions(&analysis.index_suggestions, out)?;
                write_model_suggestions(&analysis.model_suggestions, out)?;
            }
        }
    }

    writeln!(out)?;
    Ok(())
}

fn write_outcome_summary(outcome: &AnalysisOutcome, out: &mut impl Write) -> Result<()> {
    match outcome {
        AnalysisOutcome::Report(report) => write_report_summary(report, out),
        AnalysisOutcome::Error { error } => {
            writeln!(out, "  Error: {}", error)?;
            Ok(())
        }
    }
}

fn write_report_summary(report: &AnalysisReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "  Query Count: {}", report.query_count)?;
    writeln!(out, "  Total Time: {:.3}s", report.total_time)?;

    if !report.slow_queries.is_empty() {
        writeln!(out, "  Slow Queries: {}", report.slow_queries.len())?;
    }

    if !report.optimization_suggestions.is_empty() {
        writeln!(out, "  Suggestions:")?;
        for suggestion in &report.optimization_suggestions {
            writeln!(out, "    - {}", suggestion)?;
        }
    }

    Ok(())
}

fn write_index_suggestions(suggestions: &[IndexSuggestion], out: &mut impl Write) -> Result<()> {
    if suggestions.is_empty() {
        writeln!(out, "  No index suggestions")?;
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Type", "Fields", "Suggestion", "Impact"]);
    for suggestion in suggestions {
        table.add_row(vec![
            suggestion.kind.as_str().to_string(),
            suggestion.fields.join(", "),
            suggestion.suggestion.clone(),
            suggestion.impact.clone(),
        ]);
    }
    writeln!(out, "{}", table)?;
    Ok(())
}

fn write_model_suggestions(suggestions: &[String], out: &mut impl Write) -> Result<()> {
    for suggestion in suggestions {
        writeln!(out, "  * {}", suggestion)?;
    }
    Ok(())
}

fn findings_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Finding", "Count"]);
    for (label, count) in [
        ("Slow queries", report.slow_queries.len()),
        ("Duplicate patterns", report.duplicate_queries.len()),
        ("N+1 patterns", report.n_plus_one_patterns.len()),
        ("Missing indexes", report.missing_indexes.len()),
        ("Expensive operations", report.expensive_operations.len()),
    ] {
        table.add_row(vec![label.to_string(), count.to_string()]);
    }
    table
}
