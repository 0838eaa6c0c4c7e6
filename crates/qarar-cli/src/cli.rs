//! qarar-analyze - database query analysis from the command line
//!
//! Analyzes either a captured query log (`--log`) or the probe queries run
//! against the models of a SQLite database (`--app`, `--model`), and reports
//! optimization suggestions.

mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use qarar_analyzer::{AnalyzerSettings, DatabaseOptimizer, QueryAnalyzer};
use qarar_core::{QararError, QueryLog, read_query_log};
use qarar_driver_sqlite::SqliteDatabase;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use logging::LoggingConfig;
use output::{AnalysisOutput, OutputFormat, write_output};

#[derive(Debug, Parser)]
#[command(
    name = "qarar-analyze",
    version,
    about = "Analyze database queries and provide optimization suggestions"
)]
struct Cli {
    /// Settings file (defaults to <config dir>/qarar/analyzer.toml)
    #[arg(long, env = "QARAR_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database to probe for --app/--model analysis
    #[arg(long, env = "QARAR_DATABASE")]
    database: Option<PathBuf>,

    /// Analyze specific app models
    #[arg(long)]
    app: Option<String>,

    /// Analyze specific model
    #[arg(long, requires = "app")]
    model: Option<String>,

    /// Analyze a captured query log (JSON array of {sql, time})
    #[arg(long, conflicts_with_all = ["app", "model"])]
    log: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    output: OutputFormat,

    /// Override the settings' debug flag; analysis needs it enabled
    #[arg(long, env = "QARAR_DEBUG")]
    debug: Option<bool>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(LoggingConfig::for_cli(cli.verbose)) {
        eprintln!("Failed to initialize logging: {}", err);
    }

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "analysis failed");
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut settings =
        AnalyzerSettings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(debug) = cli.debug {
        settings.debug = debug;
    }

    if !settings.debug {
        eprintln!("DEBUG must be enabled for query analysis");
        return Ok(ExitCode::FAILURE);
    }

    let analyzer = QueryAnalyzer::with_config(settings.analyzer.clone());
    let mut stdout = std::io::stdout().lock();

    if let Some(path) = &cli.log {
        let records = read_query_log(path)?;
        tracing::info!(path = %path.display(), queries = records.len(), "analyzing query log");
        let report = analyzer.analyze(&records);
        write_output(
            &AnalysisOutput::Log(report),
            cli.output,
            &settings.output_dir,
            &mut stdout,
        )?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(app) = cli.app.as_deref() else {
        eprintln!("Please specify --app or --model");
        return Ok(ExitCode::FAILURE);
    };

    let database_path = cli
        .database
        .as_deref()
        .context("--database is required for --app/--model analysis")?;
    let db = SqliteDatabase::open(database_path, QueryLog::new(settings.debug))?;
    let catalog = db.introspect_catalog()?;
    let optimizer = DatabaseOptimizer::new(&db, &analyzer);

    let output = match cli.model.as_deref() {
        Some(model) => optimizer
            .analyze_model(&catalog, app, model)
            .map(AnalysisOutput::Model),
        None => optimizer
            .analyze_app_models(&catalog, app)
            .map(AnalysisOutput::App),
    };

    match output {
        Ok(output) => {
            write_output(&output, cli.output, &settings.output_dir, &mut stdout)?;
            stdout.flush()?;
            Ok(ExitCode::SUCCESS)
        }
        Err(QararError::NotFound(what)) => {
            eprintln!("{} not found", what);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(err.into()),
    }
}
