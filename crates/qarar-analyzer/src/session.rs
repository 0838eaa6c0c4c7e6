//! Scoped analysis sessions
//!
//! A session remembers how many queries a log held when it began; ending it
//! analyzes only the queries recorded since. `QueryProfiler` wraps a session
//! in a named guard that always ends it, even when the profiled work panics.

use qarar_core::QueryLogSource;
use std::time::{Duration, Instant};

use crate::{AnalysisOutcome, AnalysisReport, AnalyzerError, AnalyzerResult, QueryAnalyzer};

/// An open analysis window over a query log
pub struct AnalysisSession<'a> {
    source: &'a dyn QueryLogSource,
    analyzer: &'a QueryAnalyzer,
    baseline: usize,
    started_at: Instant,
}

impl<'a> AnalysisSession<'a> {
    /// Opens a session, recording the current log length
    pub fn begin(source: &'a dyn QueryLogSource, analyzer: &'a QueryAnalyzer) -> Self {
        let baseline = source.snapshot().len();
        tracing::trace!(baseline, "analysis session started");
        Self {
            source,
            analyzer,
            baseline,
            started_at: Instant::now(),
        }
    }

    /// Queries already in the log when the session began
    pub fn baseline(&self) -> usize {
        self.baseline
    }

    /// Wall-clock time since the session began
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Analyzes the queries recorded since `begin`.
    ///
    /// Fails with `InstrumentationDisabled` when the source is not collecting.
    /// If the log was cleared during the session, everything it now holds is
    /// analyzed.
    pub fn end(&self) -> AnalyzerResult<AnalysisReport> {
        if !self.source.is_enabled() {
            return Err(AnalyzerError::InstrumentationDisabled);
        }

        let current = self.source.snapshot();
        let new_queries = current.get(self.baseline..).unwrap_or(&current[..]);

        tracing::debug!(
            new_queries = new_queries.len(),
            elapsed_ms = self.elapsed().as_millis() as u64,
            "analysis session ended"
        );

        Ok(self.analyzer.analyze(new_queries))
    }
}

/// Named profiling guard around an analysis session.
///
/// Call `finish` to get the outcome. A profiler dropped without `finish`
/// still ends its session and logs the result.
pub struct QueryProfiler<'a> {
    name: String,
    session: AnalysisSession<'a>,
    finished: bool,
}

impl<'a> QueryProfiler<'a> {
    /// Starts profiling against `source`
    pub fn new(
        name: impl Into<String>,
        source: &'a dyn QueryLogSource,
        analyzer: &'a QueryAnalyzer,
    ) -> Self {
        Self {
            name: name.into(),
            session: AnalysisSession::begin(source, analyzer),
            finished: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ends the session and returns its outcome
    pub fn finish(mut self) -> AnalysisOutcome {
        self.finished = true;
        self.close()
    }

    fn close(&self) -> AnalysisOutcome {
        let result = self.session.end();

        match &result {
            Ok(report) if report.query_count > 0 => self.log_report(report),
            Ok(_) => {}
            Err(err) => tracing::debug!(profile = %self.name, error = %err, "query profile unavailable"),
        }

        result.into()
    }

    fn log_report(&self, report: &AnalysisReport) {
        let config = self.session.analyzer.config();

        tracing::info!(
            profile = %self.name,
            query_count = report.query_count,
            total_time = report.total_time,
            slow_queries = report.slow_queries.len(),
            suggestions = ?report.optimization_suggestions,
            "query profile"
        );

        if report.query_count > config.profile_query_warning {
            tracing::warn!(
                profile = %self.name,
                query_count = report.query_count,
                "high query count in profile"
            );
        }

        if report.total_time > config.profile_time_warning {
            tracing::warn!(
                profile = %self.name,
                total_time = report.total_time,
                "slow query execution in profile"
            );
        }
    }
}

impl Drop for QueryProfiler<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if std::thread::panicking() {
            tracing::warn!(profile = %self.name, "profiled work panicked, closing session");
        }
        let _ = self.close();
    }
}

/// Runs `work` inside a profiler and returns its output with the outcome
pub fn profile<T>(
    name: &str,
    source: &dyn QueryLogSource,
    analyzer: &QueryAnalyzer,
    work: impl FnOnce() -> T,
) -> (T, AnalysisOutcome) {
    let profiler = QueryProfiler::new(name, source, analyzer);
    let output = work();
    (output, profiler.finish())
}
