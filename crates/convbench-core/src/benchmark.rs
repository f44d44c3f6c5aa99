//! Cross-converter benchmarking and comparative statistics.

use serde::Serialize;
use tracing::{info, warn};

use crate::ConversionOutcome;
use crate::convert::ConversionInput;
use crate::dispatch::Dispatcher;
use crate::fidelity::{FidelityReport, FidelityValidator};
use crate::introspect::{Document, TextExtractor};

/// Aggregate statistics over one benchmark batch.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    /// Per-converter outcomes, in invocation order.
    pub outcomes: Vec<ConversionOutcome>,
    /// Method with the lowest duration among successes; `None` when the
    /// batch had no successes.
    pub fastest_method: Option<String>,
    /// Method with the highest duration among successes.
    pub slowest_method: Option<String>,
    /// Mean duration over successes only; 0.0 when none.
    pub average_duration_ms: f64,
    /// successes / attempted, failures included in the denominator.
    pub success_rate: f64,
    pub total_attempted: usize,
    /// Fidelity assessments of the successful outcomes, best score first,
    /// when the caller asked for validation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rankings: Option<Vec<FidelityReport>>,
}

/// Run every available converter against the same logical input,
/// sequentially, and aggregate the outcomes.
///
/// Unavailable converters are skipped without counting as attempts.
/// Invocation is deliberately serial: shared external renderer processes
/// are not proven safe under concurrent submission, and serializing keeps
/// each duration attributable to a single converter. The input buffer is
/// immutable, so every converter sees the complete content regardless of
/// what ran before it.
pub async fn benchmark_all(dispatcher: &Dispatcher, input: &ConversionInput) -> BenchmarkReport {
    let names: Vec<String> = dispatcher
        .registry()
        .iter()
        .filter(|c| c.is_available())
        .map(|c| c.name().to_string())
        .collect();

    info!(
        file = input.file_name(),
        converters = names.len(),
        "starting benchmark batch"
    );

    let mut outcomes = Vec::with_capacity(names.len());
    for name in &names {
        outcomes.push(dispatcher.dispatch(input, name).await);
    }

    compute_stats(outcomes)
}

/// [`benchmark_all`], then score each successful artifact against the
/// source and attach a ranking (best composite score first; ties keep
/// attempt order).
pub async fn benchmark_with_validation(
    dispatcher: &Dispatcher,
    input: &ConversionInput,
    validator: &FidelityValidator,
    source_extractor: &dyn TextExtractor,
    output_extractor: &dyn TextExtractor,
) -> BenchmarkReport {
    let mut report = benchmark_all(dispatcher, input).await;

    let mut rankings = Vec::new();
    for outcome in report.outcomes.iter().filter(|o| o.success) {
        let Some(locator) = outcome.artifact.as_deref() else {
            continue;
        };
        let fidelity = match dispatcher.store().load(locator) {
            Ok(bytes) => validator.validate(
                Document::new(input.bytes(), source_extractor),
                Document::new(&bytes, output_extractor),
                &outcome.method,
            ),
            Err(e) => {
                warn!(converter = %outcome.method, locator, error = %e, "could not load artifact for validation");
                FidelityReport::errored(&outcome.method, format!("failed to load artifact: {e}"))
            }
        };
        rankings.push(fidelity);
    }
    // Stable sort: equal scores keep attempt order.
    rankings.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    report.rankings = Some(rankings);
    report
}

fn compute_stats(outcomes: Vec<ConversionOutcome>) -> BenchmarkReport {
    let total_attempted = outcomes.len();

    let mut success_count = 0usize;
    let mut total_success_ms = 0u64;
    let mut fastest: Option<(u64, String)> = None;
    let mut slowest: Option<(u64, String)> = None;

    for outcome in outcomes.iter().filter(|o| o.success) {
        success_count += 1;
        total_success_ms += outcome.duration_ms;
        // Strict comparisons: ties go to the first-encountered success.
        if fastest
            .as_ref()
            .is_none_or(|(best, _)| outcome.duration_ms < *best)
        {
            fastest = Some((outcome.duration_ms, outcome.method.clone()));
        }
        if slowest
            .as_ref()
            .is_none_or(|(worst, _)| outcome.duration_ms > *worst)
        {
            slowest = Some((outcome.duration_ms, outcome.method.clone()));
        }
    }

    let average_duration_ms = if success_count > 0 {
        total_success_ms as f64 / success_count as f64
    } else {
        0.0
    };
    let success_rate = if total_attempted > 0 {
        success_count as f64 / total_attempted as f64
    } else {
        0.0
    };

    info!(
        total_attempted,
        success_count, success_rate, "benchmark batch finished"
    );

    BenchmarkReport {
        outcomes,
        fastest_method: fastest.map(|(_, name)| name),
        slowest_method: slowest.map(|(_, name)| name),
        average_duration_ms,
        success_rate,
        total_attempted,
        rankings: None,
    }
}
