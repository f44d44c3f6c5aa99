//! Conversion dispatch: one converter, one input, a normalized outcome.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tracing::{error, info};

use crate::ConversionOutcome;
use crate::convert::{ArtifactStore, ConversionInput, ConverterRegistry};

/// Append-only record of every dispatch, keyed by converter name.
///
/// A single benchmark batch is sequential, but batches from different
/// tasks may append concurrently, so the map must tolerate concurrent
/// writers. Growth is unbounded; operators clear it explicitly via
/// [`clear`](ConversionHistory::clear).
#[derive(Default)]
pub struct ConversionHistory {
    entries: DashMap<String, Vec<ConversionOutcome>>,
}

impl ConversionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an outcome under its converter name. Only the dispatcher
    /// writes here.
    pub(crate) fn record(&self, outcome: &ConversionOutcome) {
        self.entries
            .entry(outcome.method.clone())
            .or_default()
            .push(outcome.clone());
    }

    /// Read-only snapshot of the full history.
    pub fn snapshot(&self) -> HashMap<String, Vec<ConversionOutcome>> {
        self.entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Outcomes recorded for one converter, in dispatch order.
    pub fn for_converter(&self, name: &str) -> Vec<ConversionOutcome> {
        self.entries
            .get(name)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Administrative clear of the whole map.
    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Invokes one named converter against one input and normalizes the
/// result.
///
/// `dispatch` is total: unknown names, unavailable backends and converter
/// errors all come back as failure outcomes, never as panics or `Err`s.
/// Every outcome is appended to the injected [`ConversionHistory`] before
/// it is returned.
pub struct Dispatcher {
    registry: Arc<ConverterRegistry>,
    store: Arc<dyn ArtifactStore>,
    history: Arc<ConversionHistory>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ConverterRegistry>, store: Arc<dyn ArtifactStore>) -> Self {
        Self::with_history(registry, store, Arc::new(ConversionHistory::new()))
    }

    /// Construct with an externally owned history (shared across
    /// dispatchers, or a fresh one per test).
    pub fn with_history(
        registry: Arc<ConverterRegistry>,
        store: Arc<dyn ArtifactStore>,
        history: Arc<ConversionHistory>,
    ) -> Self {
        Self {
            registry,
            store,
            history,
        }
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    pub fn store(&self) -> &dyn ArtifactStore {
        self.store.as_ref()
    }

    pub fn history(&self) -> &ConversionHistory {
        &self.history
    }

    /// Run one conversion attempt with the named converter.
    pub async fn dispatch(&self, input: &ConversionInput, converter_name: &str) -> ConversionOutcome {
        let start = Instant::now();

        let Some(converter) = self.registry.find(converter_name) else {
            return self.fail(
                converter_name,
                start,
                format!("Converter not found: {converter_name}"),
            );
        };

        if !converter.is_available() {
            return self.fail(
                converter.name(),
                start,
                format!("Converter not available: {}", converter.name()),
            );
        }

        info!(
            converter = converter.name(),
            file = input.file_name(),
            "starting conversion"
        );

        let output = match converter.convert(input).await {
            Ok(bytes) => bytes,
            Err(e) => return self.fail(converter.name(), start, e.to_string()),
        };

        let artifact_name =
            artifact_file_name(input, converter.name(), converter.output_extension());
        let locator = match self.store.store(&artifact_name, &output) {
            Ok(locator) => locator,
            Err(e) => {
                return self.fail(
                    converter.name(),
                    start,
                    format!("failed to store artifact: {e}"),
                );
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let outcome = ConversionOutcome::success(
            converter.name(),
            duration_ms,
            input.size(),
            output.len() as u64,
            locator,
        );
        self.history.record(&outcome);
        info!(
            converter = converter.name(),
            duration_ms, "conversion completed"
        );
        outcome
    }

    fn fail(&self, method: &str, start: Instant, message: String) -> ConversionOutcome {
        error!(converter = method, error = %message, "conversion failed");
        let outcome =
            ConversionOutcome::failure(method, start.elapsed().as_millis() as u64, message);
        self.history.record(&outcome);
        outcome
    }
}

/// `<stem>_<converter>_<suffix>.<ext>`, converter-qualified so artifacts
/// from a multi-converter batch over the same input do not collide.
fn artifact_file_name(input: &ConversionInput, converter: &str, extension: &str) -> String {
    format!(
        "{}_{}_{:08x}.{}",
        input.stem(),
        converter,
        fastrand::u32(..),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryStore, MockConverter, MockOutcome};

    fn dispatcher_with(converters: Vec<Arc<MockConverter>>) -> Dispatcher {
        let mut registry = ConverterRegistry::new();
        for c in converters {
            registry.register(c);
        }
        Dispatcher::new(Arc::new(registry), Arc::new(MemoryStore::new()))
    }

    fn input() -> ConversionInput {
        ConversionInput::new("sample.docx", b"source document bytes".to_vec())
    }

    #[tokio::test]
    async fn unknown_converter_is_a_failure_outcome() {
        let dispatcher = dispatcher_with(vec![]);
        let outcome = dispatcher.dispatch(&input(), "ghost").await;

        assert!(!outcome.success);
        assert_eq!(outcome.method, "ghost");
        assert!(
            outcome
                .error_message
                .as_deref()
                .unwrap()
                .contains("Converter not found: ghost")
        );
        assert!(outcome.artifact.is_none());
        // Recorded under the requested name.
        assert_eq!(dispatcher.history().for_converter("ghost").len(), 1);
    }

    #[tokio::test]
    async fn unavailable_converter_is_a_failure_outcome() {
        let dispatcher = dispatcher_with(vec![Arc::new(MockConverter::unavailable("offline"))]);
        let outcome = dispatcher.dispatch(&input(), "offline").await;

        assert!(!outcome.success);
        assert!(
            outcome
                .error_message
                .as_deref()
                .unwrap()
                .contains("Converter not available: offline")
        );
    }

    #[tokio::test]
    async fn successful_dispatch_stores_artifact_and_sizes() {
        let converter = Arc::new(MockConverter::new("fast", b"rendered output".to_vec()));
        let dispatcher = dispatcher_with(vec![converter.clone()]);
        let input = input();

        let outcome = dispatcher.dispatch(&input, "fast").await;

        assert!(outcome.success);
        assert_eq!(outcome.method, "fast");
        assert_eq!(outcome.original_size, input.size());
        assert_eq!(outcome.output_size, b"rendered output".len() as u64);
        assert!(outcome.error_message.is_none());
        assert_eq!(converter.call_count(), 1);

        // The locator resolves back to the artifact bytes.
        let locator = outcome.artifact.as_deref().unwrap();
        assert!(locator.contains("sample_fast_"));
        assert_eq!(dispatcher.store().load(locator).unwrap(), b"rendered output");
    }

    #[tokio::test]
    async fn converter_error_message_is_preserved() {
        let dispatcher = dispatcher_with(vec![Arc::new(MockConverter::failing(
            "flaky",
            "font table exploded",
        ))]);
        let outcome = dispatcher.dispatch(&input(), "flaky").await;

        assert!(!outcome.success);
        assert!(
            outcome
                .error_message
                .as_deref()
                .unwrap()
                .contains("font table exploded")
        );
        // Failures are recorded too.
        assert_eq!(dispatcher.history().for_converter("flaky").len(), 1);
    }

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let dispatcher = dispatcher_with(vec![Arc::new(MockConverter::new("Libre", vec![1]))]);
        let outcome = dispatcher.dispatch(&input(), "LIBRE").await;
        assert!(outcome.success);
        // Recorded under the canonical registered name.
        assert_eq!(dispatcher.history().for_converter("Libre").len(), 1);
    }

    #[tokio::test]
    async fn history_keys_are_isolated_and_clearable() {
        let dispatcher = dispatcher_with(vec![
            Arc::new(MockConverter::new("alpha", vec![1])),
            Arc::new(MockConverter::new("beta", vec![2])),
        ]);
        let input = input();

        dispatcher.dispatch(&input, "alpha").await;
        dispatcher.dispatch(&input, "alpha").await;
        dispatcher.dispatch(&input, "beta").await;

        let snapshot = dispatcher.history().snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["alpha"].len(), 2);
        assert_eq!(snapshot["beta"].len(), 1);

        dispatcher.history().clear();
        assert!(dispatcher.history().is_empty());
        assert!(dispatcher.history().snapshot().is_empty());
    }

    #[tokio::test]
    async fn sequenced_outcomes_play_in_order() {
        let converter = Arc::new(MockConverter::with_sequence(
            "seq",
            vec![
                MockOutcome::Output(b"first".to_vec()),
                MockOutcome::Error("second call fails".into()),
            ],
        ));
        let dispatcher = dispatcher_with(vec![converter]);
        let input = input();

        assert!(dispatcher.dispatch(&input, "seq").await.success);
        let second = dispatcher.dispatch(&input, "seq").await;
        assert!(!second.success);
        assert_eq!(dispatcher.history().for_converter("seq").len(), 2);
    }
}
