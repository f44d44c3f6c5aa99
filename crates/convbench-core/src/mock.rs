//! Mock converter and artifact store for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;

use crate::convert::{ArtifactStore, ConversionInput, ConvertError, Converter, StoreError};

/// A configurable mock response for [`MockConverter`].
#[derive(Clone, Debug)]
pub enum MockOutcome {
    /// Simulate a successful conversion producing these artifact bytes.
    Output(Vec<u8>),
    /// Simulate a converter failure.
    Error(String),
}

/// A hand-rolled mock implementing [`Converter`] for tests.
///
/// Supports:
/// - A fixed outcome (used for every call), **or**
/// - A sequence of outcomes (one per call, cycling the last if exhausted).
/// - Optional per-call latency.
/// - Call counting via [`call_count()`](MockConverter::call_count).
pub struct MockConverter {
    name: &'static str,
    available: bool,
    /// If non-empty, each call pops the next outcome.
    outcomes: Mutex<Vec<MockOutcome>>,
    /// Fallback when the sequence is empty (or single-outcome mode).
    fallback: MockOutcome,
    delay: Option<Duration>,
    call_count: AtomicUsize,
}

impl MockConverter {
    /// Create an available mock that always produces `output`.
    pub fn new(name: &'static str, output: Vec<u8>) -> Self {
        Self::with_fallback(name, true, MockOutcome::Output(output))
    }

    /// Create an available mock that always fails with `message`.
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self::with_fallback(name, true, MockOutcome::Error(message.into()))
    }

    /// Create a mock whose `is_available()` reports false.
    pub fn unavailable(name: &'static str) -> Self {
        Self::with_fallback(name, false, MockOutcome::Error("unavailable".into()))
    }

    /// Create a mock that yields outcomes in order, repeating the last one.
    pub fn with_sequence(name: &'static str, mut outcomes: Vec<MockOutcome>) -> Self {
        assert!(
            !outcomes.is_empty(),
            "sequence must have at least one outcome"
        );
        // Reverse so we can pop() from the front cheaply.
        outcomes.reverse();
        let fallback = outcomes.first().cloned().unwrap();
        Self {
            name,
            available: true,
            outcomes: Mutex::new(outcomes),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    fn with_fallback(name: &'static str, available: bool, fallback: MockOutcome) -> Self {
        Self {
            name,
            available,
            outcomes: Mutex::new(Vec::new()),
            fallback,
            delay: None,
            call_count: AtomicUsize::new(0),
        }
    }

    /// Set simulated conversion latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many times `convert()` has been called.
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_outcome(&self) -> MockOutcome {
        let mut seq = self.outcomes.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl Converter for MockConverter {
    fn name(&self) -> &str {
        self.name
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn convert<'a>(
        &'a self,
        _input: &'a ConversionInput,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, ConvertError>> + Send + 'a>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let outcome = self.next_outcome();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }

            match outcome {
                MockOutcome::Output(bytes) => Ok(bytes),
                MockOutcome::Error(msg) => Err(ConvertError::Failed(msg)),
            }
        })
    }
}

/// In-memory [`ArtifactStore`] for tests; locators are `mem:<file-name>`.
#[derive(Default)]
pub struct MemoryStore {
    artifacts: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let locator = format!("mem:{file_name}");
        self.artifacts.insert(locator.clone(), bytes.to_vec());
        Ok(locator)
    }

    fn load(&self, locator: &str) -> Result<Vec<u8>, StoreError> {
        self.artifacts
            .get(locator)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(locator.to_string()))
    }
}
