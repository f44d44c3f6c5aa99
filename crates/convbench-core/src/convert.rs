//! Converter capability trait, the typed registry over it, and the
//! artifact-store boundary.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

/// Error raised by a converter backend during `convert`.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("conversion failed: {0}")]
    Failed(String),
    #[error("conversion timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One logical input document.
///
/// The full content is held in an immutable shared buffer, so every
/// converter in a batch reads the same bytes from the start; there is no
/// stream position for a prior converter to consume.
#[derive(Debug, Clone)]
pub struct ConversionInput {
    file_name: String,
    bytes: Arc<[u8]>,
}

impl ConversionInput {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// File name without its final extension.
    pub fn stem(&self) -> &str {
        self.file_name
            .rsplit_once('.')
            .map_or(self.file_name.as_str(), |(stem, _)| stem)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A document-conversion backend.
///
/// Implementations are black boxes to the harness: `convert` either
/// returns a complete artifact or fails. `name` and `is_available` must be
/// deterministic for the lifetime of the registry.
pub trait Converter: Send + Sync {
    /// Canonical name of this converter (e.g. "libreoffice", "poi").
    /// Registry lookups match it case-insensitively.
    fn name(&self) -> &str;

    /// Whether the backend is ready to convert (binary installed, license
    /// present, service reachable).
    fn is_available(&self) -> bool;

    /// Render `input` into the output format, returning the artifact bytes.
    fn convert<'a>(
        &'a self,
        input: &'a ConversionInput,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<u8>, ConvertError>> + Send + 'a>>;

    /// Extension for artifacts produced by this converter, without the dot.
    fn output_extension(&self) -> &str {
        "out"
    }
}

/// Converter backends in registration order.
///
/// Resolved once at startup; the dispatcher looks converters up by name
/// and the benchmark loop iterates them in the order they were registered.
#[derive(Default, Clone)]
pub struct ConverterRegistry {
    converters: Vec<Arc<dyn Converter>>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, converter: Arc<dyn Converter>) {
        self.converters.push(converter);
    }

    /// Case-insensitive exact-name lookup.
    pub fn find(&self, name: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// All converters, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Converter>> {
        self.converters.iter()
    }

    /// Names of the converters currently reporting themselves available.
    pub fn available_names(&self) -> Vec<String> {
        self.converters
            .iter()
            .filter(|c| c.is_available())
            .map(|c| c.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no artifact at locator: {0}")]
    NotFound(String),
}

/// Persists produced artifacts and hands back an opaque locator.
///
/// What a locator means (a path, an object key, a URL) is the store's
/// business; the harness only threads it through outcomes and reads
/// artifacts back for fidelity validation.
pub trait ArtifactStore: Send + Sync {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, StoreError>;

    fn load(&self, locator: &str) -> Result<Vec<u8>, StoreError>;
}
