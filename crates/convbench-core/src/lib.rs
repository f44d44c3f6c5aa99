use serde::Serialize;

pub mod benchmark;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod fidelity;
pub mod introspect;
pub mod mock;
pub mod similarity;

// Re-export for convenience
pub use benchmark::{BenchmarkReport, benchmark_all, benchmark_with_validation};
pub use config::ValidatorConfig;
pub use convert::{
    ArtifactStore, ConversionInput, ConvertError, Converter, ConverterRegistry, StoreError,
};
pub use dispatch::{ConversionHistory, Dispatcher};
pub use fidelity::{
    FidelityReport, FidelityValidator, MIN_SCRIPT_ACCURACY, MIN_TEXT_SIMILARITY, QualityTier,
};
pub use introspect::{
    Document, DocumentProfile, ExtractError, SCRIPT_RANGE, TextExtractor, count_script_chars,
    estimate_unit_count, introspect_output, introspect_source,
};
pub use similarity::{normalize_text, similarity};

/// The normalized record of one converter invocation.
///
/// Exactly one of the two shapes holds: a success carries an artifact
/// locator, a failure carries an error message. Instances are immutable
/// once built; the dispatcher appends them to [`ConversionHistory`].
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutcome {
    pub success: bool,
    /// Converter identity (the registered name for known converters, the
    /// requested name when the lookup itself failed).
    pub method: String,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
    /// Input size in bytes; 0 when the attempt failed before reading it.
    pub original_size: u64,
    /// Artifact size in bytes; 0 on failure.
    pub output_size: u64,
    /// Opaque reference to the stored artifact; `None` on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConversionOutcome {
    /// Build a success outcome.
    pub fn success(
        method: impl Into<String>,
        duration_ms: u64,
        original_size: u64,
        output_size: u64,
        artifact: impl Into<String>,
    ) -> Self {
        Self {
            success: true,
            method: method.into(),
            duration_ms,
            original_size,
            output_size,
            artifact: Some(artifact.into()),
            error_message: None,
        }
    }

    /// Build a failure outcome.
    pub fn failure(
        method: impl Into<String>,
        duration_ms: u64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            method: method.into(),
            duration_ms,
            original_size: 0,
            output_size: 0,
            artifact: None,
            error_message: Some(error_message.into()),
        }
    }
}
