//! Conversion fidelity assessment: four independent checks folded into a
//! weighted composite score and a discrete quality tier.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ValidatorConfig;
use crate::introspect::{Document, DocumentProfile, introspect_output, introspect_source};
use crate::similarity::similarity;

/// Minimum normalized text similarity for the text check to pass.
pub const MIN_TEXT_SIMILARITY: f64 = 0.85;

/// Minimum script-character retention for the script check to pass.
pub const MIN_SCRIPT_ACCURACY: f64 = 0.95;

// Composite weights, summing to 1.0. Unit count and structure are
// pass/fail gates; text and script fidelity contribute their continuous
// values.
const WEIGHT_UNIT_COUNT: f64 = 0.2;
const WEIGHT_TEXT: f64 = 0.4;
const WEIGHT_SCRIPT: f64 = 0.3;
const WEIGHT_STRUCTURE: f64 = 0.1;

/// Discrete quality tier derived from the composite score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Excellent,
    Good,
    Fair,
    #[default]
    Poor,
}

impl QualityTier {
    /// Map a composite score to its tier. Boundaries are inclusive at the
    /// lower bound of each tier.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.90 {
            Self::Excellent
        } else if score >= 0.80 {
            Self::Good
        } else if score >= 0.70 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for QualityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Excellent => write!(f, "excellent"),
            Self::Good => write!(f, "good"),
            Self::Fair => write!(f, "fair"),
            Self::Poor => write!(f, "poor"),
        }
    }
}

/// The quality assessment of one converted output against its source.
#[derive(Debug, Clone, Serialize)]
pub struct FidelityReport {
    pub converter_name: String,

    // Unit count
    pub expected_unit_count: usize,
    pub actual_unit_count: usize,
    pub unit_count_accurate: bool,

    // Text content
    pub text_similarity: f64,
    pub text_accurate: bool,

    // Script characters
    pub original_script_chars: usize,
    pub output_script_chars: usize,
    pub script_accuracy: f64,
    pub script_accurate: bool,

    // Structure
    pub structure_intact: bool,

    // Character volumes, for diagnostics
    pub original_char_count: usize,
    pub output_char_count: usize,

    pub overall_score: f64,
    pub quality_tier: QualityTier,

    /// One entry per failed check, in check evaluation order
    /// (unit count, text, script, structure).
    pub issues: Vec<String>,
    /// Set when extraction itself failed; all other fields are zeroed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_error: Option<String>,
}

impl FidelityReport {
    /// Report for an assessment that could not run because extraction
    /// failed. Every measurement is left at its zero value.
    pub fn errored(converter_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            converter_name: converter_name.into(),
            expected_unit_count: 0,
            actual_unit_count: 0,
            unit_count_accurate: false,
            text_similarity: 0.0,
            text_accurate: false,
            original_script_chars: 0,
            output_script_chars: 0,
            script_accuracy: 0.0,
            script_accurate: false,
            structure_intact: false,
            original_char_count: 0,
            output_char_count: 0,
            overall_score: 0.0,
            quality_tier: QualityTier::default(),
            issues: Vec::new(),
            validation_error: Some(message.into()),
        }
    }
}

/// Scores converted outputs against their sources.
///
/// Pure and deterministic over the extracted text; holds only tuning, no
/// per-call state.
#[derive(Debug, Clone, Default)]
pub struct FidelityValidator {
    config: ValidatorConfig,
}

impl FidelityValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a converted output against its source document.
    ///
    /// Extraction failure on either side short-circuits into a report with
    /// `validation_error` set; a malformed output never aborts a benchmark
    /// batch.
    pub fn validate(
        &self,
        source: Document<'_>,
        output: Document<'_>,
        converter_name: &str,
    ) -> FidelityReport {
        let source_profile = match introspect_source(source, &self.config) {
            Ok(p) => p,
            Err(e) => {
                warn!(converter = converter_name, error = %e, "source introspection failed");
                return FidelityReport::errored(converter_name, format!("extraction failed: {e}"));
            }
        };
        let output_profile = match introspect_output(output) {
            Ok(p) => p,
            Err(e) => {
                warn!(converter = converter_name, error = %e, "output introspection failed");
                return FidelityReport::errored(converter_name, format!("extraction failed: {e}"));
            }
        };
        self.assess(&source_profile, &output_profile, converter_name)
    }

    /// Run the four checks over already-introspected profiles.
    pub fn assess(
        &self,
        source: &DocumentProfile,
        output: &DocumentProfile,
        converter_name: &str,
    ) -> FidelityReport {
        let mut issues = Vec::new();

        // 1. Unit count, within tolerance of the volume-based estimate.
        let expected_unit_count = source.unit_count;
        let actual_unit_count = output.unit_count;
        let unit_count_accurate =
            expected_unit_count.abs_diff(actual_unit_count) <= self.config.unit_tolerance;
        if !unit_count_accurate {
            issues.push(format!(
                "unit count mismatch: expected {expected_unit_count}, got {actual_unit_count}"
            ));
        }

        // 2. Text similarity.
        let text_similarity = similarity(&source.text, &output.text);
        let text_accurate = text_similarity >= MIN_TEXT_SIMILARITY;
        if !text_accurate {
            issues.push(format!(
                "text similarity too low: {:.2}% (minimum {:.2}%)",
                text_similarity * 100.0,
                MIN_TEXT_SIMILARITY * 100.0
            ));
        }

        // 3. Script-character retention; vacuously accurate when the source
        // has no characters in the target range.
        let script_accuracy = if source.script_char_count > 0 {
            output.script_char_count as f64 / source.script_char_count as f64
        } else {
            1.0
        };
        let script_accurate = script_accuracy >= MIN_SCRIPT_ACCURACY;
        if !script_accurate {
            issues.push(format!(
                "script character retention too low: {:.2}% (minimum {:.2}%)",
                script_accuracy * 100.0,
                MIN_SCRIPT_ACCURACY * 100.0
            ));
        }

        // 4. Structural non-emptiness.
        let structure_intact = !output.text.trim().is_empty();
        if !structure_intact {
            issues.push("output text is empty or nearly empty".to_string());
        }

        let mut overall_score = 0.0;
        if unit_count_accurate {
            overall_score += WEIGHT_UNIT_COUNT;
        }
        overall_score += WEIGHT_TEXT * text_similarity;
        overall_score += WEIGHT_SCRIPT * script_accuracy;
        if structure_intact {
            overall_score += WEIGHT_STRUCTURE;
        }
        // Script retention above 100% would otherwise push past 1.0.
        let overall_score = overall_score.min(1.0);

        let quality_tier = QualityTier::from_score(overall_score);
        debug!(
            converter = converter_name,
            score = overall_score,
            tier = %quality_tier,
            issues = issues.len(),
            "fidelity assessed"
        );

        FidelityReport {
            converter_name: converter_name.to_string(),
            expected_unit_count,
            actual_unit_count,
            unit_count_accurate,
            text_similarity,
            text_accurate,
            original_script_chars: source.script_char_count,
            output_script_chars: output.script_char_count,
            script_accuracy,
            script_accurate,
            structure_intact,
            original_char_count: source.total_char_count,
            output_char_count: output.total_char_count,
            overall_score,
            quality_tier,
            issues,
            validation_error: None,
        }
    }
}
