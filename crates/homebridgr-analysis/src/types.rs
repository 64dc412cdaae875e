//! Caption analysis data types.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TOKENS: u32 = 400;
pub const DEFAULT_TEMPERATURE: f64 = 0.0;
pub const DEFAULT_TOP_P: f64 = 0.999;

/// One confusing term extracted from a caption plus its clarification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermExplanation {
    pub term: String,
    pub explanation: String,
}

/// Result of analyzing a caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptionAnalysis {
    /// Term/explanation pairs in model output order.
    pub terms: Vec<TermExplanation>,
    /// The model's JSON text, verbatim. Never re-serialized from `terms`, so
    /// the output survives auditing even when malformed entries were dropped.
    #[serde(rename = "rawModelText")]
    pub raw_model_text: String,
}

/// Per-call overrides for caption analysis.
///
/// Raw numeric values are accepted as-is and cleaned through the accessor
/// methods; nothing here is shared between calls.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeCaptionOptions {
    #[serde(default, rename = "modelId")]
    pub model_id: Option<String>,
    #[serde(default, rename = "maxTokens")]
    pub max_tokens: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default, rename = "topP")]
    pub top_p: Option<f64>,
}

impl AnalyzeCaptionOptions {
    /// Model id override, if supplied and non-blank.
    pub fn model_override(&self) -> Option<&str> {
        self.model_id
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }

    /// Token budget: floored, positive, defaulting to 400.
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
            .filter(|m| m.is_finite() && *m >= 1.0)
            .map(|m| m.floor() as u32)
            .unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Sampling temperature clamped to [0, 1], defaulting to 0.
    pub fn temperature(&self) -> f64 {
        self.temperature
            .filter(|t| t.is_finite())
            .map(|t| t.clamp(0.0, 1.0))
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Nucleus-sampling cutoff in (0, 1], defaulting to 0.999.
    pub fn top_p(&self) -> f64 {
        self.top_p
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| p.min(1.0))
            .unwrap_or(DEFAULT_TOP_P)
    }
}
