//! Caption analysis — prompt construction, Bedrock invocation, and strict
//! validation of the model's structured output.
//!
//! `CaptionAnalyzer` is the public entry point. The transport is injected as
//! a trait object so callers (and tests) control the remote side.

pub mod analyzer;
pub mod error;
pub mod glossary;
pub mod parse;
pub mod prompt;
pub mod types;

pub use analyzer::{CaptionAnalyzer, MODEL_ID_ENV};
pub use error::AnalysisError;
pub use parse::parse_analysis;
pub use prompt::build_prompt;
pub use types::{AnalyzeCaptionOptions, CaptionAnalysis, TermExplanation};
