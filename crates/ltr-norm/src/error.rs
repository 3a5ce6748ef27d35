//! Normalizer Error Types

use thiserror::Error;

/// Errors raised while configuring, resolving or validating a normalizer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizerError {
    /// Literal bound or parameter is not a valid float
    #[error("{param}: cannot parse {value:?} as a float")]
    ParseError { param: String, value: String },

    /// Range collapses to a single point, normalization would divide by zero
    #[error("MinMax normalizer delta must not be zero | min = {min}, max = {max}, delta = {delta}")]
    DegenerateRange { min: f32, max: f32, delta: f32 },

    /// Range is infinite or NaN, every normalized value would be meaningless
    #[error("MinMax normalizer range must be finite | min = {min}, max = {max}, delta = {delta}")]
    UnboundedRange { min: f32, max: f32, delta: f32 },

    /// Standard normalizer deviation is zero or negative
    #[error("Standard normalizer std must be positive | avg = {avg}, std = {std}")]
    NonPositiveDeviation { avg: f32, std: f32 },

    /// Placeholder has no value in the request parameters
    #[error("{bound} placeholder ${name} has no value in the request parameters")]
    UnresolvedPlaceholder { bound: &'static str, name: String },

    /// Placeholder sigil with no name after it
    #[error("{0}: placeholder name must not be empty")]
    EmptyPlaceholder(String),

    /// Placeholder given where only literals are allowed
    #[error("{class} does not accept placeholder ${name} for {param}")]
    PlaceholderNotAllowed {
        class: &'static str,
        param: String,
        name: String,
    },

    /// Class identifier does not name a known normalizer
    #[error("Unknown normalizer class: {0}")]
    UnknownClass(String),

    /// Parameter key not understood by the normalizer
    #[error("{class} has no parameter named {param}")]
    UnknownParam { class: &'static str, param: String },

    /// Parameter value is neither a string nor a number
    #[error("Invalid value for parameter {param}: {reason}")]
    InvalidParam { param: String, reason: String },

    /// Configuration source could not be read
    #[error("Failed to load normalizer configuration: {0}")]
    Load(String),
}

impl From<config::ConfigError> for NormalizerError {
    fn from(err: config::ConfigError) -> Self {
        NormalizerError::Load(err.to_string())
    }
}
