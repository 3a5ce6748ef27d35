//! Feature Normalization for Learning-to-Rank Scoring
//!
//! Rescales raw feature values before they reach the ranking model. Min-max
//! bounds may be fixed in configuration or left as `$name` placeholders that
//! each request fills in:
//!
//! configure ([`Normalizer::from_config`]) → resolve ([`Normalizer::resolve`])
//! → validate ([`ValidatedNormalizer::new`]) → normalize.

mod bound;
mod definition;
mod dynamic;
mod error;
mod min_max;
mod normalizer;
mod params;
mod standard;
mod validator;

pub use bound::{format_float, Bound, PLACEHOLDER_SIGIL};
pub use definition::{NormalizerConfig, NormalizerSet, NormalizerSetConfig, RequestNormalizers, ENV_PREFIX};
pub use dynamic::DynamicMinMaxNormalizer;
pub use error::NormalizerError;
pub use min_max::MinMaxNormalizer;
pub use normalizer::{Normalizer, NormalizerKind, NormalizerParams, Validate};
pub use params::{resolve_placeholder, ParamSource, ParamValue, RequestParams};
pub use standard::StandardNormalizer;
pub use validator::{ValidatedNormalizer, ValidationReport};
