//! Validation Gate
//!
//! Scoring only ever sees a [`ValidatedNormalizer`]. A normalizer that fails
//! validation never becomes one, so there is no way to call `normalize` on
//! a degenerate or unresolved range from the request path.

use crate::error::NormalizerError;
use crate::normalizer::{Normalizer, NormalizerParams, Validate};
use tracing::warn;

/// A resolved normalizer whose range passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedNormalizer {
    inner: Normalizer,
}

impl ValidatedNormalizer {
    /// Admit a normalizer through the gate
    pub fn new(normalizer: Normalizer) -> Result<Self, NormalizerError> {
        if let Err(err) = normalizer.validate() {
            warn!(normalizer = %normalizer, error = %err, "Normalizer rejected by validation");
            return Err(err);
        }
        Ok(Self { inner: normalizer })
    }

    /// Rescale a raw feature value
    pub fn normalize(&self, value: f32) -> f32 {
        self.inner.normalize(value)
    }

    /// Normalize a batch of feature values for one request
    pub fn normalize_all(&self, values: &[f32]) -> Vec<f32> {
        values.iter().map(|&value| self.inner.normalize(value)).collect()
    }

    /// Parameters of the admitted normalizer
    pub fn describe(&self) -> NormalizerParams {
        self.inner.describe()
    }

    /// The admitted normalizer, for diagnostics
    pub fn inner(&self) -> &Normalizer {
        &self.inner
    }
}

/// Outcome of checking a set of normalizers against one request's parameters
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Whether every normalizer can be used
    pub valid: bool,
    /// Failures, keyed by feature name
    pub errors: Vec<(String, NormalizerError)>,
    /// Number of normalizers checked
    pub checked: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            checked: 0,
        }
    }

    /// Record one check
    pub fn record(&mut self, feature: &str, result: Result<(), NormalizerError>) {
        self.checked += 1;
        if let Err(err) = result {
            self.valid = false;
            self.errors.push((feature.to_string(), err));
        }
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::DynamicMinMaxNormalizer;
    use crate::min_max::MinMaxNormalizer;

    #[test]
    fn test_valid_normalizer_admitted() {
        let gate = ValidatedNormalizer::new(MinMaxNormalizer::new(0.0, 4.0).into()).unwrap();
        assert_eq!(gate.normalize(1.0), 0.25);
        assert_eq!(gate.normalize_all(&[0.0, 2.0, 4.0]), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_degenerate_rejected() {
        let err = ValidatedNormalizer::new(MinMaxNormalizer::new(3.0, 3.0).into()).unwrap_err();
        assert!(matches!(err, NormalizerError::DegenerateRange { .. }));
    }

    #[test]
    fn test_unresolved_rejected() {
        let mut dynamic = DynamicMinMaxNormalizer::new();
        dynamic.set_min_str("$lo").unwrap();
        dynamic.set_max_str("1").unwrap();
        assert!(matches!(
            ValidatedNormalizer::new(dynamic.into()),
            Err(NormalizerError::UnresolvedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_report() {
        let mut report = ValidationReport::new();
        report.record("price", Ok(()));
        report.record(
            "age",
            Err(NormalizerError::DegenerateRange {
                min: 1.0,
                max: 1.0,
                delta: 0.0,
            }),
        );
        assert!(!report.valid);
        assert_eq!(report.checked, 2);
        assert_eq!(report.errors[0].0, "age");
    }
}
