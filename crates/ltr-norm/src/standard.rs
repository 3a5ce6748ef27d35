//! Z-score Normalization with configured mean and deviation

use crate::bound::format_float;
use crate::error::NormalizerError;
use crate::normalizer::{NormalizerParams, Validate};

/// `(value - avg) / std`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardNormalizer {
    avg: f32,
    std: f32,
}

impl StandardNormalizer {
    /// Create a normalizer with the given mean and deviation
    pub fn new(avg: f32, std: f32) -> Self {
        Self { avg, std }
    }

    /// Get mean
    pub fn avg(&self) -> f32 {
        self.avg
    }

    /// Get standard deviation
    pub fn std(&self) -> f32 {
        self.std
    }

    /// Set mean
    pub fn set_avg(&mut self, avg: f32) {
        self.avg = avg;
    }

    /// Set standard deviation
    pub fn set_std(&mut self, std: f32) {
        self.std = std;
    }

    pub(crate) fn normalize(&self, value: f32) -> f32 {
        (value - self.avg) / self.std
    }
}

impl Default for StandardNormalizer {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

impl Validate for StandardNormalizer {
    fn validate(&self) -> Result<(), NormalizerError> {
        // also rejects NaN
        if !(self.std > 0.0) {
            return Err(NormalizerError::NonPositiveDeviation {
                avg: self.avg,
                std: self.std,
            });
        }
        Ok(())
    }

    fn describe(&self) -> NormalizerParams {
        NormalizerParams::new()
            .with("avg", Some(format_float(self.avg)))
            .with("std", Some(format_float(self.std)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zscore_normalization() {
        let norm = StandardNormalizer::new(100.0, 10.0);
        assert!(norm.validate().is_ok());
        assert_eq!(norm.normalize(100.0), 0.0);
        assert_eq!(norm.normalize(110.0), 1.0);
        assert_eq!(norm.normalize(80.0), -2.0);
    }

    #[test]
    fn test_default_is_identity_like() {
        let norm = StandardNormalizer::default();
        assert_eq!(norm.normalize(3.5), 3.5);
    }

    #[test]
    fn test_non_positive_std() {
        assert!(StandardNormalizer::new(0.0, 0.0).validate().is_err());
        assert!(StandardNormalizer::new(0.0, -1.0).validate().is_err());
        assert!(StandardNormalizer::new(0.0, f32::NAN).validate().is_err());
    }

    #[test]
    fn test_describe_order() {
        let params = StandardNormalizer::new(1.0, 2.0).describe();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["avg", "std"]);
    }
}
