//! Min-Max Normalization with literal bounds

use crate::bound::format_float;
use crate::error::NormalizerError;
use crate::normalizer::{NormalizerParams, Validate};

/// Linear rescale of `[min, max]` onto `[0, 1]`.
///
/// Values outside the range extrapolate linearly; nothing is clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxNormalizer {
    min: f32,
    max: f32,
    /// Always `max - min`
    delta: f32,
}

impl MinMaxNormalizer {
    /// Create a normalizer for the literal range `[min, max]`
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            min,
            max,
            delta: max - min,
        }
    }

    /// Get lower bound
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Get upper bound
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Get cached `max - min`
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Set lower bound and recompute delta
    pub fn set_min(&mut self, min: f32) {
        self.min = min;
        self.update_delta();
    }

    /// Set upper bound and recompute delta
    pub fn set_max(&mut self, max: f32) {
        self.max = max;
        self.update_delta();
    }

    /// `(value - min) / delta`, only reached through a validated normalizer
    pub(crate) fn normalize(&self, value: f32) -> f32 {
        (value - self.min) / self.delta
    }

    fn update_delta(&mut self) {
        self.delta = self.max - self.min;
    }
}

/// Unconfigured bounds span the whole float line
impl Default for MinMaxNormalizer {
    fn default() -> Self {
        Self::new(f32::NEG_INFINITY, f32::INFINITY)
    }
}

impl Validate for MinMaxNormalizer {
    fn validate(&self) -> Result<(), NormalizerError> {
        check_range(self.min, self.max, self.delta)
    }

    fn describe(&self) -> NormalizerParams {
        NormalizerParams::new()
            .with("min", Some(format_float(self.min)))
            .with("max", Some(format_float(self.max)))
    }
}

/// Range gate shared by the min-max variants: zero delta divides by zero,
/// a non-finite delta maps every finite input to 0 or NaN.
pub(crate) fn check_range(min: f32, max: f32, delta: f32) -> Result<(), NormalizerError> {
    if delta == 0.0 {
        return Err(NormalizerError::DegenerateRange { min, max, delta });
    }
    if !delta.is_finite() {
        return Err(NormalizerError::UnboundedRange { min, max, delta });
    }
    Ok(())
}
