//! Min-Max Normalization with request-resolved bounds
//!
//! Either bound may be a literal or a `$name` placeholder. The configured
//! definition is shared by every request; [`DynamicMinMaxNormalizer::resolve`]
//! copies the literal range and fills in the placeholders for one request,
//! so concurrent requests never see each other's bounds.

use crate::bound::{format_float, placeholder_name, Bound, PLACEHOLDER_SIGIL};
use crate::error::NormalizerError;
use crate::min_max::MinMaxNormalizer;
use crate::normalizer::{NormalizerParams, Validate};
use crate::params::{resolve_placeholder, ParamSource};
use tracing::debug;

/// Min-max normalizer whose bounds may be request placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicMinMaxNormalizer {
    /// Literal range; stale for a bound that has a placeholder
    bounds: MinMaxNormalizer,
    min_param: Option<String>,
    max_param: Option<String>,
}

impl DynamicMinMaxNormalizer {
    /// Unconfigured normalizer spanning `(-inf, +inf)`
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a normalizer with both bounds configured
    pub fn with_bounds(min: Bound, max: Bound) -> Self {
        let mut norm = Self::new();
        norm.set_min(min);
        norm.set_max(max);
        norm
    }

    /// A literal replaces the value and drops any placeholder; a placeholder
    /// only records the name and leaves the literal and delta alone.
    pub fn set_min(&mut self, bound: Bound) {
        match bound {
            Bound::Literal(value) => {
                self.bounds.set_min(value);
                self.min_param = None;
            }
            Bound::Placeholder(name) => self.min_param = Some(name),
        }
    }

    /// Same as [`Self::set_min`] for the upper bound
    pub fn set_max(&mut self, bound: Bound) {
        match bound {
            Bound::Literal(value) => {
                self.bounds.set_max(value);
                self.max_param = None;
            }
            Bound::Placeholder(name) => self.max_param = Some(name),
        }
    }

    /// Parse and set `min` from a configuration string (`"1.5"` or `"$lo"`)
    pub fn set_min_str(&mut self, raw: &str) -> Result<(), NormalizerError> {
        self.set_min(Bound::parse("min", raw)?);
        Ok(())
    }

    /// Parse and set `max` from a configuration string
    pub fn set_max_str(&mut self, raw: &str) -> Result<(), NormalizerError> {
        self.set_max(Bound::parse("max", raw)?);
        Ok(())
    }

    /// Set the placeholder name directly; a leading sigil is accepted
    pub fn set_min_param(&mut self, name: &str) -> Result<(), NormalizerError> {
        let name = name.strip_prefix(PLACEHOLDER_SIGIL).unwrap_or(name);
        self.min_param = Some(placeholder_name("minParam", name)?);
        Ok(())
    }

    /// Set the upper bound placeholder name directly
    pub fn set_max_param(&mut self, name: &str) -> Result<(), NormalizerError> {
        let name = name.strip_prefix(PLACEHOLDER_SIGIL).unwrap_or(name);
        self.max_param = Some(placeholder_name("maxParam", name)?);
        Ok(())
    }

    /// Current literal `min`, possibly the unresolved default
    pub fn min(&self) -> f32 {
        self.bounds.min()
    }

    /// Current literal `max`, possibly the unresolved default
    pub fn max(&self) -> f32 {
        self.bounds.max()
    }

    /// Get cached `max - min` of the literal range
    pub fn delta(&self) -> f32 {
        self.bounds.delta()
    }

    /// Placeholder name for `min`, if any
    pub fn min_param(&self) -> Option<&str> {
        self.min_param.as_deref()
    }

    /// Placeholder name for `max`, if any
    pub fn max_param(&self) -> Option<&str> {
        self.max_param.as_deref()
    }

    /// Rescale against the literal range. Only reachable through a
    /// validated normalizer, which never holds unfilled placeholders.
    pub(crate) fn normalize(&self, value: f32) -> f32 {
        self.bounds.normalize(value)
    }

    /// No placeholders left to fill
    pub fn is_resolved(&self) -> bool {
        self.min_param.is_none() && self.max_param.is_none()
    }

    /// Substitute placeholders from the request parameters into a fresh copy
    /// of the range. Without placeholders this is the configured literal range.
    pub fn resolve<P: ParamSource + ?Sized>(
        &self,
        params: &P,
    ) -> Result<MinMaxNormalizer, NormalizerError> {
        let mut resolved = self.bounds;
        if let Some(name) = &self.min_param {
            resolved.set_min(resolve_placeholder("min", name, params)?);
        }
        if let Some(name) = &self.max_param {
            resolved.set_max(resolve_placeholder("max", name, params)?);
        }
        debug!(
            min = resolved.min(),
            max = resolved.max(),
            delta = resolved.delta(),
            "Resolved dynamic min-max range"
        );
        Ok(resolved)
    }
}

impl Validate for DynamicMinMaxNormalizer {
    fn validate(&self) -> Result<(), NormalizerError> {
        if let Some(name) = &self.min_param {
            return Err(NormalizerError::UnresolvedPlaceholder {
                bound: "min",
                name: name.clone(),
            });
        }
        if let Some(name) = &self.max_param {
            return Err(NormalizerError::UnresolvedPlaceholder {
                bound: "max",
                name: name.clone(),
            });
        }
        self.bounds.validate()
    }

    fn describe(&self) -> NormalizerParams {
        NormalizerParams::new()
            .with("min", Some(format_float(self.min())))
            .with("max", Some(format_float(self.max())))
            .with("minParam", self.min_param.clone())
            .with("maxParam", self.max_param.clone())
    }
}
