//! Normalizer contract and the closed set of normalizer kinds

use crate::dynamic::DynamicMinMaxNormalizer;
use crate::error::NormalizerError;
use crate::min_max::MinMaxNormalizer;
use crate::params::ParamSource;
use crate::standard::StandardNormalizer;
use crate::validator::ValidatedNormalizer;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// Checks and diagnostics shared by every normalizer kind.
///
/// Rescaling is not part of this trait: the only public way to normalize a
/// value is [`ValidatedNormalizer::normalize`], which cannot be built from a
/// normalizer that fails `validate`.
pub trait Validate {
    /// Check the configuration-level invariants
    fn validate(&self) -> Result<(), NormalizerError>;

    /// Parameters in a fixed order, for diagnostics and re-serialization
    fn describe(&self) -> NormalizerParams;
}

/// Ordered parameter listing produced by [`Validate::describe`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizerParams {
    entries: Vec<(&'static str, Option<String>)>,
}

impl NormalizerParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter; `None` marks a known but unset parameter
    pub fn with(mut self, name: &'static str, value: Option<String>) -> Self {
        self.entries.push((name, value));
        self
    }

    /// Value of a parameter, `None` when absent or unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(key, _)| *key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        self.entries.iter().map(|(key, value)| (*key, value.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for NormalizerParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Normalizer type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalizerKind {
    Identity,
    MinMax,
    Standard,
    DynamicMinMax,
}

impl NormalizerKind {
    /// Class name used in configuration documents
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizerKind::Identity => "IdentityNormalizer",
            NormalizerKind::MinMax => "MinMaxNormalizer",
            NormalizerKind::Standard => "StandardNormalizer",
            NormalizerKind::DynamicMinMax => "DynamicMinMaxNormalizer",
        }
    }

    /// Match a class identifier on its last `.`-separated segment, so fully
    /// qualified names from existing model stores are accepted.
    pub fn from_class(class: &str) -> Result<Self, NormalizerError> {
        let simple = class.trim().rsplit('.').next().unwrap_or_default();
        [
            NormalizerKind::Identity,
            NormalizerKind::MinMax,
            NormalizerKind::Standard,
            NormalizerKind::DynamicMinMax,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == simple)
        .ok_or_else(|| NormalizerError::UnknownClass(class.to_string()))
    }
}

impl fmt::Display for NormalizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured normalizer definition.
///
/// Immutable once built and safe to share across requests; per-request
/// work happens on the value returned by [`Normalizer::resolve`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Normalizer {
    /// Passes values through unchanged
    #[default]
    Identity,
    MinMax(MinMaxNormalizer),
    Standard(StandardNormalizer),
    DynamicMinMax(DynamicMinMaxNormalizer),
}

impl Normalizer {
    pub fn kind(&self) -> NormalizerKind {
        match self {
            Normalizer::Identity => NormalizerKind::Identity,
            Normalizer::MinMax(_) => NormalizerKind::MinMax,
            Normalizer::Standard(_) => NormalizerKind::Standard,
            Normalizer::DynamicMinMax(_) => NormalizerKind::DynamicMinMax,
        }
    }

    /// Whether every bound is known without request parameters
    pub fn is_resolved(&self) -> bool {
        match self {
            Normalizer::DynamicMinMax(dynamic) => dynamic.is_resolved(),
            _ => true,
        }
    }

    /// Produce a request-scoped copy with every placeholder substituted.
    /// Dynamic normalizers resolve to a plain min-max normalizer; the
    /// definition itself is never modified.
    pub fn resolve<P: ParamSource + ?Sized>(&self, params: &P) -> Result<Normalizer, NormalizerError> {
        match self {
            Normalizer::DynamicMinMax(dynamic) => dynamic.resolve(params).map(Normalizer::MinMax),
            other => Ok(other.clone()),
        }
    }

    /// Resolve then pass through the validation gate
    pub fn prepare<P: ParamSource + ?Sized>(
        &self,
        params: &P,
    ) -> Result<ValidatedNormalizer, NormalizerError> {
        ValidatedNormalizer::new(self.resolve(params)?)
    }

    /// Validation done when a definition is loaded. Range checks on
    /// definitions that still have placeholders wait for resolution.
    pub fn check_definition(&self) -> Result<(), NormalizerError> {
        if self.is_resolved() {
            self.validate()
        } else {
            Ok(())
        }
    }
}

impl Normalizer {
    /// Rescale a value; callers hold a [`ValidatedNormalizer`]
    pub(crate) fn normalize(&self, value: f32) -> f32 {
        match self {
            Normalizer::Identity => value,
            Normalizer::MinMax(n) => n.normalize(value),
            Normalizer::Standard(n) => n.normalize(value),
            Normalizer::DynamicMinMax(n) => n.normalize(value),
        }
    }
}

impl Validate for Normalizer {
    fn validate(&self) -> Result<(), NormalizerError> {
        match self {
            Normalizer::Identity => Ok(()),
            Normalizer::MinMax(n) => n.validate(),
            Normalizer::Standard(n) => n.validate(),
            Normalizer::DynamicMinMax(n) => n.validate(),
        }
    }

    fn describe(&self) -> NormalizerParams {
        match self {
            Normalizer::Identity => NormalizerParams::new(),
            Normalizer::MinMax(n) => n.describe(),
            Normalizer::Standard(n) => n.describe(),
            Normalizer::DynamicMinMax(n) => n.describe(),
        }
    }
}

impl From<MinMaxNormalizer> for Normalizer {
    fn from(n: MinMaxNormalizer) -> Self {
        Normalizer::MinMax(n)
    }
}

impl From<StandardNormalizer> for Normalizer {
    fn from(n: StandardNormalizer) -> Self {
        Normalizer::Standard(n)
    }
}

impl From<DynamicMinMaxNormalizer> for Normalizer {
    fn from(n: DynamicMinMaxNormalizer) -> Self {
        Normalizer::DynamicMinMax(n)
    }
}

/// `Kind(name=value,...)`, listing only the set parameters
impl fmt::Display for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        let params = self.describe();
        let mut first = true;
        for (key, value) in params.iter() {
            if let Some(value) = value {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{key}={value}")?;
                first = false;
            }
        }
        f.write_str(")")
    }
}
