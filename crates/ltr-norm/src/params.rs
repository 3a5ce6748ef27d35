//! Request-time parameters used to resolve placeholder bounds

use crate::bound::{parse_float, PLACEHOLDER_SIGIL};
use crate::error::NormalizerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// A single request parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f32),
    Text(String),
}

impl ParamValue {
    /// Numeric value, parsing text on demand
    pub fn as_f32(&self, name: &str) -> Result<f32, NormalizerError> {
        match self {
            ParamValue::Number(value) => Ok(*value),
            ParamValue::Text(raw) => parse_float(name, raw),
        }
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Number(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value as f32)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

/// Anything that can answer "what is the value of placeholder `name`"
/// for the current request.
pub trait ParamSource {
    fn param(&self, name: &str) -> Option<ParamValue>;
}

impl ParamSource for HashMap<String, f32> {
    fn param(&self, name: &str) -> Option<ParamValue> {
        self.get(name).copied().map(ParamValue::Number)
    }
}

impl ParamSource for HashMap<String, String> {
    fn param(&self, name: &str) -> Option<ParamValue> {
        self.get(name).cloned().map(ParamValue::Text)
    }
}

/// Parameters supplied with one scoring request.
///
/// Names are stored without the placeholder sigil, so `"$min"` and `"min"`
/// address the same entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams {
    values: HashMap<String, ParamValue>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParamValue>) {
        let name = name.strip_prefix(PLACEHOLDER_SIGIL).unwrap_or(name);
        self.values.insert(name.to_string(), value.into());
    }

    /// Parse a `name=value` pair, as given on a command line
    pub fn insert_pair(&mut self, pair: &str) -> Result<(), NormalizerError> {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| NormalizerError::InvalidParam {
                param: pair.to_string(),
                reason: "expected name=value".to_string(),
            })?;
        let name = name.trim();
        if name.is_empty() || name == "$" {
            return Err(NormalizerError::EmptyPlaceholder(pair.to_string()));
        }
        self.insert(name, value.trim());
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ParamSource for RequestParams {
    fn param(&self, name: &str) -> Option<ParamValue> {
        self.values.get(name).cloned()
    }
}

/// Look up the value for a placeholder bound.
///
/// A missing name is an error: an unresolved bound would leave the range
/// infinite and silently flatten every score.
pub fn resolve_placeholder<P: ParamSource + ?Sized>(
    bound: &'static str,
    name: &str,
    params: &P,
) -> Result<f32, NormalizerError> {
    let value = params
        .param(name)
        .ok_or_else(|| NormalizerError::UnresolvedPlaceholder {
            bound,
            name: name.to_string(),
        })?
        .as_f32(name)?;
    debug!(bound, placeholder = name, value, "Resolved placeholder bound");
    Ok(value)
}
