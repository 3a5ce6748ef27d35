//! Range bounds declared either as literals or as request placeholders

use crate::error::NormalizerError;
use serde_json::Value;
use std::fmt;

/// Prefix marking a bound as a placeholder resolved per request
pub const PLACEHOLDER_SIGIL: char = '$';

/// A configured bound
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// Value fixed at configuration time
    Literal(f32),
    /// Name looked up in the request parameters, stored without the sigil
    Placeholder(String),
}

impl Bound {
    /// Parse a raw configuration string. `"$name"` is a placeholder, anything
    /// else must be a float.
    pub fn parse(param: &str, raw: &str) -> Result<Self, NormalizerError> {
        let raw = raw.trim();
        match raw.strip_prefix(PLACEHOLDER_SIGIL) {
            Some(name) => placeholder_name(param, name).map(Bound::Placeholder),
            None => parse_float(param, raw).map(Bound::Literal),
        }
    }

    /// Read a bound from a configuration document value (string or number)
    pub fn from_json(param: &str, value: &Value) -> Result<Self, NormalizerError> {
        match value {
            Value::String(raw) => Self::parse(param, raw),
            other => json_number(param, other).map(Bound::Literal),
        }
    }

    /// Placeholder name, if this bound is one
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Bound::Literal(_) => None,
            Bound::Placeholder(name) => Some(name),
        }
    }
}

impl From<f32> for Bound {
    fn from(value: f32) -> Self {
        Bound::Literal(value)
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Literal(value) => f.write_str(&format_float(*value)),
            Bound::Placeholder(name) => write!(f, "{PLACEHOLDER_SIGIL}{name}"),
        }
    }
}

/// Validate a placeholder name (sigil already stripped). Names are
/// identifiers: a letter or `_`, then letters, digits or `_`.
pub(crate) fn placeholder_name(param: &str, name: &str) -> Result<String, NormalizerError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(NormalizerError::EmptyPlaceholder(param.to_string()));
    };
    let is_identifier =
        (first.is_alphabetic() || first == '_') && chars.all(|c| c.is_alphanumeric() || c == '_');
    if !is_identifier {
        return Err(NormalizerError::ParseError {
            param: param.to_string(),
            value: format!("{PLACEHOLDER_SIGIL}{name}"),
        });
    }
    Ok(name.to_string())
}

pub(crate) fn parse_float(param: &str, raw: &str) -> Result<f32, NormalizerError> {
    raw.trim()
        .parse::<f32>()
        .map_err(|_| NormalizerError::ParseError {
            param: param.to_string(),
            value: raw.to_string(),
        })
}

/// Literal-only parameter: numbers or numeric strings
pub(crate) fn json_number(param: &str, value: &Value) -> Result<f32, NormalizerError> {
    match value {
        Value::Number(number) => number
            .as_f64()
            .map(|v| v as f32)
            .ok_or_else(|| NormalizerError::InvalidParam {
                param: param.to_string(),
                reason: format!("{number} is not representable as a float"),
            }),
        Value::String(raw) => parse_float(param, raw),
        other => Err(NormalizerError::InvalidParam {
            param: param.to_string(),
            reason: format!("expected a number or string, got {other}"),
        }),
    }
}

/// Render a float the way the ranking tooling expects (`10.0`, `-Infinity`)
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f32::INFINITY {
        "Infinity".to_string()
    } else if value == f32::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{value:?}")
    }
}
