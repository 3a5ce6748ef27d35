//! Normalizer configuration documents
//!
//! A definition looks like
//!
//! ```json
//! { "class": "DynamicMinMaxNormalizer", "params": { "min": "$lo", "max": 20 } }
//! ```
//!
//! and a [`NormalizerSet`] maps feature names to such definitions, loaded from
//! a JSON or TOML file with `LTR_NORM__*` environment overrides.
//!
//! Files are parsed as written, so feature names keep their case. The
//! environment overlay arrives lowercased and is matched against the file's
//! feature and parameter names ignoring ASCII case.

use crate::bound::Bound;
use crate::dynamic::DynamicMinMaxNormalizer;
use crate::error::NormalizerError;
use crate::min_max::MinMaxNormalizer;
use crate::normalizer::{Normalizer, NormalizerKind, NormalizerParams, Validate};
use crate::params::ParamSource;
use crate::standard::StandardNormalizer;
use crate::validator::{ValidatedNormalizer, ValidationReport};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Environment prefix for overrides, e.g.
/// `LTR_NORM__NORMALIZERS__PRICE__PARAMS__MAX=500`
pub const ENV_PREFIX: &str = "LTR_NORM";

/// One normalizer definition as it appears in a configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerConfig {
    pub class: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl NormalizerConfig {
    pub fn new(kind: NormalizerKind) -> Self {
        Self {
            class: kind.as_str().to_string(),
            params: Map::new(),
        }
    }

    /// Builder-style parameter
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }
}

impl Normalizer {
    /// Build a definition from configuration and run the load-time checks
    pub fn from_config(config: &NormalizerConfig) -> Result<Self, NormalizerError> {
        let kind = NormalizerKind::from_class(&config.class)?;
        let normalizer = match kind {
            NormalizerKind::Identity => {
                if let Some(param) = config.params.keys().next() {
                    return Err(NormalizerError::UnknownParam {
                        class: kind.as_str(),
                        param: param.clone(),
                    });
                }
                Normalizer::Identity
            }
            NormalizerKind::MinMax => {
                let mut norm = MinMaxNormalizer::default();
                for (param, value) in &config.params {
                    match param.as_str() {
                        "min" => norm.set_min(literal(kind, param, value)?),
                        "max" => norm.set_max(literal(kind, param, value)?),
                        _ => return Err(unknown(kind, param)),
                    }
                }
                Normalizer::MinMax(norm)
            }
            NormalizerKind::Standard => {
                let mut norm = StandardNormalizer::default();
                for (param, value) in &config.params {
                    match param.as_str() {
                        "avg" => norm.set_avg(literal(kind, param, value)?),
                        "std" => norm.set_std(literal(kind, param, value)?),
                        _ => return Err(unknown(kind, param)),
                    }
                }
                Normalizer::Standard(norm)
            }
            NormalizerKind::DynamicMinMax => Normalizer::DynamicMinMax(dynamic_from_params(&config.params)?),
        };

        normalizer.check_definition()?;
        info!(normalizer = %normalizer, "Loaded normalizer definition");
        Ok(normalizer)
    }

    /// Configuration document that rebuilds this definition.
    ///
    /// Non-finite literals are left out since they are the unconfigured
    /// defaults and JSON has no representation for them.
    pub fn to_config(&self) -> NormalizerConfig {
        let mut config = NormalizerConfig::new(self.kind());
        let params = self.describe();
        for (name, value) in params.iter() {
            let Some(value) = value else { continue };
            let entry = match name {
                "minParam" | "maxParam" => Value::String(value.to_string()),
                _ => match value.parse::<f32>() {
                    Ok(number) if number.is_finite() => Value::from(number),
                    _ => continue,
                },
            };
            config.params.insert(name.to_string(), entry);
        }
        config
    }
}

/// Literal bounds are applied before explicit `minParam`/`maxParam` entries,
/// so a document carrying both keeps the placeholder.
fn dynamic_from_params(params: &Map<String, Value>) -> Result<DynamicMinMaxNormalizer, NormalizerError> {
    let kind = NormalizerKind::DynamicMinMax;
    let mut norm = DynamicMinMaxNormalizer::new();
    let mut min_param = None;
    let mut max_param = None;
    for (param, value) in params {
        match param.as_str() {
            "min" => norm.set_min(Bound::from_json(param, value)?),
            "max" => norm.set_max(Bound::from_json(param, value)?),
            // environment overrides arrive lowercased
            "minParam" | "minparam" => min_param = Some(param_name(param, value)?),
            "maxParam" | "maxparam" => max_param = Some(param_name(param, value)?),
            _ => return Err(unknown(kind, param)),
        }
    }
    if let Some(name) = min_param {
        norm.set_min_param(&name)?;
    }
    if let Some(name) = max_param {
        norm.set_max_param(&name)?;
    }
    Ok(norm)
}

fn literal(kind: NormalizerKind, param: &str, value: &Value) -> Result<f32, NormalizerError> {
    match Bound::from_json(param, value)? {
        Bound::Literal(value) => Ok(value),
        Bound::Placeholder(name) => Err(NormalizerError::PlaceholderNotAllowed {
            class: kind.as_str(),
            param: param.to_string(),
            name,
        }),
    }
}

fn param_name(param: &str, value: &Value) -> Result<String, NormalizerError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| NormalizerError::InvalidParam {
            param: param.to_string(),
            reason: format!("expected a placeholder name, got {value}"),
        })
}

fn unknown(kind: NormalizerKind, param: &str) -> NormalizerError {
    NormalizerError::UnknownParam {
        class: kind.as_str(),
        param: param.to_string(),
    }
}

/// File layout read by [`NormalizerSet::load`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerSetConfig {
    #[serde(default)]
    pub normalizers: BTreeMap<String, NormalizerConfig>,
}

impl NormalizerSetConfig {
    /// Parse a JSON or TOML document, keeping keys exactly as written
    pub fn read(path: &Path) -> Result<Self, NormalizerError> {
        let load_err = |reason: String| NormalizerError::Load(format!("{}: {reason}", path.display()));
        let contents = fs::read_to_string(path).map_err(|err| load_err(err.to_string()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&contents).map_err(|err| load_err(err.to_string())),
            Some("toml") => toml::from_str(&contents).map_err(|err| load_err(err.to_string())),
            other => Err(load_err(format!(
                "unsupported format {:?}, expected .json or .toml",
                other.unwrap_or_default()
            ))),
        }
    }

    /// Merge environment overrides into the document. A feature that is not
    /// in the document may only be added with its `class`.
    fn apply(&mut self, overrides: EnvOverrides) -> Result<(), NormalizerError> {
        for (key, entry) in overrides.normalizers {
            let feature = match self.normalizers.keys().find(|f| f.eq_ignore_ascii_case(&key)) {
                Some(feature) => feature.clone(),
                None if entry.class.is_some() => key,
                None => {
                    return Err(NormalizerError::Load(format!(
                        "environment override for unknown feature {key} has no class"
                    )))
                }
            };
            let definition = self.normalizers.entry(feature.clone()).or_insert_with(|| NormalizerConfig {
                class: String::new(),
                params: Map::new(),
            });
            if let Some(class) = entry.class {
                definition.class = class;
            }
            for (param, value) in entry.params {
                let name = definition
                    .params
                    .keys()
                    .find(|name| name.eq_ignore_ascii_case(&param))
                    .cloned()
                    .unwrap_or(param);
                debug!(feature = feature.as_str(), param = name.as_str(), "Applying environment override");
                definition.params.insert(name, value);
            }
        }
        Ok(())
    }
}

/// Shape of the `LTR_NORM__NORMALIZERS__<feature>__...` overlay
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    #[serde(default)]
    normalizers: BTreeMap<String, EnvOverride>,
}

#[derive(Debug, Default, Deserialize)]
struct EnvOverride {
    class: Option<String>,
    #[serde(default)]
    params: Map<String, Value>,
}

/// Normalizer definitions keyed by feature name.
///
/// Built once and shared (behind an `Arc`) by every scoring request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizerSet {
    normalizers: BTreeMap<String, Normalizer>,
}

impl NormalizerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: &str, normalizer: Normalizer) {
        self.normalizers.insert(feature.to_string(), normalizer);
    }

    pub fn get(&self, feature: &str) -> Option<&Normalizer> {
        self.normalizers.get(feature)
    }

    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.normalizers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.normalizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.normalizers.is_empty()
    }

    pub fn from_config(config: &NormalizerSetConfig) -> Result<Self, NormalizerError> {
        let mut set = Self::new();
        for (feature, definition) in &config.normalizers {
            debug!(feature = feature.as_str(), class = definition.class.as_str(), "Loading normalizer");
            set.insert(feature, Normalizer::from_config(definition)?);
        }
        Ok(set)
    }

    pub fn from_json_str(json: &str) -> Result<Self, NormalizerError> {
        let config: NormalizerSetConfig =
            serde_json::from_str(json).map_err(|err| NormalizerError::Load(err.to_string()))?;
        Self::from_config(&config)
    }

    /// Load from a JSON or TOML file (format chosen by extension), with
    /// environment overrides under [`ENV_PREFIX`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NormalizerError> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// [`NormalizerSet::load`] with an explicit environment source
    pub fn load_with_env(path: impl AsRef<Path>, env: Environment) -> Result<Self, NormalizerError> {
        let path = path.as_ref();
        let mut config = NormalizerSetConfig::read(path)?;
        let overrides: EnvOverrides = Config::builder().add_source(env).build()?.try_deserialize()?;
        config.apply(overrides)?;
        let set = Self::from_config(&config)?;
        info!(path = %path.display(), normalizers = set.len(), "Loaded normalizer set");
        Ok(set)
    }

    pub fn to_config(&self) -> NormalizerSetConfig {
        NormalizerSetConfig {
            normalizers: self
                .normalizers
                .iter()
                .map(|(feature, normalizer)| (feature.clone(), normalizer.to_config()))
                .collect(),
        }
    }

    /// `describe()` of every definition, by feature
    pub fn describe(&self) -> BTreeMap<&str, NormalizerParams> {
        self.normalizers
            .iter()
            .map(|(feature, normalizer)| {
                (feature.as_str(), normalizer.describe())
            })
            .collect()
    }

    /// Resolve and validate every definition for one request. Fails on the
    /// first normalizer that cannot be used.
    pub fn resolve<P: ParamSource + ?Sized>(
        &self,
        params: &P,
    ) -> Result<RequestNormalizers, NormalizerError> {
        let mut resolved = BTreeMap::new();
        for (feature, normalizer) in &self.normalizers {
            resolved.insert(feature.clone(), normalizer.prepare(params)?);
        }
        Ok(RequestNormalizers {
            normalizers: resolved,
        })
    }

    /// Check every definition against the request parameters, collecting
    /// all failures instead of stopping at the first
    pub fn check<P: ParamSource + ?Sized>(&self, params: &P) -> ValidationReport {
        let mut report = ValidationReport::new();
        for (feature, normalizer) in &self.normalizers {
            report.record(feature, normalizer.prepare(params).map(|_| ()));
        }
        report
    }
}

/// Normalizers resolved and validated for a single request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNormalizers {
    normalizers: BTreeMap<String, ValidatedNormalizer>,
}

impl RequestNormalizers {
    pub fn get(&self, feature: &str) -> Option<&ValidatedNormalizer> {
        self.normalizers.get(feature)
    }

    /// Normalize a feature value; features without a normalizer pass through
    pub fn normalize(&self, feature: &str, value: f32) -> f32 {
        self.normalizers
            .get(feature)
            .map_or(value, |normalizer| normalizer.normalize(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;
    use serde_json::json;

    fn definition(value: Value) -> Result<Normalizer, NormalizerError> {
        let config: NormalizerConfig = serde_json::from_value(value).unwrap();
        Normalizer::from_config(&config)
    }

    #[test]
    fn test_load_static_minmax() {
        let norm = definition(json!({
            "class": "MinMaxNormalizer",
            "params": { "min": "0", "max": 10 }
        }))
        .unwrap();
        assert_eq!(norm, Normalizer::MinMax(MinMaxNormalizer::new(0.0, 10.0)));
    }

    #[test]
    fn test_load_dynamic_with_placeholder() {
        let norm = definition(json!({
            "class": "org.apache.solr.ltr.norm.DynamicMinMaxNormalizer",
            "params": { "min": "$lo", "max": "20" }
        }))
        .unwrap();
        assert!(!norm.is_resolved());
        let params = RequestParams::new().with("lo", 10.0);
        assert_eq!(norm.prepare(&params).unwrap().normalize(15.0), 0.5);
    }

    #[test]
    fn test_load_errors() {
        assert!(matches!(
            definition(json!({ "class": "MinMaxNormalizer", "params": { "min": "x", "max": 1 } })),
            Err(NormalizerError::ParseError { .. })
        ));
        assert!(matches!(
            definition(json!({ "class": "MinMaxNormalizer", "params": { "min": 1, "max": 1 } })),
            Err(NormalizerError::DegenerateRange { .. })
        ));
        assert!(matches!(
            definition(json!({ "class": "MinMaxNormalizer", "params": { "min": "$lo", "max": 1 } })),
            Err(NormalizerError::PlaceholderNotAllowed { .. })
        ));
        assert!(matches!(
            definition(json!({ "class": "StandardNormalizer", "params": { "mean": 1 } })),
            Err(NormalizerError::UnknownParam { .. })
        ));
        assert!(matches!(
            definition(json!({ "class": "IdentityNormalizer", "params": { "min": 1 } })),
            Err(NormalizerError::UnknownParam { .. })
        ));
        assert!(matches!(
            definition(json!({ "class": "LogNormalizer" })),
            Err(NormalizerError::UnknownClass(_))
        ));
    }

    #[test]
    fn test_explicit_param_keys() {
        let norm = definition(json!({
            "class": "DynamicMinMaxNormalizer",
            "params": { "min": 0, "minParam": "lo", "max": 5 }
        }))
        .unwrap();
        match &norm {
            Normalizer::DynamicMinMax(dynamic) => {
                assert_eq!(dynamic.min(), 0.0);
                assert_eq!(dynamic.min_param(), Some("lo"));
            }
            other => panic!("unexpected normalizer {other:?}"),
        }
    }

    #[test]
    fn test_to_config_rebuilds_definition() {
        let norm = definition(json!({
            "class": "DynamicMinMaxNormalizer",
            "params": { "min": "$lo", "max": 5 }
        }))
        .unwrap();
        let config = norm.to_config();
        assert_eq!(config.params.get("min"), None);
        assert_eq!(config.params.get("minParam"), Some(&json!("lo")));
        assert_eq!(Normalizer::from_config(&config).unwrap(), norm);

        let standard = Normalizer::Standard(StandardNormalizer::new(1.5, 2.0));
        assert_eq!(Normalizer::from_config(&standard.to_config()).unwrap(), standard);
    }

    #[test]
    fn test_set_resolve_per_request() {
        let set = NormalizerSet::from_json_str(
            r#"{
                "normalizers": {
                    "price": { "class": "DynamicMinMaxNormalizer", "params": { "min": "$price_min", "max": "$price_max" } },
                    "popularity": { "class": "StandardNormalizer", "params": { "avg": 50, "std": 10 } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(set.len(), 2);

        let params = RequestParams::new().with("price_min", 0.0).with("price_max", 200.0);
        let request = set.resolve(&params).unwrap();
        assert_eq!(request.normalize("price", 50.0), 0.25);
        assert_eq!(request.normalize("popularity", 60.0), 1.0);
        assert_eq!(request.normalize("unconfigured", 7.0), 7.0);
    }

    #[test]
    fn test_set_check_collects_failures() {
        let mut set = NormalizerSet::new();
        set.insert(
            "price",
            Normalizer::DynamicMinMax(DynamicMinMaxNormalizer::with_bounds(
                Bound::Placeholder("lo".into()),
                Bound::Literal(1.0),
            )),
        );
        set.insert("age", Normalizer::MinMax(MinMaxNormalizer::new(0.0, 90.0)));

        let report = set.check(&RequestParams::new());
        assert!(!report.valid);
        assert_eq!(report.checked, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].0, "price");
        assert!(set.resolve(&RequestParams::new()).is_err());
    }

    #[test]
    fn test_set_describe() {
        let mut set = NormalizerSet::new();
        set.insert("age", Normalizer::MinMax(MinMaxNormalizer::new(0.0, 90.0)));
        let described = set.describe();
        assert_eq!(described["age"].get("max"), Some("90.0"));
    }
}
