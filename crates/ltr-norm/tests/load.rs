use config::Environment;
use ltr_norm::{NormalizerError, NormalizerKind, NormalizerSet, RequestParams, ENV_PREFIX};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("ltr-norm-{}-{name}", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

fn env(vars: &[(&str, &str)]) -> Environment {
    let source: config::Map<String, String> = vars
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Environment::with_prefix(ENV_PREFIX).separator("__").source(Some(source))
}

const PRICE_TOML: &str = r#"
[normalizers.PriceUSD]
class = "DynamicMinMaxNormalizer"

[normalizers.PriceUSD.params]
minParam = "Lo"
max = 500
"#;

#[test]
fn test_load_toml_set() {
    let path = write_temp(
        "set.toml",
        r#"
[normalizers.price]
class = "DynamicMinMaxNormalizer"

[normalizers.price.params]
min = "$price_min"
max = 500

[normalizers.rating]
class = "MinMaxNormalizer"

[normalizers.rating.params]
min = 1
max = "5"
"#,
    );

    let set = NormalizerSet::load(&path).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(set.features().collect::<Vec<_>>(), vec!["price", "rating"]);
    assert_eq!(set.get("price").unwrap().kind(), NormalizerKind::DynamicMinMax);

    let request = set
        .resolve(&RequestParams::new().with("price_min", 100.0))
        .unwrap();
    assert_eq!(request.normalize("price", 300.0), 0.5);
    assert_eq!(request.normalize("rating", 3.0), 0.5);
}

#[test]
fn test_load_json_set() {
    let path = write_temp(
        "set.json",
        r#"{ "normalizers": { "age": { "class": "StandardNormalizer", "params": { "avg": 40, "std": 10 } } } }"#,
    );

    let set = NormalizerSet::load(&path).unwrap();
    fs::remove_file(&path).ok();

    let request = set.resolve(&RequestParams::new()).unwrap();
    assert_eq!(request.normalize("age", 50.0), 1.0);
}

#[test]
fn test_load_rejects_bad_literal() {
    let path = write_temp(
        "bad.json",
        r#"{ "normalizers": { "age": { "class": "MinMaxNormalizer", "params": { "min": "young", "max": 10 } } } }"#,
    );

    let err = NormalizerSet::load(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(matches!(err, NormalizerError::ParseError { .. }));
}

#[test]
fn test_load_missing_file() {
    let err = NormalizerSet::load("/nonexistent/ltr-norm.toml").unwrap_err();
    assert!(matches!(err, NormalizerError::Load(_)));
}

#[test]
fn test_config_round_trip() {
    let set = NormalizerSet::from_json_str(
        r#"{ "normalizers": { "price": { "class": "DynamicMinMaxNormalizer", "params": { "min": 0, "max": "$hi" } } } }"#,
    )
    .unwrap();
    let json = serde_json::to_string(&set.to_config()).unwrap();
    assert_eq!(NormalizerSet::from_json_str(&json).unwrap(), set);
}

#[test]
fn test_load_keeps_feature_case() {
    let path = write_temp("mixed-case.toml", PRICE_TOML);
    let set = NormalizerSet::load_with_env(&path, env(&[])).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(set.features().collect::<Vec<_>>(), vec!["PriceUSD"]);
    let request = set.resolve(&RequestParams::new().with("Lo", 100.0)).unwrap();
    assert_eq!(request.normalize("PriceUSD", 300.0), 0.5);
}

#[test]
fn test_env_override_replaces_literal() {
    let path = write_temp(
        "env.json",
        r#"{ "normalizers": { "price": { "class": "MinMaxNormalizer", "params": { "min": 0, "max": 10 } } } }"#,
    );
    let set = NormalizerSet::load_with_env(&path, env(&[("LTR_NORM__NORMALIZERS__PRICE__PARAMS__MAX", "20")]))
        .unwrap();
    fs::remove_file(&path).ok();

    let request = set.resolve(&RequestParams::new()).unwrap();
    assert_eq!(request.normalize("price", 5.0), 0.25);
    assert_eq!(set.describe()["price"].get("max"), Some("20.0"));
}

#[test]
fn test_env_override_matches_feature_ignoring_case() {
    let path = write_temp("env-case.toml", PRICE_TOML);
    let set = NormalizerSet::load_with_env(
        &path,
        env(&[
            ("LTR_NORM__NORMALIZERS__PRICEUSD__PARAMS__MINPARAM", "Floor"),
            ("LTR_NORM__NORMALIZERS__PRICEUSD__PARAMS__MAX", "300"),
        ]),
    )
    .unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(set.features().collect::<Vec<_>>(), vec!["PriceUSD"]);
    assert_eq!(set.describe()["PriceUSD"].get("minParam"), Some("Floor"));
    let request = set.resolve(&RequestParams::new().with("Floor", 100.0)).unwrap();
    assert_eq!(request.normalize("PriceUSD", 200.0), 0.5);
}

#[test]
fn test_env_override_adds_feature_with_class() {
    let path = write_temp("env-add.toml", PRICE_TOML);
    let set = NormalizerSet::load_with_env(
        &path,
        env(&[
            ("LTR_NORM__NORMALIZERS__AGE__CLASS", "StandardNormalizer"),
            ("LTR_NORM__NORMALIZERS__AGE__PARAMS__STD", "2"),
        ]),
    )
    .unwrap();
    let orphan = NormalizerSet::load_with_env(&path, env(&[("LTR_NORM__NORMALIZERS__AGE__PARAMS__STD", "2")]));
    fs::remove_file(&path).ok();

    assert_eq!(set.get("age").unwrap().kind(), NormalizerKind::Standard);
    assert!(matches!(orphan, Err(NormalizerError::Load(_))));
}

#[test]
fn test_load_rejects_unknown_format() {
    let path = write_temp("set.yaml", "normalizers: {}");
    let err = NormalizerSet::load(&path).unwrap_err();
    fs::remove_file(&path).ok();
    assert!(matches!(err, NormalizerError::Load(_)));
}
