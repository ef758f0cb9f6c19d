use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use quotewise_core::config::{AppConfig, ConfigOverrides};
use toml::Value;

/// Renders effective configuration values with the source each one came from.
///
/// `overrides` are the values passed on the command line; they are reported as
/// `cli` sources ahead of env, file and default.
pub fn run(
    config: &AppConfig,
    explicit_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> String {
    let config_file_path = detect_config_path(explicit_path);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        if let Some(flag) = override_flag(overrides, key_path) {
            return format!("cli ({flag})");
        }
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.tax_rate",
        &config.pricing.tax_rate.to_string(),
        source("pricing.tax_rate", &["QUOTEWISE_PRICING_TAX_RATE"]),
    ));
    lines.push(render_line(
        "pricing.default_currency",
        config.pricing.default_currency.code(),
        source("pricing.default_currency", &["QUOTEWISE_PRICING_DEFAULT_CURRENCY"]),
    ));

    match config.catalog() {
        Ok(catalog) => {
            for (key, price) in catalog.entries() {
                let key_path = format!("catalog.{}", key.as_str());
                lines.push(render_line(&key_path, &price.to_string(), source(&key_path, &[])));
            }
        }
        Err(error) => lines.push(format!("- catalog = <invalid: {error}>")),
    }

    lines.push(render_line(
        "recommender.latency_ms",
        &config.recommender.latency_ms.to_string(),
        source("recommender.latency_ms", &["QUOTEWISE_RECOMMENDER_LATENCY_MS"]),
    ));
    lines.push(render_line(
        "recommender.confidence",
        &config.recommender.confidence.to_string(),
        source("recommender.confidence", &["QUOTEWISE_RECOMMENDER_CONFIDENCE"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["QUOTEWISE_LOGGING_LEVEL", "QUOTEWISE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        &format!("{:?}", config.logging.format).to_ascii_lowercase(),
        source("logging.format", &["QUOTEWISE_LOGGING_FORMAT", "QUOTEWISE_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn override_flag(overrides: &ConfigOverrides, key_path: &str) -> Option<&'static str> {
    match key_path {
        "logging.level" => overrides.log_level.as_ref().map(|_| "--log-level"),
        "recommender.latency_ms" => overrides.recommender_latency_ms.map(|_| "--latency-ms"),
        _ => None,
    }
}

fn detect_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("quotewise.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/quotewise.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
