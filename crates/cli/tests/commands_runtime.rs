use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use quotewise_cli::commands::{catalog, config as config_command, generate, price};
use quotewise_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::TempDir;

const WORKED_EXAMPLE: &str = r#"{
    "title": "Studio site",
    "projectType": "website",
    "pages": 5,
    "features": ["seo"],
    "designComplexity": "medium",
    "timelineWeeks": 4,
    "priority": "standard"
}"#;

#[test]
fn price_returns_worked_example_totals() {
    let (_dir, input) = write_input("project.json", WORKED_EXAMPLE);

    let result = price::run(&AppConfig::default(), &input, false);
    assert_eq!(result.exit_code, 0, "expected successful price run");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "price");
    assert_eq!(payload["status"], "ok");

    let quote = &payload["data"]["quote"];
    assert_eq!(quote["stage"], "draft");
    assert_eq!(quote["currency"], "KES");
    assert_eq!(decimal_field(&quote["subtotal"]), Decimal::from(117_000));
    assert_eq!(decimal_field(&quote["tax"]), Decimal::from(14_040));
    assert_eq!(decimal_field(&quote["total"]), Decimal::from(131_040));
    assert!(payload["data"].get("trace").is_none());
}

#[test]
fn price_with_trace_includes_pricing_steps() {
    let (_dir, input) = write_input("project.json", WORKED_EXAMPLE);

    let result = price::run(&AppConfig::default(), &input, true);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let steps = payload["data"]["trace"]["steps"].as_array().expect("trace steps");
    assert!(steps.iter().any(|step| step["stage"] == "contingency"));
    assert_eq!(payload["data"]["trace"]["quote_id"], payload["data"]["quote"]["id"]);
}

#[test]
fn price_reads_toml_inputs() {
    let (_dir, input) = write_input(
        "project.toml",
        r#"
projectType = "ecommerce"
designComplexity = "high"
features = ["payments"]
priority = "expedited"
"#,
    );

    let result = price::run(&AppConfig::default(), &input, false);
    assert_eq!(result.exit_code, 0);

    let quote = &parse_payload(&result.output)["data"]["quote"];
    assert_eq!(decimal_field(&quote["subtotal"]), Decimal::from(211_950));
    assert_eq!(decimal_field(&quote["total"]), Decimal::from(237_384));
}

#[test]
fn price_reports_input_failure_for_missing_file() {
    let dir = TempDir::new().expect("temp dir");
    let missing = dir.path().join("absent.json");

    let result = price::run(&AppConfig::default(), &missing, false);
    assert_eq!(result.exit_code, 4, "expected input failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "input");
}

#[test]
fn price_reports_input_failure_for_unknown_project_type() {
    let (_dir, input) =
        write_input("project.json", r#"{"projectType":"spaceship","designComplexity":"low"}"#);

    let result = price::run(&AppConfig::default(), &input, false);
    assert_eq!(result.exit_code, 4);
    assert_eq!(parse_payload(&result.output)["error_class"], "input");
}

#[test]
fn generate_merges_suggestions_into_final_quote() {
    let (_dir, input) = write_input("project.json", WORKED_EXAMPLE);

    let result = generate::run(&instant_config(), &input, None);
    assert_eq!(result.exit_code, 0, "expected successful generate run");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "generate");

    let data = &payload["data"];
    assert_eq!(data["base"]["stage"], "draft");
    assert_eq!(data["quote"]["stage"], "final");
    assert_eq!(data["quote"]["id"], data["base"]["id"]);
    assert_eq!(decimal_field(&data["quote"]["subtotal"]), Decimal::from(137_000));
    assert_eq!(decimal_field(&data["quote"]["total"]), Decimal::from(153_440));
    assert_eq!(data["recommendation"]["suggested"][0]["key"], "analytics");
}

#[test]
fn generate_merges_only_accepted_keys() {
    let (_dir, input) = write_input(
        "project.json",
        r#"{"projectType":"ecommerce","designComplexity":"low","features":["payments"]}"#,
    );

    let result = generate::run(&instant_config(), &input, Some(vec!["fraud_protection".into()]));
    assert_eq!(result.exit_code, 0);

    let data = &parse_payload(&result.output)["data"];
    let merged_keys: Vec<&str> = data["quote"]["lineItems"]
        .as_array()
        .expect("line items")
        .iter()
        .filter_map(|line| line["key"].as_str())
        .collect();
    assert!(merged_keys.contains(&"fraud_protection"));
    assert!(!merged_keys.contains(&"analytics"));
    assert_eq!(data["recommendation"]["suggested"].as_array().map(Vec::len), Some(2));
}

#[test]
fn catalog_lists_effective_prices() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("quotewise.toml");
        fs::write(&path, "[catalog]\nanalytics = 25000\n").expect("write config");
        let config = AppConfig::load(LoadOptions {
            config_path: Some(path),
            require_file: true,
            ..LoadOptions::default()
        })
        .expect("config loads");

        let result = catalog::run(&config);
        assert_eq!(result.exit_code, 0);

        let data = &parse_payload(&result.output)["data"];
        assert_eq!(decimal_field(&data["prices"]["analytics"]), Decimal::from(25_000));
        assert_eq!(decimal_field(&data["prices"]["website_base"]), Decimal::from(15_000));
        assert_eq!(data["featureOptions"]["ecommerce"].as_array().map(Vec::len), Some(8));
    });
}

#[test]
fn config_reports_env_and_default_sources() {
    with_env(&[("QUOTEWISE_PRICING_TAX_RATE", "0.16")], || {
        let config = AppConfig::load(LoadOptions::default()).expect("config loads");
        let output = config_command::run(&config, None, &ConfigOverrides::default());

        assert!(output
            .contains("- pricing.tax_rate = 0.16 (source: env (QUOTEWISE_PRICING_TAX_RATE))"));
        assert!(output.contains("- recommender.latency_ms = 600 (source: default)"));
        assert!(output.contains("- catalog.page = 15000 (source: default)"));
    });
}

#[test]
fn config_attributes_command_line_overrides_to_cli() {
    with_env(&[("QUOTEWISE_LOG_LEVEL", "warn")], || {
        let overrides =
            ConfigOverrides { log_level: Some("debug".to_string()), recommender_latency_ms: None };
        let config = AppConfig::load(LoadOptions {
            overrides: overrides.clone(),
            ..LoadOptions::default()
        })
        .expect("config loads");

        let output = config_command::run(&config, None, &overrides);

        assert!(output.contains("source precedence: cli > env > file > default"));
        assert!(output.contains("- logging.level = debug (source: cli (--log-level))"));
        assert!(output.contains("- recommender.latency_ms = 600 (source: default)"));
    });
}

#[test]
fn invalid_env_config_fails_to_load() {
    with_env(&[("QUOTEWISE_RECOMMENDER_CONFIDENCE", "1.5")], || {
        let error = AppConfig::load(LoadOptions::default()).expect_err("confidence out of range");
        assert!(error.to_string().contains("recommender.confidence"));
    });
}

fn instant_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.recommender.latency_ms = 0;
    config
}

fn write_input(name: &str, body: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(name);
    fs::write(&path, body).expect("write input");
    (dir, path)
}

fn decimal_field(value: &Value) -> Decimal {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    text.parse().expect("money fields should be decimals")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "QUOTEWISE_PRICING_TAX_RATE",
        "QUOTEWISE_PRICING_DEFAULT_CURRENCY",
        "QUOTEWISE_RECOMMENDER_LATENCY_MS",
        "QUOTEWISE_RECOMMENDER_CONFIDENCE",
        "QUOTEWISE_LOGGING_LEVEL",
        "QUOTEWISE_LOGGING_FORMAT",
        "QUOTEWISE_LOG_LEVEL",
        "QUOTEWISE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
