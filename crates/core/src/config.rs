use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cpq::{
    catalog::{Catalog, CatalogKey},
    pricing::DeterministicPricingEngine,
    totals::DEFAULT_TAX_RATE,
    QuoteSession,
};
use crate::domain::inputs::Currency;
use crate::suggestions::{RuleBasedRecommender, DEFAULT_CONFIDENCE, DEFAULT_LATENCY_MS};

const MAX_RECOMMENDER_LATENCY_MS: u64 = 60_000;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub pricing: PricingConfig,
    pub catalog: CatalogConfig,
    pub recommender: RecommenderConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    /// Used when a project input leaves out its currency.
    pub default_currency: Currency,
}

/// Price overrides applied on top of the built-in catalog, keyed by catalog key.
#[derive(Clone, Debug, Default)]
pub struct CatalogConfig {
    pub prices: BTreeMap<String, Decimal>,
}

#[derive(Clone, Debug)]
pub struct RecommenderConfig {
    pub latency_ms: u64,
    pub confidence: f64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub recommender_latency_ms: Option<u64>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pricing: PricingConfig {
                tax_rate: DEFAULT_TAX_RATE,
                default_currency: Currency::default(),
            },
            catalog: CatalogConfig::default(),
            recommender: RecommenderConfig {
                latency_ms: DEFAULT_LATENCY_MS,
                confidence: DEFAULT_CONFIDENCE,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("quotewise.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Built-in catalog with the configured price overrides applied.
    pub fn catalog(&self) -> Result<Catalog, ConfigError> {
        let mut catalog = Catalog::default();
        for (name, price) in &self.catalog.prices {
            let key = name
                .parse::<CatalogKey>()
                .map_err(|error| ConfigError::Validation(format!("catalog: {error}")))?;
            catalog = catalog
                .with_price(key, *price)
                .map_err(|error| ConfigError::Validation(format!("catalog: {error}")))?;
        }
        Ok(catalog)
    }

    pub fn recommender_latency(&self) -> Duration {
        Duration::from_millis(self.recommender.latency_ms)
    }

    pub fn pricing_engine(&self) -> Result<DeterministicPricingEngine, ConfigError> {
        Ok(DeterministicPricingEngine::new(self.catalog()?).with_tax_rate(self.pricing.tax_rate))
    }

    pub fn recommender(&self) -> Result<RuleBasedRecommender, ConfigError> {
        Ok(RuleBasedRecommender::new(self.catalog()?)
            .with_latency(self.recommender_latency())
            .with_confidence(self.recommender.confidence))
    }

    pub fn session(
        &self,
    ) -> Result<QuoteSession<DeterministicPricingEngine, RuleBasedRecommender>, ConfigError> {
        Ok(QuoteSession::new(self.pricing_engine()?, self.recommender()?))
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(pricing) = patch.pricing {
            if let Some(tax_rate) = pricing.tax_rate {
                self.pricing.tax_rate = tax_rate;
            }
            if let Some(currency) = pricing.default_currency {
                self.pricing.default_currency = currency;
            }
        }

        if let Some(prices) = patch.catalog {
            self.catalog.prices.extend(prices);
        }

        if let Some(recommender) = patch.recommender {
            if let Some(latency_ms) = recommender.latency_ms {
                self.recommender.latency_ms = latency_ms;
            }
            if let Some(confidence) = recommender.confidence {
                self.recommender.confidence = confidence;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("QUOTEWISE_PRICING_TAX_RATE") {
            self.pricing.tax_rate = parse_decimal("QUOTEWISE_PRICING_TAX_RATE", &value)?;
        }
        if let Some(value) = read_env("QUOTEWISE_PRICING_DEFAULT_CURRENCY") {
            self.pricing.default_currency = value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "QUOTEWISE_PRICING_DEFAULT_CURRENCY".to_string(),
                    value: value.clone(),
                }
            })?;
        }

        if let Some(value) = read_env("QUOTEWISE_RECOMMENDER_LATENCY_MS") {
            self.recommender.latency_ms = parse_u64("QUOTEWISE_RECOMMENDER_LATENCY_MS", &value)?;
        }
        if let Some(value) = read_env("QUOTEWISE_RECOMMENDER_CONFIDENCE") {
            self.recommender.confidence = parse_f64("QUOTEWISE_RECOMMENDER_CONFIDENCE", &value)?;
        }

        let log_level =
            read_env("QUOTEWISE_LOGGING_LEVEL").or_else(|| read_env("QUOTEWISE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("QUOTEWISE_LOGGING_FORMAT").or_else(|| read_env("QUOTEWISE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(latency_ms) = overrides.recommender_latency_ms {
            self.recommender.latency_ms = latency_ms;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_pricing(&self.pricing)?;
        self.catalog()?;
        validate_recommender(&self.recommender)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("quotewise.toml"), PathBuf::from("config/quotewise.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_pricing(pricing: &PricingConfig) -> Result<(), ConfigError> {
    if pricing.tax_rate < Decimal::ZERO {
        return Err(ConfigError::Validation(
            "pricing.tax_rate must not be negative".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommender(recommender: &RecommenderConfig) -> Result<(), ConfigError> {
    if recommender.latency_ms > MAX_RECOMMENDER_LATENCY_MS {
        return Err(ConfigError::Validation(format!(
            "recommender.latency_ms must be in range 0..={MAX_RECOMMENDER_LATENCY_MS}"
        )));
    }

    if !(0.0..=1.0).contains(&recommender.confidence) {
        return Err(ConfigError::Validation(
            "recommender.confidence must be in range 0.0..=1.0".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    pricing: Option<PricingPatch>,
    catalog: Option<BTreeMap<String, Decimal>>,
    recommender: Option<RecommenderPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    tax_rate: Option<Decimal>,
    default_currency: Option<Currency>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommenderPatch {
    latency_ms: Option<u64>,
    confidence: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
