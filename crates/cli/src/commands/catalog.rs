use std::collections::BTreeMap;

use quotewise_core::config::AppConfig;
use quotewise_core::domain::inputs::ProjectType;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG_VALIDATION};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogListing {
    prices: BTreeMap<&'static str, Decimal>,
    feature_options: BTreeMap<&'static str, &'static [&'static str]>,
}

/// Lists effective catalog prices and the feature keys offered per project type.
pub fn run(config: &AppConfig) -> CommandResult {
    let catalog = match config.catalog() {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(
                "catalog",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG_VALIDATION,
            );
        }
    };

    let listing = CatalogListing {
        prices: catalog.entries().map(|(key, price)| (key.as_str(), price)).collect(),
        feature_options: ProjectType::ALL
            .into_iter()
            .map(|project_type| (project_type.as_str(), project_type.feature_options()))
            .collect(),
    };

    let message = format!("{} catalog entries", listing.prices.len());
    CommandResult::success_with_data("catalog", message, &listing)
}
