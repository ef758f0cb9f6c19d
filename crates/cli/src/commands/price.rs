use std::path::Path;

use quotewise_core::config::AppConfig;
use quotewise_core::cpq::pricing::{PricingEngine, PricingTrace};
use quotewise_core::domain::quote::Quote;
use serde::Serialize;

use crate::commands::{input::load_inputs, CommandResult, EXIT_CONFIG_VALIDATION, EXIT_INPUT};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PricedQuote {
    quote: Quote,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace: Option<PricingTrace>,
}

/// Prices an input file into a draft quote without contacting the recommender.
pub fn run(config: &AppConfig, input: &Path, with_trace: bool) -> CommandResult {
    let engine = match config.pricing_engine() {
        Ok(engine) => engine,
        Err(error) => {
            return CommandResult::failure(
                "price",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG_VALIDATION,
            );
        }
    };

    let inputs = match load_inputs(input, config.pricing.default_currency) {
        Ok(inputs) => inputs,
        Err(error) => {
            return CommandResult::failure("price", "input", format!("{error:#}"), EXIT_INPUT);
        }
    };

    let payload = if with_trace {
        let (quote, trace) = engine.price_with_trace(&inputs);
        PricedQuote { quote, trace: Some(trace) }
    } else {
        PricedQuote { quote: engine.price(&inputs), trace: None }
    };

    let message = format!("priced draft quote {}", payload.quote.id);
    CommandResult::success_with_data("price", message, &payload)
}
