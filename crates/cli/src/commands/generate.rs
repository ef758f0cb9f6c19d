use std::path::Path;

use quotewise_core::config::AppConfig;
use quotewise_core::errors::ApplicationError;

use crate::commands::{
    input::load_inputs, CommandResult, EXIT_CONFIG_VALIDATION, EXIT_INPUT, EXIT_RUNTIME_INIT,
    EXIT_SUPERSEDED,
};

/// Prices the inputs, waits for the recommender and prints the merged quote.
///
/// `accepted` limits which suggested add-ons are merged. Ctrl-C while the
/// recommender is pending cancels the generation.
pub fn run(config: &AppConfig, input: &Path, accepted: Option<Vec<String>>) -> CommandResult {
    let session = match config.session() {
        Ok(session) => session,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG_VALIDATION,
            );
        }
    };

    let inputs = match load_inputs(input, config.pricing.default_currency) {
        Ok(inputs) => inputs,
        Err(error) => {
            return CommandResult::failure("generate", "input", format!("{error:#}"), EXIT_INPUT);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME_INIT,
            );
        }
    };

    let result = runtime.block_on(async {
        let generate = session.generate(&inputs, accepted.as_deref());
        tokio::pin!(generate);

        tokio::select! {
            result = &mut generate => result,
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!(
                    event_name = "cli.generate.interrupted",
                    "interrupt received, cancelling quote generation"
                );
                session.cancel();
                generate.await
            }
        }
    });

    match result {
        Ok(generated) => {
            let message = format!(
                "generated quote {} with {} suggested add-on(s)",
                generated.quote.id,
                generated.recommendation.suggested.len()
            );
            CommandResult::success_with_data("generate", message, &generated)
        }
        Err(error @ ApplicationError::Superseded { .. }) => CommandResult::failure(
            "generate",
            error.error_class(),
            error.to_string(),
            EXIT_SUPERSEDED,
        ),
    }
}
