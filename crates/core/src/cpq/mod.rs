pub mod catalog;
pub mod finalize;
pub mod pricing;
pub mod totals;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Mutex, MutexGuard,
};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    domain::{inputs::ProjectInputs, quote::Quote},
    errors::ApplicationError,
    suggestions::{cancel_channel, Recommendation, Recommender, RuleBasedRecommender},
};

use self::{
    finalize::finalize,
    pricing::{DeterministicPricingEngine, PricingEngine},
};

/// Everything produced by one generate action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuote {
    pub base: Quote,
    pub recommendation: Recommendation,
    pub quote: Quote,
}

/// Drives preview and generate for one quote form.
///
/// Each `generate` call starts a new generation and cancels the previous one.
/// A generation that is overtaken while the recommender is still working
/// returns [`ApplicationError::Superseded`] instead of a quote built from
/// outdated inputs.
pub struct QuoteSession<P, R> {
    pricing_engine: P,
    recommender: R,
    generation: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
}

struct InFlight {
    generation: u64,
    cancel: watch::Sender<bool>,
}

impl Default for QuoteSession<DeterministicPricingEngine, RuleBasedRecommender> {
    fn default() -> Self {
        Self::new(DeterministicPricingEngine::default(), RuleBasedRecommender::default())
    }
}

impl<P, R> QuoteSession<P, R>
where
    P: PricingEngine,
    R: Recommender,
{
    pub fn new(pricing_engine: P, recommender: R) -> Self {
        Self {
            pricing_engine,
            recommender,
            generation: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    /// Live estimate from the inputs alone.
    pub fn preview(&self, inputs: &ProjectInputs) -> Quote {
        self.pricing_engine.price(inputs)
    }

    /// Prices the inputs, asks the recommender for add-ons and merges them.
    ///
    /// With `accepted` set, only suggestions whose keys are listed are merged;
    /// the full recommendation is still returned.
    pub async fn generate(
        &self,
        inputs: &ProjectInputs,
        accepted: Option<&[String]>,
    ) -> Result<GeneratedQuote, ApplicationError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let (cancel, signal) = cancel_channel();
        if let Some(previous) = self.swap_in_flight(Some(InFlight { generation, cancel })) {
            let _ = previous.cancel.send(true);
        }

        let base = self.pricing_engine.price(inputs);
        info!(
            event_name = "quote.session.generate_started",
            correlation_id = generation,
            quote_id = %base.id,
            "quote generation started"
        );

        let recommendation = self.recommender.recommend(inputs, &base, signal).await;

        if self.generation.load(Ordering::SeqCst) != generation {
            warn!(
                event_name = "quote.session.generate_superseded",
                correlation_id = generation,
                quote_id = %base.id,
                "discarding recommendation for superseded generation"
            );
            return Err(ApplicationError::Superseded { generation });
        }
        self.clear_in_flight(generation);

        let merged = match accepted {
            Some(keys) => recommendation.retain_accepted(keys),
            None => recommendation.clone(),
        };
        let quote = finalize(&base, &merged, self.pricing_engine.tax_rate());

        info!(
            event_name = "quote.session.generate_completed",
            correlation_id = generation,
            quote_id = %quote.id,
            total = %quote.total,
            "quote generation completed"
        );

        Ok(GeneratedQuote { base, recommendation, quote })
    }

    /// Cancels the in-flight generate, if any. Its caller receives
    /// [`ApplicationError::Superseded`].
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.swap_in_flight(None) {
            let _ = previous.cancel.send(true);
        }
    }

    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn swap_in_flight(&self, next: Option<InFlight>) -> Option<InFlight> {
        let mut slot = self.in_flight_slot();
        std::mem::replace(&mut *slot, next)
    }

    fn clear_in_flight(&self, generation: u64) {
        let mut slot = self.in_flight_slot();
        if slot.as_ref().is_some_and(|current| current.generation == generation) {
            *slot = None;
        }
    }

    fn in_flight_slot(&self) -> MutexGuard<'_, Option<InFlight>> {
        match self.in_flight.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
