//! Rule table behind the assistant suggestions

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use super::{CancelSignal, Recommendation, Recommender, DEFAULT_CONFIDENCE, DEFAULT_LATENCY_MS};
use crate::{
    cpq::catalog::{Catalog, CatalogKey},
    domain::{
        inputs::{ProjectInputs, ProjectType},
        quote::{Quote, QuoteLineItem},
    },
};

/// Deterministic add-on rules behind a simulated response delay.
///
/// The suggestions depend on the inputs only; the base quote is used for
/// correlation in logs.
#[derive(Debug, Clone)]
pub struct RuleBasedRecommender {
    catalog: Catalog,
    latency: Duration,
    confidence: f64,
}

impl Default for RuleBasedRecommender {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl RuleBasedRecommender {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            latency: Duration::from_millis(DEFAULT_LATENCY_MS),
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    /// Responds without any delay.
    pub fn instant(catalog: Catalog) -> Self {
        Self::new(catalog).with_latency(Duration::ZERO)
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Applies the rule table without waiting.
    pub fn suggest(&self, inputs: &ProjectInputs) -> Vec<QuoteLineItem> {
        let mut suggested = Vec::new();

        if !inputs.has_feature("analytics") {
            suggested.push(
                QuoteLineItem::surcharge(
                    CatalogKey::Analytics.as_str(),
                    "Analytics & Tracking Setup",
                    self.catalog.unit_price(CatalogKey::Analytics),
                )
                .with_notes("Recommended for conversion tracking and insights"),
            );
        }

        if inputs.project_type == ProjectType::Ecommerce && !inputs.has_feature("fraud") {
            suggested.push(
                QuoteLineItem::surcharge(
                    CatalogKey::FraudProtection.as_str(),
                    "Fraud protection & chargeback defenses",
                    self.catalog.unit_price(CatalogKey::FraudProtection),
                )
                .with_notes("Recommended for mid-to-high transaction stores"),
            );
        }

        suggested
    }
}

#[async_trait]
impl Recommender for RuleBasedRecommender {
    async fn recommend(
        &self,
        inputs: &ProjectInputs,
        base: &Quote,
        cancel: CancelSignal,
    ) -> Recommendation {
        if !wait_unless_cancelled(self.latency, cancel).await {
            info!(
                event_name = "quote.recommendation.cancelled",
                quote_id = %base.id,
                "recommendation cancelled before completion"
            );
            return Recommendation::empty(self.confidence);
        }

        let recommendation =
            Recommendation::from_suggestions(self.suggest(inputs), self.confidence);
        debug!(
            event_name = "quote.recommendation.completed",
            quote_id = %base.id,
            suggestion_count = recommendation.suggested.len(),
            confidence = recommendation.confidence,
            "recommendation completed"
        );
        recommendation
    }
}

/// Returns `false` if the signal fired before `latency` elapsed.
async fn wait_unless_cancelled(latency: Duration, mut cancel: CancelSignal) -> bool {
    if *cancel.borrow() {
        return false;
    }
    if latency.is_zero() {
        return true;
    }

    tokio::select! {
        _ = tokio::time::sleep(latency) => true,
        _ = cancelled(&mut cancel) => false,
    }
}

async fn cancelled(cancel: &mut CancelSignal) {
    let sender_dropped = cancel.wait_for(|flag| *flag).await.is_err();
    if sender_dropped {
        // Nobody can cancel any more; let the delay decide.
        std::future::pending::<()>().await;
    }
}
