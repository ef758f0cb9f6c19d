//! Recommendation enhancer
//!
//! Proposes optional add-on lines for a draft quote. The shipped implementation
//! is a deterministic rule table ([`RuleBasedRecommender`]) with a configurable
//! delay standing in for a remote assistant call; anything implementing
//! [`Recommender`] can replace it.

mod rules;
mod types;

use async_trait::async_trait;
use tokio::sync::watch;

pub use rules::RuleBasedRecommender;
pub use types::*;

use crate::domain::{inputs::ProjectInputs, quote::Quote};

/// Confidence reported by the rule table
pub const DEFAULT_CONFIDENCE: f64 = 0.88;

/// Simulated assistant latency in milliseconds
pub const DEFAULT_LATENCY_MS: u64 = 600;

/// Flips to `true` when the caller no longer wants the result.
pub type CancelSignal = watch::Receiver<bool>;

/// Creates a cancel sender and the signal handed to [`Recommender::recommend`].
pub fn cancel_channel() -> (watch::Sender<bool>, CancelSignal) {
    watch::channel(false)
}

#[async_trait]
pub trait Recommender: Send + Sync {
    /// Never fails. A cancelled call resolves with an empty recommendation.
    async fn recommend(
        &self,
        inputs: &ProjectInputs,
        base: &Quote,
        cancel: CancelSignal,
    ) -> Recommendation;
}
