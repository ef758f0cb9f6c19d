//! Types for the recommendation enhancer

use serde::{Deserialize, Serialize};

use crate::domain::quote::QuoteLineItem;

pub const SUMMARY_WITH_ADD_ONS: &str =
    "We recommend add-ons to improve tracking and risk management.";
pub const SUMMARY_WITHOUT_ADD_ONS: &str = "No immediate add-ons suggested.";

/// Optional add-ons proposed for a draft quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Suggested lines, in the order they would be appended to the quote
    pub suggested: Vec<QuoteLineItem>,
    /// Human-readable justification shown next to the suggestions
    pub summary: String,
    /// Confidence in the suggestions (0.0 - 1.0)
    pub confidence: f64,
}

impl Recommendation {
    /// Builds a recommendation whose summary reflects whether anything was suggested.
    pub fn from_suggestions(suggested: Vec<QuoteLineItem>, confidence: f64) -> Self {
        let summary =
            if suggested.is_empty() { SUMMARY_WITHOUT_ADD_ONS } else { SUMMARY_WITH_ADD_ONS };
        Self { suggested, summary: summary.to_string(), confidence }
    }

    /// No suggestions.
    pub fn empty(confidence: f64) -> Self {
        Self::from_suggestions(Vec::new(), confidence)
    }

    pub fn is_empty(&self) -> bool {
        self.suggested.is_empty()
    }

    pub fn suggested_keys(&self) -> Vec<&str> {
        self.suggested.iter().map(|item| item.key.as_str()).collect()
    }

    /// Keeps only the suggestions the client accepted. The summary and
    /// confidence stay as the recommender reported them.
    pub fn retain_accepted<S: AsRef<str>>(&self, accepted: &[S]) -> Self {
        let suggested = self
            .suggested
            .iter()
            .filter(|item| accepted.iter().any(|key| key.as_ref() == item.key))
            .cloned()
            .collect();
        Self { suggested, summary: self.summary.clone(), confidence: self.confidence }
    }
}
