use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    cpq::totals::calculate_totals,
    domain::quote::{Quote, QuoteStage},
    suggestions::Recommendation,
};

/// Merges a draft quote with the recommender's add-ons.
///
/// Suggested lines are appended after every base line and totals are
/// recomputed over the merged sequence. The quote keeps the draft's id,
/// currency and timestamp; notes and confidence come from the recommendation.
///
/// Call once per draft. Finalizing an already merged quote appends the
/// suggestions a second time.
pub fn finalize(base: &Quote, recommendation: &Recommendation, tax_rate: Decimal) -> Quote {
    let line_items: Vec<_> =
        base.line_items.iter().chain(recommendation.suggested.iter()).cloned().collect();
    let totals = calculate_totals(&line_items, tax_rate);

    debug!(
        event_name = "quote.finalize.merged",
        quote_id = %base.id,
        base_lines = base.line_items.len(),
        suggested_lines = recommendation.suggested.len(),
        total = %totals.total,
        "quote finalized"
    );

    Quote {
        id: base.id.clone(),
        currency: base.currency,
        stage: QuoteStage::Final,
        line_items,
        subtotal: totals.subtotal,
        tax: totals.tax,
        total: totals.total,
        ai_notes: Some(recommendation.summary.clone()),
        confidence: Some(recommendation.confidence),
        generated_at: base.generated_at,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::finalize;
    use crate::{
        cpq::{
            pricing::{DeterministicPricingEngine, PricingEngine},
            totals::DEFAULT_TAX_RATE,
        },
        domain::{
            inputs::{Currency, DesignComplexity, ProjectInputs, ProjectType},
            quote::{QuoteLineItem, QuoteStage},
        },
        suggestions::{Recommendation, RuleBasedRecommender, SUMMARY_WITH_ADD_ONS},
    };

    fn worked_example() -> ProjectInputs {
        ProjectInputs::new(ProjectType::Website, DesignComplexity::Medium)
            .with_pages(5)
            .with_features(["seo"])
    }

    #[test]
    fn appends_suggestions_after_base_lines_and_recomputes_totals() {
        let inputs = worked_example();
        let base = DeterministicPricingEngine::default().price(&inputs);
        let recommendation = Recommendation::from_suggestions(
            RuleBasedRecommender::default().suggest(&inputs),
            0.88,
        );

        let merged = finalize(&base, &recommendation, DEFAULT_TAX_RATE);

        assert_eq!(
            merged.line_items.len(),
            base.line_items.len() + recommendation.suggested.len()
        );
        assert_eq!(&merged.line_items[..base.line_items.len()], &base.line_items[..]);
        assert_eq!(merged.line_items.last().map(|line| line.key.as_str()), Some("analytics"));
        // 117000 + 20000
        assert_eq!(merged.subtotal, Decimal::from(137_000));
        assert_eq!(merged.tax, Decimal::from(16_440));
        assert_eq!(merged.total, Decimal::from(153_440));
    }

    #[test]
    fn keeps_identity_and_overwrites_assistant_fields() {
        let inputs = worked_example().with_currency(Currency::Usd);
        let base = DeterministicPricingEngine::default().price(&inputs);
        let recommendation = Recommendation::from_suggestions(
            RuleBasedRecommender::default().suggest(&inputs),
            0.75,
        );

        let merged = finalize(&base, &recommendation, DEFAULT_TAX_RATE);

        assert_eq!(merged.id, base.id);
        assert_eq!(merged.currency, Currency::Usd);
        assert_eq!(merged.generated_at, base.generated_at);
        assert_eq!(merged.stage, QuoteStage::Final);
        assert_eq!(merged.ai_notes.as_deref(), Some(SUMMARY_WITH_ADD_ONS));
        assert_eq!(merged.confidence, Some(0.75));
        assert_eq!(base.stage, QuoteStage::Draft);
    }

    #[test]
    fn empty_recommendation_keeps_base_totals() {
        let base = DeterministicPricingEngine::default().price(&worked_example());
        let merged = finalize(&base, &Recommendation::empty(0.88), DEFAULT_TAX_RATE);

        assert_eq!(merged.line_items, base.line_items);
        assert_eq!(
            (merged.subtotal, merged.tax, merged.total),
            (base.subtotal, base.tax, base.total)
        );
    }

    #[test]
    fn tax_exempt_suggestions_are_excluded_from_tax_only() {
        let base = DeterministicPricingEngine::default().price(&worked_example());
        let exempt =
            QuoteLineItem::surcharge("hosting_credit", "Hosting credit", Decimal::from(1_000))
                .tax_exempt();
        let recommendation = Recommendation::from_suggestions(vec![exempt], 0.88);

        let merged = finalize(&base, &recommendation, DEFAULT_TAX_RATE);

        assert_eq!(merged.subtotal, base.subtotal + Decimal::from(1_000));
        assert_eq!(merged.tax, base.tax);
    }

    #[test]
    fn finalizing_twice_duplicates_suggestions() {
        let inputs = worked_example();
        let base = DeterministicPricingEngine::default().price(&inputs);
        let recommendation = Recommendation::from_suggestions(
            RuleBasedRecommender::default().suggest(&inputs),
            0.88,
        );

        let once = finalize(&base, &recommendation, DEFAULT_TAX_RATE);
        let twice = finalize(&once, &recommendation, DEFAULT_TAX_RATE);

        assert_eq!(twice.line_items.len(), base.line_items.len() + 2);
        assert_eq!(twice.line_items.iter().filter(|line| line.key == "analytics").count(), 2);
    }
}
