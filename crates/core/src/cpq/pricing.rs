use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cpq::{
        catalog::{Catalog, CatalogKey},
        totals::{calculate_totals, round_whole, DEFAULT_TAX_RATE},
    },
    domain::{
        inputs::{DesignComplexity, Priority, ProjectInputs, ProjectType, MAX_PAGES},
        quote::{Quote, QuoteId, QuoteLineItem, QuoteStage},
    },
};

/// Amount the design multiplier is applied to when computing the design surcharge.
const DESIGN_SURCHARGE_BASE: i64 = 50_000;

/// Recognized feature keys in the order their lines are emitted.
const FEATURE_LINES: [(&str, CatalogKey, &str); 4] = [
    ("cms", CatalogKey::CmsIntegration, "CMS Integration"),
    ("payments", CatalogKey::Payments, "Payment Gateway"),
    ("auth", CatalogKey::Auth, "Authentication & Authorization"),
    ("admin", CatalogKey::AdminDashboard, "Admin Dashboard"),
];

fn contingency_rate() -> Decimal {
    Decimal::new(7, 2)
}

fn design_multiplier(complexity: DesignComplexity) -> Decimal {
    match complexity {
        DesignComplexity::Low => Decimal::ONE,
        DesignComplexity::Medium => Decimal::new(12, 1),
        DesignComplexity::High => Decimal::new(15, 1),
    }
}

fn timeline_multiplier(priority: Priority) -> Decimal {
    match priority {
        Priority::Standard => Decimal::ONE,
        Priority::Expedited => Decimal::new(125, 2),
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub quote_id: QuoteId,
    pub currency: String,
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    fn record(&mut self, stage: &str, detail: impl Into<String>, amount: Decimal) {
        self.steps.push(PricingTraceStep {
            stage: stage.to_string(),
            detail: detail.into(),
            amount,
        });
    }

    pub fn step(&self, stage: &str) -> Option<&PricingTraceStep> {
        self.steps.iter().find(|step| step.stage == stage)
    }
}

pub trait PricingEngine: Send + Sync {
    fn price(&self, inputs: &ProjectInputs) -> Quote;

    fn tax_rate(&self) -> Decimal {
        DEFAULT_TAX_RATE
    }
}

/// Rule-based pricing over an injected [`Catalog`].
///
/// Pricing is deterministic for fixed inputs and catalog: only the quote id and
/// timestamp differ between calls.
#[derive(Clone, Debug)]
pub struct DeterministicPricingEngine {
    catalog: Catalog,
    tax_rate: Decimal,
}

impl Default for DeterministicPricingEngine {
    fn default() -> Self {
        Self::new(Catalog::default())
    }
}

impl PricingEngine for DeterministicPricingEngine {
    fn price(&self, inputs: &ProjectInputs) -> Quote {
        self.price_with_trace(inputs).0
    }

    fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }
}

impl DeterministicPricingEngine {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, tax_rate: DEFAULT_TAX_RATE }
    }

    pub fn with_tax_rate(mut self, tax_rate: Decimal) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn price_with_trace(&self, inputs: &ProjectInputs) -> (Quote, PricingTrace) {
        let generated_at = Utc::now();
        let id = QuoteId::generate(generated_at);
        let mut trace = PricingTrace {
            quote_id: id.clone(),
            currency: inputs.currency.code().to_string(),
            steps: Vec::new(),
        };
        let mut items = Vec::new();

        let base = self.base_package(inputs.project_type);
        trace.record("base", base.key.clone(), base.total);
        items.push(base);

        let pages = inputs.pages.min(MAX_PAGES);
        if pages > 0 {
            let line = QuoteLineItem::priced(
                "pages",
                format!("Pages ({pages})"),
                Decimal::from(pages),
                self.catalog.unit_price(CatalogKey::Page),
            );
            trace.record("pages", format!("{pages} x page"), line.total);
            items.push(line);
        }

        for (feature, key, label) in FEATURE_LINES {
            if inputs.has_feature(feature) {
                let line =
                    QuoteLineItem::surcharge(key.as_str(), label, self.catalog.unit_price(key));
                trace.record("feature", key.as_str(), line.total);
                items.push(line);
            }
        }

        let complexity = design_multiplier(inputs.design_complexity);
        let design_extra =
            round_whole(Decimal::from(DESIGN_SURCHARGE_BASE) * (complexity - Decimal::ONE));
        if design_extra > Decimal::ZERO {
            trace.record("design", inputs.design_complexity.as_str(), design_extra);
            items.push(QuoteLineItem::surcharge(
                "design_complexity",
                format!("Design ({})", inputs.design_complexity.as_str()),
                design_extra,
            ));
        }

        let raw_subtotal =
            items.iter().fold(Decimal::ZERO, |sum, item| sum.saturating_add(item.total));
        trace.record("raw_subtotal", "sum of lines before buffer", raw_subtotal);

        // Appended even when zero, unlike the design and adjustment lines.
        let contingency = round_whole(raw_subtotal.saturating_mul(contingency_rate()));
        trace.record("contingency", "7% of raw subtotal", contingency);
        items.push(QuoteLineItem::surcharge("contingency", "Contingency Buffer (7%)", contingency));

        let adjustment_rate = (timeline_multiplier(inputs.priority) - Decimal::ONE)
            + (complexity - Decimal::ONE) * Decimal::new(5, 1);
        let adjustment = round_whole(raw_subtotal.saturating_mul(adjustment_rate));
        if adjustment > Decimal::ZERO {
            trace.record("adjustment", format!("{adjustment_rate} of raw subtotal"), adjustment);
            items.push(QuoteLineItem::surcharge(
                "adjustment",
                "Timeline & Complexity Adjustment",
                adjustment,
            ));
        }

        let totals = calculate_totals(&items, self.tax_rate);
        trace.record("subtotal", "sum of billable lines", totals.subtotal);
        trace.record("tax", format!("{} of taxable amount", totals.tax_rate), totals.tax);
        trace.record("total", "subtotal + tax", totals.total);

        debug!(
            event_name = "quote.pricing.priced",
            quote_id = %id,
            project_type = inputs.project_type.as_str(),
            line_count = items.len(),
            total = %totals.total,
            "draft quote priced"
        );

        let quote = Quote {
            id,
            currency: inputs.currency,
            stage: QuoteStage::Draft,
            line_items: items,
            subtotal: totals.subtotal,
            tax: totals.tax,
            total: totals.total,
            ai_notes: None,
            confidence: None,
            generated_at,
        };

        (quote, trace)
    }

    fn base_package(&self, project_type: ProjectType) -> QuoteLineItem {
        // Everything that is not e-commerce or branding is priced as a website.
        let (key, label) = match project_type {
            ProjectType::Ecommerce => (CatalogKey::EcommerceBase, "E-commerce Platform (base)"),
            ProjectType::Branding => (CatalogKey::BrandingPackage, "Branding Package"),
            ProjectType::Website | ProjectType::Webapp | ProjectType::Seo | ProjectType::Other => {
                (CatalogKey::WebsiteBase, "Website Base")
            }
        };
        QuoteLineItem::surcharge(key.as_str(), label, self.catalog.unit_price(key))
    }
}
