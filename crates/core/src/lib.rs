pub mod config;
pub mod cpq;
pub mod domain;
pub mod errors;
pub mod suggestions;

pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use cpq::catalog::{Catalog, CatalogKey};
pub use cpq::finalize::finalize;
pub use cpq::pricing::{DeterministicPricingEngine, PricingEngine, PricingTrace};
pub use cpq::totals::{calculate_totals, QuoteTotals};
pub use cpq::{GeneratedQuote, QuoteSession};
pub use domain::inputs::{Currency, DesignComplexity, Priority, ProjectInputs, ProjectType};
pub use domain::quote::{Quote, QuoteId, QuoteLineItem, QuoteStage};
pub use errors::{ApplicationError, DomainError};
pub use suggestions::{Recommendation, Recommender, RuleBasedRecommender};
