use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Website,
    Ecommerce,
    Webapp,
    Branding,
    Seo,
    Other,
}

const BASE_FEATURE_OPTIONS: &[&str] = &["cms", "seo", "analytics", "auth"];
const ECOMMERCE_FEATURE_OPTIONS: &[&str] =
    &["cms", "seo", "analytics", "auth", "payments", "shipping", "inventory", "fraud"];
const WEBAPP_FEATURE_OPTIONS: &[&str] =
    &["cms", "seo", "analytics", "auth", "admin", "realtime", "api"];

impl ProjectType {
    /// Feature keys a client can pick for this kind of project.
    pub fn feature_options(self) -> &'static [&'static str] {
        match self {
            Self::Ecommerce => ECOMMERCE_FEATURE_OPTIONS,
            Self::Webapp => WEBAPP_FEATURE_OPTIONS,
            Self::Website | Self::Branding | Self::Seo | Self::Other => BASE_FEATURE_OPTIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Ecommerce => "ecommerce",
            Self::Webapp => "webapp",
            Self::Branding => "branding",
            Self::Seo => "seo",
            Self::Other => "other",
        }
    }

    pub const ALL: [ProjectType; 6] =
        [Self::Website, Self::Ecommerce, Self::Webapp, Self::Branding, Self::Seo, Self::Other];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignComplexity {
    Low,
    Medium,
    High,
}

impl DesignComplexity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Standard,
    Expedited,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "KES")]
    Kes,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Kes => "KES",
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "KES" => Ok(Self::Kes),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            other => Err(format!("unsupported currency `{other}` (expected KES|USD|EUR|GBP)")),
        }
    }
}

/// Structured requirements captured by the quote form.
///
/// The pricing engine assumes `pages >= 0` and `timeline_weeks >= 1`. It does
/// not check either; callers that accept raw user input run [`ProjectInputs::clamped`]
/// first. Page counts above [`MAX_PAGES`] are priced as `MAX_PAGES`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInputs {
    #[serde(default)]
    pub title: String,
    pub project_type: ProjectType,
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub features: BTreeSet<String>,
    pub design_complexity: DesignComplexity,
    #[serde(default = "default_timeline_weeks")]
    pub timeline_weeks: i64,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub target_budget: Option<Decimal>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
}

/// Largest page count a quote is priced for.
pub const MAX_PAGES: i64 = 10_000;

fn default_timeline_weeks() -> i64 {
    1
}

impl ProjectInputs {
    pub fn new(project_type: ProjectType, design_complexity: DesignComplexity) -> Self {
        Self {
            title: String::new(),
            project_type,
            pages: 0,
            features: BTreeSet::new(),
            design_complexity,
            timeline_weeks: default_timeline_weeks(),
            priority: Priority::Standard,
            target_budget: None,
            currency: Currency::default(),
            notes: None,
            contact_name: None,
            contact_email: None,
        }
    }

    pub fn with_pages(mut self, pages: i64) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Floors the numeric fields the same way the input form does and caps
    /// `pages` at [`MAX_PAGES`].
    pub fn clamped(mut self) -> Self {
        self.pages = self.pages.clamp(0, MAX_PAGES);
        self.timeline_weeks = self.timeline_weeks.max(1);
        self
    }
}
