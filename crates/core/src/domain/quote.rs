use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::inputs::Currency;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(pub String);

impl QuoteId {
    /// `q_` followed by the base36 millisecond timestamp and a short random suffix.
    pub fn generate(at: DateTime<Utc>) -> Self {
        let millis = u64::try_from(at.timestamp_millis()).unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();
        Self(format!("q_{}{}", to_base36(millis), &suffix[..6]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStage {
    /// Live preview computed from the inputs alone.
    #[default]
    Draft,
    /// Draft merged with the recommender's add-ons after an explicit generate.
    Final,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemMeta {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tax_exempt: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    pub key: String,
    pub label: String,
    pub qty: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub meta: LineItemMeta,
}

impl QuoteLineItem {
    pub fn priced(
        key: impl Into<String>,
        label: impl Into<String>,
        qty: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            qty,
            unit_price,
            total: qty.saturating_mul(unit_price),
            notes: None,
            meta: LineItemMeta::default(),
        }
    }

    /// A pre-computed amount modeled as a single unit.
    pub fn surcharge(key: impl Into<String>, label: impl Into<String>, amount: Decimal) -> Self {
        Self::priced(key, label, Decimal::ONE, amount)
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn tax_exempt(mut self) -> Self {
        self.meta.tax_exempt = true;
        self
    }

    /// Rows with a non-positive quantity or a negative unit price are ignored by totals.
    pub fn is_billable(&self) -> bool {
        self.qty > Decimal::ZERO && self.unit_price >= Decimal::ZERO
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub currency: Currency,
    pub stage: QuoteStage,
    pub line_items: Vec<QuoteLineItem>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub generated_at: DateTime<Utc>,
}

impl Quote {
    pub fn line(&self, key: &str) -> Option<&QuoteLineItem> {
        self.line_items.iter().find(|item| item.key == key)
    }

    pub fn has_line(&self, key: &str) -> bool {
        self.line(key).is_some()
    }

    pub fn line_keys(&self) -> Vec<&str> {
        self.line_items.iter().map(|item| item.key.as_str()).collect()
    }
}
