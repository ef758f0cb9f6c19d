use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKey {
    WebsiteBase,
    Page,
    EcommerceBase,
    BrandingPackage,
    SeoPackage,
    CmsIntegration,
    Payments,
    Auth,
    AdminDashboard,
    Analytics,
    FraudProtection,
}

impl CatalogKey {
    pub const ALL: [CatalogKey; 11] = [
        Self::WebsiteBase,
        Self::Page,
        Self::EcommerceBase,
        Self::BrandingPackage,
        Self::SeoPackage,
        Self::CmsIntegration,
        Self::Payments,
        Self::Auth,
        Self::AdminDashboard,
        Self::Analytics,
        Self::FraudProtection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WebsiteBase => "website_base",
            Self::Page => "page",
            Self::EcommerceBase => "ecommerce_base",
            Self::BrandingPackage => "branding_package",
            Self::SeoPackage => "seo_package",
            Self::CmsIntegration => "cms_integration",
            Self::Payments => "payments",
            Self::Auth => "auth",
            Self::AdminDashboard => "admin_dashboard",
            Self::Analytics => "analytics",
            Self::FraudProtection => "fraud_protection",
        }
    }

    fn default_price(self) -> Decimal {
        let amount: i64 = match self {
            Self::WebsiteBase => 15_000,
            Self::Page => 15_000,
            Self::EcommerceBase => 60_000,
            Self::BrandingPackage => 45_000,
            Self::SeoPackage => 12_000,
            Self::CmsIntegration => 45_000,
            Self::Payments => 50_000,
            Self::Auth => 12_000,
            Self::AdminDashboard => 18_000,
            Self::Analytics => 20_000,
            Self::FraudProtection => 45_000,
        };
        Decimal::from(amount)
    }
}

impl std::str::FromStr for CatalogKey {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownCatalogKey(value.to_string()))
    }
}

/// Largest unit price a catalog accepts.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Unit prices for every priced item. A `Catalog` is always complete: the
/// constructor rejects missing keys, so lookups cannot fail afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Catalog {
    prices: BTreeMap<CatalogKey, Decimal>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self { prices: CatalogKey::ALL.into_iter().map(|key| (key, key.default_price())).collect() }
    }
}

impl Catalog {
    pub fn new(prices: BTreeMap<CatalogKey, Decimal>) -> Result<Self, DomainError> {
        for key in CatalogKey::ALL {
            let price = prices.get(&key).ok_or(DomainError::MissingCatalogPrice(key.as_str()))?;
            if *price < Decimal::ZERO {
                return Err(DomainError::NegativeCatalogPrice { key: key.as_str(), price: *price });
            }
            if *price > MAX_UNIT_PRICE {
                return Err(DomainError::CatalogPriceTooLarge {
                    key: key.as_str(),
                    price: *price,
                    max: MAX_UNIT_PRICE,
                });
            }
        }

        Ok(Self { prices })
    }

    /// Returns a copy with one price replaced.
    pub fn with_price(&self, key: CatalogKey, price: Decimal) -> Result<Self, DomainError> {
        let mut prices = self.prices.clone();
        prices.insert(key, price);
        Self::new(prices)
    }

    pub fn unit_price(&self, key: CatalogKey) -> Decimal {
        self.prices.get(&key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn entries(&self) -> impl Iterator<Item = (CatalogKey, Decimal)> + '_ {
        self.prices.iter().map(|(key, price)| (*key, *price))
    }
}
