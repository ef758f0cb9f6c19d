use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("catalog is missing a price for `{0}`")]
    MissingCatalogPrice(&'static str),
    #[error("catalog price for `{key}` must not be negative (got {price})")]
    NegativeCatalogPrice { key: &'static str, price: Decimal },
    #[error("catalog price for `{key}` exceeds the maximum of {max} (got {price})")]
    CatalogPriceTooLarge { key: &'static str, price: Decimal, max: Decimal },
    #[error("unknown catalog key `{0}`")]
    UnknownCatalogKey(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("quote generation {generation} was superseded by a newer request")]
    Superseded { generation: u64 },
}

impl ApplicationError {
    /// Stable machine-readable class used in CLI outcomes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Superseded { .. } => "superseded",
        }
    }
}
