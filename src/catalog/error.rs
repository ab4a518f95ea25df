//! Catalog errors

use thiserror::Error;

/// Errors raised while assembling a [`super::Catalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog has no canonical items.
    #[error("catalog has no items")]
    Empty,

    /// Two canonical items share a key.
    #[error("duplicate item key: {0}")]
    DuplicateItem(String),

    /// Two combos share a key.
    #[error("duplicate combo key: {0}")]
    DuplicateCombo(String),

    /// A raw item has more than one rule, or clashes with a directly orderable item.
    #[error("duplicate raw item key: {0}")]
    DuplicateRawItem(String),

    /// A combo, rule or promotion names a canonical item that does not exist.
    #[error("unknown item `{item}` referenced by {context}")]
    UnknownItem {
        /// The missing canonical item key
        item: String,

        /// What referenced it
        context: String,
    },

    /// The whole-unit list names an item that cannot be ordered.
    #[error("unknown raw item: {0}")]
    UnknownRawItem(String),

    /// A price is below zero.
    #[error("price of `{0}` is negative")]
    NegativePrice(String),

    /// A price is in a different currency to the catalog.
    #[error("price of `{key}` is in {actual}, but the catalog uses {expected}")]
    CurrencyMismatch {
        /// Item or combo key
        key: String,

        /// Catalog currency code
        expected: &'static str,

        /// Currency code of the offending price
        actual: &'static str,
    },

    /// No free-item promotion was configured.
    #[error("catalog has no free-item promotion")]
    MissingPromotion,

    /// The promotion does not name two distinct items.
    #[error("free-item promotion must name two distinct items, got `{0}` twice")]
    InvalidPromotion(String),
}
