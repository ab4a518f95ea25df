//! Order normalization
//!
//! Turns a raw [`Order`] into [`NormalizedDemand`]: validates whole-unit items,
//! splits paired and fractional items into their sub-units and merges
//! interchangeable items into their composite item. The result is indexed by
//! [`CanonicalId`] and never changes once built.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{CanonicalId, Catalog},
    orders::Order,
};

/// Errors raised while normalizing an order.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// A whole-unit item was ordered in a fractional quantity.
    #[error("{item} must be ordered by the whole unit; it cannot be {quantity}")]
    NonIntegerQuantity {
        /// Raw item key
        item: String,

        /// Offending quantity
        quantity: Decimal,
    },

    /// A quantity below zero was ordered.
    #[error("{item} cannot be ordered in a negative quantity ({quantity})")]
    NegativeQuantity {
        /// Raw item key
        item: String,

        /// Offending quantity
        quantity: Decimal,
    },

    /// The order names an item that is not on the menu.
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Summed quantities for an item exceed the decimal range.
    #[error("total quantity of {item} is too large")]
    QuantityOverflow {
        /// Raw or canonical item key
        item: String,
    },

    /// Internal normalization invariant was violated (this is a bug).
    #[error("normalization invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// Canonical demand vector, aligned with [`Catalog::items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedDemand {
    quantities: Vec<Decimal>,
}

impl NormalizedDemand {
    /// Wrap a demand vector. Index `i` is the demand for `CanonicalId` `i`.
    pub fn from_quantities(quantities: impl Into<Vec<Decimal>>) -> Self {
        Self {
            quantities: quantities.into(),
        }
    }

    /// Demand for one item (zero when out of range).
    pub fn get(&self, id: CanonicalId) -> Decimal {
        self.quantities
            .get(id.index())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// `(item, demand)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalId, Decimal)> + '_ {
        self.quantities
            .iter()
            .enumerate()
            .map(|(index, quantity)| (CanonicalId::new(index), *quantity))
    }

    /// Raw demand vector.
    pub fn as_slice(&self) -> &[Decimal] {
        &self.quantities
    }

    /// Number of canonical items covered.
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// Whether the vector covers no items.
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Whether nothing at all is demanded.
    pub fn is_zero(&self) -> bool {
        self.quantities.iter().all(Decimal::is_zero)
    }

    /// Sum of demand over items matching `filter`.
    pub fn total_where(&self, mut filter: impl FnMut(CanonicalId) -> bool) -> Decimal {
        self.iter()
            .filter(|(id, _)| filter(*id))
            .map(|(_, quantity)| quantity)
            .sum()
    }

    /// A copy of this demand with one item's quantity replaced.
    pub fn with_quantity(&self, id: CanonicalId, quantity: Decimal) -> Self {
        let mut quantities = self.quantities.clone();

        if let Some(slot) = quantities.get_mut(id.index()) {
            *slot = quantity;
        }

        Self { quantities }
    }
}

/// Normalize a raw order against `catalog`.
///
/// Quantities of repeated lines for the same raw item are added up before
/// splitting. Missing quantities count as zero.
///
/// # Errors
///
/// Returns [`NormalizeError::NonIntegerQuantity`] when a whole-unit item has a
/// fractional quantity, and fails on unknown items and negative quantities. No
/// demand is produced on failure.
pub fn normalize(catalog: &Catalog, order: &Order) -> Result<NormalizedDemand, NormalizeError> {
    let mut raw_totals = vec![Decimal::ZERO; catalog.raw_items().len()];

    for line in order.lines() {
        let index = catalog
            .raw_item_index(line.item())
            .ok_or_else(|| NormalizeError::UnknownItem(line.item().to_string()))?;

        let Some(quantity) = line.quantity() else {
            continue;
        };

        if quantity < Decimal::ZERO {
            return Err(NormalizeError::NegativeQuantity {
                item: line.item().to_string(),
                quantity,
            });
        }

        let raw = catalog
            .raw_items()
            .get(index)
            .ok_or(NormalizeError::InvariantViolation {
                message: "raw item index out of range",
            })?;

        if raw.requires_whole_units() && quantity != quantity.trunc() {
            return Err(NormalizeError::NonIntegerQuantity {
                item: line.item().to_string(),
                quantity,
            });
        }

        let total = raw_totals
            .get_mut(index)
            .ok_or(NormalizeError::InvariantViolation {
                message: "raw item total missing",
            })?;

        *total = total
            .checked_add(quantity)
            .ok_or_else(|| NormalizeError::QuantityOverflow {
                item: line.item().to_string(),
            })?;
    }

    let mut quantities = vec![Decimal::ZERO; catalog.items().len()];

    for (raw, total) in catalog.raw_items().iter().zip(raw_totals) {
        for (id, part) in raw.rule().split(total) {
            let slot = quantities
                .get_mut(id.index())
                .ok_or(NormalizeError::InvariantViolation {
                    message: "canonical item index out of range",
                })?;

            *slot = slot
                .checked_add(part)
                .ok_or_else(|| NormalizeError::QuantityOverflow {
                    item: catalog
                        .item(id)
                        .map_or_else(|| raw.key().to_string(), |item| item.key().to_string()),
                })?;
        }
    }

    let demand = NormalizedDemand { quantities };

    debug!(
        lines = order.len(),
        items = demand.len(),
        "normalized order"
    );

    Ok(demand)
}
