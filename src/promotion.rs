//! Promotion evaluation
//!
//! With any seafood on the order, the first unit of each of the catalog's two
//! free items costs nothing. This module works out whether an order qualifies,
//! which units are free, and the a-la-carte reference costs the savings are
//! measured against.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{CanonicalId, Catalog},
    normalize::NormalizedDemand,
};

/// Seafood demand needed to qualify for the promotion.
pub const ELIGIBILITY_THRESHOLD: Decimal = Decimal::ONE;

/// Errors raised while evaluating the promotion.
#[derive(Debug, Error)]
pub enum PromotionError {
    /// An a-la-carte cost overflowed the money representation.
    #[error("a-la-carte cost of the order cannot be represented")]
    CostNotRepresentable,
}

/// Promotion state and baselines for one order.
#[derive(Debug, Clone)]
pub struct PromotionOutcome {
    eligible: bool,
    free_items: SmallVec<[CanonicalId; 2]>,
    discounted_demand: NormalizedDemand,
    reference_cost: Money<'static, Currency>,
    discounted_cost: Money<'static, Currency>,
}

impl PromotionOutcome {
    /// Whether the order contains enough seafood to qualify.
    pub fn is_eligible(&self) -> bool {
        self.eligible
    }

    /// Items with one unit made free (subset of the catalog's free-item pair).
    pub fn free_items(&self) -> &[CanonicalId] {
        &self.free_items
    }

    /// Demand with the free units removed.
    pub fn discounted_demand(&self) -> &NormalizedDemand {
        &self.discounted_demand
    }

    /// Everything a-la-carte, no combos, no promotion.
    pub fn reference_cost(&self) -> Money<'static, Currency> {
        self.reference_cost
    }

    /// Everything a-la-carte with the free units removed.
    pub fn discounted_cost(&self) -> Money<'static, Currency> {
        self.discounted_cost
    }

    /// Amount the promotion takes off the a-la-carte reference.
    pub fn discount(&self) -> Money<'static, Currency> {
        Money::from_minor(
            self.reference_cost
                .to_minor_units()
                .saturating_sub(self.discounted_cost.to_minor_units()),
            self.reference_cost.currency(),
        )
    }
}

/// Evaluate the free-item promotion for `demand`.
///
/// # Errors
///
/// Returns [`PromotionError::CostNotRepresentable`] if an a-la-carte cost
/// overflows.
pub fn evaluate(
    catalog: &Catalog,
    demand: &NormalizedDemand,
) -> Result<PromotionOutcome, PromotionError> {
    let seafood = demand.total_where(|id| catalog.item(id).is_some_and(|item| item.is_seafood()));
    let eligible = seafood >= ELIGIBILITY_THRESHOLD;

    let mut discounted_demand = demand.clone();
    let mut free_items = SmallVec::new();

    if eligible {
        for id in catalog.promotion().items() {
            let quantity = demand.get(id);

            if quantity >= Decimal::ONE {
                discounted_demand = discounted_demand.with_quantity(id, quantity - Decimal::ONE);
                free_items.push(id);
            }
        }
    }

    let reference_cost = a_la_carte_cost(catalog, demand)?;
    let discounted_cost = a_la_carte_cost(catalog, &discounted_demand)?;

    debug!(
        eligible,
        free_items = free_items.len(),
        reference_minor = reference_cost.to_minor_units(),
        "evaluated promotion"
    );

    Ok(PromotionOutcome {
        eligible,
        free_items,
        discounted_demand,
        reference_cost,
        discounted_cost,
    })
}

/// Inner product of canonical prices and `demand`, rounded to the nearest minor unit.
///
/// # Errors
///
/// Returns [`PromotionError::CostNotRepresentable`] on overflow.
pub fn a_la_carte_cost(
    catalog: &Catalog,
    demand: &NormalizedDemand,
) -> Result<Money<'static, Currency>, PromotionError> {
    let total = catalog
        .items()
        .iter()
        .zip(demand.as_slice())
        .try_fold(Decimal::ZERO, |total, (item, quantity)| {
            Decimal::from(item.price().to_minor_units())
                .checked_mul(*quantity)
                .and_then(|cost| total.checked_add(cost))
        })
        .ok_or(PromotionError::CostNotRepresentable)?;

    let minor_units = total
        .round_dp(0)
        .to_i64()
        .ok_or(PromotionError::CostNotRepresentable)?;

    Ok(Money::from_minor(minor_units, catalog.currency()))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::catalog::CatalogBuilder;

    use super::*;

    fn catalog() -> Result<Catalog, crate::catalog::CatalogError> {
        let mut builder = CatalogBuilder::new(USD);

        builder
            .item("corn", "Corn", Money::from_minor(75, USD), false)
            .item("potato", "Potato", Money::from_minor(55, USD), false)
            .item("shrimp", "Shrimp", Money::from_minor(1599, USD), true)
            .item("sausage", "Sausage", Money::from_minor(399, USD), false)
            .free_items("corn", "potato");

        builder.build()
    }

    // corn, potato, sausage, shrimp
    fn demand(corn: i64, potato: i64, sausage: i64, shrimp: i64) -> NormalizedDemand {
        NormalizedDemand::from_quantities(
            [corn, potato, sausage, shrimp].map(Decimal::from).to_vec(),
        )
    }

    fn id(catalog: &Catalog, key: &str) -> Result<CanonicalId, String> {
        catalog.item_id(key).ok_or_else(|| format!("missing {key}"))
    }

    #[test]
    fn seafood_order_gets_one_corn_and_one_potato_free() -> TestResult {
        let catalog = catalog()?;
        let outcome = evaluate(&catalog, &demand(2, 3, 0, 1))?;

        assert!(outcome.is_eligible());
        assert_eq!(
            outcome.free_items(),
            [id(&catalog, "corn")?, id(&catalog, "potato")?]
        );
        assert_eq!(
            outcome.discounted_demand().as_slice(),
            demand(1, 2, 0, 1).as_slice()
        );

        Ok(())
    }

    #[test]
    fn only_demanded_free_items_are_discounted() -> TestResult {
        let catalog = catalog()?;
        let outcome = evaluate(&catalog, &demand(1, 0, 0, 2))?;

        assert_eq!(outcome.free_items(), [id(&catalog, "corn")?]);
        assert_eq!(outcome.discount(), Money::from_minor(75, USD));

        Ok(())
    }

    #[test]
    fn no_seafood_means_no_promotion() -> TestResult {
        let catalog = catalog()?;
        let outcome = evaluate(&catalog, &demand(1, 1, 2, 0))?;

        assert!(!outcome.is_eligible());
        assert!(outcome.free_items().is_empty());
        assert_eq!(outcome.reference_cost(), outcome.discounted_cost());

        Ok(())
    }

    #[test]
    fn at_most_one_unit_of_each_is_free() -> TestResult {
        let catalog = catalog()?;
        let outcome = evaluate(&catalog, &demand(10, 10, 0, 10))?;

        assert_eq!(outcome.discount(), Money::from_minor(130, USD));

        Ok(())
    }

    #[test]
    fn reference_cost_is_inner_product_of_prices_and_demand() -> TestResult {
        let catalog = catalog()?;
        let outcome = evaluate(&catalog, &demand(2, 1, 1, 1))?;

        // 2 * 75 + 55 + 399 + 1599
        assert_eq!(outcome.reference_cost(), Money::from_minor(2203, USD));
        assert_eq!(outcome.discounted_cost(), Money::from_minor(2073, USD));

        Ok(())
    }

    #[test]
    fn fractional_demand_is_priced_to_the_nearest_minor_unit() -> TestResult {
        let catalog = catalog()?;
        let demand = NormalizedDemand::from_quantities([
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(5, 1),
        ]);

        // 0.5 * 1599 = 799.5
        assert_eq!(a_la_carte_cost(&catalog, &demand)?, Money::from_minor(800, USD));

        Ok(())
    }
}
