//! Order model
//!
//! Builds the mixed-integer program for one order:
//!
//! - `x[i]`: integer units of canonical item `i` bought a-la-carte
//! - `y[j]`: integer number of combo `j` bought
//! - `z`: binary, the free-item promotion is claimed
//!
//! minimise `sum(combo_price[j] * y[j]) + sum(item_price[i] * x[i]) - credit * z`
//!
//! subject to coverage of every canonical item and the `2z - 1` linkage rows
//! that only let `z` be 1 when seafood and both free items are bought
//! a-la-carte. Coefficients are in minor currency units.

use std::fmt;

use good_lp::{Expression, ProblemVariables, Variable, variable};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{CanonicalId, Catalog, ComboId},
    normalize::NormalizedDemand,
};

/// Errors raised while building an order model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Normalized demand holds a negative quantity.
    #[error("invalid demand for `{item}`: {quantity}")]
    InvalidDemand {
        /// Canonical item key
        item: String,

        /// Offending quantity
        quantity: Decimal,
    },

    /// Demand vector does not match the catalog's item list.
    #[error("demand covers {actual} items, but the catalog has {expected}")]
    DemandShapeMismatch {
        /// Catalog item count
        expected: usize,

        /// Demand vector length
        actual: usize,
    },

    /// Demand quantity cannot be used as a solver coefficient.
    #[error("demand for `{item}` cannot be represented as a solver coefficient: {quantity}")]
    DemandNotRepresentable {
        /// Canonical item key
        item: String,

        /// Offending quantity
        quantity: Decimal,
    },

    /// Money amount in minor units cannot be represented exactly as a solver coefficient.
    #[error(
        "money amount in minor units cannot be represented exactly as a solver coefficient: {minor_units}"
    )]
    MinorUnitsNotRepresentable {
        /// Money amount in minor units
        minor_units: i64,
    },
}

/// What a constraint row enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Combo plus a-la-carte supply covers demand for one item.
    Coverage(CanonicalId),

    /// `z = 1` requires seafood bought a-la-carte.
    SeafoodLinkage,

    /// `z = 1` requires this free item bought a-la-carte.
    FreeItemLinkage(CanonicalId),
}

/// Linear constraint `lhs >= rhs`.
#[derive(Debug, Clone)]
pub struct ModelConstraint {
    /// What the row enforces
    pub kind: ConstraintKind,

    /// Left-hand side expression
    pub lhs: Expression,

    /// Right-hand side scalar
    pub rhs: f64,
}

/// Mixed-integer program for one order, ready to hand to a solver.
///
/// Each order gets its own model; variables and constraints are never shared.
pub struct OrderModel {
    variables: ProblemVariables,
    objective: Expression,
    constraints: Vec<ModelConstraint>,
    purchases: Vec<Variable>,
    combos: Vec<Variable>,
    promotion: Variable,
}

impl fmt::Debug for OrderModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderModel")
            .field("variables", &"<ProblemVariables>")
            .field("objective", &"<Expression>")
            .field(
                "constraints",
                &format!("[{} constraints]", self.constraints.len()),
            )
            .field("purchases", &format!("[{} variables]", self.purchases.len()))
            .field("combos", &format!("[{} variables]", self.combos.len()))
            .finish_non_exhaustive()
    }
}

/// Parts of an [`OrderModel`], for solvers.
pub struct OrderModelParts {
    /// Declared variables
    pub variables: ProblemVariables,

    /// Objective to minimise
    pub objective: Expression,

    /// Constraint rows
    pub constraints: Vec<ModelConstraint>,

    /// `x`, aligned with catalog items
    pub purchases: Vec<Variable>,

    /// `y`, aligned with catalog combos
    pub combos: Vec<Variable>,

    /// `z`
    pub promotion: Variable,
}

impl fmt::Debug for OrderModelParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderModelParts")
            .field("variables", &"<ProblemVariables>")
            .field("constraints", &self.constraints.len())
            .finish_non_exhaustive()
    }
}

impl OrderModel {
    /// Objective expression.
    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    /// Constraint rows, in build order.
    pub fn constraints(&self) -> &[ModelConstraint] {
        &self.constraints
    }

    /// `x[item]`.
    pub fn purchase_variable(&self, item: CanonicalId) -> Option<Variable> {
        self.purchases.get(item.index()).copied()
    }

    /// `y[combo]`.
    pub fn combo_variable(&self, combo: ComboId) -> Option<Variable> {
        self.combos.get(combo.index()).copied()
    }

    /// `z`.
    pub fn promotion_variable(&self) -> Variable {
        self.promotion
    }

    /// Total number of declared variables.
    pub fn variable_count(&self) -> usize {
        self.purchases.len() + self.combos.len() + 1
    }

    /// Split the model into its parts.
    pub fn into_parts(self) -> OrderModelParts {
        OrderModelParts {
            variables: self.variables,
            objective: self.objective,
            constraints: self.constraints,
            purchases: self.purchases,
            combos: self.combos,
            promotion: self.promotion,
        }
    }
}

/// Build the order model for `demand`.
///
/// Coverage rows are stated against `demand` as given; the promotion enters only
/// through the `z`-gated credit, so pass the undiscounted demand.
///
/// # Errors
///
/// Returns [`ModelError::InvalidDemand`] for negative demand and
/// [`ModelError::DemandShapeMismatch`] when `demand` does not belong to
/// `catalog`. Fails if a price or quantity cannot be used as a coefficient.
pub fn build_model(catalog: &Catalog, demand: &NormalizedDemand) -> Result<OrderModel, ModelError> {
    if demand.len() != catalog.items().len() {
        return Err(ModelError::DemandShapeMismatch {
            expected: catalog.items().len(),
            actual: demand.len(),
        });
    }

    let mut rhs = Vec::with_capacity(demand.len());

    for (item, (_, quantity)) in catalog.items().iter().zip(demand.iter()) {
        if quantity < Decimal::ZERO {
            return Err(ModelError::InvalidDemand {
                item: item.key().to_string(),
                quantity,
            });
        }

        rhs.push(
            quantity
                .to_f64()
                .ok_or_else(|| ModelError::DemandNotRepresentable {
                    item: item.key().to_string(),
                    quantity,
                })?,
        );
    }

    let mut variables = ProblemVariables::new();

    let purchases: Vec<Variable> = catalog
        .items()
        .iter()
        .map(|_| variables.add(variable().integer().min(0)))
        .collect();

    let combos: Vec<Variable> = catalog
        .combos()
        .iter()
        .map(|_| variables.add(variable().integer().min(0)))
        .collect();

    let promotion = variables.add(variable().binary());

    let mut objective = Expression::default();

    for (combo, &y) in catalog.combos().iter().zip(&combos) {
        objective += y * minor_units_coefficient(combo.price().to_minor_units())?;
    }

    for (item, &x) in catalog.items().iter().zip(&purchases) {
        objective += x * minor_units_coefficient(item.price().to_minor_units())?;
    }

    let credit = minor_units_coefficient(catalog.promotion_credit().to_minor_units())?;
    objective += promotion * -credit;

    let mut constraints = Vec::with_capacity(catalog.items().len() + 3);

    for ((id, &x), required) in catalog.item_ids().zip(&purchases).zip(rhs) {
        let mut lhs = Expression::from(x);

        for (combo, &y) in catalog.combos().iter().zip(&combos) {
            let supplied = combo.quantity_of(id);

            if supplied > 0 {
                lhs += y * f64::from(supplied);
            }
        }

        constraints.push(ModelConstraint {
            kind: ConstraintKind::Coverage(id),
            lhs,
            rhs: required,
        });
    }

    // With z binary, `lhs - 2z >= -1` is `lhs >= -1` when z = 0 (never binding
    // for non-negative x) and `lhs >= 1` when z = 1.
    let mut seafood = Expression::default();

    for (item, &x) in catalog.items().iter().zip(&purchases) {
        if item.is_seafood() {
            seafood += x;
        }
    }

    constraints.push(ModelConstraint {
        kind: ConstraintKind::SeafoodLinkage,
        lhs: seafood + promotion * -2.0,
        rhs: -1.0,
    });

    for id in catalog.promotion().items() {
        if let Some(&x) = purchases.get(id.index()) {
            constraints.push(ModelConstraint {
                kind: ConstraintKind::FreeItemLinkage(id),
                lhs: Expression::from(x) + promotion * -2.0,
                rhs: -1.0,
            });
        }
    }

    debug!(
        variables = purchases.len() + combos.len() + 1,
        constraints = constraints.len(),
        "built order model"
    );

    Ok(OrderModel {
        variables,
        objective,
        constraints,
        purchases,
        combos,
        promotion,
    })
}

/// `good_lp` stores coefficients as `f64`. Only integers with absolute value <= 2^53
/// can be represented exactly in an IEEE-754 `f64` mantissa; enforce that via a
/// round-trip check so we never silently change the objective.
fn minor_units_coefficient(minor_units: i64) -> Result<f64, ModelError> {
    i64_to_f64_exact(minor_units).ok_or(ModelError::MinorUnitsNotRepresentable { minor_units })
}

fn i64_to_f64_exact(v: i64) -> Option<f64> {
    let f = v.to_f64()?;

    (f.to_i64() == Some(v)).then_some(f)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use good_lp::Solution;
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::catalog::CatalogBuilder;

    use super::*;

    fn catalog() -> Result<Catalog, crate::catalog::CatalogError> {
        let mut builder = CatalogBuilder::new(USD);

        builder
            .item("corn", "Corn", Money::from_minor(75, USD), false)
            .item("potato", "Potato", Money::from_minor(55, USD), false)
            .item("shrimp", "Shrimp", Money::from_minor(1599, USD), true)
            .combo(
                "a",
                "Combo A",
                Money::from_minor(1999, USD),
                [("shrimp", 1), ("corn", 1), ("potato", 1)],
            )
            .free_items("corn", "potato");

        builder.build()
    }

    fn demand(corn: i64, potato: i64, shrimp: i64) -> NormalizedDemand {
        NormalizedDemand::from_quantities([corn, potato, shrimp].map(Decimal::from).to_vec())
    }

    fn assignment(
        model: &OrderModel,
        catalog: &Catalog,
        x: [f64; 3],
        y: f64,
        z: f64,
    ) -> Result<HashMap<Variable, f64>, String> {
        let mut values = HashMap::new();

        for (id, value) in catalog.item_ids().zip(x) {
            values.insert(
                model.purchase_variable(id).ok_or("missing purchase variable")?,
                value,
            );
        }

        let combo = catalog.combo_id("a").ok_or("missing combo")?;
        values.insert(model.combo_variable(combo).ok_or("missing combo variable")?, y);
        values.insert(model.promotion_variable(), z);

        Ok(values)
    }

    fn satisfied(model: &OrderModel, values: &HashMap<Variable, f64>) -> bool {
        model
            .constraints()
            .iter()
            .all(|row| values.eval(&row.lhs) >= row.rhs - 1e-9)
    }

    #[test]
    fn declares_one_variable_per_item_and_combo_plus_promotion() -> TestResult {
        let catalog = catalog()?;
        let model = build_model(&catalog, &demand(1, 1, 1))?;

        assert_eq!(model.variable_count(), 5);

        Ok(())
    }

    #[test]
    fn constraint_rows_cover_every_item_then_linkage() -> TestResult {
        let catalog = catalog()?;
        let model = build_model(&catalog, &demand(2, 0, 1))?;

        let corn = catalog.item_id("corn").ok_or("missing corn")?;
        let potato = catalog.item_id("potato").ok_or("missing potato")?;
        let shrimp = catalog.item_id("shrimp").ok_or("missing shrimp")?;

        let kinds: Vec<ConstraintKind> = model.constraints().iter().map(|row| row.kind).collect();

        assert_eq!(
            kinds,
            [
                ConstraintKind::Coverage(corn),
                ConstraintKind::Coverage(potato),
                ConstraintKind::Coverage(shrimp),
                ConstraintKind::SeafoodLinkage,
                ConstraintKind::FreeItemLinkage(corn),
                ConstraintKind::FreeItemLinkage(potato),
            ]
        );

        let rhs: Vec<f64> = model.constraints().iter().map(|row| row.rhs).collect();
        assert_eq!(rhs, [2.0, 0.0, 1.0, -1.0, -1.0, -1.0]);

        Ok(())
    }

    #[test]
    fn objective_prices_combos_items_and_credits_promotion() -> TestResult {
        let catalog = catalog()?;
        let model = build_model(&catalog, &demand(1, 1, 1))?;

        let values = assignment(&model, &catalog, [1.0, 1.0, 1.0], 1.0, 1.0)?;

        // 1999 + 75 + 55 + 1599 - 130
        assert!((values.eval(model.objective()) - 3598.0).abs() < 1e-9);

        Ok(())
    }

    #[test]
    fn combo_counts_towards_coverage() -> TestResult {
        let catalog = catalog()?;
        let model = build_model(&catalog, &demand(1, 1, 1))?;

        let combo_only = assignment(&model, &catalog, [0.0, 0.0, 0.0], 1.0, 0.0)?;
        let nothing = assignment(&model, &catalog, [0.0, 0.0, 0.0], 0.0, 0.0)?;

        assert!(satisfied(&model, &combo_only));
        assert!(!satisfied(&model, &nothing));

        Ok(())
    }

    #[test]
    fn promotion_requires_seafood_and_both_free_items_a_la_carte() -> TestResult {
        let catalog = catalog()?;
        let model = build_model(&catalog, &demand(0, 0, 0))?;

        let claimed_with_purchases = assignment(&model, &catalog, [1.0, 1.0, 1.0], 0.0, 1.0)?;
        let claimed_without_potato = assignment(&model, &catalog, [1.0, 0.0, 1.0], 0.0, 1.0)?;
        let claimed_without_seafood = assignment(&model, &catalog, [1.0, 1.0, 0.0], 1.0, 1.0)?;
        let unclaimed_empty = assignment(&model, &catalog, [0.0, 0.0, 0.0], 0.0, 0.0)?;

        assert!(satisfied(&model, &claimed_with_purchases));
        assert!(!satisfied(&model, &claimed_without_potato));
        assert!(!satisfied(&model, &claimed_without_seafood));
        assert!(satisfied(&model, &unclaimed_empty));

        Ok(())
    }

    #[test]
    fn negative_demand_is_rejected() -> TestResult {
        let catalog = catalog()?;
        let result = build_model(&catalog, &demand(0, -1, 0));

        assert!(matches!(
            result,
            Err(ModelError::InvalidDemand { item, .. }) if item == "potato"
        ));

        Ok(())
    }

    #[test]
    fn demand_from_another_catalog_is_rejected() -> TestResult {
        let catalog = catalog()?;
        let result = build_model(&catalog, &NormalizedDemand::from_quantities([Decimal::ONE]));

        assert!(matches!(
            result,
            Err(ModelError::DemandShapeMismatch {
                expected: 3,
                actual: 1
            })
        ));

        Ok(())
    }

    #[test]
    fn i64_to_f64_exact_accepts_exactly_representable_integers() {
        let cases: [i64; 5] = [0, 1, -1, 123, 9_007_199_254_740_992]; // 2^53

        for v in cases {
            assert_eq!(i64_to_f64_exact(v), Some(v as f64));
        }
    }

    #[test]
    fn i64_to_f64_exact_rejects_nonrepresentable_integers() {
        let cases: [i64; 2] = [9_007_199_254_740_993, -9_007_199_254_740_993]; // 2^53 + 1

        for v in cases {
            assert_eq!(i64_to_f64_exact(v), None);
        }
    }
}
