//! Order planning pipeline

use thiserror::Error;
use tracing::{info, info_span};

use crate::{
    catalog::Catalog,
    model::{ModelError, build_model},
    normalize::{NormalizeError, NormalizedDemand, normalize},
    orders::Order,
    promotion::{PromotionError, PromotionOutcome, evaluate},
    solvers::{Solution, Solver},
};

/// Errors that stop an order before it reaches the solver.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The order failed validation or normalization.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// The promotion baseline could not be computed.
    #[error(transparent)]
    Promotion(#[from] PromotionError),

    /// The normalized demand could not be turned into a model.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Every stage's output for one order.
#[derive(Debug, Clone)]
pub struct OrderPlan {
    demand: NormalizedDemand,
    promotion: PromotionOutcome,
    solution: Solution,
}

impl OrderPlan {
    /// Canonical demand.
    pub fn demand(&self) -> &NormalizedDemand {
        &self.demand
    }

    /// Promotion state and a-la-carte baselines.
    pub fn promotion(&self) -> &PromotionOutcome {
        &self.promotion
    }

    /// Solver outcome.
    pub fn solution(&self) -> &Solution {
        &self.solution
    }
}

/// Normalize `order`, evaluate the promotion, build the model and solve it.
///
/// # Errors
///
/// Returns a [`PlanError`] if the order is invalid or the model cannot be built.
/// Infeasible, failed and timed out solves are not errors; they are carried in
/// [`OrderPlan::solution`].
pub fn plan_order(
    catalog: &Catalog,
    order: &Order,
    solver: &impl Solver,
) -> Result<OrderPlan, PlanError> {
    let span = info_span!("plan_order", lines = order.len());
    let _guard = span.enter();

    let demand = normalize(catalog, order)?;
    let promotion = evaluate(catalog, &demand)?;
    let model = build_model(catalog, &demand)?;
    let solution = solver.solve(model);

    info!(
        status = %solution.status(),
        reference_minor = promotion.reference_cost().to_minor_units(),
        "planned order"
    );

    Ok(OrderPlan {
        demand,
        promotion,
        solution,
    })
}
