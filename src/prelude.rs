//! King Crab prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{
        CanonicalId, CanonicalItem, Catalog, CatalogBuilder, CatalogError, Combo, ComboId,
        FreeItemPromotion, RawItem, RawRule, SplitRule,
    },
    fixtures::{Fixture, FixtureError},
    model::{ModelError, OrderModel, build_model},
    normalize::{NormalizeError, NormalizedDemand, normalize},
    orders::{Order, OrderLine},
    plan::{OrderPlan, PlanError, plan_order},
    promotion::{PromotionError, PromotionOutcome, evaluate},
    report::{PurchasePlan, Report, ReportError, ReportLine, ReportOutcome},
    solvers::{OptimalSolution, Solution, SolutionStatus, Solver, milp::MILPSolver},
};
