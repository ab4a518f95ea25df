//! Solvers for order models

use std::{fmt, time::Duration};

use crate::{
    catalog::{CanonicalId, ComboId},
    model::OrderModel,
};

pub mod milp;

/// Binary threshold for determining truthiness
pub const BINARY_THRESHOLD: f64 = 0.5;

/// Coarse solve status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// An optimal assignment was found.
    Optimal,

    /// No assignment satisfies the constraints.
    Infeasible,

    /// The solver did not finish before its deadline.
    TimedOut,

    /// The solver failed.
    Error,
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SolutionStatus::Optimal => "optimal",
            SolutionStatus::Infeasible => "infeasible",
            SolutionStatus::TimedOut => "timed out",
            SolutionStatus::Error => "error",
        })
    }
}

/// Optimal assignment of `x`, `y` and `z`.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalSolution {
    objective: f64,
    purchases: Vec<u32>,
    combos: Vec<u32>,
    promotion_active: bool,
}

impl OptimalSolution {
    /// Create a solution from solved values.
    pub fn new(objective: f64, purchases: Vec<u32>, combos: Vec<u32>, promotion_active: bool) -> Self {
        Self {
            objective,
            purchases,
            combos,
            promotion_active,
        }
    }

    /// Objective value in minor currency units.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Units of `item` bought a-la-carte.
    pub fn purchased(&self, item: CanonicalId) -> u32 {
        self.purchases.get(item.index()).copied().unwrap_or(0)
    }

    /// Number of `combo` bought.
    pub fn combo_count(&self, combo: ComboId) -> u32 {
        self.combos.get(combo.index()).copied().unwrap_or(0)
    }

    /// `x`, aligned with catalog items.
    pub fn purchases(&self) -> &[u32] {
        &self.purchases
    }

    /// `y`, aligned with catalog combos.
    pub fn combos(&self) -> &[u32] {
        &self.combos
    }

    /// Whether `z` is 1.
    pub fn promotion_active(&self) -> bool {
        self.promotion_active
    }
}

/// Outcome of solving an order model. Only the optimal outcome carries values.
#[derive(Debug, Clone, PartialEq)]
pub enum Solution {
    /// Solved to optimality.
    Optimal(OptimalSolution),

    /// The model has no feasible assignment.
    Infeasible,

    /// Gave up after the given deadline.
    TimedOut(Duration),

    /// The solver reported an error.
    Failed(String),
}

impl Solution {
    /// Coarse status.
    pub fn status(&self) -> SolutionStatus {
        match self {
            Solution::Optimal(_) => SolutionStatus::Optimal,
            Solution::Infeasible => SolutionStatus::Infeasible,
            Solution::TimedOut(_) => SolutionStatus::TimedOut,
            Solution::Failed(_) => SolutionStatus::Error,
        }
    }

    /// The assignment, when optimal.
    pub fn optimal(&self) -> Option<&OptimalSolution> {
        match self {
            Solution::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Trait for solving order models
pub trait Solver {
    /// Solve `model`. Solver problems are reported through the returned
    /// [`Solution`], never by panicking or blocking past the configured deadline.
    fn solve(&self, model: OrderModel) -> Solution;
}
