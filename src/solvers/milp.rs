//! MILP Solver

use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use good_lp::{ResolutionError, Solution as _, SolverModel, Variable, constraint};
use num_traits::ToPrimitive;
use tracing::{debug, warn};

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::{
    model::{OrderModel, OrderModelParts},
    solvers::{BINARY_THRESHOLD, OptimalSolution, Solution, Solver},
};

/// Solver using Mixed Integer Linear Programming (MILP) through `good_lp`.
///
/// With a timeout, the solve runs on a worker thread and is abandoned once the
/// deadline passes; the caller gets [`Solution::TimedOut`] and the worker's result
/// is dropped when it eventually finishes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MILPSolver {
    timeout: Option<Duration>,
}

impl MILPSolver {
    /// Solver with no deadline.
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Solver that gives up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Configured deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Solver for MILPSolver {
    fn solve(&self, model: OrderModel) -> Solution {
        let parts = model.into_parts();

        match self.timeout {
            Some(timeout) => solve_with_deadline(timeout, move || solve_parts(parts)),
            None => solve_parts(parts),
        }
    }
}

/// Run `job` on a worker thread and wait at most `timeout` for its result.
fn solve_with_deadline<F>(timeout: Duration, job: F) -> Solution
where
    F: FnOnce() -> Solution + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();

    let spawned = thread::Builder::new()
        .name("milp-solve".to_string())
        .spawn(move || {
            // The receiver is gone once the deadline passes; nothing to report then.
            _ = sender.send(job());
        });

    if let Err(err) = spawned {
        warn!("failed to spawn solver thread: {err}");

        return Solution::Failed(format!("failed to spawn solver thread: {err}"));
    }

    match receiver.recv_timeout(timeout) {
        Ok(solution) => solution,
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = timeout.as_millis(), "solver timed out");

            Solution::TimedOut(timeout)
        }
        Err(RecvTimeoutError::Disconnected) => {
            warn!("solver thread exited without a result");

            Solution::Failed("solver thread exited without a result".to_string())
        }
    }
}

fn solve_parts(parts: OrderModelParts) -> Solution {
    let OrderModelParts {
        variables,
        objective,
        constraints,
        purchases,
        combos,
        promotion,
    } = parts;

    let mut model = variables.minimise(objective.clone()).using(default_solver);

    for row in constraints {
        model = model.with(constraint::geq(row.lhs, row.rhs));
    }

    let solution = match model.solve() {
        Ok(solution) => solution,
        Err(ResolutionError::Infeasible) => {
            debug!("order model is infeasible");

            return Solution::Infeasible;
        }
        Err(err) => {
            warn!("solver failed: {err}");

            return Solution::Failed(err.to_string());
        }
    };

    let Some(purchases) = integral_values(&solution, &purchases) else {
        return Solution::Failed("solver returned a non-integral purchase quantity".to_string());
    };

    let Some(combos) = integral_values(&solution, &combos) else {
        return Solution::Failed("solver returned a non-integral combo count".to_string());
    };

    // `promotion` is a binary decision variable; the solver returns floats, so treat
    // values greater than 0.5 as "selected" (i.e. 1) to tolerate tiny numerical noise.
    let promotion_active = solution.value(promotion) > BINARY_THRESHOLD;

    Solution::Optimal(OptimalSolution::new(
        solution.eval(&objective),
        purchases,
        combos,
        promotion_active,
    ))
}

/// Round integer variables to the nearest whole number.
fn integral_values(solution: &impl good_lp::Solution, vars: &[Variable]) -> Option<Vec<u32>> {
    vars.iter()
        .map(|var| solution.value(*var).round().to_u32())
        .collect()
}
