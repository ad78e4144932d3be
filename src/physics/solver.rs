use super::bodies::Bodies;
use super::constraints::contact::{ContactConstraintPools, ContactManifoldConstraint};
use super::constraints::CollisionResponseSettings;
use crate::utilities::Fix32;
use std::fmt;
use tracing::trace;

/// Iteration control of the sequential impulse solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct SolverSettings {
    /// Hard cap on iterations per solve.
    pub iteration_limit: u32,
    /// Iterations always run, even when the first ones already converge.
    pub minimum_iteration_count: u32,
    /// An iteration whose largest impulse change falls below this ends the solve.
    pub minimum_impulse: Fix32,
    /// Whether impulses accumulated during the previous step are applied before iterating.
    pub warm_starting: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            iteration_limit: 10,
            minimum_iteration_count: 1,
            minimum_impulse: Fix32::from_ratio(1, 1000),
            warm_starting: true,
        }
    }
}

/// Outcome of one [`Solver::solve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolveStats {
    /// Iterations that ran.
    pub iterations: u32,
    /// Largest impulse change applied during the last iteration.
    pub last_impulse_change: Fix32,
    /// Whether the solve stopped because it converged rather than because it hit the limit.
    pub converged: bool,
}

impl fmt::Display for SolveStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} iterations, last impulse change {}, {}",
            self.iterations,
            self.last_impulse_change,
            if self.converged { "converged" } else { "hit the iteration limit" }
        )
    }
}

/// Sequential impulse solver for contact manifolds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct Solver {
    pub settings: SolverSettings,
    pub collision_response: CollisionResponseSettings,
}

impl Solver {
    pub fn new(settings: SolverSettings, collision_response: CollisionResponseSettings) -> Self {
        Self {
            settings,
            collision_response,
        }
    }

    /// Solves every manifold of one island for a step of length `dt`.
    ///
    /// Runs the update of every constraint, then the warm start (or an impulse reset when warm
    /// starting is off), then iterates manifolds in order until the impulse changes die down.
    pub fn solve(
        &self,
        bodies: &mut Bodies,
        manifolds: &[ContactManifoldConstraint],
        pools: &mut ContactConstraintPools,
        dt: Fix32,
    ) -> SolveStats {
        for manifold in manifolds {
            manifold.update(bodies, pools, &self.collision_response, dt);
        }
        for manifold in manifolds {
            if self.settings.warm_starting {
                manifold.exclusive_update(bodies, pools);
            } else {
                manifold.reset_accumulated_impulses(pools);
            }
        }

        let mut stats = SolveStats::default();
        let minimum_iteration_count = self.settings.minimum_iteration_count.min(self.settings.iteration_limit);
        while stats.iterations < self.settings.iteration_limit {
            let largest = manifolds
                .iter()
                .map(|manifold| manifold.solve_iteration(bodies, pools))
                .fold(Fix32::ZERO, Fix32::max);
            stats.iterations += 1;
            stats.last_impulse_change = largest;
            if stats.iterations >= minimum_iteration_count && largest < self.settings.minimum_impulse {
                stats.converged = true;
                break;
            }
        }
        trace!(manifolds = manifolds.len(), %stats, "solve finished");
        stats
    }
}
