use std::collections::HashSet;

use super::error::SimulationError;
use super::island::SolverIsland;
use super::pose_integrator::PoseIntegrator;
use super::solver::{SolveStats, Solver};
use crate::utilities::thread_dispatcher::ThreadDispatcher;
use crate::utilities::Fix32;
use tracing::trace;

/// Checks that no dynamic body is owned by more than one island.
///
/// Kinematic bodies may appear in several islands: the solver never writes to them.
pub fn check_island_disjointness(islands: &[SolverIsland]) -> Result<(), SimulationError> {
    let mut seen = HashSet::new();
    for island in islands {
        for id in island.dynamic_body_ids() {
            if !seen.insert(id) {
                return Err(SimulationError::SharedBody(id));
            }
        }
    }
    Ok(())
}

/// Orchestrates the islands of a simulation through a timestep.
#[derive(Debug, Clone, Default)]
pub struct Simulation {
    pub islands: Vec<SolverIsland>,
    pub solver: Solver,
    pub integrator: PoseIntegrator,
}

impl Simulation {
    pub fn new(solver: Solver, integrator: PoseIntegrator) -> Self {
        Self {
            islands: Vec::new(),
            solver,
            integrator,
        }
    }

    /// Adds an island and returns its index.
    pub fn add_island(&mut self, island: SolverIsland) -> usize {
        self.islands.push(island);
        self.islands.len() - 1
    }

    /// Steps every island on the calling thread, in order. Returns each island's solve stats.
    pub fn timestep(&mut self, dt: Fix32) -> Result<Vec<SolveStats>, SimulationError> {
        let (solver, integrator) = (&self.solver, &self.integrator);
        let stats = self
            .islands
            .iter_mut()
            .map(|island| island.step(solver, integrator, dt))
            .collect::<Result<Vec<_>, _>>()?;
        trace!(islands = stats.len(), "timestep finished");
        Ok(stats)
    }

    /// Steps the islands in parallel through `dispatcher`.
    ///
    /// Islands never share a dynamic body, which is checked up front, so the results are
    /// bit-identical to [`Simulation::timestep`].
    pub fn timestep_with<D: ThreadDispatcher>(
        &mut self,
        dt: Fix32,
        dispatcher: &D,
    ) -> Result<Vec<SolveStats>, SimulationError> {
        check_island_disjointness(&self.islands)?;
        let (solver, integrator) = (&self.solver, &self.integrator);
        let stats = dispatcher
            .map_disjoint(&mut self.islands, |island| island.step(solver, integrator, dt))
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        trace!(
            islands = stats.len(),
            threads = dispatcher.thread_count(),
            "parallel timestep finished"
        );
        Ok(stats)
    }
}
