use std::collections::BTreeMap;

use super::bodies::{Bodies, BodyDescription};
use super::collision_detection::Contact;
use super::constraints::contact::{ContactConstraintPools, ContactManifoldConstraint};
use super::error::SimulationError;
use super::handles::{BodyHandle, BodyPair};
use super::materials::{blend_multiplicative, InteractionProperties, Material, MaterialBlender};
use super::pose_integrator::PoseIntegrator;
use super::solver::{SolveStats, Solver};
use crate::utilities::Fix32;
use tracing::debug;

/// A group of bodies that only interact with each other, together with the contact
/// constraints between them.
///
/// Islands share nothing mutable, so separate islands can be stepped on separate threads.
#[derive(Debug, Clone)]
pub struct SolverIsland {
    bodies: Bodies,
    materials: Vec<Material>,
    world_material: Material,
    blender: MaterialBlender,
    manifolds: Vec<ContactManifoldConstraint>,
    manifold_indices: BTreeMap<BodyPair, usize>,
    pools: ContactConstraintPools,
}

impl Default for SolverIsland {
    fn default() -> Self {
        Self::with_pools(ContactConstraintPools::default())
    }
}

impl SolverIsland {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an island whose pools hold up to `manifold_capacity` full manifolds.
    pub fn with_manifold_capacity(manifold_capacity: u32) -> Self {
        Self::with_pools(ContactConstraintPools::with_manifold_capacity(manifold_capacity))
    }

    fn with_pools(pools: ContactConstraintPools) -> Self {
        Self {
            bodies: Bodies::new(),
            materials: Vec::new(),
            world_material: Material::default(),
            blender: blend_multiplicative,
            manifolds: Vec::new(),
            manifold_indices: BTreeMap::new(),
            pools,
        }
    }

    /// Adds a body with the default material.
    pub fn add_body(&mut self, description: &BodyDescription) -> Result<BodyHandle, SimulationError> {
        self.add_body_with_material(description, Material::default())
    }

    pub fn add_body_with_material(
        &mut self,
        description: &BodyDescription,
        material: Material,
    ) -> Result<BodyHandle, SimulationError> {
        let handle = self.bodies.add(description)?;
        self.materials.push(material);
        Ok(handle)
    }

    /// Changes a body's material and re-blends every manifold the body is part of.
    pub fn set_material(&mut self, handle: BodyHandle, material: Material) -> Result<(), SimulationError> {
        let slot = self
            .materials
            .get_mut(handle.index())
            .ok_or(SimulationError::InvalidBody(handle))?;
        *slot = material;
        self.reblend(|pair| pair.a == Some(handle) || pair.b == Some(handle));
        Ok(())
    }

    /// Material of the immovable world side of manifolds whose `a` or `b` is `None`.
    pub fn set_world_material(&mut self, material: Material) {
        self.world_material = material;
        self.reblend(|pair| pair.a.is_none() || pair.b.is_none());
    }

    pub fn set_material_blender(&mut self, blender: MaterialBlender) {
        self.blender = blender;
        self.reblend(|_| true);
    }

    fn reblend(&mut self, affected: impl Fn(BodyPair) -> bool) {
        for index in 0..self.manifolds.len() {
            let pair = self.manifolds[index].pair();
            if affected(pair) {
                let material = self.interaction(pair);
                self.manifolds[index].set_material(material);
            }
        }
    }

    fn material_of(&self, handle: Option<BodyHandle>) -> Material {
        handle
            .and_then(|handle| self.materials.get(handle.index()).copied())
            .unwrap_or(self.world_material)
    }

    fn interaction(&self, pair: BodyPair) -> InteractionProperties {
        (self.blender)(&self.material_of(pair.a), &self.material_of(pair.b))
    }

    fn validate(&self, handle: Option<BodyHandle>) -> Result<(), SimulationError> {
        match handle {
            Some(handle) if !self.bodies.contains(handle) => Err(SimulationError::InvalidBody(handle)),
            _ => Ok(()),
        }
    }

    /// Hands the narrow phase's contacts for one body pair to the island.
    ///
    /// Creates the manifold on first use and removes it once the pair reports no contacts.
    pub fn update_manifold(&mut self, pair: BodyPair, contacts: &[Contact]) -> Result<(), SimulationError> {
        self.validate(pair.a)?;
        self.validate(pair.b)?;
        if contacts.is_empty() {
            self.remove_manifold(pair);
            return Ok(());
        }

        let material = self.interaction(pair);
        if let Some(&index) = self.manifold_indices.get(&pair) {
            let manifold = &mut self.manifolds[index];
            manifold.set_material(material);
            return manifold.sync(contacts, &mut self.pools);
        }

        let mut manifold = ContactManifoldConstraint::new(pair, material, &mut self.pools)?;
        if let Err(error) = manifold.sync(contacts, &mut self.pools) {
            manifold.release(&mut self.pools);
            return Err(error);
        }
        debug!(%pair, contacts = contacts.len(), "manifold created");
        self.manifold_indices.insert(pair, self.manifolds.len());
        self.manifolds.push(manifold);
        Ok(())
    }

    /// Removes a pair's manifold, returning its constraints to the pools. Returns whether the pair
    /// had one.
    pub fn remove_manifold(&mut self, pair: BodyPair) -> bool {
        let Some(index) = self.manifold_indices.remove(&pair) else {
            return false;
        };
        // Keep the remaining manifolds in insertion order; the solve order depends on it.
        let manifold = self.manifolds.remove(index);
        for later in self.manifold_indices.values_mut().filter(|later| **later > index) {
            *later -= 1;
        }
        manifold.release(&mut self.pools);
        debug!(%pair, "manifold removed");
        true
    }

    /// Advances the island by `dt`: velocity integration, contact solve, pose integration.
    pub fn step(&mut self, solver: &Solver, integrator: &PoseIntegrator, dt: Fix32) -> Result<SolveStats, SimulationError> {
        integrator.integrate_velocities(&mut self.bodies, dt)?;
        let stats = solver.solve(&mut self.bodies, &self.manifolds, &mut self.pools, dt);
        integrator.integrate_poses(&mut self.bodies, dt);
        Ok(stats)
    }

    #[inline(always)]
    pub fn bodies(&self) -> &Bodies {
        &self.bodies
    }

    #[inline(always)]
    pub fn bodies_mut(&mut self) -> &mut Bodies {
        &mut self.bodies
    }

    pub fn manifold(&self, pair: BodyPair) -> Option<&ContactManifoldConstraint> {
        self.manifold_indices.get(&pair).map(|&index| &self.manifolds[index])
    }

    #[inline(always)]
    pub fn manifolds(&self) -> &[ContactManifoldConstraint] {
        &self.manifolds
    }

    #[inline(always)]
    pub fn pools(&self) -> &ContactConstraintPools {
        &self.pools
    }

    /// External ids of the island's dynamic bodies.
    pub fn dynamic_body_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.bodies
            .iter()
            .filter(|(_, body)| body.is_dynamic())
            .map(|(_, body)| body.id())
    }
}
