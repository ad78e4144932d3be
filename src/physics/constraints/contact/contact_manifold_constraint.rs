use super::penetration_limit::ContactPenetrationConstraint;
use super::tangent_friction::ContactFrictionConstraint;
use super::twist_friction::TwistFrictionConstraint;
use crate::physics::bodies::Bodies;
use crate::physics::collision_detection::{Contact, MAXIMUM_CONTACT_COUNT};
use crate::physics::constraints::CollisionResponseSettings;
use crate::physics::error::SimulationError;
use crate::physics::handles::BodyPair;
use crate::physics::materials::InteractionProperties;
use crate::utilities::memory::{PoolError, PoolHandle, ResourcePool};
use crate::utilities::Fix32;

/// Pools every contact constraint of an island is checked out from.
#[derive(Debug, Clone)]
pub struct ContactConstraintPools {
    pub penetration: ResourcePool<ContactPenetrationConstraint>,
    pub friction: ResourcePool<ContactFrictionConstraint>,
    pub twist: ResourcePool<TwistFrictionConstraint>,
}

impl ContactConstraintPools {
    /// Creates pools sized for `manifold_capacity` full manifolds.
    pub fn with_manifold_capacity(manifold_capacity: u32) -> Self {
        let contact_capacity = manifold_capacity.saturating_mul(MAXIMUM_CONTACT_COUNT as u32);
        Self {
            penetration: ResourcePool::with_capacity(contact_capacity),
            friction: ResourcePool::with_capacity(contact_capacity),
            twist: ResourcePool::with_capacity(manifold_capacity),
        }
    }

    /// Number of contacts that can still be added across every manifold.
    fn free_contact_slots(&self) -> usize {
        let free = |capacity: u32, used: usize| (capacity as usize).saturating_sub(used);
        free(self.penetration.capacity(), self.penetration.checked_out_count())
            .min(free(self.friction.capacity(), self.friction.checked_out_count()))
    }
}

impl Default for ContactConstraintPools {
    fn default() -> Self {
        Self::with_manifold_capacity(256)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ContactSlot {
    feature_id: u32,
    penetration: PoolHandle<ContactPenetrationConstraint>,
    friction: PoolHandle<ContactFrictionConstraint>,
}

/// All contact constraints between one pair of bodies.
///
/// Contacts are matched to existing constraints by feature id, so a contact that persists from
/// one frame to the next keeps its accumulated impulses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactManifoldConstraint {
    pair: BodyPair,
    material: InteractionProperties,
    slots: Vec<ContactSlot>,
    twist: PoolHandle<TwistFrictionConstraint>,
}

impl ContactManifoldConstraint {
    /// Creates an empty manifold, checking out its twist friction constraint.
    pub fn new(
        pair: BodyPair,
        material: InteractionProperties,
        pools: &mut ContactConstraintPools,
    ) -> Result<Self, SimulationError> {
        let twist = pools.twist.take()?;
        pools.twist[twist].setup(pair.a, pair.b);
        Ok(Self {
            pair,
            material,
            slots: Vec::with_capacity(MAXIMUM_CONTACT_COUNT),
            twist,
        })
    }

    /// Replaces the manifold's contacts.
    ///
    /// Contacts whose feature id was already present keep their constraints and accumulated
    /// impulses. Constraints of contacts that disappeared go back to the pools. Capacity errors
    /// are detected before anything changes, so the manifold keeps its previous contacts.
    pub fn sync(&mut self, contacts: &[Contact], pools: &mut ContactConstraintPools) -> Result<(), SimulationError> {
        if contacts.len() > MAXIMUM_CONTACT_COUNT {
            return Err(SimulationError::ContactCapacity(self.pair));
        }
        let matched = |slot: &ContactSlot| contacts.iter().any(|contact| contact.feature_id == slot.feature_id);
        let new_contacts = contacts
            .iter()
            .enumerate()
            .filter(|(index, contact)| {
                !self.slots.iter().any(|slot| slot.feature_id == contact.feature_id)
                    || contacts[..*index].iter().any(|earlier| earlier.feature_id == contact.feature_id)
            })
            .count();
        let released = self.slots.iter().filter(|&slot| !matched(slot)).count();
        if new_contacts > pools.free_contact_slots() + released {
            return Err(PoolError::Exhausted {
                capacity: pools.penetration.capacity(),
            }
            .into());
        }

        let (kept, dropped): (Vec<ContactSlot>, Vec<ContactSlot>) = self.slots.drain(..).partition(matched);
        for slot in dropped {
            Self::release_slot(slot, pools);
        }

        let mut previous = kept;
        for contact in contacts {
            let slot = match previous.iter().position(|slot| slot.feature_id == contact.feature_id) {
                Some(index) => {
                    let slot = previous.swap_remove(index);
                    pools.penetration[slot.penetration].set_contact(*contact);
                    slot
                }
                None => match self.take_slot(contact, pools) {
                    Ok(slot) => slot,
                    Err(error) => {
                        for slot in previous.drain(..) {
                            Self::release_slot(slot, pools);
                        }
                        pools.twist[self.twist].set_penetrations(self.slots.iter().map(|slot| slot.penetration));
                        return Err(error);
                    }
                },
            };
            self.slots.push(slot);
        }
        pools.twist[self.twist].set_penetrations(self.slots.iter().map(|slot| slot.penetration));
        Ok(())
    }

    fn take_slot(&self, contact: &Contact, pools: &mut ContactConstraintPools) -> Result<ContactSlot, SimulationError> {
        let penetration = pools.penetration.take()?;
        let friction = match pools.friction.take() {
            Ok(friction) => friction,
            Err(error) => {
                pools.penetration.give_back(penetration);
                return Err(error.into());
            }
        };
        pools.penetration[penetration].setup(self.pair.a, self.pair.b, *contact);
        pools.friction[friction].setup(self.pair.a, self.pair.b, penetration);
        Ok(ContactSlot {
            feature_id: contact.feature_id,
            penetration,
            friction,
        })
    }

    fn release_slot(slot: ContactSlot, pools: &mut ContactConstraintPools) {
        pools.friction[slot.friction].clean_up();
        pools.friction.give_back(slot.friction);
        pools.penetration[slot.penetration].clean_up();
        pools.penetration.give_back(slot.penetration);
    }

    /// Returns every constraint of the manifold to the pools.
    pub fn release(mut self, pools: &mut ContactConstraintPools) {
        for slot in self.slots.drain(..) {
            Self::release_slot(slot, pools);
        }
        pools.twist[self.twist].clean_up();
        pools.twist.give_back(self.twist);
    }

    /// Prepares every constraint for this step: penetration first, then friction, then twist.
    pub fn update(
        &self,
        bodies: &Bodies,
        pools: &mut ContactConstraintPools,
        settings: &CollisionResponseSettings,
        dt: Fix32,
    ) {
        let ContactConstraintPools {
            penetration,
            friction,
            twist,
        } = pools;
        for slot in &self.slots {
            penetration[slot.penetration].update(bodies, &self.material, settings, dt);
        }
        for slot in &self.slots {
            friction[slot.friction].update(bodies, penetration, &self.material, settings);
        }
        twist[self.twist].update(bodies, penetration, &self.material, settings);
    }

    /// Warm start: applies every accumulated impulse once.
    pub fn exclusive_update(&self, bodies: &mut Bodies, pools: &mut ContactConstraintPools) {
        let ContactConstraintPools {
            penetration,
            friction,
            twist,
        } = pools;
        for slot in &self.slots {
            penetration[slot.penetration].exclusive_update(bodies);
            friction[slot.friction].exclusive_update(bodies, penetration);
        }
        twist[self.twist].exclusive_update(bodies, penetration);
    }

    /// Discards the impulses carried over from earlier steps.
    pub fn reset_accumulated_impulses(&self, pools: &mut ContactConstraintPools) {
        for slot in &self.slots {
            pools.penetration[slot.penetration].reset_accumulated_impulse();
            pools.friction[slot.friction].reset_accumulated_impulse();
        }
        pools.twist[self.twist].reset_accumulated_impulse();
    }

    /// One iteration over the manifold: for each contact penetration then friction, then twist.
    /// Returns the largest impulse change applied.
    pub fn solve_iteration(&self, bodies: &mut Bodies, pools: &mut ContactConstraintPools) -> Fix32 {
        let ContactConstraintPools {
            penetration,
            friction,
            twist,
        } = pools;
        let mut largest = Fix32::ZERO;
        for slot in &self.slots {
            largest = largest.max(penetration[slot.penetration].solve_iteration(bodies));
            largest = largest.max(friction[slot.friction].solve_iteration(bodies, penetration));
        }
        largest.max(twist[self.twist].solve_iteration(bodies, penetration))
    }

    #[inline(always)]
    pub fn pair(&self) -> BodyPair {
        self.pair
    }

    #[inline(always)]
    pub fn material(&self) -> &InteractionProperties {
        &self.material
    }

    #[inline(always)]
    pub fn set_material(&mut self, material: InteractionProperties) {
        self.material = material;
    }

    #[inline(always)]
    pub fn contact_count(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Feature ids of the current contacts, in the order they were last synced.
    pub fn feature_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().map(|slot| slot.feature_id)
    }

    /// Penetration and friction constraint handles of each contact, in sync order.
    pub fn contact_constraints(
        &self,
    ) -> impl Iterator<Item = (PoolHandle<ContactPenetrationConstraint>, PoolHandle<ContactFrictionConstraint>)> + '_
    {
        self.slots.iter().map(|slot| (slot.penetration, slot.friction))
    }

    #[inline(always)]
    pub fn twist(&self) -> PoolHandle<TwistFrictionConstraint> {
        self.twist
    }

    /// Sum of the accumulated normal impulses of every contact.
    pub fn total_normal_impulse(&self, pools: &ContactConstraintPools) -> Fix32 {
        self.slots
            .iter()
            .filter_map(|slot| pools.penetration.get(slot.penetration))
            .map(ContactPenetrationConstraint::accumulated_impulse)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::handles::BodyHandle;
    use crate::utilities::Vector3;

    fn contact(feature_id: u32, x: i32) -> Contact {
        Contact::new(Vector3::from_i32(x, 0, 0), Vector3::UNIT_Y, Fix32::from_ratio(1, 50), feature_id)
    }

    fn manifold(pools: &mut ContactConstraintPools) -> Result<ContactManifoldConstraint, SimulationError> {
        ContactManifoldConstraint::new(
            BodyPair::new(None, Some(BodyHandle(0))),
            InteractionProperties::default(),
            pools,
        )
    }

    #[test]
    fn persistent_contacts_keep_their_constraints() -> Result<(), SimulationError> {
        let mut pools = ContactConstraintPools::with_manifold_capacity(2);
        let mut manifold = manifold(&mut pools)?;
        manifold.sync(&[contact(1, 0), contact(2, 1)], &mut pools)?;
        let before: Vec<_> = manifold.contact_constraints().collect();
        assert_eq!(pools.penetration.checked_out_count(), 2);

        manifold.sync(&[contact(3, 2), contact(2, 1)], &mut pools)?;
        assert_eq!(manifold.feature_ids().collect::<Vec<_>>(), vec![3, 2]);
        let after: Vec<_> = manifold.contact_constraints().collect();
        assert_eq!(after[1], before[1]);
        assert_eq!(pools.penetration.checked_out_count(), 2);
        assert_eq!(pools.friction.checked_out_count(), 2);
        Ok(())
    }

    #[test]
    fn too_many_contacts_is_an_error() -> Result<(), SimulationError> {
        let mut pools = ContactConstraintPools::with_manifold_capacity(2);
        let mut manifold = manifold(&mut pools)?;
        let contacts: Vec<_> = (0..5).map(|id| contact(id, id as i32)).collect();
        assert_eq!(
            manifold.sync(&contacts, &mut pools),
            Err(SimulationError::ContactCapacity(manifold.pair()))
        );
        assert!(manifold.is_empty());
        Ok(())
    }

    #[test]
    fn exhausted_pools_leave_the_manifold_untouched() -> Result<(), SimulationError> {
        let mut pools = ContactConstraintPools {
            penetration: ResourcePool::with_capacity(3),
            friction: ResourcePool::with_capacity(3),
            twist: ResourcePool::with_capacity(2),
        };
        let mut first = manifold(&mut pools)?;
        first.sync(&[contact(1, 0), contact(2, 1)], &mut pools)?;
        let mut second = manifold(&mut pools)?;
        second.sync(&[contact(1, 0)], &mut pools)?;
        assert!(matches!(
            second.sync(&[contact(1, 0), contact(5, 1)], &mut pools),
            Err(SimulationError::Pool(PoolError::Exhausted { .. }))
        ));
        assert_eq!(second.feature_ids().collect::<Vec<_>>(), vec![1]);
        Ok(())
    }

    #[test]
    fn release_returns_everything() -> Result<(), SimulationError> {
        let mut pools = ContactConstraintPools::with_manifold_capacity(1);
        let mut manifold = manifold(&mut pools)?;
        manifold.sync(&[contact(1, 0), contact(2, 1)], &mut pools)?;
        manifold.release(&mut pools);
        assert_eq!(pools.penetration.checked_out_count(), 0);
        assert_eq!(pools.friction.checked_out_count(), 0);
        assert_eq!(pools.twist.checked_out_count(), 0);
        Ok(())
    }
}
