//! Fixed-capacity arena of recyclable objects addressed by typed handles.

use super::managed_id_pool::ManagedIdPool;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use thiserror::Error;
use tracing::warn;

/// Object that can be recycled through a [`ResourcePool`].
pub trait Poolable: Default {
    /// True once the object holds no references and no accumulated state, which is the only state
    /// it may be given back in.
    fn is_cleaned_up(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("resource pool exhausted: all {capacity} slots are checked out")]
    Exhausted { capacity: u32 },
}

/// Index of a checked out slot in a [`ResourcePool<T>`].
///
/// Handles are plain indices; they do not keep the slot alive and must not be used after the
/// slot is given back.
pub struct PoolHandle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PoolHandle<T> {
    #[inline(always)]
    const fn new(index: u32) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    #[inline(always)]
    pub fn index(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for PoolHandle<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PoolHandle<T> {}

impl<T> PartialEq for PoolHandle<T> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for PoolHandle<T> {}

impl<T> Hash for PoolHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for PoolHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({})", self.index)
    }
}

/// Preallocated slots of `T` handed out with [`ResourcePool::take`] and returned with
/// [`ResourcePool::give_back`].
///
/// No allocation happens after construction. Slot ids are recycled through a
/// [`ManagedIdPool`], so a given sequence of takes and returns always produces the same handles.
#[derive(Clone, Debug)]
pub struct ResourcePool<T> {
    slots: Vec<T>,
    checked_out: Vec<bool>,
    ids: ManagedIdPool,
}

impl<T: Poolable> ResourcePool<T> {
    pub fn with_capacity(capacity: u32) -> Self {
        Self {
            slots: (0..capacity).map(|_| T::default()).collect(),
            checked_out: vec![false; capacity as usize],
            ids: ManagedIdPool::new(capacity),
        }
    }

    /// Checks out a cleaned up object.
    pub fn take(&mut self) -> Result<PoolHandle<T>, PoolError> {
        let Some(index) = self.ids.take() else {
            warn!(capacity = self.capacity(), "resource pool exhausted");
            return Err(PoolError::Exhausted {
                capacity: self.ids.capacity(),
            });
        };
        let slot = index as usize;
        debug_assert!(!self.checked_out[slot], "slot {index} handed out twice");
        debug_assert!(self.slots[slot].is_cleaned_up());
        self.checked_out[slot] = true;
        Ok(PoolHandle::new(index))
    }

    /// Returns an object to the pool. It must have been cleaned up first.
    ///
    /// Giving back a handle that is not checked out is a contract violation: it asserts in debug
    /// builds and is ignored in release builds.
    pub fn give_back(&mut self, handle: PoolHandle<T>) {
        let slot = handle.index();
        let was_checked_out = self.checked_out.get(slot).copied().unwrap_or(false);
        debug_assert!(was_checked_out, "{handle:?} given back while not checked out");
        if !was_checked_out {
            warn!(?handle, "ignoring give back of a handle that is not checked out");
            return;
        }
        debug_assert!(self.slots[slot].is_cleaned_up(), "{handle:?} given back without cleanup");
        self.checked_out[slot] = false;
        self.ids.return_id(handle.index);
    }

    #[inline(always)]
    pub fn get(&self, handle: PoolHandle<T>) -> Option<&T> {
        let slot = handle.index();
        if self.checked_out.get(slot).copied().unwrap_or(false) {
            self.slots.get(slot)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn get_mut(&mut self, handle: PoolHandle<T>) -> Option<&mut T> {
        let slot = handle.index();
        if self.checked_out.get(slot).copied().unwrap_or(false) {
            self.slots.get_mut(slot)
        } else {
            None
        }
    }

    #[inline(always)]
    pub fn is_checked_out(&self, handle: PoolHandle<T>) -> bool {
        self.checked_out.get(handle.index()).copied().unwrap_or(false)
    }

    #[inline(always)]
    pub fn checked_out_count(&self) -> usize {
        self.ids.claimed_count()
    }

    #[inline(always)]
    pub fn capacity(&self) -> u32 {
        self.ids.capacity()
    }
}

impl<T> Index<PoolHandle<T>> for ResourcePool<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, handle: PoolHandle<T>) -> &T {
        debug_assert!(self.checked_out[handle.index()], "{handle:?} is not checked out");
        &self.slots[handle.index()]
    }
}

impl<T> IndexMut<PoolHandle<T>> for ResourcePool<T> {
    #[inline(always)]
    fn index_mut(&mut self, handle: PoolHandle<T>) -> &mut T {
        debug_assert!(self.checked_out[handle.index()], "{handle:?} is not checked out");
        &mut self.slots[handle.index()]
    }
}
