//! Manages a bounded pool of identifier values.
//!
//! Grabbing an id from the pool picks a number that has been picked and returned before,
//! or if none of those are available, the minimum value greater than any existing id.

/// Manages a pool of identifier values in `[0, capacity)`.
///
/// Stack-based: O(1) take and return, with returned ids recycled most-recent first so the same
/// sequence of operations always yields the same ids.
#[derive(Clone, Debug)]
pub struct ManagedIdPool {
    /// The next ID to allocate if no recycled IDs are available.
    next_index: u32,
    /// Upper bound (exclusive) on the ids this pool will hand out.
    capacity: u32,
    /// Stack of available (recycled) IDs.
    available_ids: Vec<u32>,
}

impl ManagedIdPool {
    /// Creates a pool handing out at most `capacity` distinct ids.
    pub fn new(capacity: u32) -> Self {
        ManagedIdPool {
            next_index: 0,
            capacity,
            available_ids: Vec::with_capacity(capacity as usize),
        }
    }

    /// Takes an ID from the pool, or `None` once every id is claimed.
    #[inline(always)]
    pub fn take(&mut self) -> Option<u32> {
        match self.available_ids.pop() {
            Some(id) => Some(id),
            None if self.next_index < self.capacity => {
                let id = self.next_index;
                self.next_index += 1;
                Some(id)
            }
            None => None,
        }
    }

    /// Returns an ID to the pool for recycling.
    ///
    /// The id must be currently claimed; the pool does not track claims itself.
    #[inline(always)]
    pub fn return_id(&mut self, id: u32) {
        debug_assert!(id < self.next_index, "id {id} was never handed out");
        debug_assert!(self.available_ids.len() < self.next_index as usize);
        self.available_ids.push(id);
    }

    /// Resets the pool, forgetting all claimed and recycled IDs.
    #[inline(always)]
    pub fn clear(&mut self) {
        self.next_index = 0;
        self.available_ids.clear();
    }

    /// Gets the highest value which any index claimed thus far could possibly have.
    /// This is not necessarily the current highest claimed index; this value may represent
    /// an earlier claim that has already been released.
    /// Returns `None` if nothing has ever been claimed.
    #[inline(always)]
    pub fn highest_possibly_claimed_id(&self) -> Option<u32> {
        self.next_index.checked_sub(1)
    }

    /// Gets the number of previously returned ids waiting in the pool.
    #[inline(always)]
    pub fn available_id_count(&self) -> usize {
        self.available_ids.len()
    }

    /// Number of ids currently claimed.
    #[inline(always)]
    pub fn claimed_count(&self) -> usize {
        self.next_index as usize - self.available_ids.len()
    }

    #[inline(always)]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
