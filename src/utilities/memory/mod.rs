//! Allocation-free recycling primitives for per-frame solver objects.

pub mod managed_id_pool;
pub mod resource_pool;

pub use managed_id_pool::ManagedIdPool;
pub use resource_pool::{PoolError, PoolHandle, Poolable, ResourcePool};
