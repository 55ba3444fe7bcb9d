//! Session cache persistence and write policy
//!
//! [`CacheStore`] owns the file-system side of session persistence;
//! [`policy`] decides when a completed operation triggers a write.

pub mod policy;
pub mod store;

pub use policy::{CacheTrigger, Operation, should_persist};
pub use store::{CacheStore, default_cache_path};
