//! Synchronization primitives behind the registry's single lock.

pub(crate) mod mutex;
