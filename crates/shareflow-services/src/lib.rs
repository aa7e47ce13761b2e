//! Shareflow Services Layer
//!
//! This crate is the **composition and background layer**: it wires the
//! registry, content store and snapshot together into the long-running
//! pieces of the system (startup restore, periodic eviction, snapshot
//! persistence). Keep coordination here; keep thin HTTP handling in
//! shareflow-api.

pub mod persistence;
pub mod restore;
pub mod sweeper;

pub use persistence::PersistenceService;
pub use restore::restore_registry;
pub use sweeper::{evict_now, EvictionSweeper};
