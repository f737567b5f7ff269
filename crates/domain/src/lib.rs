//! Campaign domain logic: quests, factions, tension, and the dependency
//! graph that ties quests together.
//!
//! This crate is pure and synchronous. It performs no I/O, holds no global
//! state, and never reads the clock or an RNG on its own; callers pass in
//! `DateTime<Utc>` readings and a [`RandomSource`]. That keeps every
//! operation deterministic under test and leaves scheduling decisions to
//! the engine.

pub mod entities;
pub mod error;
pub mod events;
pub mod graph;
pub mod ids;
pub mod quests;
pub mod random;
pub mod tension;
pub mod value_objects;

pub use error::DomainError;
pub use events::DomainEvent;
pub use random::RandomSource;
