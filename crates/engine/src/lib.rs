//! QuestWeave engine: async runtime around the campaign domain.
//!
//! The domain crate is pure; this crate supplies the outside world. It owns
//! the atlas HTTP client with its retry and cache layers, the in-memory
//! tension store, and the quest board that ties generation, gating, and
//! outcomes together.

pub mod infrastructure;
pub mod stores;
pub mod use_cases;
