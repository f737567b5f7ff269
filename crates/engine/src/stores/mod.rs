//! In-memory state stores.

pub mod tension;

pub use tension::TensionStore;
