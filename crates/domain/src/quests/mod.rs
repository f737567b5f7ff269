//! Quest generation and faction interplay.

mod competing;
mod generator;

pub use competing::{apply_outcome, generate_competing, modify_for_faction, opposing_quest};
pub use generator::{
    generate_fallback, instantiate, interpolate, select_template, GenerationContext,
    SelectionCriteria,
};
