//! Value objects - immutable types with validation and derived behavior

mod difficulty;
mod rewards;
mod tension;
mod theme;

pub use difficulty::Difficulty;
pub use rewards::{ItemReward, ReputationReward, RewardSet};
pub use tension::{Standing, TensionLevel};
pub use theme::Theme;
