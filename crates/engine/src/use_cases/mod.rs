//! Engine use cases.

pub mod quest_board;

pub use quest_board::{Posting, QuestBoard};
