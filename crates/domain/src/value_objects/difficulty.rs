//! Quest difficulty tiers and their tuning tables.
//!
//! All of the numeric knobs that scale with difficulty live here: step
//! counts, base rewards, reward multipliers, expiry windows, and item drop
//! chance. Keeping them on the enum means a new tier cannot be added without
//! the compiler pointing at every table that needs a row.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Quest difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Epic,
    ];

    /// Inclusive range of objective steps a generated quest should have.
    pub fn step_count_range(self) -> (u32, u32) {
        match self {
            Self::Easy => (1, 2),
            Self::Medium => (2, 3),
            Self::Hard => (3, 4),
            Self::Epic => (4, 6),
        }
    }

    /// Base gold and experience before level scaling.
    pub fn base_rewards(self) -> (u32, u32) {
        match self {
            Self::Easy => (50, 100),
            Self::Medium => (150, 300),
            Self::Hard => (400, 800),
            Self::Epic => (1000, 2000),
        }
    }

    /// Multiplier applied to template-declared reward bases.
    pub fn reward_multiplier(self) -> f32 {
        match self {
            Self::Easy => 1.0,
            Self::Medium => 1.5,
            Self::Hard => 2.0,
            Self::Epic => 3.0,
        }
    }

    /// Days before a generated quest of this tier expires.
    pub fn expiry_days(self) -> i64 {
        match self {
            Self::Easy => 7,
            Self::Medium => 14,
            Self::Hard => 21,
            Self::Epic => 30,
        }
    }

    /// Chance that a quest of this tier carries an item reward.
    pub fn item_chance(self) -> f64 {
        match self {
            Self::Easy => 0.1,
            Self::Medium => 0.3,
            Self::Hard => 0.6,
            Self::Epic => 0.9,
        }
    }

    /// Flavor adjectives used by algorithmic title generation.
    pub fn adjectives(self) -> &'static [&'static str] {
        match self {
            Self::Easy => &["Curious", "Local", "Minor", "Small", "Simple"],
            Self::Medium => &["Dangerous", "Forgotten", "Hidden", "Valuable", "Important"],
            Self::Hard => &["Ancient", "Cursed", "Legendary", "Powerful", "Forbidden"],
            Self::Epic => &["Dreadful", "Divine", "Infernal", "Primordial", "World-Shaking"],
        }
    }

    /// Whether this tier grants reputation and may grant items.
    pub fn grants_bonus_rewards(self) -> bool {
        matches!(self, Self::Hard | Self::Epic)
    }

    /// Derive a difficulty tier from quest-giver level, importance (1-5),
    /// and local danger (1-5).
    pub fn from_context(giver_level: u32, importance: u32, danger: u32) -> Self {
        let score = (giver_level + importance * 5 + danger * 3) as f32 / 3.0;
        if score <= 5.0 {
            Self::Easy
        } else if score <= 15.0 {
            Self::Medium
        } else if score <= 25.0 {
            Self::Hard
        } else {
            Self::Epic
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Epic => "epic",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            "epic" => Ok(Self::Epic),
            _ => Err(DomainError::parse(format!("Unknown difficulty: {}", s))),
        }
    }
}
