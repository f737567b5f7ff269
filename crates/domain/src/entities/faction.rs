//! Factions and a player's standing with them.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::FactionId;
use crate::value_objects::Theme;

/// A faction operating in the campaign world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    pub description: String,
    /// What the faction cares about, each on a 0.0-1.0 scale
    pub values: FactionValues,
    /// Per-theme reward multipliers applied to quests this faction issues
    pub reward_multipliers: HashMap<Theme, f32>,
    /// Per-theme difficulty multipliers applied to quests this faction issues
    pub difficulty_multipliers: HashMap<Theme, f32>,
    /// Resources only this faction can grant as rewards
    pub special_resources: Vec<String>,
}

impl Faction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FactionId::new(),
            name: name.into(),
            description: String::new(),
            values: FactionValues::default(),
            reward_multipliers: HashMap::new(),
            difficulty_multipliers: HashMap::new(),
            special_resources: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_values(mut self, values: FactionValues) -> Self {
        self.values = values.clamped();
        self
    }

    pub fn with_reward_multiplier(mut self, theme: Theme, multiplier: f32) -> Self {
        self.reward_multipliers.insert(theme, multiplier);
        self
    }

    pub fn with_difficulty_multiplier(mut self, theme: Theme, multiplier: f32) -> Self {
        self.difficulty_multipliers.insert(theme, multiplier);
        self
    }

    pub fn with_special_resource(mut self, resource: impl Into<String>) -> Self {
        self.special_resources.push(resource.into());
        self
    }

    /// Reward multiplier this faction applies to quests of the given theme.
    pub fn reward_multiplier(&self, theme: Theme) -> f32 {
        self.reward_multipliers.get(&theme).copied().unwrap_or(1.0)
    }

    /// Difficulty multiplier this faction applies to quests of the given theme.
    pub fn difficulty_multiplier(&self, theme: Theme) -> f32 {
        self.difficulty_multipliers
            .get(&theme)
            .copied()
            .unwrap_or(1.0)
    }

    /// Composite power score from the faction's values. Used by conflict
    /// trigger evaluation to detect power imbalances.
    pub fn power_score(&self) -> f32 {
        let v = &self.values;
        v.power * 0.3 + v.wealth * 0.25 + v.knowledge * 0.2 + v.tradition * 0.15 + v.honor * 0.1
    }
}

/// What a faction cares about; each axis is 0.0-1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionValues {
    pub honor: f32,
    pub wealth: f32,
    pub power: f32,
    pub knowledge: f32,
    pub tradition: f32,
    pub progress: f32,
}

impl FactionValues {
    fn clamped(self) -> Self {
        Self {
            honor: self.honor.clamp(0.0, 1.0),
            wealth: self.wealth.clamp(0.0, 1.0),
            power: self.power.clamp(0.0, 1.0),
            knowledge: self.knowledge.clamp(0.0, 1.0),
            tradition: self.tradition.clamp(0.0, 1.0),
            progress: self.progress.clamp(0.0, 1.0),
        }
    }
}

/// A player's standing with one faction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactionStanding {
    pub faction_id: FactionId,
    /// Reputation within the current tier, -100 to 100
    pub reputation: i32,
    /// Advancement tier, 0-5
    pub tier: u32,
    pub completed_quests: u32,
    pub failed_quests: u32,
    pub last_updated: DateTime<Utc>,
}

/// Maximum advancement tier.
pub const MAX_TIER: u32 = 5;

impl FactionStanding {
    pub fn new(faction_id: FactionId, now: DateTime<Utc>) -> Self {
        Self {
            faction_id,
            reputation: 0,
            tier: 0,
            completed_quests: 0,
            failed_quests: 0,
            last_updated: now,
        }
    }

    /// Adjust reputation, clamped to [-100, 100], then advance a tier if
    /// reputation hits the cap (tier-up resets reputation to zero).
    pub fn adjust_reputation(&mut self, change: i32, now: DateTime<Utc>) {
        self.reputation = (self.reputation + change).clamp(-100, 100);
        if self.reputation >= 100 && self.tier < MAX_TIER {
            self.tier += 1;
            self.reputation = 0;
        }
        self.last_updated = now;
    }

    pub fn record_completion(&mut self, now: DateTime<Utc>) {
        self.completed_quests += 1;
        self.last_updated = now;
    }

    pub fn record_failure(&mut self, now: DateTime<Utc>) {
        self.failed_quests += 1;
        self.last_updated = now;
    }

    /// Whether this standing satisfies a quest's gates.
    pub fn meets(&self, minimum_reputation: Option<i32>, minimum_tier: Option<u32>) -> bool {
        if let Some(min_rep) = minimum_reputation {
            if self.reputation < min_rep {
                return false;
            }
        }
        if let Some(min_tier) = minimum_tier {
            if self.tier < min_tier {
                return false;
            }
        }
        true
    }
}
