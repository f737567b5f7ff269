//! Quest rewards and their scaling rules.

use serde::{Deserialize, Serialize};

use crate::ids::FactionId;
use crate::random::RandomSource;
use crate::value_objects::Difficulty;

/// Rewards granted on quest completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSet {
    pub gold: u32,
    pub experience: u32,
    /// Reputation gain with the issuing faction, if any
    pub reputation: Option<ReputationReward>,
    pub items: Vec<ItemReward>,
}

/// Reputation component of a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationReward {
    pub faction_id: FactionId,
    pub amount: i32,
}

/// An item granted as part of a reward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReward {
    pub item_kind: String,
    pub level: u32,
    pub rarity: Difficulty,
    pub quantity: u32,
}

/// Extra reward scaling per quest-giver level above 1.
const LEVEL_MULTIPLIER: f32 = 0.1;

const ITEM_KINDS: [&str; 4] = ["weapon", "armor", "accessory", "consumable"];

impl RewardSet {
    /// Build the rewards for a quest of the given difficulty and giver level.
    ///
    /// High tiers additionally roll for reputation (when a faction is
    /// attributed) and an item drop; both rolls come from the injected
    /// random source.
    pub fn generate(
        difficulty: Difficulty,
        level: u32,
        faction_id: Option<FactionId>,
        rng: &mut impl RandomSource,
    ) -> Self {
        let (base_gold, base_exp) = difficulty.base_rewards();
        let level_scale = 1.0 + (level.saturating_sub(1)) as f32 * LEVEL_MULTIPLIER;

        let reputation = if difficulty.grants_bonus_rewards() {
            faction_id.map(|faction_id| ReputationReward {
                faction_id,
                amount: rng.range(10, 50),
            })
        } else {
            None
        };

        let items = if difficulty.grants_bonus_rewards() && rng.chance(difficulty.item_chance()) {
            let item_kind = ITEM_KINDS[rng.pick(ITEM_KINDS.len())].to_string();
            vec![ItemReward {
                item_kind,
                level,
                rarity: difficulty,
                quantity: 1,
            }]
        } else {
            Vec::new()
        };

        Self {
            gold: (base_gold as f32 * level_scale) as u32,
            experience: (base_exp as f32 * level_scale) as u32,
            reputation,
            items,
        }
    }

    /// Scale declared base values by the difficulty's multiplier, for
    /// template-supplied reward bases.
    pub fn from_base(base_gold: u32, base_experience: u32, difficulty: Difficulty) -> Self {
        let multiplier = difficulty.reward_multiplier();
        Self {
            gold: (base_gold as f32 * multiplier) as u32,
            experience: (base_experience as f32 * multiplier) as u32,
            reputation: None,
            items: Vec::new(),
        }
    }

    /// Apply a faction's reward multiplier (issuer preference for a theme).
    pub fn scaled_by(mut self, multiplier: f32) -> Self {
        self.gold = (self.gold as f32 * multiplier) as u32;
        self.experience = (self.experience as f32 * multiplier) as u32;
        self
    }
}
