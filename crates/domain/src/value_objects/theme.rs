//! Quest themes and their generation vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Thematic category of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Theme {
    Combat,
    Exploration,
    Social,
    Mystery,
    Crafting,
    Trade,
    Aid,
    Knowledge,
    General,
}

impl Theme {
    pub const ALL: [Theme; 9] = [
        Theme::Combat,
        Theme::Exploration,
        Theme::Social,
        Theme::Mystery,
        Theme::Crafting,
        Theme::Trade,
        Theme::Aid,
        Theme::Knowledge,
        Theme::General,
    ];

    /// Title openers for algorithmic generation.
    pub fn title_prefixes(self) -> &'static [&'static str] {
        match self {
            Self::Combat => &["Slay the", "Defeat the", "Conquer the", "Vanquish the"],
            Self::Exploration => &["Discover the", "Find the", "Explore the", "Search for the"],
            Self::Social => &[
                "Convince the",
                "Persuade the",
                "Negotiate with the",
                "Mediate between",
            ],
            Self::Mystery => &["Investigate the", "Uncover the", "Solve the", "Decipher the"],
            Self::Crafting => &["Craft the", "Create the", "Forge the", "Build the"],
            Self::Trade => &["Deliver the", "Transport the", "Trade the", "Sell the"],
            Self::Aid => &["Help the", "Assist the", "Rescue the", "Heal the"],
            Self::Knowledge => &[
                "Learn about the",
                "Study the",
                "Research the",
                "Understand the",
            ],
            Self::General => &["Complete the", "Fulfill the", "Accomplish the", "Finish the"],
        }
    }

    /// Title subjects for algorithmic generation.
    pub fn nouns(self) -> &'static [&'static str] {
        match self {
            Self::Combat => &["Dragon", "Beast", "Warband", "Champion", "Demon", "Giant"],
            Self::Exploration => &["Ruins", "Cavern", "Shrine", "Artifact", "Temple", "Treasure"],
            Self::Social => &["Noble", "Merchant", "Guild", "Council", "Elder", "Leader"],
            Self::Mystery => &[
                "Conspiracy",
                "Disappearance",
                "Secret",
                "Prophecy",
                "Murder",
                "Theft",
            ],
            Self::Crafting => &["Weapon", "Armor", "Tool", "Potion", "Artifact", "Device"],
            Self::Trade => &["Goods", "Message", "Cargo", "Package", "Supplies", "Documents"],
            Self::Aid => &["Villager", "Traveler", "Wounded", "Lost", "Sick", "Trapped"],
            Self::Knowledge => &[
                "Ancient Text",
                "Ritual",
                "Language",
                "History",
                "Magic",
                "Lore",
            ],
            Self::General => &["Task", "Mission", "Request", "Assignment", "Job", "Duty"],
        }
    }

    /// Objective step kinds appropriate for the theme.
    pub fn step_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Combat => &["kill", "defeat_boss", "clear_area"],
            Self::Exploration => &["explore", "discover", "collect"],
            Self::Social => &["dialogue", "persuade", "deliver_message"],
            Self::Mystery => &["investigate", "gather_clues", "interrogate"],
            Self::Crafting => &["gather_materials", "craft_item", "deliver_item"],
            Self::Trade => &["collect_goods", "transport", "deliver"],
            Self::Aid => &["rescue", "heal", "escort", "provide_aid"],
            Self::Knowledge => &["study", "research", "translate", "learn"],
            Self::General => &["collect", "deliver", "explore", "dialogue"],
        }
    }

    /// Map a quest-giver's profession onto the theme they tend to offer.
    /// Unknown professions fall back to `General`.
    pub fn for_profession(profession: &str) -> Self {
        match profession.to_lowercase().as_str() {
            "warrior" | "guard" | "soldier" => Self::Combat,
            "scout" | "explorer" | "ranger" => Self::Exploration,
            "merchant" | "trader" | "shopkeeper" => Self::Trade,
            "scholar" | "librarian" | "researcher" => Self::Knowledge,
            "detective" | "investigator" => Self::Mystery,
            "noble" | "diplomat" => Self::Social,
            "blacksmith" | "craftsman" => Self::Crafting,
            "healer" | "priest" => Self::Aid,
            _ => Self::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Exploration => "exploration",
            Self::Social => "social",
            Self::Mystery => "mystery",
            Self::Crafting => "crafting",
            Self::Trade => "trade",
            Self::Aid => "aid",
            Self::Knowledge => "knowledge",
            Self::General => "general",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = crate::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "combat" => Ok(Self::Combat),
            "exploration" => Ok(Self::Exploration),
            "social" => Ok(Self::Social),
            "mystery" => Ok(Self::Mystery),
            "crafting" => Ok(Self::Crafting),
            "trade" => Ok(Self::Trade),
            "aid" => Ok(Self::Aid),
            "knowledge" => Ok(Self::Knowledge),
            "general" => Ok(Self::General),
            _ => Err(crate::error::DomainError::parse(format!(
                "Unknown theme: {}",
                s
            ))),
        }
    }
}
