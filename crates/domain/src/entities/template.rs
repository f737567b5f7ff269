//! Quest templates - static definitions instantiated per generation request.

use serde::{Deserialize, Serialize};

use crate::ids::TemplateId;
use crate::value_objects::{Difficulty, Theme};

/// A static quest definition. Title, description, and step text may contain
/// `{placeholder}` markers filled in from the generation context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestTemplate {
    pub id: TemplateId,
    pub title: String,
    pub description: String,
    pub theme: Theme,
    pub difficulty: Difficulty,
    /// Suggested character level; generation context may override
    pub level: u32,
    pub steps: Vec<StepTemplate>,
    /// Base rewards before difficulty scaling; generated when absent
    pub base_gold: Option<u32>,
    pub base_experience: Option<u32>,
    pub tags: Vec<String>,
    /// Reputation required with the issuing faction
    pub minimum_reputation: Option<i32>,
    /// Advancement tier required with the issuing faction
    pub minimum_tier: Option<u32>,
    pub is_main_quest: bool,
}

impl QuestTemplate {
    pub fn new(
        title: impl Into<String>,
        theme: Theme,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: TemplateId::new(),
            title: title.into(),
            description: String::new(),
            theme,
            difficulty,
            level: 1,
            steps: Vec::new(),
            base_gold: None,
            base_experience: None,
            tags: Vec::new(),
            minimum_reputation: None,
            minimum_tier: None,
            is_main_quest: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_step(mut self, step: StepTemplate) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_base_rewards(mut self, gold: u32, experience: u32) -> Self {
        self.base_gold = Some(gold);
        self.base_experience = Some(experience);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn requires_reputation(mut self, minimum: i32) -> Self {
        self.minimum_reputation = Some(minimum);
        self
    }

    pub fn requires_tier(mut self, minimum: u32) -> Self {
        self.minimum_tier = Some(minimum);
        self
    }

    pub fn as_main_quest(mut self) -> Self {
        self.is_main_quest = true;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// One objective within a template
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepTemplate {
    pub title: String,
    pub description: String,
    /// Machine-readable step category ("kill", "deliver", ...)
    pub kind: String,
    pub required: bool,
}

impl StepTemplate {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: kind.into(),
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// What a step of a given kind asks the player to do. Used when generating
/// steps algorithmically rather than from an authored template.
pub fn step_description(kind: &str) -> &'static str {
    match kind {
        "kill" => "Eliminate the specified target",
        "defeat_boss" => "Defeat the area boss",
        "clear_area" => "Clear all enemies from the area",
        "explore" => "Explore the designated area",
        "discover" => "Discover the hidden location",
        "collect" => "Collect the required items",
        "dialogue" => "Speak with the designated person",
        "persuade" => "Convince someone to help",
        "deliver_message" => "Deliver an important message",
        "investigate" => "Investigate the scene",
        "gather_clues" => "Gather evidence and clues",
        "interrogate" => "Question witnesses or suspects",
        "gather_materials" => "Collect the required materials",
        "craft_item" => "Craft the specified item",
        "deliver_item" => "Deliver the completed item",
        "collect_goods" => "Collect the goods for transport",
        "transport" => "Transport goods safely",
        "deliver" => "Deliver goods to destination",
        "rescue" => "Rescue someone in danger",
        "heal" => "Provide healing to those in need",
        "escort" => "Safely escort someone",
        "provide_aid" => "Provide assistance to those in need",
        "study" => "Study the subject matter",
        "research" => "Research the topic thoroughly",
        "translate" => "Translate ancient texts",
        "learn" => "Learn new skills or knowledge",
        _ => "Complete this objective",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates() {
        let template = QuestTemplate::new("Slay the {beast_name}", Theme::Combat, Difficulty::Hard)
            .with_description("The {beast_name} has been raiding {region_name}.")
            .with_step(StepTemplate::new("Track the beast", "Follow its trail", "explore"))
            .with_step(StepTemplate::new("Slay it", "End the threat", "kill"))
            .with_tag("hunt")
            .requires_tier(1);

        assert_eq!(template.steps.len(), 2);
        assert!(template.has_tag("hunt"));
        assert!(!template.has_tag("escort"));
        assert_eq!(template.minimum_tier, Some(1));
        assert_eq!(template.minimum_reputation, None);
    }

    #[test]
    fn unknown_step_kind_gets_fallback_description() {
        assert_eq!(step_description("juggle"), "Complete this objective");
        assert_eq!(step_description("kill"), "Eliminate the specified target");
    }
}
