//! Quest instances - generated from templates or algorithmically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{FactionId, QuestId, RegionId, TemplateId};
use crate::tension::QuestConsequences;
use crate::value_objects::{Difficulty, RewardSet, Theme};

/// Lifecycle state of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestStatus {
    Pending,
    Active,
    Completed,
    Failed,
    Abandoned,
    Expired,
}

impl QuestStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Failed | Self::Abandoned | Self::Expired
        )
    }
}

/// An instantiated quest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: QuestId,
    /// Template this quest was instantiated from, if any
    pub template_id: Option<TemplateId>,
    pub title: String,
    pub description: String,
    pub status: QuestStatus,
    pub theme: Theme,
    pub difficulty: Difficulty,
    pub level: u32,
    /// Faction that issued the quest, if any
    pub faction_id: Option<FactionId>,
    /// Region the quest takes place in, if known
    pub region_id: Option<RegionId>,
    pub steps: Vec<QuestStep>,
    pub rewards: RewardSet,
    pub consequences: QuestConsequences,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Quest {
    /// Whether the quest has passed its expiry time.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| now >= at)
    }

    /// Whether every required step is done.
    pub fn required_steps_done(&self) -> bool {
        self.steps
            .iter()
            .filter(|s| s.required)
            .all(|s| s.completed)
    }

    /// Accept a pending quest.
    pub fn activate(&mut self) -> Result<(), DomainError> {
        match self.status {
            QuestStatus::Pending => {
                self.status = QuestStatus::Active;
                Ok(())
            }
            other => Err(DomainError::constraint(format!(
                "Cannot activate quest in state {:?}",
                other
            ))),
        }
    }

    /// Mark a step complete by position.
    pub fn complete_step(&mut self, index: usize) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::constraint(
                "Cannot progress a finished quest".to_string(),
            ));
        }
        let step = self
            .steps
            .get_mut(index)
            .ok_or_else(|| DomainError::not_found("QuestStep", index.to_string()))?;
        step.completed = true;
        Ok(())
    }

    /// Finish the quest successfully. Requires all required steps done.
    pub fn complete(&mut self) -> Result<(), DomainError> {
        if self.status != QuestStatus::Active {
            return Err(DomainError::constraint(format!(
                "Cannot complete quest in state {:?}",
                self.status
            )));
        }
        if !self.required_steps_done() {
            return Err(DomainError::constraint(
                "Required steps remain incomplete".to_string(),
            ));
        }
        self.status = QuestStatus::Completed;
        Ok(())
    }

    /// Finish the quest in failure.
    pub fn fail(&mut self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::constraint(
                "Quest already finished".to_string(),
            ));
        }
        self.status = QuestStatus::Failed;
        Ok(())
    }

    /// Walk away from the quest.
    pub fn abandon(&mut self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::constraint(
                "Quest already finished".to_string(),
            ));
        }
        self.status = QuestStatus::Abandoned;
        Ok(())
    }

    /// Expire the quest if its deadline has passed. Returns whether it did.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if !self.status.is_terminal() && self.is_expired(now) {
            self.status = QuestStatus::Expired;
            true
        } else {
            false
        }
    }
}

/// One objective within a quest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestStep {
    pub title: String,
    pub description: String,
    /// Machine-readable step category ("kill", "deliver", ...)
    pub kind: String,
    pub completed: bool,
    pub required: bool,
}

impl QuestStep {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: kind.into(),
            completed: false,
            required: true,
        }
    }
}
