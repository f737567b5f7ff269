//! Consequence ledger - world-state changes produced by quest outcomes.
//!
//! Quests declare what succeeds or fails in the world; the ledger records
//! those changes with severity and attribution so downstream systems can
//! apply them at their own pace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{ConsequenceId, FactionId, QuestId};

/// A single declared change to world state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldStateChange {
    pub description: String,
    /// Signed impact magnitude; the sign distinguishes improvement from harm
    pub value: f32,
}

impl WorldStateChange {
    pub fn new(description: impl Into<String>, value: f32) -> Self {
        Self {
            description: description.into(),
            value,
        }
    }

    /// The inverse change an opposing faction works toward: negated value,
    /// description marked as prevented.
    pub fn opposed_by(&self, faction_name: &str) -> Self {
        Self {
            description: format!("{} prevents: {}", faction_name, self.description),
            value: -self.value,
        }
    }
}

/// Success and failure change sets attached to a quest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestConsequences {
    pub success: Vec<WorldStateChange>,
    pub failure: Vec<WorldStateChange>,
}

impl QuestConsequences {
    pub fn is_empty(&self) -> bool {
        self.success.is_empty() && self.failure.is_empty()
    }

    /// Build the change sets an opposing faction's counter-quest carries.
    pub fn opposed_by(&self, faction_name: &str) -> Self {
        Self {
            success: self
                .success
                .iter()
                .map(|c| c.opposed_by(faction_name))
                .collect(),
            failure: self
                .failure
                .iter()
                .map(|c| c.opposed_by(faction_name))
                .collect(),
        }
    }
}

/// How serious a recorded consequence is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Critical,
}

impl Severity {
    /// Grade an impact magnitude on the 0.0-1.0 scale.
    pub fn from_impact(impact: f32) -> Self {
        let magnitude = impact.abs();
        if magnitude > 0.75 {
            Self::Critical
        } else if magnitude > 0.5 {
            Self::Major
        } else if magnitude > 0.25 {
            Self::Moderate
        } else {
            Self::Minor
        }
    }
}

/// A recorded consequence awaiting application
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consequence {
    pub id: ConsequenceId,
    pub severity: Severity,
    pub change: WorldStateChange,
    /// Quest whose outcome produced this change, if any
    pub quest_id: Option<QuestId>,
    /// Faction pair whose relationship produced this change, if any
    pub factions: Option<(FactionId, FactionId)>,
    pub recorded_at: DateTime<Utc>,
    pub applied: bool,
}

/// Append-only record of world-state changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsequenceLedger {
    entries: Vec<Consequence>,
}

impl ConsequenceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change, grading severity from its impact value.
    pub fn record(
        &mut self,
        change: WorldStateChange,
        quest_id: Option<QuestId>,
        factions: Option<(FactionId, FactionId)>,
        now: DateTime<Utc>,
    ) -> ConsequenceId {
        let id = ConsequenceId::new();
        self.entries.push(Consequence {
            id,
            severity: Severity::from_impact(change.value),
            change,
            quest_id,
            factions,
            recorded_at: now,
            applied: false,
        });
        id
    }

    /// Consequences not yet applied, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Consequence> {
        self.entries.iter().filter(|c| !c.applied)
    }

    /// Mark a consequence as applied.
    pub fn mark_applied(&mut self, id: ConsequenceId) -> Result<(), DomainError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::not_found("Consequence", id.to_string()))?;
        entry.applied = true;
        Ok(())
    }

    /// All entries at or above the given severity.
    pub fn at_least(&self, severity: Severity) -> impl Iterator<Item = &Consequence> {
        self.entries.iter().filter(move |c| c.severity >= severity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
