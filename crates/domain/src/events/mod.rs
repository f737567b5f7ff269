//! Domain Events
//!
//! Coarse-grained events representing significant state changes. The domain
//! returns these from mutations instead of dispatching them itself; the
//! engine decides what to log, store, or forward.

use serde::{Deserialize, Serialize};

use crate::ids::{ConsequenceId, FactionId, PoiId, QuestId, RegionId};
use crate::tension::Severity;
use crate::value_objects::TensionLevel;

/// Domain event for significant state changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    // Faction diplomacy
    TensionShifted {
        faction_a: FactionId,
        faction_b: FactionId,
        old_level: TensionLevel,
        new_level: TensionLevel,
        source: String,
    },
    WarDeclared {
        faction_a: FactionId,
        faction_b: FactionId,
        tension: TensionLevel,
    },
    AllianceFormed {
        faction_a: FactionId,
        faction_b: FactionId,
        tension: TensionLevel,
    },
    PeaceOpportunity {
        faction_a: FactionId,
        faction_b: FactionId,
        tension: TensionLevel,
    },

    // Local unrest
    RevoltTriggered {
        region_id: RegionId,
        poi_id: PoiId,
        duration_hours: u32,
        tension_at_start: f32,
    },
    ConflictTriggered {
        region_id: RegionId,
        trigger_name: String,
        max_tension: f32,
    },

    // Quests
    QuestCompleted {
        quest_id: QuestId,
        faction_id: Option<FactionId>,
    },
    QuestFailed {
        quest_id: QuestId,
        faction_id: Option<FactionId>,
    },

    // Consequences
    ConsequenceRecorded {
        consequence_id: ConsequenceId,
        severity: Severity,
    },
}

impl DomainEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TensionShifted { .. } => "tension_shifted",
            Self::WarDeclared { .. } => "faction_war_declared",
            Self::AllianceFormed { .. } => "faction_alliance_formed",
            Self::PeaceOpportunity { .. } => "faction_peace_opportunity",
            Self::RevoltTriggered { .. } => "revolt_triggered",
            Self::ConflictTriggered { .. } => "conflict_triggered",
            Self::QuestCompleted { .. } => "quest_completed",
            Self::QuestFailed { .. } => "quest_failed",
            Self::ConsequenceRecorded { .. } => "consequence_recorded",
        }
    }
}
