//! Tension and consequence tracking.
//!
//! Two separate scales live here. The faction ledger tracks diplomacy on a
//! -100..100 integer scale; local unrest tracks a POI's mood on 0.0-1.0.
//! The consequence ledger records what quest outcomes changed in the world.

mod consequences;
mod ledger;
mod local;

pub use consequences::{
    Consequence, ConsequenceLedger, QuestConsequences, Severity, WorldStateChange,
};
pub use ledger::{FactionPair, TensionEvent, TensionLedger, TensionRecord};
pub use local::{
    fired_triggers, summarize_region, ConflictTrigger, RegionTensionSummary, RevoltOutcome,
    TensionConfig, TensionEventKind, TensionModifier, TensionState, REVOLT_THRESHOLD,
};
