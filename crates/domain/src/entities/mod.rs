//! Domain entities

mod faction;
mod quest;
mod region;
mod template;

pub use faction::{Faction, FactionStanding, FactionValues, MAX_TIER};
pub use quest::{Quest, QuestStatus, QuestStep};
pub use region::{Coordinates, MapBounds, Poi, PoiKind, Region};
pub use template::{step_description, QuestTemplate, StepTemplate};
