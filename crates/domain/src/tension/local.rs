//! Local unrest at points of interest.
//!
//! Each (region, POI) pair carries a tension value on a 0.0-1.0 scale,
//! separate from the faction ledger's diplomatic scale. Player actions push
//! it up, festivals and time pull it down, and past a threshold the
//! population may revolt.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::ids::{FactionId, PoiId, RegionId};
use crate::random::RandomSource;
use crate::tension::Severity;

/// Tension level above which a revolt becomes possible.
pub const REVOLT_THRESHOLD: f32 = 0.8;
/// Ceiling on per-check revolt probability, even at maximum tension.
const MAX_REVOLT_CHANCE: f64 = 0.8;
/// Each faction with a presence at the POI adds this much revolt chance.
const FACTION_PRESENCE_WEIGHT: f64 = 0.1;
/// Relief modifier applied after a revolt burns itself out.
const POST_REVOLT_RELIEF: f32 = -0.3;
const POST_REVOLT_RELIEF_HOURS: i64 = 72;

/// Tuning for a POI's tension behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionConfig {
    /// Resting tension the value decays toward
    pub baseline: f32,
    /// Linear decay per hour toward the baseline
    pub decay_per_hour: f32,
    /// Floor for the effective tension value
    pub min: f32,
    /// Ceiling for the effective tension value
    pub max: f32,
}

impl Default for TensionConfig {
    fn default() -> Self {
        Self {
            baseline: 0.2,
            decay_per_hour: 0.01,
            min: 0.0,
            max: 1.0,
        }
    }
}

/// A temporary push on local tension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionModifier {
    pub name: String,
    pub amount: f32,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TensionModifier {
    pub fn active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Something that happened at a POI and moved local tension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TensionEventKind {
    PlayerCombat { lethal: bool, stealthy: bool },
    NpcDeath { important: bool, civilian: bool },
    Theft,
    PropertyDestroyed,
    Festival,
    GuardCrackdown,
}

impl TensionEventKind {
    /// Signed tension impact on the 0.0-1.0 scale.
    pub fn impact(self) -> f32 {
        match self {
            Self::PlayerCombat { lethal, stealthy } => {
                let mut impact = 0.15;
                if lethal {
                    impact *= 1.5;
                }
                if stealthy {
                    impact *= 0.5;
                }
                impact
            }
            Self::NpcDeath { important, civilian } => {
                let mut impact = 0.2;
                if important {
                    impact *= 2.0;
                }
                if civilian {
                    impact *= 1.5;
                }
                impact
            }
            Self::Theft => 0.05,
            Self::PropertyDestroyed => 0.1,
            Self::Festival => -0.15,
            Self::GuardCrackdown => -0.1,
        }
    }
}

/// Record of a revolt produced by a revolt check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevoltOutcome {
    pub duration_hours: u32,
    pub casualties: u32,
    /// Factions with a presence at the POI when the revolt broke out
    pub participating: Vec<FactionId>,
}

/// Tension state for one POI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionState {
    pub region_id: RegionId,
    pub poi_id: PoiId,
    pub config: TensionConfig,
    base: f32,
    modifiers: Vec<TensionModifier>,
    factions_present: Vec<FactionId>,
    last_decayed: DateTime<Utc>,
}

impl TensionState {
    pub fn new(region_id: RegionId, poi_id: PoiId, now: DateTime<Utc>) -> Self {
        Self::with_config(region_id, poi_id, TensionConfig::default(), now)
    }

    pub fn with_config(
        region_id: RegionId,
        poi_id: PoiId,
        config: TensionConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            region_id,
            poi_id,
            base: config.baseline,
            config,
            modifiers: Vec::new(),
            factions_present: Vec::new(),
            last_decayed: now,
        }
    }

    /// Replace the set of factions currently operating at the POI.
    pub fn set_factions_present(&mut self, factions: Vec<FactionId>) {
        self.factions_present = factions;
    }

    pub fn factions_present(&self) -> &[FactionId] {
        &self.factions_present
    }

    /// Effective tension: decayed base plus active modifiers, clamped.
    pub fn current(&self, now: DateTime<Utc>) -> f32 {
        let modifier_sum: f32 = self
            .modifiers
            .iter()
            .filter(|m| m.active(now))
            .map(|m| m.amount)
            .sum();
        (self.base + modifier_sum).clamp(self.config.min, self.config.max)
    }

    /// Decay the base toward the baseline and drop expired modifiers.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        let hours = (now - self.last_decayed).num_minutes() as f32 / 60.0;
        if hours > 0.0 {
            let decay = self.config.decay_per_hour * hours;
            if self.base > self.config.baseline {
                self.base = (self.base - decay).max(self.config.baseline);
            } else if self.base < self.config.baseline {
                self.base = (self.base + decay).min(self.config.baseline);
            }
            self.last_decayed = now;
        }
        self.modifiers.retain(|m| m.active(now));
    }

    /// Apply an event's impact. Returns the applied delta and its severity.
    pub fn apply_event(&mut self, kind: TensionEventKind, now: DateTime<Utc>) -> (f32, Severity) {
        self.tick(now);
        let impact = kind.impact();
        self.base = (self.base + impact).clamp(self.config.min, self.config.max);
        (impact, Severity::from_impact(impact))
    }

    /// Add a timed modifier.
    pub fn add_modifier(
        &mut self,
        name: impl Into<String>,
        amount: f32,
        duration: Option<Duration>,
        now: DateTime<Utc>,
    ) {
        self.modifiers.push(TensionModifier {
            name: name.into(),
            amount,
            expires_at: duration.map(|d| now + d),
        });
    }

    pub fn modifiers(&self) -> &[TensionModifier] {
        &self.modifiers
    }

    /// Per-check revolt probability. Zero below the threshold; above it the
    /// chance scales with how far past the threshold tension sits, plus a
    /// bump for every faction with a presence, capped at the ceiling.
    pub fn revolt_probability(&self, now: DateTime<Utc>) -> f64 {
        let tension = self.current(now);
        if tension < REVOLT_THRESHOLD {
            return 0.0;
        }
        let base =
            ((tension - REVOLT_THRESHOLD) / (1.0 - REVOLT_THRESHOLD)).clamp(0.0, 1.0) as f64;
        let presence = self.factions_present.len() as f64 * FACTION_PRESENCE_WEIGHT;
        (base * MAX_REVOLT_CHANCE + presence).min(MAX_REVOLT_CHANCE)
    }

    /// Roll for a revolt. A revolt resets the base and leaves an exhausted
    /// populace behind.
    pub fn check_revolt(
        &mut self,
        rng: &mut dyn RandomSource,
        now: DateTime<Utc>,
    ) -> Option<(RevoltOutcome, DomainEvent)> {
        let tension = self.current(now);
        if tension < REVOLT_THRESHOLD {
            return None;
        }

        if !rng.chance(self.revolt_probability(now)) {
            return None;
        }

        let duration_hours = rng.range(24, 72) as u32;
        let casualties = rng.range(0, 20) as u32;

        self.base = self.config.baseline;
        self.add_modifier(
            "post-revolt exhaustion",
            POST_REVOLT_RELIEF,
            Some(Duration::hours(POST_REVOLT_RELIEF_HOURS)),
            now,
        );

        let event = DomainEvent::RevoltTriggered {
            region_id: self.region_id,
            poi_id: self.poi_id,
            duration_hours,
            tension_at_start: tension,
        };
        Some((
            RevoltOutcome {
                duration_hours,
                casualties,
                participating: self.factions_present.clone(),
            },
            event,
        ))
    }
}

/// A named region-level threshold that fires when any POI runs hot enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictTrigger {
    pub name: String,
    pub threshold: f32,
}

/// Aggregate view over a region's POIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTensionSummary {
    pub region_id: RegionId,
    pub poi_count: usize,
    pub average: f32,
    pub max: f32,
    /// POI currently running hottest, if any
    pub hottest_poi: Option<PoiId>,
}

/// Summarize a region's POIs at a point in time.
pub fn summarize_region(
    region_id: RegionId,
    states: &[&TensionState],
    now: DateTime<Utc>,
) -> RegionTensionSummary {
    let levels: Vec<(PoiId, f32)> = states
        .iter()
        .filter(|s| s.region_id == region_id)
        .map(|s| (s.poi_id, s.current(now)))
        .collect();

    let max_entry = levels
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1));
    let average = if levels.is_empty() {
        0.0
    } else {
        levels.iter().map(|(_, t)| t).sum::<f32>() / levels.len() as f32
    };

    RegionTensionSummary {
        region_id,
        poi_count: levels.len(),
        average,
        max: max_entry.map(|(_, t)| t).unwrap_or(0.0),
        hottest_poi: max_entry.map(|(id, _)| id),
    }
}

/// Evaluate a region's conflict triggers against its hottest POI.
pub fn fired_triggers(
    summary: &RegionTensionSummary,
    triggers: &[ConflictTrigger],
) -> Vec<DomainEvent> {
    triggers
        .iter()
        .filter(|t| summary.max >= t.threshold)
        .map(|t| DomainEvent::ConflictTriggered {
            region_id: summary.region_id,
            trigger_name: t.name.clone(),
            max_tension: summary.max,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedRandom;

    fn state(now: DateTime<Utc>) -> TensionState {
        TensionState::new(RegionId::new(), PoiId::new(), now)
    }

    #[test]
    fn starts_at_baseline() {
        let now = Utc::now();
        let state = state(now);
        assert_eq!(state.current(now), TensionConfig::default().baseline);
    }

    #[test]
    fn combat_impact_scales_with_circumstances() {
        let loud = TensionEventKind::PlayerCombat {
            lethal: true,
            stealthy: false,
        };
        let quiet = TensionEventKind::PlayerCombat {
            lethal: true,
            stealthy: true,
        };
        assert!(loud.impact() > quiet.impact());
        assert!((loud.impact() - 0.225).abs() < f32::EPSILON);
    }

    #[test]
    fn important_npc_death_hits_hardest() {
        let kind = TensionEventKind::NpcDeath {
            important: true,
            civilian: false,
        };
        assert!((kind.impact() - 0.4).abs() < f32::EPSILON);
        assert_eq!(Severity::from_impact(kind.impact()), Severity::Moderate);
    }

    #[test]
    fn festivals_lower_tension() {
        let now = Utc::now();
        let mut state = state(now);
        state.apply_event(
            TensionEventKind::NpcDeath {
                important: false,
                civilian: true,
            },
            now,
        );
        let before = state.current(now);
        state.apply_event(TensionEventKind::Festival, now);
        assert!(state.current(now) < before);
    }

    #[test]
    fn tension_decays_toward_baseline_per_hour() {
        let now = Utc::now();
        let mut state = state(now);
        state.apply_event(
            TensionEventKind::NpcDeath {
                important: true,
                civilian: true,
            },
            now,
        );
        let heated = state.current(now);

        state.tick(now + Duration::hours(10));
        let later = state.current(now + Duration::hours(10));
        assert!((heated - later - 0.1).abs() < 1e-4);

        // Enough time returns it to the baseline exactly
        state.tick(now + Duration::hours(500));
        assert_eq!(
            state.current(now + Duration::hours(500)),
            state.config.baseline
        );
    }

    #[test]
    fn modifiers_expire() {
        let now = Utc::now();
        let mut state = state(now);
        state.add_modifier("curfew", 0.3, Some(Duration::hours(6)), now);
        assert!(state.current(now) > state.config.baseline);
        assert!(state.current(now + Duration::hours(7)) <= state.config.baseline);

        state.tick(now + Duration::hours(7));
        assert!(state.modifiers().is_empty());
    }

    #[test]
    fn no_revolt_below_threshold() {
        let now = Utc::now();
        let mut state = state(now);
        // A crowded POI still needs the tension to get there first
        state.set_factions_present(vec![FactionId::new(), FactionId::new()]);
        let mut rng = FixedRandom::new(true);
        assert_eq!(state.revolt_probability(now), 0.0);
        assert!(state.check_revolt(&mut rng, now).is_none());
    }

    #[test]
    fn faction_presence_raises_revolt_probability() {
        let now = Utc::now();
        let mut state = state(now);
        state.add_modifier("occupation", 0.7, None, now);

        let alone = state.revolt_probability(now);
        state.set_factions_present(vec![FactionId::new(), FactionId::new()]);
        let contested = state.revolt_probability(now);
        assert!((contested - alone - 0.2).abs() < 1e-6);

        // Presence never pushes past the ceiling
        state.set_factions_present((0..10).map(|_| FactionId::new()).collect());
        assert!((state.revolt_probability(now) - MAX_REVOLT_CHANCE).abs() < 1e-6);
    }

    #[test]
    fn revolt_records_participating_factions() {
        let now = Utc::now();
        let mut state = state(now);
        state.add_modifier("occupation", 0.7, None, now);
        let factions = vec![FactionId::new(), FactionId::new()];
        state.set_factions_present(factions.clone());
        let mut rng = FixedRandom::new(true);

        let (outcome, _) = state.check_revolt(&mut rng, now).expect("revolt fires");
        assert_eq!(outcome.participating, factions);
    }

    #[test]
    fn revolt_fires_at_high_tension_and_leaves_relief() {
        let now = Utc::now();
        let mut state = state(now);
        state.add_modifier("occupation", 0.7, None, now);
        let mut rng = FixedRandom::new(true);

        let (outcome, event) = state.check_revolt(&mut rng, now).expect("revolt fires");
        assert_eq!(outcome.duration_hours, 24); // FixedRandom picks range minimums
        assert!(matches!(event, DomainEvent::RevoltTriggered { .. }));

        // Base reset plus the relief modifier drags tension down hard
        let after = state.current(now);
        assert!(after < REVOLT_THRESHOLD);
        assert!(state
            .modifiers()
            .iter()
            .any(|m| m.name == "post-revolt exhaustion"));
    }

    #[test]
    fn revolt_respects_rng_refusal() {
        let now = Utc::now();
        let mut state = state(now);
        state.add_modifier("occupation", 0.7, None, now);
        let mut rng = FixedRandom::new(false);
        assert!(state.check_revolt(&mut rng, now).is_none());
    }

    #[test]
    fn region_summary_and_triggers() {
        let now = Utc::now();
        let region = RegionId::new();
        let mut calm = TensionState::new(region, PoiId::new(), now);
        calm.tick(now);
        let mut hot = TensionState::new(region, PoiId::new(), now);
        hot.add_modifier("siege", 0.8, None, now);

        let summary = summarize_region(region, &[&calm, &hot], now);
        assert_eq!(summary.poi_count, 2);
        assert_eq!(summary.hottest_poi, Some(hot.poi_id));
        assert!(summary.max > 0.9);

        let triggers = vec![
            ConflictTrigger {
                name: "garrison deployed".to_string(),
                threshold: 0.7,
            },
            ConflictTrigger {
                name: "martial law".to_string(),
                threshold: 0.99,
            },
        ];
        let fired = fired_triggers(&summary, &triggers);
        assert_eq!(fired.len(), 1);
        assert!(matches!(
            &fired[0],
            DomainEvent::ConflictTriggered { trigger_name, .. } if trigger_name == "garrison deployed"
        ));
    }
}
