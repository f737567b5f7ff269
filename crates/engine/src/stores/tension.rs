//! In-memory world tension state.
//!
//! Holds the faction ledger behind an async lock and per-POI unrest in a
//! concurrent map. The tick loop drives decay and revolt checks through
//! here; everything else is thin delegation into the domain types.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use questweave_domain::events::DomainEvent;
use questweave_domain::ids::{FactionId, PoiId, RegionId};
use questweave_domain::tension::{
    fired_triggers, summarize_region, ConflictTrigger, RegionTensionSummary, Severity,
    TensionEventKind, TensionLedger, TensionState,
};
use questweave_domain::value_objects::{Standing, TensionLevel};
use questweave_domain::RandomSource;

pub struct TensionStore {
    ledger: RwLock<TensionLedger>,
    local: DashMap<(RegionId, PoiId), TensionState>,
    /// Region-level thresholds evaluated on every tick
    triggers: Vec<ConflictTrigger>,
}

impl TensionStore {
    pub fn new() -> Self {
        Self::with_triggers(Vec::new())
    }

    pub fn with_triggers(triggers: Vec<ConflictTrigger>) -> Self {
        Self {
            ledger: RwLock::new(TensionLedger::new()),
            local: DashMap::new(),
            triggers,
        }
    }

    /// Shift diplomatic tension between two factions.
    pub async fn shift(
        &self,
        a: FactionId,
        b: FactionId,
        delta: i32,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> (TensionLevel, Vec<DomainEvent>) {
        self.ledger.write().await.apply_delta(a, b, delta, source, now)
    }

    pub async fn level(&self, a: FactionId, b: FactionId) -> TensionLevel {
        self.ledger.read().await.level(a, b)
    }

    pub async fn standing(&self, a: FactionId, b: FactionId) -> Standing {
        self.ledger.read().await.standing(a, b)
    }

    /// Run a closure against the ledger. Quest generation needs read access
    /// to the whole ledger for rival scans.
    pub async fn with_ledger<R>(&self, f: impl FnOnce(&TensionLedger) -> R) -> R {
        f(&*self.ledger.read().await)
    }

    pub async fn with_ledger_mut<R>(&self, f: impl FnOnce(&mut TensionLedger) -> R) -> R {
        f(&mut *self.ledger.write().await)
    }

    /// Record something that happened at a POI.
    pub fn record_local_event(
        &self,
        region_id: RegionId,
        poi_id: PoiId,
        kind: TensionEventKind,
        now: DateTime<Utc>,
    ) -> (f32, Severity) {
        let mut state = self
            .local
            .entry((region_id, poi_id))
            .or_insert_with(|| TensionState::new(region_id, poi_id, now));
        state.apply_event(kind, now)
    }

    /// Replace the factions operating at a POI; feeds revolt checks.
    pub fn set_faction_presence(
        &self,
        region_id: RegionId,
        poi_id: PoiId,
        factions: Vec<FactionId>,
        now: DateTime<Utc>,
    ) {
        let mut state = self
            .local
            .entry((region_id, poi_id))
            .or_insert_with(|| TensionState::new(region_id, poi_id, now));
        state.set_factions_present(factions);
    }

    pub fn local_tension(&self, region_id: RegionId, poi_id: PoiId, now: DateTime<Utc>) -> f32 {
        self.local
            .get(&(region_id, poi_id))
            .map(|s| s.current(now))
            .unwrap_or(0.0)
    }

    /// Aggregate view over one region's POIs.
    pub fn region_summary(&self, region_id: RegionId, now: DateTime<Utc>) -> RegionTensionSummary {
        let states: Vec<TensionState> = self
            .local
            .iter()
            .filter(|entry| entry.key().0 == region_id)
            .map(|entry| entry.value().clone())
            .collect();
        let refs: Vec<&TensionState> = states.iter().collect();
        summarize_region(region_id, &refs, now)
    }

    /// Advance the world clock: decay the faction ledger, tick every POI,
    /// roll revolt checks, and evaluate region conflict triggers.
    pub async fn tick(
        &self,
        now: DateTime<Utc>,
        rng: &mut (dyn RandomSource + Send),
    ) -> Vec<DomainEvent> {
        let mut events = self.ledger.write().await.decay_all(now);

        let mut regions: Vec<RegionId> = Vec::new();
        for mut entry in self.local.iter_mut() {
            let state = entry.value_mut();
            state.tick(now);
            if let Some((_, event)) = state.check_revolt(rng, now) {
                events.push(event);
            }
            if !regions.contains(&entry.key().0) {
                regions.push(entry.key().0);
            }
        }

        if !self.triggers.is_empty() {
            for region_id in regions {
                let summary = self.region_summary(region_id, now);
                events.extend(fired_triggers(&summary, &self.triggers));
            }
        }

        events
    }
}

impl Default for TensionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::{FixedClock, FixedRandom};
    use crate::infrastructure::ports::ClockPort;
    use chrono::Duration;

    #[tokio::test]
    async fn shift_and_read_back() {
        let store = TensionStore::new();
        let (a, b) = (FactionId::new(), FactionId::new());
        let now = Utc::now();

        store.shift(a, b, 35, "border raid", now).await;
        assert_eq!(store.level(a, b).await.value(), 35);
        assert_eq!(store.standing(a, b).await, Standing::Hostile);
    }

    #[tokio::test]
    async fn tick_decays_the_ledger() {
        let store = TensionStore::new();
        let (a, b) = (FactionId::new(), FactionId::new());
        let now = Utc::now();
        store.shift(a, b, 40, "skirmish", now).await;

        let mut rng = FixedRandom(false);
        store.tick(now + Duration::days(2), &mut rng).await;
        assert_eq!(store.level(a, b).await.value(), 38);
    }

    #[tokio::test]
    async fn local_events_accumulate_per_poi() {
        let store = TensionStore::new();
        let region = RegionId::new();
        let poi = PoiId::new();
        let now = Utc::now();

        let (delta, severity) = store.record_local_event(
            region,
            poi,
            TensionEventKind::NpcDeath {
                important: true,
                civilian: false,
            },
            now,
        );
        assert!(delta > 0.0);
        assert_eq!(severity, Severity::Moderate);
        assert!(store.local_tension(region, poi, now) > 0.0);
        // A different POI is untouched
        assert_eq!(store.local_tension(region, PoiId::new(), now), 0.0);
    }

    #[tokio::test]
    async fn tick_rolls_revolts_for_contested_pois() {
        let store = TensionStore::new();
        let clock = FixedClock(Utc::now());
        let region = RegionId::new();
        let poi = PoiId::new();
        let now = clock.now();

        store.record_local_event(
            region,
            poi,
            TensionEventKind::NpcDeath {
                important: true,
                civilian: true,
            },
            now,
        );
        store.record_local_event(
            region,
            poi,
            TensionEventKind::PlayerCombat {
                lethal: true,
                stealthy: false,
            },
            now,
        );
        store.set_faction_presence(region, poi, vec![FactionId::new()], now);

        let mut rng = FixedRandom(true);
        let events = store.tick(clock.now(), &mut rng).await;
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::RevoltTriggered { .. })));
    }

    #[tokio::test]
    async fn tick_fires_conflict_triggers() {
        let store = TensionStore::with_triggers(vec![ConflictTrigger {
            name: "garrison deployed".to_string(),
            threshold: 0.5,
        }]);
        let region = RegionId::new();
        let poi = PoiId::new();
        let now = Utc::now();

        store.record_local_event(
            region,
            poi,
            TensionEventKind::NpcDeath {
                important: true,
                civilian: true,
            },
            now,
        );
        store.record_local_event(
            region,
            poi,
            TensionEventKind::PlayerCombat {
                lethal: true,
                stealthy: false,
            },
            now,
        );

        let mut rng = FixedRandom(false);
        let events = store.tick(now, &mut rng).await;
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::ConflictTriggered { .. })));
    }

    #[tokio::test]
    async fn region_summary_counts_only_that_region() {
        let store = TensionStore::new();
        let region = RegionId::new();
        let other = RegionId::new();
        let now = Utc::now();

        store.record_local_event(region, PoiId::new(), TensionEventKind::Theft, now);
        store.record_local_event(other, PoiId::new(), TensionEventKind::Theft, now);

        let summary = store.region_summary(region, now);
        assert_eq!(summary.poi_count, 1);
    }
}
