//! Faction tension ledger.
//!
//! Pairwise tension between factions, keyed order-independently. All time
//! passes through explicit `now` arguments; decay is applied lazily when a
//! pair is touched and in bulk by `decay_all`, never by a background task.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::DomainEvent;
use crate::ids::FactionId;
use crate::value_objects::{Standing, TensionLevel};

/// How long an event stays in a pair's recent history.
const RECENT_EVENT_WINDOW_HOURS: i64 = 24;

/// Normalized faction pair. Construction sorts the two IDs, so
/// `(a, b)` and `(b, a)` address the same ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactionPair(FactionId, FactionId);

impl FactionPair {
    pub fn new(a: FactionId, b: FactionId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    pub fn first(&self) -> FactionId {
        self.0
    }

    pub fn second(&self) -> FactionId {
        self.1
    }
}

/// A dated entry in a pair's recent history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionEvent {
    pub occurred_at: DateTime<Utc>,
    pub source: String,
    pub delta: i32,
}

/// Tension state for one faction pair
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionRecord {
    pub level: TensionLevel,
    pub last_updated: DateTime<Utc>,
    last_decayed: DateTime<Utc>,
    recent_events: Vec<TensionEvent>,
}

impl TensionRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            level: TensionLevel::NEUTRAL,
            last_updated: now,
            last_decayed: now,
            recent_events: Vec::new(),
        }
    }

    pub fn recent_events(&self) -> &[TensionEvent] {
        &self.recent_events
    }

    fn trim_recent(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(RECENT_EVENT_WINDOW_HOURS);
        self.recent_events.retain(|e| e.occurred_at >= cutoff);
    }

    /// Pull the level toward neutral for the full days elapsed since the
    /// last decay. Alliances erode at half rate. Returns the points shed.
    fn decay(&mut self, now: DateTime<Utc>) -> i32 {
        let elapsed_days = (now - self.last_decayed).num_days();
        if elapsed_days < 1 {
            return 0;
        }
        let (points, consumed_days) = if self.level.is_allied() {
            let points = elapsed_days / 2;
            (points, points * 2)
        } else {
            (elapsed_days, elapsed_days)
        };
        if points == 0 {
            return 0;
        }
        self.level = self.level.decayed_toward_neutral(points as i32);
        self.last_decayed += Duration::days(consumed_days);
        points as i32
    }
}

/// Keyed ledger of pairwise faction tension.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensionLedger {
    records: HashMap<FactionPair, TensionRecord>,
}

impl TensionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tension for a pair. Unknown pairs sit at neutral.
    pub fn level(&self, a: FactionId, b: FactionId) -> TensionLevel {
        self.records
            .get(&FactionPair::new(a, b))
            .map(|r| r.level)
            .unwrap_or(TensionLevel::NEUTRAL)
    }

    pub fn standing(&self, a: FactionId, b: FactionId) -> Standing {
        self.level(a, b).standing()
    }

    pub fn record(&self, a: FactionId, b: FactionId) -> Option<&TensionRecord> {
        self.records.get(&FactionPair::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Shift tension between two factions. Returns the new level and any
    /// events the shift produced, threshold crossings included.
    pub fn apply_delta(
        &mut self,
        a: FactionId,
        b: FactionId,
        delta: i32,
        source: impl Into<String>,
        now: DateTime<Utc>,
    ) -> (TensionLevel, Vec<DomainEvent>) {
        let pair = FactionPair::new(a, b);
        let record = self
            .records
            .entry(pair)
            .or_insert_with(|| TensionRecord::new(now));

        let old = record.level;
        // Settle pending decay before the shift so stale pairs don't jump
        record.decay(now);
        let new = record.level.apply(delta);
        record.level = new;
        record.last_updated = now;
        record.recent_events.push(TensionEvent {
            occurred_at: now,
            source: source.into(),
            delta,
        });
        record.trim_recent(now);

        let mut events = vec![DomainEvent::TensionShifted {
            faction_a: pair.first(),
            faction_b: pair.second(),
            old_level: old,
            new_level: new,
            source: record
                .recent_events
                .last()
                .map(|e| e.source.clone())
                .unwrap_or_default(),
        }];
        events.extend(crossing_events(pair, old, new));
        (new, events)
    }

    /// Pin a pair to an exact level without emitting shift history.
    pub fn set_level(&mut self, a: FactionId, b: FactionId, level: TensionLevel, now: DateTime<Utc>) {
        let record = self
            .records
            .entry(FactionPair::new(a, b))
            .or_insert_with(|| TensionRecord::new(now));
        record.level = level;
        record.last_updated = now;
    }

    /// Decay every pair toward neutral: one point per full day since the
    /// last decay, alliances at half that rate. Pairs updated less than a
    /// day ago are untouched.
    pub fn decay_all(&mut self, now: DateTime<Utc>) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        for (pair, record) in &mut self.records {
            let old = record.level;
            if record.decay(now) == 0 {
                continue;
            }
            record.trim_recent(now);

            if record.level != old {
                events.extend(crossing_events(*pair, old, record.level));
            }
        }
        events
    }

    /// Pairs currently at war.
    pub fn wars(&self) -> Vec<FactionPair> {
        self.pairs_where(|level| level.is_at_war())
    }

    /// Pairs currently allied.
    pub fn alliances(&self) -> Vec<FactionPair> {
        self.pairs_where(|level| level.is_allied())
    }

    fn pairs_where(&self, predicate: impl Fn(TensionLevel) -> bool) -> Vec<FactionPair> {
        let mut pairs: Vec<FactionPair> = self
            .records
            .iter()
            .filter(|(_, r)| predicate(r.level))
            .map(|(&pair, _)| pair)
            .collect();
        pairs.sort();
        pairs
    }

    /// Every faction the given one is at war with.
    pub fn enemies_of(&self, faction: FactionId) -> Vec<FactionId> {
        self.wars()
            .into_iter()
            .filter_map(|pair| {
                if pair.first() == faction {
                    Some(pair.second())
                } else if pair.second() == faction {
                    Some(pair.first())
                } else {
                    None
                }
            })
            .collect()
    }
}

/// Events for threshold crossings between two levels.
fn crossing_events(pair: FactionPair, old: TensionLevel, new: TensionLevel) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    let war = TensionLevel::WAR_THRESHOLD;
    let alliance = TensionLevel::ALLIANCE_THRESHOLD;

    if old.value() < war && new.value() >= war {
        events.push(DomainEvent::WarDeclared {
            faction_a: pair.first(),
            faction_b: pair.second(),
            tension: new,
        });
    }
    if old.value() >= war && new.value() < war {
        events.push(DomainEvent::PeaceOpportunity {
            faction_a: pair.first(),
            faction_b: pair.second(),
            tension: new,
        });
    }
    if old.value() > alliance && new.value() <= alliance {
        events.push(DomainEvent::AllianceFormed {
            faction_a: pair.first(),
            faction_b: pair.second(),
            tension: new,
        });
    }
    events
}
