//! The quest board: posting, gating, and settling quests.
//!
//! Owns the dependency graph, the live quest set, and the template pool,
//! and coordinates the domain's generation and tension logic. All time and
//! randomness come in from the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use questweave_domain::entities::{Faction, FactionStanding, Quest, QuestStatus, QuestTemplate};
use questweave_domain::error::DomainError;
use questweave_domain::events::DomainEvent;
use questweave_domain::graph::{DependencyKind, GraphAnalysis, QuestGraph};
use questweave_domain::ids::{FactionId, QuestId};
use questweave_domain::quests::{
    apply_outcome, generate_competing, generate_fallback, instantiate, modify_for_faction,
    select_template, GenerationContext, SelectionCriteria,
};
use questweave_domain::tension::ConsequenceLedger;
use questweave_domain::value_objects::{Difficulty, Theme};
use questweave_domain::RandomSource;

use crate::stores::TensionStore;

/// A freshly posted quest with any counter-quests rivals fielded.
#[derive(Debug)]
pub struct Posting {
    pub quest: Quest,
    pub counters: Vec<Quest>,
}

pub struct QuestBoard {
    graph: RwLock<QuestGraph>,
    quests: DashMap<QuestId, Quest>,
    templates: RwLock<Vec<QuestTemplate>>,
    factions: DashMap<FactionId, Faction>,
    standings: DashMap<FactionId, FactionStanding>,
    consequences: RwLock<ConsequenceLedger>,
    tension: Arc<TensionStore>,
}

impl QuestBoard {
    pub fn new(tension: Arc<TensionStore>) -> Self {
        Self {
            graph: RwLock::new(QuestGraph::new()),
            quests: DashMap::new(),
            templates: RwLock::new(Vec::new()),
            factions: DashMap::new(),
            standings: DashMap::new(),
            consequences: RwLock::new(ConsequenceLedger::new()),
            tension,
        }
    }

    pub async fn add_template(&self, template: QuestTemplate) {
        self.templates.write().await.push(template);
    }

    /// Register a faction and open a neutral standing with it.
    pub fn add_faction(&self, faction: Faction, now: DateTime<Utc>) {
        self.standings
            .entry(faction.id)
            .or_insert_with(|| FactionStanding::new(faction.id, now));
        self.factions.insert(faction.id, faction);
    }

    pub fn quest(&self, id: QuestId) -> Option<Quest> {
        self.quests.get(&id).map(|q| q.clone())
    }

    pub fn standing(&self, faction_id: FactionId) -> Option<FactionStanding> {
        self.standings.get(&faction_id).map(|s| s.clone())
    }

    /// Post a quest from the template pool. Falls back to algorithmic
    /// generation when no template matches the criteria.
    pub async fn post(
        &self,
        criteria: &SelectionCriteria,
        ctx: &GenerationContext,
        faction_id: Option<FactionId>,
        now: DateTime<Utc>,
        rng: &mut impl RandomSource,
    ) -> Result<Posting, DomainError> {
        let faction = faction_id.and_then(|id| self.factions.get(&id).map(|f| f.clone()));
        let standing = faction_id.and_then(|id| self.standing(id));

        let templates = self.templates.read().await;
        let quest = match select_template(&templates, criteria, standing.as_ref(), rng) {
            Some(template) => {
                let mut quest = instantiate(template, ctx, faction.as_ref(), now, rng);
                if let Some(faction) = &faction {
                    modify_for_faction(&mut quest, faction);
                }
                quest
            }
            None => {
                let theme = criteria.theme.unwrap_or(Theme::General);
                let difficulty = criteria.difficulty.unwrap_or(Difficulty::Easy);
                tracing::debug!(
                    theme = %theme,
                    difficulty = %difficulty,
                    "No template matched, generating algorithmically"
                );
                let mut quest =
                    generate_fallback(theme, difficulty, ctx, faction.as_ref(), now, rng);
                if let Some(faction) = &faction {
                    modify_for_faction(&mut quest, faction);
                }
                quest
            }
        };
        drop(templates);

        let rivals: Vec<Faction> = self.factions.iter().map(|f| f.clone()).collect();
        let counters = self
            .tension
            .with_ledger(|ledger| generate_competing(&quest, &rivals, ledger, now, rng))
            .await;

        let mut graph = self.graph.write().await;
        graph.add_quest(quest.id, quest.title.clone())?;
        for counter in &counters {
            graph.add_quest(counter.id, counter.title.clone())?;
            // Completing either side locks the other out
            graph.add_dependency(quest.id, counter.id, DependencyKind::Exclusive)?;
        }
        drop(graph);

        self.quests.insert(quest.id, quest.clone());
        for counter in &counters {
            self.quests.insert(counter.id, counter.clone());
        }

        tracing::info!(
            quest_id = %quest.id,
            title = %quest.title,
            counters = counters.len(),
            "Quest posted"
        );
        Ok(Posting { quest, counters })
    }

    /// Wire a dependency between two posted quests.
    ///
    /// Cycles are not checked here; call [`Self::ensure_acyclic`] after a
    /// batch of edits, or read them from [`Self::analyze`].
    pub async fn add_dependency(
        &self,
        from: QuestId,
        to: QuestId,
        kind: DependencyKind,
    ) -> Result<(), DomainError> {
        self.graph.write().await.add_dependency(from, to, kind)
    }

    pub async fn ensure_acyclic(&self) -> Result<(), DomainError> {
        self.graph.read().await.ensure_acyclic()
    }

    pub async fn analyze(&self) -> GraphAnalysis {
        self.graph.read().await.analyze()
    }

    pub async fn export_dot(&self) -> String {
        self.graph.read().await.to_dot()
    }

    pub async fn export_json(&self) -> Result<String, DomainError> {
        let export = self.graph.read().await.export();
        serde_json::to_string_pretty(&export)
            .map_err(|e| DomainError::parse(format!("Graph export failed: {}", e)))
    }

    /// Quests a player could take up right now: graph gates open, not
    /// expired, still pending.
    pub async fn available(&self, now: DateTime<Utc>) -> Vec<Quest> {
        let completed = self
            .quests
            .iter()
            .filter(|q| q.status == QuestStatus::Completed)
            .map(|q| q.id)
            .collect();

        let graph = self.graph.read().await;
        graph
            .available(&completed)
            .into_iter()
            .filter_map(|id| self.quests.get(&id).map(|q| q.clone()))
            .filter(|q| q.status == QuestStatus::Pending && !q.is_expired(now))
            .collect()
    }

    pub fn activate(&self, id: QuestId) -> Result<(), DomainError> {
        self.with_quest_mut(id, |q| q.activate())
    }

    pub fn complete_step(&self, id: QuestId, step: usize) -> Result<(), DomainError> {
        self.with_quest_mut(id, |q| q.complete_step(step))
    }

    fn with_quest_mut(
        &self,
        id: QuestId,
        f: impl FnOnce(&mut Quest) -> Result<(), DomainError>,
    ) -> Result<(), DomainError> {
        let mut quest = self
            .quests
            .get_mut(&id)
            .ok_or(DomainError::UnknownQuest(id))?;
        f(&mut quest)
    }

    /// Settle a quest's outcome: transition its status, move the player's
    /// standing, aggravate the issuer's enemies, and record consequences.
    pub async fn record_outcome(
        &self,
        id: QuestId,
        succeeded: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<DomainEvent>, DomainError> {
        let quest = {
            let mut entry = self
                .quests
                .get_mut(&id)
                .ok_or(DomainError::UnknownQuest(id))?;
            if succeeded {
                entry.complete()?;
            } else {
                entry.fail()?;
            }
            entry.clone()
        };

        let mut events = Vec::new();
        if let Some(faction_id) = quest.faction_id {
            // Work on a copy so no map guard is held across the ledger lock
            let mut standing = self
                .standings
                .get(&faction_id)
                .map(|s| s.clone())
                .unwrap_or_else(|| FactionStanding::new(faction_id, now));
            events = self
                .tension
                .with_ledger_mut(|ledger| {
                    apply_outcome(&quest, succeeded, &mut standing, ledger, now)
                })
                .await;
            self.standings.insert(faction_id, standing);
        } else {
            events.push(if succeeded {
                DomainEvent::QuestCompleted {
                    quest_id: quest.id,
                    faction_id: None,
                }
            } else {
                DomainEvent::QuestFailed {
                    quest_id: quest.id,
                    faction_id: None,
                }
            });
        }

        let changes = if succeeded {
            &quest.consequences.success
        } else {
            &quest.consequences.failure
        };
        if !changes.is_empty() {
            let mut ledger = self.consequences.write().await;
            for change in changes {
                let consequence_id = ledger.record(change.clone(), Some(quest.id), None, now);
                events.push(DomainEvent::ConsequenceRecorded {
                    consequence_id,
                    severity: questweave_domain::tension::Severity::from_impact(change.value),
                });
            }
        }

        tracing::info!(
            quest_id = %id,
            succeeded,
            events = events.len(),
            "Quest outcome recorded"
        );
        Ok(events)
    }

    /// Expire overdue quests. Returns the IDs that expired on this sweep.
    pub fn expire_due(&self, now: DateTime<Utc>) -> Vec<QuestId> {
        let mut expired = Vec::new();
        for mut entry in self.quests.iter_mut() {
            if entry.value_mut().expire_if_due(now) {
                expired.push(*entry.key());
            }
        }
        if !expired.is_empty() {
            tracing::info!(count = expired.len(), "Quests expired");
        }
        expired
    }

    /// Pending consequences awaiting application, oldest first.
    pub async fn pending_consequences(&self) -> usize {
        self.consequences.read().await.pending().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use chrono::Duration;
    use questweave_domain::value_objects::TensionLevel;

    fn board() -> QuestBoard {
        QuestBoard::new(Arc::new(TensionStore::new()))
    }

    fn easy_template(theme: Theme) -> QuestTemplate {
        QuestTemplate::new("Posted errand", theme, Difficulty::Easy).with_base_rewards(50, 100)
    }

    #[tokio::test]
    async fn posting_from_template_registers_in_graph() {
        let board = board();
        board.add_template(easy_template(Theme::Trade)).await;
        let mut rng = FixedRandom(false);

        let posting = board
            .post(
                &SelectionCriteria::themed(Theme::Trade),
                &GenerationContext::new(1),
                None,
                Utc::now(),
                &mut rng,
            )
            .await
            .expect("posts");
        assert_eq!(posting.quest.title, "Posted errand");
        assert!(posting.counters.is_empty());

        let available = board.available(Utc::now()).await;
        assert_eq!(available.len(), 1);
    }

    #[tokio::test]
    async fn empty_pool_falls_back_to_generation() {
        let board = board();
        let mut rng = FixedRandom(false);

        let posting = board
            .post(
                &SelectionCriteria::themed(Theme::Combat).with_difficulty(Difficulty::Easy),
                &GenerationContext::new(3),
                None,
                Utc::now(),
                &mut rng,
            )
            .await
            .expect("falls back");
        assert!(posting.quest.template_id.is_none());
        assert_eq!(posting.quest.theme, Theme::Combat);
    }

    #[tokio::test]
    async fn warring_rival_fields_a_counter() {
        let tension = Arc::new(TensionStore::new());
        let board = QuestBoard::new(tension.clone());
        let now = Utc::now();

        let crown = Faction::new("Crown");
        let rebels = Faction::new("Rebels");
        let crown_id = crown.id;
        let rebel_id = rebels.id;
        board.add_faction(crown, now);
        board.add_faction(rebels, now);
        tension
            .with_ledger_mut(|l| l.set_level(crown_id, rebel_id, TensionLevel::clamped(80), now))
            .await;

        let mut rng = FixedRandom(true);
        let posting = board
            .post(
                &SelectionCriteria::themed(Theme::Combat).with_difficulty(Difficulty::Easy),
                &GenerationContext::new(3),
                Some(crown_id),
                now,
                &mut rng,
            )
            .await
            .expect("posts");
        assert_eq!(posting.counters.len(), 1);
        assert_eq!(posting.counters[0].faction_id, Some(rebel_id));

        // Completing the original locks out the counter
        let original = posting.quest.id;
        board.activate(original).expect("activates");
        for step in 0..posting.quest.steps.len() {
            board.complete_step(original, step).expect("step exists");
        }
        board
            .record_outcome(original, true, now)
            .await
            .expect("settles");
        let available = board.available(now).await;
        assert!(available.iter().all(|q| q.id != posting.counters[0].id));
    }

    #[tokio::test]
    async fn prerequisites_gate_availability() {
        let board = board();
        board.add_template(easy_template(Theme::Trade)).await;
        let mut rng = FixedRandom(false);
        let now = Utc::now();
        let criteria = SelectionCriteria::themed(Theme::Trade);
        let ctx = GenerationContext::new(1);

        let first = board
            .post(&criteria, &ctx, None, now, &mut rng)
            .await
            .expect("posts");
        let second = board
            .post(&criteria, &ctx, None, now, &mut rng)
            .await
            .expect("posts");
        board
            .add_dependency(first.quest.id, second.quest.id, DependencyKind::Prerequisite)
            .await
            .expect("edge");
        board.ensure_acyclic().await.expect("no cycles");

        let available = board.available(now).await;
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, first.quest.id);
    }

    #[tokio::test]
    async fn outcome_moves_standing_and_records_consequences() {
        let board = board();
        let now = Utc::now();
        let faction = Faction::new("Crown");
        let faction_id = faction.id;
        board.add_faction(faction, now);
        board.add_template(easy_template(Theme::Trade)).await;

        let mut rng = FixedRandom(false);
        let posting = board
            .post(
                &SelectionCriteria::themed(Theme::Trade),
                &GenerationContext::new(1),
                Some(faction_id),
                now,
                &mut rng,
            )
            .await
            .expect("posts");

        // Attach a consequence before settling
        {
            let mut quest = board.quests.get_mut(&posting.quest.id).expect("exists");
            quest.consequences.success.push(
                questweave_domain::tension::WorldStateChange::new("Trade route opens", 0.6),
            );
        }

        let id = posting.quest.id;
        board.activate(id).expect("activates");
        for step in 0..posting.quest.steps.len() {
            board.complete_step(id, step).expect("step exists");
        }
        let events = board.record_outcome(id, true, now).await.expect("settles");

        let standing = board.standing(faction_id).expect("standing exists");
        assert_eq!(standing.completed_quests, 1);
        assert!(standing.reputation > 0);
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::QuestCompleted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::ConsequenceRecorded { .. })));
        assert_eq!(board.pending_consequences().await, 1);
    }

    #[tokio::test]
    async fn expiry_sweep_is_clock_driven() {
        let board = board();
        board.add_template(easy_template(Theme::Trade)).await;
        let mut rng = FixedRandom(false);
        let now = Utc::now();

        let posting = board
            .post(
                &SelectionCriteria::themed(Theme::Trade),
                &GenerationContext::new(1),
                None,
                now,
                &mut rng,
            )
            .await
            .expect("posts");

        assert!(board.expire_due(now).is_empty());
        let later = now + Duration::days(Difficulty::Easy.expiry_days() + 1);
        let expired = board.expire_due(later);
        assert_eq!(expired, vec![posting.quest.id]);
        assert!(board.available(later).await.is_empty());
    }

    #[tokio::test]
    async fn unknown_quest_is_an_error() {
        let board = board();
        assert!(matches!(
            board.record_outcome(QuestId::new(), true, Utc::now()).await,
            Err(DomainError::UnknownQuest(_))
        ));
    }
}
