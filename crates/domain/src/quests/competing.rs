//! Faction interplay around quests: issuer modifications, counter-quests
//! from rivals, and the standing fallout of an outcome.

use chrono::{DateTime, Duration, Utc};

use crate::entities::{Faction, FactionStanding, Quest, QuestStatus, QuestStep};
use crate::events::DomainEvent;
use crate::ids::QuestId;
use crate::random::RandomSource;
use crate::tension::{TensionLedger, WorldStateChange};
use crate::value_objects::{Difficulty, RewardSet, Standing};

/// Chance a rival at war fields a counter-quest.
const COUNTER_CHANCE_AT_WAR: f64 = 0.6;
/// Chance a merely hostile rival fields one.
const COUNTER_CHANCE_HOSTILE: f64 = 0.3;

/// Reputation gained with the issuer on success when the reward set carries
/// no explicit reputation grant.
const DEFAULT_REPUTATION_GAIN: i32 = 10;
const REPUTATION_LOSS_ON_FAILURE: i32 = 5;
/// How much completing a faction's quest aggravates that faction's enemies.
const RIVAL_TENSION_ON_SUCCESS: i32 = 5;
const RIVAL_TENSION_ON_FAILURE: i32 = -2;

/// Adjust a generated quest for its issuing faction's preferences: rewards
/// scale by the theme multiplier, and a strong difficulty preference shifts
/// the tier (recomputing the expiry window to match).
pub fn modify_for_faction(quest: &mut Quest, faction: &Faction) {
    quest.faction_id = Some(faction.id);
    quest.rewards = quest
        .rewards
        .clone()
        .scaled_by(faction.reward_multiplier(quest.theme));

    let multiplier = faction.difficulty_multiplier(quest.theme);
    let shifted = if multiplier >= 1.25 {
        harder(quest.difficulty)
    } else if multiplier <= 0.8 {
        easier(quest.difficulty)
    } else {
        quest.difficulty
    };
    if shifted != quest.difficulty {
        quest.difficulty = shifted;
        quest.expires_at = Some(quest.created_at + Duration::days(shifted.expiry_days()));
    }

    // Quests without authored stakes still get faction-flavored fallout
    if quest.consequences.success.is_empty() {
        quest.consequences.success.push(WorldStateChange::new(
            format!("{} gains standing in the region", faction.name),
            0.2,
        ));
    }
    if quest.consequences.failure.is_empty() {
        quest.consequences.failure.push(WorldStateChange::new(
            format!("{} loses face with its rivals", faction.name),
            -0.1,
        ));
    }
}

fn harder(difficulty: Difficulty) -> Difficulty {
    match difficulty {
        Difficulty::Easy => Difficulty::Medium,
        Difficulty::Medium => Difficulty::Hard,
        Difficulty::Hard | Difficulty::Epic => Difficulty::Epic,
    }
}

fn easier(difficulty: Difficulty) -> Difficulty {
    match difficulty {
        Difficulty::Easy | Difficulty::Medium => Difficulty::Easy,
        Difficulty::Hard => Difficulty::Medium,
        Difficulty::Epic => Difficulty::Hard,
    }
}

/// Swap objective verbs for their opposites, so a counter-quest's text
/// reads as undoing the original.
fn reverse_objective(text: &str) -> String {
    const SWAPS: [(&str, &str); 8] = [
        ("Collect", "Prevent collection of"),
        ("collect", "prevent collection of"),
        ("Kill", "Protect"),
        ("kill", "protect"),
        ("Destroy", "Defend"),
        ("destroy", "defend"),
        ("Capture", "Maintain control of"),
        ("capture", "maintain control of"),
    ];
    let mut out = text.to_string();
    for (from, to) in SWAPS {
        out = out.replace(from, to);
    }
    out
}

/// Build the counter-quest a rival faction fields against an original.
///
/// The counter carries a "Counter:" title, reversed objectives, the
/// original's consequences negated, and rewards rolled for the rival.
pub fn opposing_quest(
    original: &Quest,
    rival: &Faction,
    now: DateTime<Utc>,
    rng: &mut impl RandomSource,
) -> Quest {
    let steps: Vec<QuestStep> = original
        .steps
        .iter()
        .map(|s| QuestStep {
            title: reverse_objective(&s.title),
            description: reverse_objective(&s.description),
            kind: s.kind.clone(),
            completed: false,
            required: s.required,
        })
        .collect();

    let rewards = RewardSet::generate(original.difficulty, original.level, Some(rival.id), rng)
        .scaled_by(rival.reward_multiplier(original.theme));

    Quest {
        id: QuestId::new(),
        template_id: None,
        title: format!("Counter: {}", original.title),
        description: format!(
            "{} moves to thwart a rival's plans. {}",
            rival.name,
            reverse_objective(&original.description)
        ),
        status: QuestStatus::Pending,
        theme: original.theme,
        difficulty: original.difficulty,
        level: original.level,
        faction_id: Some(rival.id),
        region_id: original.region_id,
        steps,
        rewards,
        consequences: original.consequences.opposed_by(&rival.name),
        created_at: now,
        expires_at: original.expires_at,
    }
}

/// Roll counter-quests from every rival hostile enough to bother.
///
/// A rival qualifies when its tension with the issuer reads hostile or
/// worse; the dice then decide whether it actually commits.
pub fn generate_competing(
    original: &Quest,
    rivals: &[Faction],
    ledger: &TensionLedger,
    now: DateTime<Utc>,
    rng: &mut impl RandomSource,
) -> Vec<Quest> {
    let Some(issuer) = original.faction_id else {
        return Vec::new();
    };

    rivals
        .iter()
        .filter(|rival| rival.id != issuer)
        .filter_map(|rival| {
            let chance = match ledger.standing(issuer, rival.id) {
                Standing::War => COUNTER_CHANCE_AT_WAR,
                Standing::Hostile => COUNTER_CHANCE_HOSTILE,
                _ => return None,
            };
            rng.chance(chance)
                .then(|| opposing_quest(original, rival, now, rng))
        })
        .collect()
}

/// Settle the faction fallout of a finished quest: the player's standing
/// with the issuer moves, and the issuer's enemies react.
pub fn apply_outcome(
    quest: &Quest,
    succeeded: bool,
    standing: &mut FactionStanding,
    ledger: &mut TensionLedger,
    now: DateTime<Utc>,
) -> Vec<DomainEvent> {
    let mut events = Vec::new();
    let issuer = quest.faction_id;

    if succeeded {
        let gain = quest
            .rewards
            .reputation
            .as_ref()
            .map(|r| r.amount)
            .unwrap_or(DEFAULT_REPUTATION_GAIN);
        standing.adjust_reputation(gain, now);
        standing.record_completion(now);
        events.push(DomainEvent::QuestCompleted {
            quest_id: quest.id,
            faction_id: issuer,
        });
    } else {
        standing.adjust_reputation(-REPUTATION_LOSS_ON_FAILURE, now);
        standing.record_failure(now);
        events.push(DomainEvent::QuestFailed {
            quest_id: quest.id,
            faction_id: issuer,
        });
    }

    if let Some(issuer) = issuer {
        let delta = if succeeded {
            RIVAL_TENSION_ON_SUCCESS
        } else {
            RIVAL_TENSION_ON_FAILURE
        };
        let source = format!("quest outcome: {}", quest.title);
        for enemy in ledger.enemies_of(issuer) {
            let (_, shift_events) = ledger.apply_delta(issuer, enemy, delta, source.clone(), now);
            events.extend(shift_events);
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::FactionId;
    use crate::quests::{generate_fallback, GenerationContext};
    use crate::random::FixedRandom;
    use crate::tension::{QuestConsequences, WorldStateChange};
    use crate::value_objects::{TensionLevel, Theme};

    fn sample_quest(faction_id: Option<FactionId>) -> Quest {
        let ctx = GenerationContext::new(5);
        let mut rng = FixedRandom::new(false);
        let mut quest = generate_fallback(
            Theme::Combat,
            Difficulty::Medium,
            &ctx,
            None,
            Utc::now(),
            &mut rng,
        );
        quest.faction_id = faction_id;
        quest
    }

    #[test]
    fn faction_preference_shifts_difficulty_and_expiry() {
        let faction = Faction::new("Iron Compact").with_difficulty_multiplier(Theme::Combat, 1.5);
        let mut quest = sample_quest(None);
        modify_for_faction(&mut quest, &faction);

        assert_eq!(quest.difficulty, Difficulty::Hard);
        assert_eq!(
            quest.expires_at,
            Some(quest.created_at + Duration::days(Difficulty::Hard.expiry_days()))
        );
    }

    #[test]
    fn neutral_multiplier_leaves_difficulty_alone() {
        let faction = Faction::new("Quiet Hand");
        let mut quest = sample_quest(None);
        modify_for_faction(&mut quest, &faction);
        assert_eq!(quest.difficulty, Difficulty::Medium);
    }

    #[test]
    fn faction_flavor_fills_missing_consequences() {
        let faction = Faction::new("Iron Compact");
        let mut quest = sample_quest(None);
        assert!(quest.consequences.is_empty());

        modify_for_faction(&mut quest, &faction);
        assert!(quest.consequences.success[0]
            .description
            .contains("Iron Compact"));
        assert!(!quest.consequences.failure.is_empty());
    }

    #[test]
    fn objective_reversal_swaps_verbs() {
        assert_eq!(reverse_objective("Kill the warlord"), "Protect the warlord");
        assert_eq!(
            reverse_objective("collect the relics"),
            "prevent collection of the relics"
        );
        assert_eq!(reverse_objective("Scout the pass"), "Scout the pass");
    }

    #[test]
    fn counter_quest_negates_consequences() {
        let rival = Faction::new("Ashen Pact");
        let mut original = sample_quest(Some(FactionId::new()));
        original.consequences = QuestConsequences {
            success: vec![WorldStateChange::new("The warlord falls", 0.5)],
            failure: vec![],
        };
        let mut rng = FixedRandom::new(false);

        let counter = opposing_quest(&original, &rival, Utc::now(), &mut rng);
        assert!(counter.title.starts_with("Counter:"));
        assert_eq!(counter.faction_id, Some(rival.id));
        assert_eq!(counter.consequences.success[0].value, -0.5);
        assert_eq!(counter.steps.len(), original.steps.len());
    }

    #[test]
    fn competing_quests_require_hostility() {
        let issuer = Faction::new("Crown");
        let friendly = Faction::new("Guild");
        let enemy = Faction::new("Rebels");
        let mut ledger = TensionLedger::new();
        let now = Utc::now();
        ledger.set_level(issuer.id, enemy.id, TensionLevel::clamped(80), now);
        ledger.set_level(issuer.id, friendly.id, TensionLevel::clamped(-40), now);

        let quest = sample_quest(Some(issuer.id));
        let mut rng = FixedRandom::new(true);
        let counters = generate_competing(
            &quest,
            &[friendly.clone(), enemy.clone()],
            &ledger,
            now,
            &mut rng,
        );
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].faction_id, Some(enemy.id));
    }

    #[test]
    fn competing_quests_respect_the_dice() {
        let issuer = Faction::new("Crown");
        let enemy = Faction::new("Rebels");
        let mut ledger = TensionLedger::new();
        let now = Utc::now();
        ledger.set_level(issuer.id, enemy.id, TensionLevel::clamped(80), now);

        let quest = sample_quest(Some(issuer.id));
        let mut rng = FixedRandom::new(false);
        assert!(generate_competing(&quest, &[enemy], &ledger, now, &mut rng).is_empty());
    }

    #[test]
    fn no_issuer_means_no_counters() {
        let enemy = Faction::new("Rebels");
        let ledger = TensionLedger::new();
        let quest = sample_quest(None);
        let mut rng = FixedRandom::new(true);
        assert!(generate_competing(&quest, &[enemy], &ledger, Utc::now(), &mut rng).is_empty());
    }

    #[test]
    fn success_raises_standing_and_aggravates_enemies() {
        let issuer = FactionId::new();
        let enemy = FactionId::new();
        let now = Utc::now();
        let mut ledger = TensionLedger::new();
        ledger.set_level(issuer, enemy, TensionLevel::clamped(75), now);

        let quest = sample_quest(Some(issuer));
        let mut standing = FactionStanding::new(issuer, now);
        let events = apply_outcome(&quest, true, &mut standing, &mut ledger, now);

        assert_eq!(standing.reputation, DEFAULT_REPUTATION_GAIN);
        assert_eq!(standing.completed_quests, 1);
        assert_eq!(ledger.level(issuer, enemy).value(), 80);
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::QuestCompleted { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::TensionShifted { .. })));
    }

    #[test]
    fn failure_costs_reputation() {
        let issuer = FactionId::new();
        let now = Utc::now();
        let mut ledger = TensionLedger::new();
        let quest = sample_quest(Some(issuer));
        let mut standing = FactionStanding::new(issuer, now);

        let events = apply_outcome(&quest, false, &mut standing, &mut ledger, now);
        assert_eq!(standing.reputation, -(REPUTATION_LOSS_ON_FAILURE));
        assert_eq!(standing.failed_quests, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::QuestFailed { .. })));
    }
}
