//! Night resolution.
//!
//! Runs once, after the last night step, on a working copy of the state:
//!
//! 1. Investigation outcomes (they only set flags)
//! 2. Werewolf kill: plurality of pack ballots, ties broken by the random source
//! 3. Independent kills (vigilante shots)
//! 4. Death cascade
//! 5. Day log summary
//! 6. Revenge hand-off or win evaluation
//!
//! The input state is never touched, so resolving the same snapshot twice
//! with the same random source yields the same result.

use im::OrdSet;
use rustc_hash::FxHashMap;

use crate::core::{GameRng, GameState, PendingRevenge, Phase, PlayerId, RandomSource};
use crate::roles::{Deaths, NightOutcomeContext, OutcomeStage, RoleRegistry};

use super::cascade::{run_cascade, CascadeReport};
use super::revenge::{await_shot, owed_shots, settle_wins};
use super::win::{RecentDeath, WinEvaluator};

/// Outcome of resolving one night.
#[derive(Clone, Debug, PartialEq)]
pub struct NightResolution {
    /// The resolved state, already moved to its next phase.
    pub state: GameState,
    /// The pack's chosen victim, whether or not it died.
    pub wolf_target: Option<PlayerId>,
    /// Deaths from the kill steps, in order.
    pub direct_deaths: Vec<PlayerId>,
    pub cascade: CascadeReport,
    /// Line appended to the day log.
    pub summary: String,
}

impl NightResolution {
    /// The resolved state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Random stream for the night of `round`.
///
/// Derived from the persisted seed so any host replays the same tie-breaks.
#[must_use]
pub fn night_rng(state: &GameState) -> GameRng {
    GameRng::new(state.seed).for_context(&format!("night:{}", state.round))
}

/// Pack ballots per target, in first-appearance order over voters.
#[must_use]
pub fn tally_werewolf_votes(state: &GameState) -> Vec<(PlayerId, usize)> {
    let mut index: FxHashMap<&PlayerId, usize> = FxHashMap::default();
    let mut tally: Vec<(PlayerId, usize)> = Vec::new();

    for target in state.night_actions.werewolf_votes.values() {
        match index.get(target) {
            Some(&i) => tally[i].1 += 1,
            None => {
                index.insert(target, tally.len());
                tally.push((target.clone(), 1));
            }
        }
    }
    tally
}

/// The pack's victim: the plurality target, a random pick among ties.
pub fn choose_wolf_target(state: &GameState, rng: &mut dyn RandomSource) -> Option<PlayerId> {
    let tally = tally_werewolf_votes(state);
    let top = tally.iter().map(|(_, n)| *n).max()?;
    let tied: Vec<&PlayerId> = tally
        .iter()
        .filter(|(_, n)| *n == top)
        .map(|(id, _)| id)
        .collect();

    let pick = if tied.len() == 1 { 0 } else { rng.pick_index(tied.len()) };
    if tied.len() > 1 {
        tracing::debug!(tied = tied.len(), pick, "pack vote tied");
    }
    tied.get(pick).map(|id| (*id).clone())
}

/// Summary line for a set of deaths.
#[must_use]
pub fn death_summary(state: &GameState, deaths: &[PlayerId]) -> String {
    if deaths.is_empty() {
        return "No one died.".to_string();
    }
    let names: Vec<String> = deaths.iter().map(|id| state.name_of(id)).collect();
    format!("{} died.", names.join(", "))
}

/// Resolve the night from a snapshot.
pub fn resolve_night(
    state: &GameState,
    registry: &RoleRegistry,
    evaluator: &WinEvaluator,
    rng: &mut dyn RandomSource,
    now_ms: i64,
) -> NightResolution {
    let mut working = state.clone();
    let protected: OrdSet<PlayerId> = working.night_actions.protected();
    let night = working.night_actions.clone();
    let mut deaths = Deaths::new();

    let wolf_target = choose_wolf_target(&working, rng);
    {
        let mut ctx = NightOutcomeContext {
            registry,
            players: &mut working.players,
            night: &night,
            deaths: &mut deaths,
            vigilante_ammo: &mut working.vigilante_ammo,
            protected: &protected,
        };

        for capability in registry.in_stage(OutcomeStage::Investigate) {
            capability.apply_night_outcome(&mut ctx);
        }

        if let Some(target) = &wolf_target {
            if ctx.kill(target) {
                tracing::debug!(victim = %target, "pack kill landed");
            }
        }

        for capability in registry.in_stage(OutcomeStage::IndependentKill) {
            capability.apply_night_outcome(&mut ctx);
        }
    }

    let cascade = run_cascade(&mut working, registry, &protected);
    let direct_deaths: Vec<PlayerId> = deaths.into_vec();

    let summary = death_summary(&working, &direct_deaths);
    working.log(summary.clone());
    tracing::info!(
        round = working.round,
        direct = direct_deaths.len(),
        secondary = cascade.secondary_deaths.len(),
        transformed = cascade.transformations.len(),
        "night resolved"
    );

    let shooters = owed_shots(
        &working,
        registry,
        direct_deaths.iter().chain(cascade.secondary_deaths.iter()),
    );
    match PendingRevenge::from_shooters(shooters, Phase::DayReveal, None) {
        Some(pending) => await_shot(&mut working, pending, now_ms),
        None => {
            let recent: Vec<RecentDeath> = direct_deaths
                .first()
                .cloned()
                .map(RecentDeath::Night)
                .into_iter()
                .collect();
            let game_over = settle_wins(&mut working, registry, evaluator, &recent);
            let next = if game_over { Phase::GameOver } else { Phase::DayReveal };
            working.set_phase(next, None);
        }
    }

    NightResolution {
        state: working,
        wolf_target,
        direct_deaths,
        cascade,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedRandom, GameSettings, NightActionPatch, Player};
    use crate::roles::RoleId;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn village() -> GameState {
        GameState::new("room", 9, GameSettings::default())
            .with_player(Player::new("w1", "Wolf One").with_role(RoleId::Werewolf))
            .with_player(Player::new("w2", "Wolf Two").with_role(RoleId::Werewolf))
            .with_player(Player::new("a", "Alice").with_role(RoleId::Villager))
            .with_player(Player::new("b", "Bob").with_role(RoleId::Villager))
            .with_player(Player::new("c", "Carol").with_role(RoleId::Villager))
            .with_player(Player::new("d", "Dan").with_role(RoleId::Doctor))
            .with_player(Player::new("e", "Eve").with_role(RoleId::Villager))
    }

    fn wolf_vote(state: &mut GameState, actor: &str, target: &str) {
        state.night_actions.apply(NightActionPatch::WerewolfVote {
            actor: pid(actor),
            target: pid(target),
        });
    }

    fn resolve(state: &GameState) -> NightResolution {
        resolve_night(
            state,
            &RoleRegistry::standard(),
            &WinEvaluator::standard(),
            &mut FixedRandom(0.0),
            0,
        )
    }

    #[test]
    fn test_consensus_kill() {
        let mut state = village();
        wolf_vote(&mut state, "w1", "a");
        wolf_vote(&mut state, "w2", "a");

        let resolution = resolve(&state);
        assert_eq!(resolution.direct_deaths, vec![pid("a")]);
        assert_eq!(resolution.summary, "Alice died.");
        assert_eq!(resolution.state.phase, Phase::DayReveal);
        assert!(!resolution.state.is_alive(&pid("a")));
        assert!(state.is_alive(&pid("a")), "input snapshot must be untouched");
    }

    #[test]
    fn test_tie_broken_by_random_source() {
        let mut state = village();
        wolf_vote(&mut state, "w1", "b");
        wolf_vote(&mut state, "w2", "a");

        // Voter order is w1 then w2, so b appears first.
        assert_eq!(choose_wolf_target(&state, &mut FixedRandom(0.0)), Some(pid("b")));
        assert_eq!(choose_wolf_target(&state, &mut FixedRandom(0.99)), Some(pid("a")));
    }

    #[test]
    fn test_no_ballots_no_kill() {
        let state = village();
        let resolution = resolve(&state);
        assert_eq!(resolution.wolf_target, None);
        assert_eq!(resolution.summary, "No one died.");
    }

    #[test]
    fn test_protection_saves_target() {
        let mut state = village();
        wolf_vote(&mut state, "w1", "a");
        wolf_vote(&mut state, "w2", "a");
        state.night_actions.apply(NightActionPatch::Protect {
            actor: pid("d"),
            target: pid("a"),
        });

        let resolution = resolve(&state);
        assert_eq!(resolution.wolf_target, Some(pid("a")));
        assert!(resolution.direct_deaths.is_empty());
        assert_eq!(resolution.state.day_log.back().map(String::as_str), Some("No one died."));
    }

    #[test]
    fn test_vigilante_and_pack_both_land() {
        let mut state = village().with_player(Player::new("v", "Vic").with_role(RoleId::Vigilante));
        state.vigilante_ammo.insert(pid("v"), 1);
        wolf_vote(&mut state, "w1", "a");
        wolf_vote(&mut state, "w2", "a");
        state.night_actions.apply(NightActionPatch::VigilanteTarget {
            actor: pid("v"),
            target: Some(pid("w1")),
        });

        let resolution = resolve(&state);
        assert_eq!(resolution.direct_deaths, vec![pid("a"), pid("w1")]);
        assert_eq!(resolution.summary, "Alice, Wolf One died.");
        assert_eq!(resolution.state.vigilante_ammo.get(&pid("v")), Some(&0));
    }

    #[test]
    fn test_lover_death_not_named_in_log() {
        let mut state = village();
        state.lovers = Some((pid("a"), pid("b")));
        wolf_vote(&mut state, "w1", "a");
        wolf_vote(&mut state, "w2", "a");

        let resolution = resolve(&state);
        assert_eq!(resolution.summary, "Alice died.");
        assert_eq!(resolution.cascade.secondary_deaths, vec![pid("b")]);
        assert!(!resolution.state.is_alive(&pid("b")));
    }

    #[test]
    fn test_revenge_role_defers_win_check() {
        let mut state = village().with_player(Player::new("h", "Hal").with_role(RoleId::Hunter));
        wolf_vote(&mut state, "w1", "h");
        wolf_vote(&mut state, "w2", "h");

        let resolution = resolve(&state);
        assert_eq!(resolution.state.phase, Phase::HunterRevenge);
        assert_eq!(
            resolution.state.pending_revenge,
            PendingRevenge::from_shooters([pid("h")], Phase::DayReveal, None)
        );
        assert!(resolution.state.phase_end_time.is_some());
    }

    #[test]
    fn test_every_dead_hunter_is_queued() {
        let mut state = village()
            .with_player(Player::new("h1", "Hal").with_role(RoleId::Hunter))
            .with_player(Player::new("h2", "Hana").with_role(RoleId::Hunter));
        state.lovers = Some((pid("h1"), pid("h2")));
        wolf_vote(&mut state, "w1", "h1");
        wolf_vote(&mut state, "w2", "h1");

        let resolution = resolve(&state);
        assert_eq!(resolution.direct_deaths, vec![pid("h1")]);
        assert_eq!(resolution.cascade.secondary_deaths, vec![pid("h2")]);
        assert_eq!(
            resolution.state.pending_revenge,
            PendingRevenge::from_shooters([pid("h1"), pid("h2")], Phase::DayReveal, None)
        );
    }

    #[test]
    fn test_parity_ends_game() {
        let state = GameState::new("room", 1, GameSettings::default())
            .with_player(Player::new("w", "W").with_role(RoleId::Werewolf))
            .with_player(Player::new("a", "A").with_role(RoleId::Villager))
            .with_player(Player::new("b", "B").with_role(RoleId::Villager));
        let mut state = state;
        wolf_vote(&mut state, "w", "a");

        let resolution = resolve(&state);
        assert_eq!(resolution.state.phase, Phase::GameOver);
        assert_eq!(resolution.state.winners.iter().cloned().collect::<Vec<_>>(), vec![pid("w")]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut state = village();
        wolf_vote(&mut state, "w1", "a");
        wolf_vote(&mut state, "w2", "b");

        let registry = RoleRegistry::standard();
        let evaluator = WinEvaluator::standard();
        let first = resolve_night(&state, &registry, &evaluator, &mut night_rng(&state), 0);
        let second = resolve_night(&state, &registry, &evaluator, &mut night_rng(&state), 0);
        assert_eq!(first, second);
    }
}
