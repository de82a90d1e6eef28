//! The game engine: one method per UI intent.
//!
//! Every method takes the current snapshot by reference and returns the next
//! snapshot, or an error with the input left untouched. The engine holds no
//! per-match state, so one instance can serve any number of rooms.
//!
//! ## Flow
//!
//! ```text
//! Lobby -> RoleReveal -> NightIntro -> Night(..)* -> DayReveal -> DayVote -> NightIntro ...
//!                                         |                          |
//!                                         +------ HunterRevenge -----+
//! ```

use crate::core::{
    EngineError, GameRng, GameState, NightAction, NightActionPatch, NightActionState, NightPhase,
    Phase, PlayerId, RandomSource, VoteTarget,
};
use crate::roles::{
    apparent_alignment, apparent_role, Alignment, RoleCapability, RoleId, RoleRegistry,
};

use super::night::{night_rng, resolve_night, NightResolution};
use super::revenge::resolve_revenge;
use super::sequencer::{eligible_actors, next_night_phase, phase_complete, NextPhase};
use super::setup::assign_roles;
use super::voting::resolve_votes;
use super::win::WinEvaluator;

/// What an investigator saw.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Investigation {
    pub target: PlayerId,
    pub seen_role: RoleId,
    pub seen_alignment: Alignment,
}

/// Applies intents to snapshots.
#[derive(Debug)]
pub struct GameEngine {
    registry: RoleRegistry,
    evaluator: WinEvaluator,
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl GameEngine {
    /// Create an engine from an explicit registry and win chain.
    #[must_use]
    pub fn new(registry: RoleRegistry, evaluator: WinEvaluator) -> Self {
        Self {
            registry,
            evaluator,
        }
    }

    /// Built-in roles and win chain.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(RoleRegistry::standard(), WinEvaluator::standard())
    }

    #[must_use]
    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    #[must_use]
    pub fn evaluator(&self) -> &WinEvaluator {
        &self.evaluator
    }

    // === Guards ===

    fn ensure_running(state: &GameState) -> Result<(), EngineError> {
        if state.phase == Phase::GameOver {
            return Err(EngineError::GameOver);
        }
        Ok(())
    }

    fn expect_phase(state: &GameState, phase: Phase) -> Result<(), EngineError> {
        Self::ensure_running(state)?;
        if state.phase != phase {
            return Err(EngineError::WrongPhase {
                actual: state.phase,
            });
        }
        Ok(())
    }

    fn capability_of(&self, state: &GameState, id: &PlayerId) -> Result<&dyn RoleCapability, EngineError> {
        let player = state.player(id)?;
        self.registry
            .for_player_or_warn(player)
            .ok_or_else(|| EngineError::UnknownRole(id.clone()))
    }

    // === Setup ===

    /// Validate the lobby and deal roles.
    pub fn start_game(&self, state: &GameState) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::Lobby)?;

        let mut rng = GameRng::new(state.seed).for_context("deal");
        let mut next = assign_roles(state, &self.registry, &mut rng).map_err(EngineError::Setup)?;
        next.round = 0;
        next.winners.clear();
        next.set_phase(Phase::RoleReveal, None);
        tracing::info!(room = %next.room_id, players = next.players.len(), "game started");
        Ok(next)
    }

    /// Acknowledge the role reveal. The last acknowledgement moves to the night intro.
    pub fn mark_ready(&self, state: &GameState, player: &PlayerId) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::RoleReveal)?;
        if state.living_player(player)?.flags.ready {
            return Err(EngineError::AlreadyCommitted(player.clone()));
        }

        let mut next = state.clone();
        if let Some(p) = next.players.get_mut(player) {
            p.flags.ready = true;
        }
        if next.alive().all(|p| p.flags.ready) {
            next.set_phase(Phase::NightIntro, None);
            tracing::info!(room = %next.room_id, "all players ready");
        }
        Ok(next)
    }

    // === Night ===

    /// Begin a new night.
    pub fn start_night_phase(&self, state: &GameState, now_ms: i64) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::NightIntro)?;

        let mut next = state.clone();
        next.round += 1;
        next.night_actions = NightActionState::new();
        next.votes.clear();
        next.locked_votes.clear();
        next.pending_revenge = None;
        tracing::info!(room = %next.room_id, round = next.round, "night started");
        Ok(self.enter_next(next, None, now_ms))
    }

    /// Submit a night intent for the current step.
    ///
    /// Once every eligible actor has committed, the night moves on by itself.
    pub fn advance_night_phase(
        &self,
        state: &GameState,
        actor: &PlayerId,
        action: &NightAction,
        now_ms: i64,
    ) -> Result<GameState, EngineError> {
        Self::ensure_running(state)?;
        let Phase::Night(phase) = state.phase else {
            return Err(EngineError::WrongPhase {
                actual: state.phase,
            });
        };

        state.living_player(actor)?;
        let capability = self.capability_of(state, actor)?;
        if !capability.is_wake_up_phase(phase) {
            return Err(EngineError::NotEligible(actor.clone()));
        }
        if state.night_actions.has_acted(phase, actor) {
            return Err(EngineError::AlreadyCommitted(actor.clone()));
        }
        self.check_targets(state, actor, action)?;

        let patch = capability
            .process_night_action(&state.night_actions, actor, action)
            .filter(|patch| patch.phase() == phase)
            .ok_or_else(|| EngineError::NotEligible(actor.clone()))?;
        tracing::debug!(%actor, %phase, "night action accepted");

        let mut next = state.clone();
        match &patch {
            NightActionPatch::CupidLinks { pair, .. } if next.lovers.is_none() => {
                next.lovers = Some(pair.clone());
            }
            NightActionPatch::DoppelgangerPick { target, .. } if next.doppelganger_target.is_none() => {
                next.doppelganger_target = Some(target.clone());
            }
            _ => {}
        }
        next.night_actions.apply(patch);

        if phase_complete(phase, &next, &self.registry) {
            return Ok(self.enter_next(next, Some(phase), now_ms));
        }
        Ok(next)
    }

    fn check_targets(
        &self,
        state: &GameState,
        actor: &PlayerId,
        action: &NightAction,
    ) -> Result<(), EngineError> {
        let invalid = |target: &PlayerId| EngineError::InvalidTarget {
            actor: actor.clone(),
            target: target.clone(),
        };

        for target in action.targets() {
            let player = state.player(target)?;
            if !player.alive {
                return Err(invalid(target));
            }
            if target == actor && !state.settings.allow_self_target {
                return Err(invalid(target));
            }
            if let NightAction::WerewolfVote(_) = action {
                if !self.registry.is_pack_target(actor, player) {
                    return Err(invalid(target));
                }
            }
        }

        if let NightAction::VigilanteShoot(Some(_)) = action {
            if state.vigilante_ammo.get(actor).copied().unwrap_or(0) == 0 {
                return Err(EngineError::NotEligible(actor.clone()));
            }
        }
        Ok(())
    }

    /// Players `actor` may target in the current night step.
    #[must_use]
    pub fn legal_targets(&self, state: &GameState, actor: &PlayerId) -> Vec<PlayerId> {
        let Phase::Night(phase) = state.phase else {
            return Vec::new();
        };
        let awake = state
            .players
            .get(actor)
            .filter(|p| p.alive)
            .and_then(|p| self.registry.for_player(p))
            .is_some_and(|c| c.is_wake_up_phase(phase));
        if !awake {
            return Vec::new();
        }

        state
            .alive()
            .filter(|p| p.id != *actor || state.settings.allow_self_target)
            .filter(|p| phase != NightPhase::WerewolfKill || self.registry.is_pack_target(actor, p))
            .map(|p| p.id.clone())
            .collect()
    }

    fn enter_next(&self, mut state: GameState, after: Option<NightPhase>, now_ms: i64) -> GameState {
        let mut after = after;
        loop {
            match next_night_phase(after, &state, &self.registry) {
                NextPhase::Phase(phase) if phase.passive_action().is_some() => {
                    self.acknowledge_passive(&mut state, phase);
                    tracing::debug!(room = %state.room_id, %phase, "passive night step");
                    after = Some(phase);
                }
                step @ NextPhase::Phase(phase) => {
                    let deadline = step.deadline(&state.settings, now_ms);
                    state.set_phase(Phase::Night(phase), deadline);
                    tracing::info!(room = %state.room_id, %phase, "night step");
                    return state;
                }
                NextPhase::Resolve => {
                    let mut rng = night_rng(&state);
                    return self.resolve_night_with(&state, &mut rng, now_ms).into_state();
                }
            }
        }
    }

    fn acknowledge_passive(&self, state: &mut GameState, phase: NightPhase) {
        let Some(action) = phase.passive_action() else { return };
        for actor in eligible_actors(phase, state, &self.registry) {
            let patch = state
                .players
                .get(&actor)
                .and_then(|p| self.registry.for_player(p))
                .and_then(|c| c.process_night_action(&state.night_actions, &actor, &action));
            if let Some(patch) = patch {
                state.night_actions.apply(patch);
            }
        }
    }

    /// Resolve the night with an explicit random source.
    #[must_use]
    pub fn resolve_night_with(
        &self,
        state: &GameState,
        rng: &mut dyn RandomSource,
        now_ms: i64,
    ) -> NightResolution {
        let resolution = resolve_night(state, &self.registry, &self.evaluator, rng, now_ms);
        if resolution.state.phase == Phase::GameOver {
            tracing::info!(room = %state.room_id, winners = resolution.state.winners.len(), "game over");
        }
        resolution
    }

    /// Deadline expiry: advance with whatever was collected.
    ///
    /// Night steps move on, the vote resolves, and a revenge shot is held.
    pub fn force_advance(&self, state: &GameState, now_ms: i64) -> Result<GameState, EngineError> {
        Self::ensure_running(state)?;
        match state.phase {
            Phase::Night(phase) => {
                tracing::debug!(room = %state.room_id, %phase, "night step timed out");
                Ok(self.enter_next(state.clone(), Some(phase), now_ms))
            }
            Phase::DayVote => self.resolve_voting(state, now_ms),
            Phase::HunterRevenge => {
                let shooter = state
                    .pending_revenge
                    .as_ref()
                    .map(|p| p.shooter.clone())
                    .ok_or(EngineError::WrongPhase {
                        actual: state.phase,
                    })?;
                self.handle_revenge_shot(state, &shooter, None, now_ms)
            }
            actual => Err(EngineError::WrongPhase { actual }),
        }
    }

    // === Day ===

    /// Open the day vote.
    pub fn begin_voting(&self, state: &GameState, now_ms: i64) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::DayReveal)?;

        let mut next = state.clone();
        next.votes.clear();
        next.locked_votes.clear();
        let deadline = now_ms + next.settings.vote_ms();
        next.set_phase(Phase::DayVote, Some(deadline));
        tracing::info!(room = %next.room_id, round = next.round, "voting opened");
        Ok(next)
    }

    /// Record or change an unlocked ballot.
    pub fn cast_vote(
        &self,
        state: &GameState,
        voter: &PlayerId,
        target: &VoteTarget,
    ) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::DayVote)?;
        state.living_player(voter)?;
        if state.locked_votes.contains(voter) {
            return Err(EngineError::AlreadyCommitted(voter.clone()));
        }
        if let VoteTarget::Player(id) = target {
            if !state.player(id)?.alive {
                return Err(EngineError::InvalidTarget {
                    actor: voter.clone(),
                    target: id.clone(),
                });
            }
        }

        let mut next = state.clone();
        next.votes.insert(voter.clone(), target.clone());
        tracing::debug!(%voter, "ballot cast");
        Ok(next)
    }

    /// Commit a ballot. Only locked ballots are counted.
    pub fn lock_vote(&self, state: &GameState, voter: &PlayerId) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::DayVote)?;
        state.living_player(voter)?;
        if state.locked_votes.contains(voter) {
            return Err(EngineError::AlreadyCommitted(voter.clone()));
        }
        if !state.votes.contains_key(voter) {
            return Err(EngineError::NotEligible(voter.clone()));
        }

        let mut next = state.clone();
        next.locked_votes.insert(voter.clone());
        Ok(next)
    }

    /// Check if every living player has locked a ballot.
    #[must_use]
    pub fn all_votes_locked(&self, state: &GameState) -> bool {
        state.alive().all(|p| state.locked_votes.contains(&p.id))
    }

    /// Count the locked ballots and apply the outcome.
    pub fn resolve_voting(&self, state: &GameState, now_ms: i64) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::DayVote)?;
        let resolution = resolve_votes(state, &self.registry, &self.evaluator, now_ms);
        if resolution.state.phase == Phase::GameOver {
            tracing::info!(room = %state.room_id, winners = resolution.state.winners.len(), "game over");
        }
        Ok(resolution.state)
    }

    /// The pending revenge shot. `None` holds fire.
    pub fn handle_revenge_shot(
        &self,
        state: &GameState,
        shooter: &PlayerId,
        target: Option<&PlayerId>,
        now_ms: i64,
    ) -> Result<GameState, EngineError> {
        Self::expect_phase(state, Phase::HunterRevenge)?;
        let pending = state.pending_revenge.as_ref().ok_or(EngineError::WrongPhase {
            actual: state.phase,
        })?;
        if pending.shooter != *shooter {
            return Err(EngineError::NotEligible(shooter.clone()));
        }

        let resolution = resolve_revenge(state, &self.registry, &self.evaluator, target, now_ms)?;
        if resolution.state.phase == Phase::GameOver {
            tracing::info!(room = %state.room_id, winners = resolution.state.winners.len(), "game over");
        }
        Ok(resolution.state)
    }

    // === Views ===

    /// Teammates revealed to `viewer`.
    pub fn visible_teammates(&self, state: &GameState, viewer: &PlayerId) -> Result<Vec<PlayerId>, EngineError> {
        let player = state.player(viewer)?;
        let capability = self.capability_of(state, viewer)?;
        Ok(capability.visible_teammates(player, &state.players))
    }

    /// What `seer` learned from tonight's check, as seen through the seer's role.
    pub fn investigation_result(
        &self,
        state: &GameState,
        seer: &PlayerId,
    ) -> Result<Option<Investigation>, EngineError> {
        let viewer = self.capability_of(state, seer)?.id();
        let Some(target) = state.night_actions.seer_check.get(seer) else {
            return Ok(None);
        };
        let capability = self.capability_of(state, target)?;
        Ok(Some(Investigation {
            target: target.clone(),
            seen_role: apparent_role(capability, viewer),
            seen_alignment: apparent_alignment(capability, viewer),
        }))
    }
}
