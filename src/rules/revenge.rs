//! Revenge shots.
//!
//! A dead revenge role may take one player down with it. The shot uses the
//! protections still on record, so a player protected last night survives a
//! shot fired during the following day. The death cascade runs afterwards.
//! Every revenge role that dies along the way joins the queue, and the win
//! chain runs once the queue is empty.

use crate::core::{EngineError, GameState, PendingRevenge, Phase, PlayerId};
use crate::roles::RoleRegistry;

use super::cascade::{run_cascade, CascadeReport};
use super::night::death_summary;
use super::win::{RecentDeath, WinEvaluator};

/// Outcome of a revenge shot.
#[derive(Clone, Debug, PartialEq)]
pub struct RevengeResolution {
    pub state: GameState,
    /// Who died from the shot, if anyone.
    pub victim: Option<PlayerId>,
    pub cascade: CascadeReport,
}

/// Dead revenge roles among `deaths`, in order.
#[must_use]
pub fn owed_shots<'a>(
    state: &GameState,
    registry: &RoleRegistry,
    deaths: impl IntoIterator<Item = &'a PlayerId>,
) -> Vec<PlayerId> {
    deaths
        .into_iter()
        .filter(|id| {
            state
                .players
                .get(*id)
                .filter(|p| !p.alive)
                .and_then(|p| registry.for_player(p))
                .is_some_and(|c| c.has_revenge())
        })
        .cloned()
        .collect()
}

/// Park the match in `HunterRevenge` until `pending.shooter` fires.
pub(crate) fn await_shot(working: &mut GameState, pending: PendingRevenge, now_ms: i64) {
    tracing::debug!(
        shooter = %pending.shooter,
        queued = pending.queued.len(),
        "revenge shot owed"
    );
    let deadline = now_ms + working.settings.revenge_ms();
    working.pending_revenge = Some(pending);
    working.set_phase(Phase::HunterRevenge, Some(deadline));
}

/// Run the win chain once per recent death. Returns whether the game is over.
pub(crate) fn settle_wins(
    working: &mut GameState,
    registry: &RoleRegistry,
    evaluator: &WinEvaluator,
    recent: &[RecentDeath],
) -> bool {
    let passes: Vec<Option<&RecentDeath>> = if recent.is_empty() {
        vec![None]
    } else {
        recent.iter().map(Some).collect()
    };

    let mut game_over = false;
    for death in passes {
        let result = evaluator.evaluate_state(working, registry, death);
        working.add_winners(&result.winners);
        game_over |= result.is_game_over;
    }
    game_over
}

/// Resolve the pending revenge shot. `None` holds fire.
pub fn resolve_revenge(
    state: &GameState,
    registry: &RoleRegistry,
    evaluator: &WinEvaluator,
    target: Option<&PlayerId>,
    now_ms: i64,
) -> Result<RevengeResolution, EngineError> {
    let pending = state
        .pending_revenge
        .clone()
        .ok_or(EngineError::WrongPhase { actual: state.phase })?;

    if let Some(target) = target {
        state.living_player(target)?;
    }

    let mut working = state.clone();
    working.pending_revenge = None;

    let victim = target
        .filter(|t| {
            let blocked = state.night_actions.is_protected(t);
            if blocked {
                tracing::debug!(shooter = %pending.shooter, victim = %t, "revenge shot blocked by protection");
            }
            !blocked
        })
        .cloned();

    if let Some(victim) = &victim {
        if let Some(player) = working.players.get_mut(victim) {
            player.alive = false;
        }
    }
    let protected = working.night_actions.protected();
    let cascade = run_cascade(&mut working, registry, &protected);

    if target.is_some() {
        let deaths: Vec<PlayerId> = victim.iter().cloned().collect();
        let line = death_summary(&working, &deaths);
        working.log(line);
    }
    tracing::info!(shooter = %pending.shooter, hit = victim.is_some(), "revenge shot resolved");

    let fresh = owed_shots(
        &working,
        registry,
        victim.iter().chain(cascade.secondary_deaths.iter()),
    );
    let shooters = pending.queued.iter().cloned().chain(fresh);
    let next = PendingRevenge::from_shooters(shooters, pending.resume, pending.executed.clone());

    match next {
        Some(next) => await_shot(&mut working, next, now_ms),
        None => {
            let recent: Vec<RecentDeath> = pending
                .executed
                .clone()
                .map(RecentDeath::Execution)
                .into_iter()
                .chain(victim.clone().map(RecentDeath::Revenge))
                .collect();
            let game_over = settle_wins(&mut working, registry, evaluator, &recent);
            let phase = if game_over { Phase::GameOver } else { pending.resume };
            working.set_phase(phase, None);
        }
    }

    Ok(RevengeResolution {
        state: working,
        victim,
        cascade,
    })
}
