//! Day voting.
//!
//! Only locked ballots from living voters count. Each counts with the
//! voter's role weight. A unique strict maximum on a player eliminates that
//! player; a tie at the top, a top `Skip`, or no ballots at all eliminates
//! no one.

use crate::core::{GameState, PendingRevenge, Phase, PlayerId, VoteTarget};
use crate::roles::RoleRegistry;

use super::cascade::{run_cascade, CascadeReport};
use super::revenge::{await_shot, owed_shots, settle_wins};
use super::win::{RecentDeath, WinEvaluator};

/// Result of counting the day's ballots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteOutcome {
    Eliminate(PlayerId),
    NoElimination,
}

/// Weighted ballot counts in first-appearance order, plus the outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteTally {
    pub counts: Vec<(VoteTarget, u32)>,
    pub outcome: VoteOutcome,
}

/// Outcome of resolving the day vote.
#[derive(Clone, Debug, PartialEq)]
pub struct VoteResolution {
    pub state: GameState,
    pub tally: VoteTally,
    pub cascade: CascadeReport,
}

/// Count the locked ballots.
#[must_use]
pub fn tally_votes(state: &GameState, registry: &RoleRegistry) -> VoteTally {
    let mut counts: Vec<(VoteTarget, u32)> = Vec::new();

    for voter in &state.locked_votes {
        let Some(player) = state.players.get(voter).filter(|p| p.alive) else {
            continue;
        };
        let Some(ballot) = state.votes.get(voter) else { continue };
        if let VoteTarget::Player(target) = ballot {
            if !state.is_alive(target) {
                tracing::warn!(%voter, %target, "ballot for a dead player ignored");
                continue;
            }
        }
        let Some(capability) = registry.for_player_or_warn(player) else {
            continue;
        };

        let weight = capability.vote_weight();
        match counts.iter_mut().find(|(t, _)| t == ballot) {
            Some((_, n)) => *n += weight,
            None => counts.push((ballot.clone(), weight)),
        }
    }

    let outcome = match counts.iter().map(|(_, n)| *n).max() {
        Some(top) => {
            let mut leaders = counts.iter().filter(|(_, n)| *n == top);
            match (leaders.next(), leaders.next()) {
                (Some((VoteTarget::Player(id), _)), None) => VoteOutcome::Eliminate(id.clone()),
                _ => VoteOutcome::NoElimination,
            }
        }
        None => VoteOutcome::NoElimination,
    };

    VoteTally { counts, outcome }
}

/// Resolve the day vote from a snapshot.
pub fn resolve_votes(
    state: &GameState,
    registry: &RoleRegistry,
    evaluator: &WinEvaluator,
    now_ms: i64,
) -> VoteResolution {
    let tally = tally_votes(state, registry);
    let mut working = state.clone();
    working.votes.clear();
    working.locked_votes.clear();

    let victim = match &tally.outcome {
        VoteOutcome::Eliminate(id) => id.clone(),
        VoteOutcome::NoElimination => {
            working.log("No one was eliminated.");
            working.set_phase(Phase::NightIntro, None);
            tracing::info!(round = working.round, "vote ended without elimination");
            return VoteResolution {
                state: working,
                tally,
                cascade: CascadeReport::default(),
            };
        }
    };

    if let Some(player) = working.players.get_mut(&victim) {
        player.alive = false;
    }
    let protected = working.night_actions.protected();
    let cascade = run_cascade(&mut working, registry, &protected);
    let line = format!("{} was eliminated.", working.name_of(&victim));
    working.log(line);
    tracing::info!(round = working.round, eliminated = %victim, "vote resolved");

    let shooters = owed_shots(
        &working,
        registry,
        std::iter::once(&victim).chain(cascade.secondary_deaths.iter()),
    );
    match PendingRevenge::from_shooters(shooters, Phase::NightIntro, Some(victim.clone())) {
        Some(pending) => await_shot(&mut working, pending, now_ms),
        None => {
            let recent = [RecentDeath::Execution(victim.clone())];
            let game_over = settle_wins(&mut working, registry, evaluator, &recent);
            let next = if game_over { Phase::GameOver } else { Phase::NightIntro };
            working.set_phase(next, None);
        }
    }

    VoteResolution {
        state: working,
        tally,
        cascade,
    }
}
