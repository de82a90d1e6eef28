//! Win condition evaluation.
//!
//! A `WinEvaluator` runs an ordered chain of `WinStrategy` values every time
//! the roster changes. Every strategy runs; winner sets are unioned into an
//! accumulator that starts from the winners already recorded, and
//! `is_game_over` is OR-reduced. Nothing is ever removed from the
//! accumulator.

use crate::core::{GameSettings, GameState, PlayerId, Roster};
use crate::roles::{RoleId, RoleRegistry, Team};

/// The death that triggered this evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecentDeath {
    /// Killed during the night.
    Night(PlayerId),
    /// Voted out during the day.
    Execution(PlayerId),
    /// Shot by a revenge role.
    Revenge(PlayerId),
}

/// Read-only inputs shared by every strategy.
#[derive(Clone, Copy)]
pub struct WinContext<'a> {
    pub players: &'a Roster,
    pub registry: &'a RoleRegistry,
    pub lovers: Option<&'a (PlayerId, PlayerId)>,
    /// Winners accumulated so far, including earlier strategies in this pass.
    pub current_winners: &'a [PlayerId],
    pub settings: &'a GameSettings,
    pub recent_death: Option<&'a RecentDeath>,
}

impl WinContext<'_> {
    /// Living members of the werewolf team, pack or not.
    #[must_use]
    pub fn wolf_team_alive(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.alive && p.team == Team::Werewolf)
            .count()
    }

    /// Living players outside the werewolf team.
    #[must_use]
    pub fn others_alive(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.alive && p.team != Team::Werewolf)
            .count()
    }

    /// Whether both lovers are already among the winners.
    #[must_use]
    pub fn lovers_have_won(&self) -> bool {
        self.lovers.is_some_and(|(a, b)| {
            self.current_winners.contains(a) && self.current_winners.contains(b)
        })
    }

    /// Every player, living or dead, currently on `team`.
    #[must_use]
    pub fn team_members(&self, team: Team) -> Vec<PlayerId> {
        self.players
            .values()
            .filter(|p| p.team == team)
            .map(|p| p.id.clone())
            .collect()
    }
}

/// What a strategy contributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WinOutcome {
    pub winners: Vec<PlayerId>,
    pub is_game_over: bool,
}

/// Accumulated result of a full chain pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WinResult {
    /// Superset of the winners passed in.
    pub winners: Vec<PlayerId>,
    pub is_game_over: bool,
}

/// One pluggable win condition.
pub trait WinStrategy: Send + Sync + std::fmt::Debug {
    fn id(&self) -> &'static str;

    /// Lower runs first.
    fn priority(&self) -> u32;

    /// `None` when the condition does not hold.
    fn check(&self, ctx: &WinContext<'_>) -> Option<WinOutcome>;
}

/// Personal role conditions, e.g. the Tanner's execution.
#[derive(Debug, Default)]
pub struct PersonalWinStrategy;

impl WinStrategy for PersonalWinStrategy {
    fn id(&self) -> &'static str {
        "personal"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn check(&self, ctx: &WinContext<'_>) -> Option<WinOutcome> {
        let mut winners = Vec::new();
        let mut ends_game = false;

        for player in ctx.players.values() {
            let Some(capability) = ctx.registry.for_player(player) else { continue };
            if capability.check_win(player, ctx) {
                winners.push(player.id.clone());
                ends_game |= !capability.wants_execution() || ctx.settings.tanner_win_ends_game;
            }
        }

        (!winners.is_empty()).then_some(WinOutcome {
            winners,
            is_game_over: ends_game,
        })
    }
}

/// Lovers are the last two alive, or the last three with their Cupid.
#[derive(Debug, Default)]
pub struct LoversStrategy;

impl WinStrategy for LoversStrategy {
    fn id(&self) -> &'static str {
        "lovers"
    }

    fn priority(&self) -> u32 {
        20
    }

    fn check(&self, ctx: &WinContext<'_>) -> Option<WinOutcome> {
        let (a, b) = ctx.lovers?;
        let alive: Vec<_> = ctx.players.values().filter(|p| p.alive).collect();
        let lovers_alive = alive.iter().filter(|p| p.id == *a || p.id == *b).count();
        if lovers_alive != 2 {
            return None;
        }

        let others: Vec<_> = alive.iter().filter(|p| p.id != *a && p.id != *b).collect();
        let mut winners = vec![a.clone(), b.clone()];
        match others.as_slice() {
            [] => {}
            [third] if third.has_role(RoleId::Cupid) => winners.push(third.id.clone()),
            _ => return None,
        }

        Some(WinOutcome {
            winners,
            is_game_over: true,
        })
    }
}

/// The werewolf team has been wiped out.
#[derive(Debug, Default)]
pub struct VillageStrategy;

impl WinStrategy for VillageStrategy {
    fn id(&self) -> &'static str {
        "village"
    }

    fn priority(&self) -> u32 {
        30
    }

    fn check(&self, ctx: &WinContext<'_>) -> Option<WinOutcome> {
        if ctx.lovers_have_won() || ctx.wolf_team_alive() > 0 {
            return None;
        }
        Some(WinOutcome {
            winners: ctx.team_members(Team::Village),
            is_game_over: true,
        })
    }
}

/// The werewolf team has reached parity.
#[derive(Debug, Default)]
pub struct WerewolfStrategy;

impl WinStrategy for WerewolfStrategy {
    fn id(&self) -> &'static str {
        "werewolf"
    }

    fn priority(&self) -> u32 {
        40
    }

    fn check(&self, ctx: &WinContext<'_>) -> Option<WinOutcome> {
        let wolves = ctx.wolf_team_alive();
        if ctx.lovers_have_won() || wolves == 0 || wolves < ctx.others_alive() {
            return None;
        }
        Some(WinOutcome {
            winners: ctx.team_members(Team::Werewolf),
            is_game_over: true,
        })
    }
}

/// Ordered strategy chain.
#[derive(Debug, Default)]
pub struct WinEvaluator {
    strategies: Vec<Box<dyn WinStrategy>>,
}

impl WinEvaluator {
    /// Create an evaluator with no strategies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in chain: personal, lovers, village, werewolf.
    #[must_use]
    pub fn standard() -> Self {
        Self::new()
            .with_strategy(PersonalWinStrategy)
            .with_strategy(LoversStrategy)
            .with_strategy(VillageStrategy)
            .with_strategy(WerewolfStrategy)
    }

    /// Add a strategy, keeping the chain sorted by priority.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl WinStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self.strategies.sort_by_key(|s| s.priority());
        self
    }

    /// Strategy ids in evaluation order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().map(|s| s.id())
    }

    /// Run every strategy and union their winners.
    #[must_use]
    pub fn evaluate(&self, ctx: &WinContext<'_>) -> WinResult {
        let mut winners = ctx.current_winners.to_vec();
        let mut is_game_over = false;

        for strategy in &self.strategies {
            let view = WinContext {
                current_winners: &winners,
                ..*ctx
            };
            let Some(outcome) = strategy.check(&view) else { continue };

            tracing::debug!(
                strategy = strategy.id(),
                winners = outcome.winners.len(),
                game_over = outcome.is_game_over,
                "win strategy fired"
            );
            for id in outcome.winners {
                if !winners.contains(&id) {
                    winners.push(id);
                }
            }
            is_game_over |= outcome.is_game_over;
        }

        WinResult {
            winners,
            is_game_over,
        }
    }

    /// Evaluate against a state snapshot.
    #[must_use]
    pub fn evaluate_state(
        &self,
        state: &GameState,
        registry: &RoleRegistry,
        recent_death: Option<&RecentDeath>,
    ) -> WinResult {
        let current: Vec<PlayerId> = state.winners.iter().cloned().collect();
        let ctx = WinContext {
            players: &state.players,
            registry,
            lovers: state.lovers.as_ref(),
            current_winners: &current,
            settings: &state.settings,
            recent_death,
        };
        self.evaluate(&ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{roster_of, Player};

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    fn dead(mut p: Player) -> Player {
        p.alive = false;
        p
    }

    fn eval(players: Vec<Player>, lovers: Option<(PlayerId, PlayerId)>, death: Option<RecentDeath>) -> WinResult {
        let registry = RoleRegistry::standard();
        let roster = roster_of(players);
        let settings = GameSettings::default();
        let ctx = WinContext {
            players: &roster,
            registry: &registry,
            lovers: lovers.as_ref(),
            current_winners: &[],
            settings: &settings,
            recent_death: death.as_ref(),
        };
        WinEvaluator::standard().evaluate(&ctx)
    }

    #[test]
    fn test_chain_order() {
        let ids: Vec<_> = WinEvaluator::standard().ids().collect();
        assert_eq!(ids, vec!["personal", "lovers", "village", "werewolf"]);
    }

    #[test]
    fn test_no_winner_midgame() {
        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                Player::new("b", "B").with_role(RoleId::Seer),
            ],
            None,
            None,
        );
        assert!(!result.is_game_over);
        assert!(result.winners.is_empty());
    }

    #[test]
    fn test_village_wins_including_dead_members() {
        let result = eval(
            vec![
                dead(Player::new("w", "W").with_role(RoleId::Werewolf)),
                dead(Player::new("a", "A").with_role(RoleId::Villager)),
                Player::new("b", "B").with_role(RoleId::Seer),
                Player::new("c", "C").with_role(RoleId::Villager),
                dead(Player::new("m", "M").with_role(RoleId::Minion)),
            ],
            None,
            None,
        );
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("a"), pid("b"), pid("c")]);
    }

    #[test]
    fn test_living_minion_keeps_game_going() {
        let result = eval(
            vec![
                dead(Player::new("w", "W").with_role(RoleId::Werewolf)),
                Player::new("m", "M").with_role(RoleId::Minion),
                Player::new("a", "A").with_role(RoleId::Villager),
                Player::new("b", "B").with_role(RoleId::Villager),
            ],
            None,
            None,
        );
        assert!(!result.is_game_over);
        assert!(result.winners.is_empty());
    }

    #[test]
    fn test_werewolves_win_at_parity() {
        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("s", "S").with_role(RoleId::Sorcerer),
                Player::new("a", "A").with_role(RoleId::Villager),
                dead(Player::new("b", "B").with_role(RoleId::Seer)),
            ],
            None,
            None,
        );
        // The sorcerer counts with the wolf: two against one.
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("s"), pid("w")]);

        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                Player::new("b", "B").with_role(RoleId::Villager),
                dead(Player::new("s", "S").with_role(RoleId::Sorcerer)),
            ],
            None,
            None,
        );
        assert!(!result.is_game_over);

        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                dead(Player::new("s", "S").with_role(RoleId::Sorcerer)),
            ],
            None,
            None,
        );
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("s"), pid("w")]);
    }

    #[test]
    fn test_lovers_suppress_team_wins() {
        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                dead(Player::new("b", "B").with_role(RoleId::Villager)),
            ],
            Some((pid("w"), pid("a"))),
            None,
        );
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("w"), pid("a")]);
    }

    #[test]
    fn test_lovers_win_with_cupid_as_third() {
        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                Player::new("c", "C").with_role(RoleId::Cupid),
            ],
            Some((pid("w"), pid("a"))),
            None,
        );
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("w"), pid("a"), pid("c")]);

        let result = eval(
            vec![
                Player::new("w", "W").with_role(RoleId::Werewolf),
                Player::new("a", "A").with_role(RoleId::Villager),
                Player::new("x", "X").with_role(RoleId::Seer),
            ],
            Some((pid("w"), pid("a"))),
            None,
        );
        assert!(!result.is_game_over);
    }

    #[test]
    fn test_tanner_execution() {
        let players = vec![
            Player::new("w", "W").with_role(RoleId::Werewolf),
            dead(Player::new("t", "T").with_role(RoleId::Tanner)),
            Player::new("a", "A").with_role(RoleId::Villager),
            Player::new("b", "B").with_role(RoleId::Villager),
        ];
        let result = eval(players.clone(), None, Some(RecentDeath::Execution(pid("t"))));
        assert!(result.is_game_over);
        assert_eq!(result.winners, vec![pid("t")]);

        let registry = RoleRegistry::standard();
        let roster = roster_of(players);
        let settings = GameSettings::default().with_tanner_ends_game(false);
        let death = RecentDeath::Execution(pid("t"));
        let ctx = WinContext {
            players: &roster,
            registry: &registry,
            lovers: None,
            current_winners: &[],
            settings: &settings,
            recent_death: Some(&death),
        };
        let result = WinEvaluator::standard().evaluate(&ctx);
        assert!(!result.is_game_over);
        assert_eq!(result.winners, vec![pid("t")]);
    }

    #[test]
    fn test_prior_winners_are_kept() {
        let registry = RoleRegistry::standard();
        let roster = roster_of(vec![
            Player::new("w", "W").with_role(RoleId::Werewolf),
            Player::new("a", "A").with_role(RoleId::Villager),
            Player::new("b", "B").with_role(RoleId::Villager),
        ]);
        let settings = GameSettings::default();
        let prior = vec![pid("tanner")];
        let ctx = WinContext {
            players: &roster,
            registry: &registry,
            lovers: None,
            current_winners: &prior,
            settings: &settings,
            recent_death: None,
        };
        let result = WinEvaluator::standard().evaluate(&ctx);
        assert_eq!(result.winners, prior);
    }
}
