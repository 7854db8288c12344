//! Round state and round transitions.
//!
//! A [`RoundState`] holds everything that is rebuilt when a round starts:
//! the difficulty sequence, the pairings and their states, and the station
//! slots. [`finish_round_if_complete`] runs at the end of every tick and,
//! once every live player has played every hole, applies the cut (after the
//! configured round), then either starts the next round from the current
//! clock or marks the tournament complete.

use fairway_types::{Difficulty, Pairing, PairingId, PairingState, PairingStatus, Player, PlayerId};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SchedulerParams;
use crate::course::{course_par, difficulty_sequence};
use crate::leaderboard::{self, SessionBoard};
use crate::pairing::{BuildError, build_pairings};
use crate::pending::PendingTurnBroker;
use crate::tee_sheet::{initial_states, release_due};

/// Everything scoped to the round in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// Round number (1-based). Exceeds the round limit once the tournament
    /// is complete.
    pub number: u32,
    /// Difficulty class of each hole for this round.
    pub difficulties: Vec<Difficulty>,
    /// Virtual time the round was initialized.
    pub started_at: f64,
    /// Occupant of each station.
    pub slots: Vec<Option<PairingId>>,
    /// Pairings in build order.
    pub pairings: Vec<Pairing>,
    /// One state per pairing, indexed by pairing id.
    pub states: Vec<PairingState>,
    /// Set permanently once the human is removed by the cut.
    pub human_eliminated: bool,
    /// Set when a new round has been initialized; cleared when taken.
    pub restarted: bool,
    /// Set once the last round has finished.
    pub tournament_complete: bool,
    /// The outstanding human turn, if any.
    pub pending: PendingTurnBroker,
}

impl RoundState {
    /// Build round `number` for the given live roster, starting at `start`.
    ///
    /// Draws a difficulty sequence, builds pairings, lays out the tee sheet
    /// and runs one release pass so the first pairing is queued at `start`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the roster is empty or the pairing size
    /// is unsupported.
    pub fn initialize(
        number: u32,
        roster: &[PlayerId],
        params: &SchedulerParams,
        start: f64,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BuildError> {
        let difficulties = difficulty_sequence(&params.course, rng);
        let pairings = build_pairings(roster, params.pairing_size, rng)?;
        let mut states = initial_states(pairings.len(), start, params.tee_interval_secs);
        let _ = release_due(&mut states, start);

        info!(
            round = number,
            pairings = pairings.len(),
            players = roster.len(),
            par = course_par(&difficulties),
            start,
            "Round initialized"
        );

        Ok(Self {
            number,
            difficulties,
            started_at: start,
            slots: vec![None; params.station_count()],
            pairings,
            states,
            human_eliminated: false,
            restarted: false,
            tournament_complete: false,
            pending: PendingTurnBroker::new(),
        })
    }

    /// State of a pairing.
    pub fn state(&self, id: PairingId) -> Option<&PairingState> {
        self.states.get(id.index())
    }

    /// Mutable state of a pairing.
    pub fn state_mut(&mut self, id: PairingId) -> Option<&mut PairingState> {
        self.states.get_mut(id.index())
    }

    /// A pairing by id.
    pub fn pairing(&self, id: PairingId) -> Option<&Pairing> {
        self.pairings.get(id.index())
    }

    /// Number of pairings currently on a station.
    pub fn active_count(&self) -> usize {
        self.states
            .iter()
            .filter(|s| s.status == PairingStatus::Active)
            .count()
    }

    /// The pairing containing `player`.
    pub fn pairing_of(&self, player: PlayerId) -> Option<PairingId> {
        self.pairings
            .iter()
            .find(|p| p.contains(player))
            .map(|p| p.id)
    }
}

/// Outcome of the elimination cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutSummary {
    /// Players kept.
    pub kept: usize,
    /// Names of removed players, best first.
    pub removed: Vec<String>,
    /// Whether the human was among the removed.
    pub human_eliminated: bool,
}

/// What happened when a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTransition {
    /// The round that just finished.
    pub finished_round: u32,
    /// The cut, if one was applied after this round.
    pub cut: Option<CutSummary>,
    /// The round that started, or `None` when the tournament is over.
    pub next_round: Option<u32>,
}

/// Whether every live player has played every hole of the current round.
pub fn round_is_over(roster: &[Player], station_count: usize) -> bool {
    let holes = u32::try_from(station_count).unwrap_or(u32::MAX);
    !roster.is_empty() && roster.iter().all(|p| p.holes_completed >= holes)
}

/// Close the round if it is over.
///
/// Applies the cut after the cut round, then either re-initializes the next
/// round from `now` or, past the round limit, marks the tournament complete
/// and records the final board on `board`.
///
/// # Errors
///
/// Returns a [`BuildError`] if the next round's pairings cannot be built.
pub fn finish_round_if_complete(
    round: &mut RoundState,
    roster: &mut Vec<Player>,
    human: Option<PlayerId>,
    params: &SchedulerParams,
    now: f64,
    rng: &mut dyn RngCore,
    board: &mut SessionBoard,
) -> Result<Option<RoundTransition>, BuildError> {
    if round.tournament_complete || !round_is_over(roster, params.station_count()) {
        return Ok(None);
    }

    let finished_round = round.number;
    info!(round = finished_round, now, "Round complete");

    let cut = if finished_round == params.cut_after_round {
        let removed = leaderboard::apply_cut(roster, params.cut_size);
        let human_removed = human.is_some_and(|h| removed.iter().any(|p| p.id == h));
        if human_removed {
            round.human_eliminated = true;
        }
        info!(
            round = finished_round,
            survivors = roster.len(),
            removed = removed.len(),
            human_eliminated = human_removed,
            "Cut applied"
        );
        Some(CutSummary {
            kept: roster.len(),
            removed: removed.into_iter().map(|p| p.name).collect(),
            human_eliminated: human_removed,
        })
    } else {
        None
    };

    let next = finished_round.saturating_add(1);
    if next > params.rounds {
        round.number = next;
        round.tournament_complete = true;
        board.record(&leaderboard::rank(roster), params.session_board_size);
        info!(rounds = params.rounds, players = roster.len(), "Tournament complete");
        return Ok(Some(RoundTransition {
            finished_round,
            cut,
            next_round: None,
        }));
    }

    for player in roster.iter_mut() {
        player.holes_completed = 0;
        player.round = next;
    }
    let ids: Vec<PlayerId> = roster.iter().map(|p| p.id).collect();
    let eliminated = round.human_eliminated;
    *round = RoundState::initialize(next, &ids, params, now, rng)?;
    round.human_eliminated = eliminated;
    round.restarted = true;

    Ok(Some(RoundTransition {
        finished_round,
        cut,
        next_round: Some(next),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    fn params() -> SchedulerParams {
        SchedulerParams {
            course: vec![Difficulty::Short, Difficulty::Medium, Difficulty::Long],
            rounds: 3,
            cut_after_round: 1,
            cut_size: 2,
            ..SchedulerParams::default()
        }
    }

    fn roster(n: u32) -> Vec<Player> {
        (0..n)
            .map(|i| Player::new(PlayerId::new(i), format!("P{i}"), 10))
            .collect()
    }

    fn ids(players: &[Player]) -> Vec<PlayerId> {
        players.iter().map(|p| p.id).collect()
    }

    #[test]
    fn initialize_queues_first_pairing_only() {
        let params = SchedulerParams::default();
        let players = roster(9);
        let mut rng = SimRng::from_seed(1);
        let round = RoundState::initialize(1, &ids(&players), &params, 0.0, &mut rng).unwrap();
        assert_eq!(round.pairings.len(), 3);
        assert_eq!(round.slots.len(), 18);
        assert!(round.slots.iter().all(Option::is_none));
        let statuses: Vec<PairingStatus> = round.states.iter().map(|s| s.status).collect();
        assert_eq!(
            statuses,
            vec![
                PairingStatus::Queued,
                PairingStatus::PreRelease,
                PairingStatus::PreRelease
            ]
        );
        assert!(!round.restarted);
    }

    #[test]
    fn unfinished_round_is_left_alone() {
        let params = params();
        let mut players = roster(4);
        let mut rng = SimRng::from_seed(2);
        let mut round = RoundState::initialize(1, &ids(&players), &params, 0.0, &mut rng).unwrap();
        let mut board = SessionBoard::new();
        let result =
            finish_round_if_complete(&mut round, &mut players, None, &params, 10.0, &mut rng, &mut board)
                .unwrap();
        assert!(result.is_none());
        assert_eq!(round.number, 1);
    }

    #[test]
    fn cut_round_removes_players_and_flags_human() {
        let params = params();
        let mut players = roster(4);
        // Human (id 0) plays worst.
        for player in &mut players {
            player.holes_completed = 3;
            let strokes = if player.id == PlayerId::new(0) { 9 } else { 3 };
            let meta = fairway_types::StationMeta {
                hole: 0,
                difficulty: Difficulty::Short,
                par: 3,
                target: 5,
            };
            player.results.push(fairway_types::HoleResult::new(1, &meta, strokes));
        }
        let mut rng = SimRng::from_seed(3);
        let mut round = RoundState::initialize(1, &ids(&players), &params, 0.0, &mut rng).unwrap();
        let mut board = SessionBoard::new();

        let transition = finish_round_if_complete(
            &mut round,
            &mut players,
            Some(PlayerId::new(0)),
            &params,
            42.0,
            &mut rng,
            &mut board,
        )
        .unwrap()
        .unwrap();

        let cut = transition.cut.unwrap();
        assert_eq!(cut.kept, 2);
        assert!(cut.human_eliminated);
        assert_eq!(transition.next_round, Some(2));
        assert_eq!(players.len(), 2);
        assert!(players.iter().all(|p| p.holes_completed == 0 && p.round == 2));
        assert!(round.human_eliminated);
        assert!(round.restarted);
        assert_eq!(round.number, 2);
        assert!((round.started_at - 42.0).abs() < 1e-9);
        let members: usize = round.pairings.iter().map(|p| p.players.len()).sum();
        assert_eq!(members, 2);
    }

    #[test]
    fn last_round_completes_tournament() {
        let params = SchedulerParams {
            rounds: 1,
            cut_after_round: 5,
            ..params()
        };
        let mut players = roster(3);
        for player in &mut players {
            player.holes_completed = 3;
        }
        let mut rng = SimRng::from_seed(4);
        let mut round = RoundState::initialize(1, &ids(&players), &params, 0.0, &mut rng).unwrap();
        let mut board = SessionBoard::new();
        let transition =
            finish_round_if_complete(&mut round, &mut players, None, &params, 9.0, &mut rng, &mut board)
                .unwrap()
                .unwrap();
        assert_eq!(transition.next_round, None);
        assert!(transition.cut.is_none());
        assert!(round.tournament_complete);
        assert_eq!(round.number, 2);
        assert_eq!(board.rows().len(), 3);

        let again =
            finish_round_if_complete(&mut round, &mut players, None, &params, 10.0, &mut rng, &mut board)
                .unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn empty_roster_never_ends_a_round() {
        assert!(!round_is_over(&[], 18));
    }
}
