//! End-to-end scheduler tests.
//!
//! These drive a [`SimulationContext`] through whole rounds and check the
//! structural guarantees on every tick: station exclusivity, FIFO service,
//! non-blocking human turns, the cut, determinism, and save/restore.

#![allow(clippy::unwrap_used)]

use fairway_core::SimulationContext;
use fairway_core::config::SimulationConfig;
use fairway_core::pairing_state::{CompletionOutcome, SubmitError};
use fairway_core::roster::RosterEntry;
use fairway_core::runner::{NoOpCallback, RunOptions, StopReason, TickCallback, fast_forward};
use fairway_core::score::GaussianResolver;
use fairway_core::tick::TickSummary;
use fairway_types::{PairingId, PairingStatus, PairingStatusRow};

fn entries(count: u32) -> Vec<RosterEntry> {
    (1..=count)
        .map(|i| RosterEntry {
            name: format!("Player {i:02}"),
            skill: u8::try_from(i % 20).unwrap().max(1),
        })
        .collect()
}

fn config(seed: u64, manual: bool) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = seed;
    config.session.manual_mode = manual;
    config
}

/// Context with the human plus `others` opponents.
fn context(seed: u64, others: u32, manual: bool) -> SimulationContext {
    SimulationContext::from_config(&config(seed, manual), &entries(others)).unwrap()
}

fn run_until_pending(ctx: &mut SimulationContext) {
    let result = fast_forward(ctx, RunOptions::default(), &mut NoOpCallback).unwrap();
    assert_eq!(result.reason, StopReason::AwaitingInput);
}

/// Checks every invariant after every tick.
struct InvariantWatch {
    ticks: u64,
}

impl TickCallback for InvariantWatch {
    fn on_tick(&mut self, _summary: &TickSummary, ctx: &SimulationContext) {
        self.ticks = self.ticks.saturating_add(1);
        let checked = ctx.check_invariants();
        assert!(
            checked.is_ok(),
            "invariant broken after tick {}: {checked:?}",
            self.ticks
        );
        let active = ctx
            .pairing_statuses()
            .iter()
            .filter(|r| r.status == PairingStatus::Active)
            .count();
        assert!(active <= ctx.params().station_count());
        let awaiting = ctx
            .pairing_statuses()
            .iter()
            .filter(|r| r.status == PairingStatus::AwaitingInput)
            .count();
        assert!(awaiting <= 1);
    }
}

#[test]
fn nine_players_start_with_one_queued_pairing() {
    let mut ctx = context(1, 8, false);
    let statuses: Vec<PairingStatus> = ctx.pairing_statuses().iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            PairingStatus::Queued,
            PairingStatus::PreRelease,
            PairingStatus::PreRelease
        ]
    );
    assert!(ctx.station_occupancy().iter().all(|s| s.occupant.is_none()));

    let _ = ctx.advance(0.5).unwrap();
    let occupancy = ctx.station_occupancy();
    assert_eq!(occupancy.first().unwrap().occupant, Some(PairingId::new(0)));
    assert!(occupancy.iter().skip(1).all(|s| s.occupant.is_none()));
}

#[test]
fn full_tournament_keeps_invariants_on_every_tick() {
    let mut ctx = context(7, 40, false);
    let mut watch = InvariantWatch { ticks: 0 };
    let options = RunOptions {
        step: 0.8,
        ..RunOptions::default()
    };
    let result = fast_forward(&mut ctx, options, &mut watch).unwrap();
    assert_eq!(result.reason, StopReason::TournamentComplete);
    assert!(watch.ticks > 0);
    assert_eq!(ctx.roster().len(), 41);
    let holes = u32::try_from(ctx.params().station_count()).unwrap();
    let expected = usize::try_from(holes.saturating_mul(ctx.params().rounds)).unwrap();
    assert!(ctx.roster().iter().all(|p| p.results.len() == expected));
    assert!(!ctx.session_board().rows().is_empty());
    assert!(ctx.session_board().rows().len() <= 10);
}

/// Verifies that every allocation went to the longest-waiting pairing.
struct FifoWatch {
    before: Vec<PairingStatusRow>,
    allocations: usize,
}

impl FifoWatch {
    fn entry_before(&self, pairing: PairingId, now: f64) -> f64 {
        self.before
            .iter()
            .find(|r| r.pairing == pairing && r.status == PairingStatus::Queued)
            .and_then(|r| r.queue_entry)
            .unwrap_or(now)
    }
}

impl TickCallback for FifoWatch {
    fn on_tick(&mut self, summary: &TickSummary, ctx: &SimulationContext) {
        let after = ctx.pairing_statuses();
        if summary.transition.is_none() {
            for placed in &summary.allocations {
                let chosen = self.entry_before(placed.pairing, summary.now);
                for waiting in after.iter().filter(|r| {
                    r.status == PairingStatus::Queued && r.next_station == placed.station
                }) {
                    let entry = waiting.queue_entry.unwrap();
                    assert!(
                        entry > chosen || (entry >= chosen && waiting.pairing > placed.pairing),
                        "pairing {} waited longer than {} for station {}",
                        waiting.pairing,
                        placed.pairing,
                        placed.station
                    );
                }
                self.allocations = self.allocations.saturating_add(1);
            }
        }
        self.before = after;
    }
}

#[test]
fn stations_are_served_first_come_first_served() {
    let mut ctx = context(11, 59, false);
    let mut watch = FifoWatch {
        before: ctx.pairing_statuses(),
        allocations: 0,
    };
    let options = RunOptions {
        step: 0.6,
        stop_at_round_end: true,
        ..RunOptions::default()
    };
    let result = fast_forward(&mut ctx, options, &mut watch).unwrap();
    assert_eq!(result.reason, StopReason::RoundRestarted);
    // Every pairing visits every station once in round 1.
    assert_eq!(watch.allocations, 360);
}

#[test]
fn equal_seeds_and_steps_give_equal_histories() {
    let mut a = context(99, 30, false);
    let mut b = context(99, 30, false);
    for step in [0.4, 1.1, 2.5, 0.9] {
        for _ in 0..60 {
            let left = a.advance(step).unwrap();
            let right = b.advance(step).unwrap();
            assert_eq!(left, right);
        }
    }
    assert_eq!(a.leaderboard(), b.leaderboard());
    assert_eq!(a.round_state(), b.round_state());
    assert_eq!(a.roster(), b.roster());
}

#[test]
fn different_seeds_differ() {
    let mut a = context(1, 30, false);
    let mut b = context(2, 30, false);
    for _ in 0..200 {
        let _ = a.advance(1.0).unwrap();
        let _ = b.advance(1.0).unwrap();
    }
    assert_ne!(a.roster(), b.roster());
}

#[test]
fn pending_human_turn_does_not_block_others() {
    let mut ctx = context(5, 29, true);
    run_until_pending(&mut ctx);
    let turn = ctx.pending_turn().unwrap();
    let human = ctx.human().unwrap();

    let others_before: usize = ctx
        .roster()
        .iter()
        .filter(|p| p.id != human)
        .map(|p| p.results.len())
        .sum();
    let human_before = ctx.roster().first().unwrap().results.len();

    let mut completions = 0_usize;
    for _ in 0..40 {
        let summary = ctx.advance(1.0).unwrap();
        completions = completions.saturating_add(summary.completed.len());
        assert_eq!(ctx.pending_turn(), Some(turn));
        let occupant = ctx
            .station_occupancy()
            .get(usize::from(turn.station))
            .unwrap()
            .occupant;
        assert_ne!(occupant, Some(turn.pairing));
        assert!(ctx.check_invariants().is_ok());
    }
    assert!(completions > 0);

    let others_after: usize = ctx
        .roster()
        .iter()
        .filter(|p| p.id != human)
        .map(|p| p.results.len())
        .sum();
    assert!(others_after > others_before);
    assert_eq!(ctx.roster().first().unwrap().results.len(), human_before);

    let done = ctx.submit_human_score(turn.pairing, 4).unwrap();
    assert_ne!(done.outcome, CompletionOutcome::Suspended);
    assert!(ctx.pending_turn().is_none());
    let human_row = ctx.roster().first().unwrap();
    assert_eq!(human_row.results.len(), human_before.saturating_add(1));
    assert_eq!(human_row.results.last().unwrap().strokes, 4);
    let status = ctx
        .pairing_statuses()
        .into_iter()
        .find(|r| r.pairing == turn.pairing)
        .unwrap();
    assert_eq!(status.status, PairingStatus::Queued);
    assert!(status.queue_entry.is_some_and(|t| (t - ctx.now()).abs() < 1e-9));
}

#[test]
fn rejected_submissions_change_nothing() {
    let mut ctx = context(6, 14, true);
    run_until_pending(&mut ctx);
    let turn = ctx.pending_turn().unwrap();
    let roster = ctx.roster().to_vec();
    let round = ctx.round_state().clone();

    let other = PairingId::new(turn.pairing.into_inner().saturating_add(1));
    assert_eq!(
        ctx.submit_human_score(other, 3),
        Err(SubmitError::WrongPairing {
            expected: turn.pairing,
            submitted: other,
        })
    );
    assert!(matches!(
        ctx.submit_human_score(turn.pairing, 0),
        Err(SubmitError::InvalidStrokes { strokes: 0, .. })
    ));
    let too_many = turn.meta.par.saturating_add(6);
    assert!(matches!(
        ctx.submit_human_score(turn.pairing, too_many),
        Err(SubmitError::InvalidStrokes { .. })
    ));

    assert_eq!(ctx.roster(), roster.as_slice());
    assert_eq!(ctx.round_state(), &round);
    assert_eq!(ctx.pending_turn(), Some(turn));
}

#[test]
fn switching_to_auto_releases_pending_turn() {
    let mut ctx = context(8, 14, true);
    run_until_pending(&mut ctx);
    let turn = ctx.pending_turn().unwrap();

    let done = ctx.set_manual_mode(false).unwrap();
    assert_eq!(done.pairing, turn.pairing);
    assert!(ctx.pending_turn().is_none());
    assert!(ctx.check_invariants().is_ok());

    let result = fast_forward(&mut ctx, RunOptions::default(), &mut NoOpCallback).unwrap();
    assert_eq!(result.reason, StopReason::TournamentComplete);
}

#[test]
fn cut_after_round_two_keeps_fifty() {
    let mut ctx = context(13, 79, false);
    let options = RunOptions {
        stop_at_round_end: true,
        ..RunOptions::default()
    };

    let first = fast_forward(&mut ctx, options, &mut NoOpCallback).unwrap();
    assert_eq!(first.reason, StopReason::RoundRestarted);
    assert_eq!(ctx.round_number(), 2);
    assert_eq!(ctx.roster().len(), 80);

    let second = fast_forward(&mut ctx, options, &mut NoOpCallback).unwrap();
    assert_eq!(second.reason, StopReason::RoundRestarted);
    let transition = second.final_summary.unwrap().transition.unwrap();
    assert_eq!(transition.finished_round, 2);
    assert_eq!(transition.cut.unwrap().kept, 50);

    assert_eq!(ctx.round_number(), 3);
    assert_eq!(ctx.roster().len(), 50);
    assert!(ctx.roster().iter().all(|p| p.holes_completed == 0 && p.round == 3));
    let members: usize = ctx
        .round_state()
        .pairings
        .iter()
        .map(|p| p.players.len())
        .sum();
    assert_eq!(members, 50);
    assert!(ctx.check_invariants().is_ok());
}

#[test]
fn eliminated_human_is_never_asked_again() {
    let mut config = config(21, false);
    config.session.human_skill = 20;
    let strong: Vec<RosterEntry> = (1..=59)
        .map(|i| RosterEntry {
            name: format!("Pro {i:02}"),
            skill: 1,
        })
        .collect();
    let mut ctx = SimulationContext::from_config(&config, &strong).unwrap();
    let options = RunOptions {
        stop_at_round_end: true,
        ..RunOptions::default()
    };
    let _ = fast_forward(&mut ctx, options, &mut NoOpCallback).unwrap();
    let _ = fast_forward(&mut ctx, options, &mut NoOpCallback).unwrap();
    assert!(ctx.is_human_eliminated());
    assert!(ctx.human_pairing().is_none());

    let _ = ctx.set_manual_mode(true);
    let result = fast_forward(&mut ctx, RunOptions::default(), &mut NoOpCallback).unwrap();
    assert_eq!(result.reason, StopReason::TournamentComplete);
    assert!(ctx.pending_turn().is_none());
}

#[test]
fn restored_game_continues_like_the_original() {
    let mut original = context(31, 20, true);
    run_until_pending(&mut original);
    let json = original.export().unwrap();
    let mut restored =
        SimulationContext::import(&json, Box::new(GaussianResolver::default())).unwrap();
    assert_eq!(restored.pending_turn(), original.pending_turn());

    let turn = original.pending_turn().unwrap();
    let _ = original.submit_human_score(turn.pairing, 3).unwrap();
    let _ = restored.submit_human_score(turn.pairing, 3).unwrap();
    assert_eq!(original.set_manual_mode(false), None);
    assert_eq!(restored.set_manual_mode(false), None);

    for _ in 0..300 {
        let left = original.advance(1.0).unwrap();
        let right = restored.advance(1.0).unwrap();
        assert_eq!(left, right);
    }
    assert_eq!(original.leaderboard(), restored.leaderboard());
    assert_eq!(original.round_state(), restored.round_state());
}

#[test]
fn players_are_conserved_across_rounds_without_a_cut() {
    let mut config = config(3, false);
    config.tournament.cut_after_round = 0;
    let mut ctx = SimulationContext::from_config(&config, &entries(17)).unwrap();
    let watch_options = RunOptions {
        stop_at_round_end: true,
        ..RunOptions::default()
    };
    for round in 2..=4 {
        let result = fast_forward(&mut ctx, watch_options, &mut NoOpCallback).unwrap();
        assert_eq!(result.reason, StopReason::RoundRestarted);
        assert_eq!(ctx.round_number(), round);
        assert_eq!(ctx.roster().len(), 18);
        assert!(ctx.check_invariants().is_ok());
    }
}
