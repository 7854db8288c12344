//! Console rendering for the interactive driver.
//!
//! [`ConsoleCallback`] reports round transitions and human turns as ticks
//! happen. The `render_*` functions build the text for the `board`,
//! `status`, and `session` commands.

use std::fmt::Write as _;

use fairway_core::SimulationContext;
use fairway_core::runner::TickCallback;
use fairway_core::tick::TickSummary;
use fairway_types::{LeaderboardRow, PendingTurn};
use tracing::debug;

/// Golf-style score relative to par: `E`, `+3`, `-2`.
pub fn format_par_delta(delta: i32) -> String {
    match delta {
        0 => "E".to_owned(),
        d if d > 0 => format!("+{d}"),
        d => d.to_string(),
    }
}

/// Render up to `limit` leaderboard rows as a table.
pub fn render_leaderboard(rows: &[LeaderboardRow], limit: usize) -> String {
    let mut out = String::from(" pos  player                holes  strokes  score\n");
    for row in rows.iter().take(limit) {
        let _ = writeln!(
            out,
            "{:>4}  {:<20}  {:>5}  {:>7}  {:>5}",
            row.position,
            row.name,
            row.stations_completed,
            row.total_strokes,
            format_par_delta(row.par_delta),
        );
    }
    if rows.len() > limit {
        let _ = writeln!(out, "  ... {} more", rows.len().saturating_sub(limit));
    }
    out
}

/// Render the prompt for an outstanding human turn.
pub fn render_pending(turn: &PendingTurn) -> String {
    format!(
        "Your turn: hole {} ({}, par {}), aim for {}. Enter `score <n>`.",
        u32::from(turn.meta.hole).saturating_add(1),
        turn.meta.difficulty,
        turn.meta.par,
        turn.meta.target,
    )
}

/// Render station occupancy and the pending turn.
pub fn render_status(ctx: &SimulationContext) -> String {
    let mut out = format!(
        "round {}  t={:.1}s  manual={}\n",
        ctx.round_number(),
        ctx.now(),
        ctx.manual_mode(),
    );
    for station in ctx.station_occupancy() {
        let hole = u32::from(station.station).saturating_add(1);
        match (station.occupant, station.remaining) {
            (Some(pairing), Some(remaining)) => {
                let _ = writeln!(out, "  hole {hole:>2}: {pairing} ({remaining:.1}s)");
            }
            (Some(pairing), None) => {
                let _ = writeln!(out, "  hole {hole:>2}: {pairing}");
            }
            (None, _) => {
                let _ = writeln!(out, "  hole {hole:>2}: -");
            }
        }
    }
    if let Some(turn) = ctx.pending_turn() {
        let _ = writeln!(out, "{}", render_pending(&turn));
    }
    out
}

/// Tick callback that prints round transitions and human turns.
#[derive(Debug, Default)]
pub struct ConsoleCallback {
    board_rows: usize,
}

impl ConsoleCallback {
    /// Create a callback that prints `board_rows` leaderboard rows at the
    /// end of each round.
    pub const fn new(board_rows: usize) -> Self {
        Self { board_rows }
    }
}

impl TickCallback for ConsoleCallback {
    fn on_tick(&mut self, summary: &TickSummary, ctx: &SimulationContext) {
        if !summary.completed.is_empty() {
            debug!(
                now = summary.now,
                completed = summary.completed.len(),
                deferred = summary.deferred,
                "Stations completed"
            );
        }

        let human_turn = ctx.pending_turn().filter(|turn| {
            summary.suspended() == Some(turn.pairing) && ctx.human_pairing() == Some(turn.pairing)
        });
        if let Some(turn) = human_turn {
            println!("{}", render_pending(&turn));
        }

        if let Some(transition) = &summary.transition {
            println!("Round {} complete.", transition.finished_round);
            if let Some(cut) = &transition.cut {
                println!(
                    "Cut made: {} players advance, {} eliminated.",
                    cut.kept,
                    cut.removed.len()
                );
                if cut.human_eliminated {
                    println!("You missed the cut. The tournament continues without you.");
                }
            }
            print!("{}", render_leaderboard(&ctx.leaderboard(), self.board_rows));
            if transition.next_round.is_none() {
                println!("Tournament complete.");
            }
        }
    }
}
