//! Leaderboard ranking, the elimination cut, and the session board.
//!
//! Ranking order is score relative to par (lower first), then holes played
//! (more first), then total strokes (fewer first), then name. The cut keeps
//! the leading players in exactly this order.

use std::cmp::Ordering;

use fairway_types::{LeaderboardRow, Player, PlayerId};
use serde::{Deserialize, Serialize};

/// Compare two players in leaderboard order.
pub fn compare_players(a: &Player, b: &Player) -> Ordering {
    a.par_delta()
        .cmp(&b.par_delta())
        .then_with(|| b.stations_completed().cmp(&a.stations_completed()))
        .then_with(|| a.total_strokes().cmp(&b.total_strokes()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Players sorted in leaderboard order.
pub fn ranked<'a>(players: &'a [Player]) -> Vec<&'a Player> {
    let mut sorted: Vec<&Player> = players.iter().collect();
    sorted.sort_by(|a, b| compare_players(a, b));
    sorted
}

/// The ranked leaderboard.
pub fn rank(players: &[Player]) -> Vec<LeaderboardRow> {
    ranked(players)
        .into_iter()
        .enumerate()
        .map(|(idx, player)| LeaderboardRow {
            position: u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX),
            name: player.name.clone(),
            stations_completed: player.stations_completed(),
            total_strokes: player.total_strokes(),
            par_delta: player.par_delta(),
        })
        .collect()
}

/// Keep the top `keep` ranked players and return the removed ones.
///
/// Survivors stay in their roster order; removed players are returned in
/// ranked order.
pub fn apply_cut(players: &mut Vec<Player>, keep: usize) -> Vec<Player> {
    let survivors: Vec<PlayerId> = ranked(players)
        .into_iter()
        .take(keep)
        .map(|p| p.id)
        .collect();

    let mut removed = Vec::new();
    let mut kept = Vec::with_capacity(survivors.len());
    for player in players.drain(..) {
        if survivors.contains(&player.id) {
            kept.push(player);
        } else {
            removed.push(player);
        }
    }
    *players = kept;
    removed.sort_by(compare_players);
    removed
}

/// Best finishers across the tournaments completed in this session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBoard {
    rows: Vec<LeaderboardRow>,
}

impl SessionBoard {
    /// An empty board.
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Current rows, best first.
    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    /// Merge a final leaderboard into the board, keeping each name's best
    /// finish and at most `capacity` rows.
    pub fn record(&mut self, finals: &[LeaderboardRow], capacity: usize) {
        let mut combined: Vec<LeaderboardRow> =
            self.rows.iter().chain(finals.iter()).cloned().collect();
        combined.sort_by(|a, b| {
            a.par_delta
                .cmp(&b.par_delta)
                .then_with(|| a.total_strokes.cmp(&b.total_strokes))
                .then_with(|| a.name.cmp(&b.name))
        });

        let mut rows: Vec<LeaderboardRow> = Vec::new();
        for row in combined {
            if rows.len() >= capacity {
                break;
            }
            if rows.iter().any(|r| r.name == row.name) {
                continue;
            }
            rows.push(row);
        }
        for (idx, row) in rows.iter_mut().enumerate() {
            row.position = u32::try_from(idx.saturating_add(1)).unwrap_or(u32::MAX);
        }
        self.rows = rows;
    }
}
