//! Roster loading.
//!
//! A roster is an ordered, de-duplicated list of `(name, skill)` entries.
//! It is read from a plain text file (one `name,skill` or `name skill` per
//! line, `#` comments allowed). When no file is configured or it cannot be
//! parsed, a roster is drawn from the built-in name pool instead. The human
//! player is always placed first.

use std::collections::BTreeSet;
use std::path::Path;

use fairway_types::{Player, PlayerId};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::config::{MAX_SKILL, RosterConfig};

/// Errors that can occur when loading a roster.
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    /// Failed to read the roster file.
    #[error("failed to read roster file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A line could not be parsed.
    #[error("roster line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What is wrong with the line.
        reason: String,
    },

    /// The file held no entries.
    #[error("roster is empty")]
    Empty,
}

/// One roster line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    /// Player name.
    pub name: String,
    /// Skill level (1 = best).
    pub skill: u8,
}

/// Built-in pool of opponent names used when no roster file is available.
const NAME_POOL: &[&str] = &[
    "Ace", "Birdie", "Bogey", "Chip", "Divot", "Eagle", "Fade", "Gimme", "Hook", "Iron",
    "Jigger", "Kestrel", "Links", "Mashie", "Niblick", "Oriole", "Pin", "Quail", "Rough",
    "Sandy", "Tee", "Upton", "Vardon", "Wedge", "Yardley", "Zinger", "Albatross", "Brassie",
    "Cleek", "Dormie", "Ember", "Flagg", "Gorse", "Hazel", "Inlet", "Juniper", "Kettle",
    "Lofty", "Marram", "Nettle", "Oakes", "Putter", "Ridley", "Spoon", "Thistle", "Underhill",
    "Wren", "Yarrow", "Heath", "Brook", "Moss",
];

/// Parse roster text.
///
/// Blank lines and lines starting with `#` are skipped. Duplicate names
/// (case-insensitive) keep their first occurrence.
///
/// # Errors
///
/// Returns [`RosterError::Parse`] for a malformed line or a skill outside
/// `1..=20`, and [`RosterError::Empty`] if no entries remain.
pub fn parse_roster(text: &str) -> Result<Vec<RosterEntry>, RosterError> {
    let mut seen = BTreeSet::new();
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx.saturating_add(1);
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (name, skill) = line
            .rsplit_once(',')
            .or_else(|| line.rsplit_once(char::is_whitespace))
            .ok_or_else(|| RosterError::Parse {
                line: line_no,
                reason: "expected `name,skill`".to_owned(),
            })?;

        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::Parse {
                line: line_no,
                reason: "missing name".to_owned(),
            });
        }

        let skill: u8 = skill.trim().parse().map_err(|_err| RosterError::Parse {
            line: line_no,
            reason: format!("invalid skill `{}`", skill.trim()),
        })?;
        if !(1..=MAX_SKILL).contains(&skill) {
            return Err(RosterError::Parse {
                line: line_no,
                reason: format!("skill {skill} outside 1..={MAX_SKILL}"),
            });
        }

        if seen.insert(name.to_lowercase()) {
            entries.push(RosterEntry {
                name: name.to_owned(),
                skill,
            });
        }
    }

    if entries.is_empty() {
        return Err(RosterError::Empty);
    }
    Ok(entries)
}

/// Read and parse a roster file.
///
/// # Errors
///
/// Returns [`RosterError::Io`] if the file cannot be read, otherwise the
/// errors of [`parse_roster`].
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let text = std::fs::read_to_string(path)?;
    parse_roster(&text)
}

/// Draw a roster from the built-in name pool.
///
/// Picks between `fallback_min_extra` and `fallback_max_extra` names
/// (bounded by the pool size) and gives each a random skill in the
/// configured range. Names equal to `exclude` are never drawn.
pub fn fallback_roster(
    config: &RosterConfig,
    exclude: &str,
    rng: &mut dyn RngCore,
) -> Vec<RosterEntry> {
    let excluded = exclude.to_lowercase();
    let mut names: Vec<&str> = NAME_POOL
        .iter()
        .copied()
        .filter(|n| n.to_lowercase() != excluded)
        .collect();
    names.shuffle(rng);

    let max = config.fallback_max_extra.min(names.len());
    let min = config.fallback_min_extra.min(max);
    let count = rng.random_range(min..=max);

    names
        .into_iter()
        .take(count)
        .map(|name| RosterEntry {
            name: name.to_owned(),
            skill: rng.random_range(config.fallback_min_skill..=config.fallback_max_skill),
        })
        .collect()
}

/// Build the player table with the human first.
///
/// Entries whose name matches the human (case-insensitive) are dropped.
/// Returns the players in roster order and the human's id.
pub fn assemble_players(
    human_name: &str,
    human_skill: u8,
    entries: &[RosterEntry],
) -> (Vec<Player>, PlayerId) {
    let human_key = human_name.to_lowercase();
    let human_id = PlayerId::new(0);
    let mut players = vec![Player::new(human_id, human_name.to_owned(), human_skill)];

    let mut next: u32 = 1;
    for entry in entries {
        if entry.name.to_lowercase() == human_key {
            continue;
        }
        players.push(Player::new(PlayerId::new(next), entry.name.clone(), entry.skill));
        next = next.saturating_add(1);
    }

    (players, human_id)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::rng::SimRng;

    #[test]
    fn parses_comma_and_space_separated_lines() {
        let text = "# club roster\nAlex,4\n\nBailey 12\n  Casey , 20 \n";
        let entries = parse_roster(text).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.first().unwrap().name, "Alex");
        assert_eq!(entries.get(1).unwrap().skill, 12);
        assert_eq!(entries.get(2).unwrap().name, "Casey");
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let entries = parse_roster("Drew,3\ndrew,9\nEllis,5\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries.first().unwrap().skill, 3);
    }

    #[test]
    fn bad_skill_reports_line() {
        let err = parse_roster("Gray,4\nHarper,21\n").unwrap_err();
        assert!(matches!(err, RosterError::Parse { line: 2, .. }));
        let err = parse_roster("Indy,abc\n").unwrap_err();
        assert!(matches!(err, RosterError::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_text_is_an_error() {
        assert!(matches!(parse_roster("# nothing\n\n"), Err(RosterError::Empty)));
    }

    #[test]
    fn fallback_respects_bounds_and_exclusion() {
        let config = RosterConfig::default();
        let mut rng = SimRng::from_seed(21);
        for _ in 0..20 {
            let entries = fallback_roster(&config, "wren", &mut rng);
            assert!(entries.len() >= config.fallback_min_extra);
            assert!(entries.len() <= config.fallback_max_extra);
            assert!(entries.iter().all(|e| e.name != "Wren"));
            assert!(entries
                .iter()
                .all(|e| (config.fallback_min_skill..=config.fallback_max_skill).contains(&e.skill)));
        }
    }

    #[test]
    fn human_is_first_and_not_duplicated() {
        let entries = parse_roster("you,3\nKai,7\nLogan,9\n").unwrap();
        let (players, human) = assemble_players("You", 12, &entries);
        assert_eq!(players.len(), 3);
        let first = players.first().unwrap();
        assert_eq!(first.id, human);
        assert_eq!(first.skill, 12);
        let ids: Vec<u32> = players.iter().map(|p| p.id.into_inner()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
