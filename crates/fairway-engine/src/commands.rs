//! Console command parsing for the interactive driver.
//!
//! Each stdin line is one command. Parsing is separate from execution so
//! the grammar can be tested without a running simulation.

use std::path::PathBuf;

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit strokes for the pending human turn.
    Score(u8),
    /// Print the leaderboard.
    Board,
    /// Print station occupancy and the pending turn.
    Status,
    /// Print the session board.
    Session,
    /// Write a save file.
    Save(PathBuf),
    /// Switch the human between manual and auto play.
    Manual(bool),
    /// Stop advancing the clock.
    Pause,
    /// Resume advancing the clock.
    Resume,
    /// Fast-forward to the next human turn or round end.
    Skip,
    /// Print the command list.
    Help,
    /// Leave the program.
    Quit,
}

/// Errors produced while parsing a console line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The first word is not a known command.
    #[error("unknown command `{input}` (type `help`)")]
    Unknown {
        /// The unrecognised word.
        input: String,
    },

    /// A required argument is missing.
    #[error("`{command}` needs an argument")]
    MissingArgument {
        /// The command that was missing its argument.
        command: &'static str,
    },

    /// An argument could not be parsed.
    #[error("`{command}`: invalid argument `{value}`")]
    InvalidArgument {
        /// The command the argument belongs to.
        command: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Help text printed by the `help` command.
pub const HELP: &str = "\
commands:
  score <n>        submit strokes for your pending hole
  board            show the leaderboard
  status           show stations and your pending hole
  session          show the session board
  save <path>      write a save file
  manual on|off    play your own holes or let them auto-play
  pause | resume   hold or release the clock
  skip             fast-forward to your next hole or the round end
  help             show this list
  quit             exit";

/// Parse one console line.
///
/// Words are whitespace separated and the command word is case-insensitive.
/// A bare number is shorthand for `score <n>`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(CommandError::Empty);
    };
    let arg = words.next();

    if let Ok(strokes) = head.parse::<u8>() {
        return Ok(Command::Score(strokes));
    }

    match head.to_lowercase().as_str() {
        "score" | "s" => {
            let value = arg.ok_or(CommandError::MissingArgument { command: "score" })?;
            value
                .parse::<u8>()
                .map(Command::Score)
                .map_err(|_err| CommandError::InvalidArgument {
                    command: "score",
                    value: value.to_owned(),
                })
        }
        "board" | "leaderboard" => Ok(Command::Board),
        "status" => Ok(Command::Status),
        "session" => Ok(Command::Session),
        "save" => arg
            .map(|path| Command::Save(PathBuf::from(path)))
            .ok_or(CommandError::MissingArgument { command: "save" }),
        "manual" => {
            let value = arg.ok_or(CommandError::MissingArgument { command: "manual" })?;
            match value.to_lowercase().as_str() {
                "on" | "true" => Ok(Command::Manual(true)),
                "off" | "false" => Ok(Command::Manual(false)),
                _ => Err(CommandError::InvalidArgument {
                    command: "manual",
                    value: value.to_owned(),
                }),
            }
        }
        "pause" => Ok(Command::Pause),
        "resume" => Ok(Command::Resume),
        "skip" => Ok(Command::Skip),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(CommandError::Unknown {
            input: other.to_owned(),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn score_forms() {
        assert_eq!(parse_command("score 4").unwrap(), Command::Score(4));
        assert_eq!(parse_command("  S 3 ").unwrap(), Command::Score(3));
        assert_eq!(parse_command("5").unwrap(), Command::Score(5));
    }

    #[test]
    fn score_argument_errors() {
        assert_eq!(
            parse_command("score"),
            Err(CommandError::MissingArgument { command: "score" })
        );
        assert_eq!(
            parse_command("score -1"),
            Err(CommandError::InvalidArgument {
                command: "score",
                value: "-1".to_owned(),
            })
        );
        assert!(matches!(
            parse_command("score 300"),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn manual_toggle() {
        assert_eq!(parse_command("manual on").unwrap(), Command::Manual(true));
        assert_eq!(parse_command("MANUAL Off").unwrap(), Command::Manual(false));
        assert!(matches!(
            parse_command("manual maybe"),
            Err(CommandError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn save_takes_a_path() {
        assert_eq!(
            parse_command("save games/club.json").unwrap(),
            Command::Save(PathBuf::from("games/club.json"))
        );
        assert_eq!(
            parse_command("save"),
            Err(CommandError::MissingArgument { command: "save" })
        );
    }

    #[test]
    fn plain_commands() {
        assert_eq!(parse_command("board").unwrap(), Command::Board);
        assert_eq!(parse_command("status").unwrap(), Command::Status);
        assert_eq!(parse_command("session").unwrap(), Command::Session);
        assert_eq!(parse_command("pause").unwrap(), Command::Pause);
        assert_eq!(parse_command("resume").unwrap(), Command::Resume);
        assert_eq!(parse_command("skip").unwrap(), Command::Skip);
        assert_eq!(parse_command("?").unwrap(), Command::Help);
        assert_eq!(parse_command("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn blank_and_unknown() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("putt"),
            Err(CommandError::Unknown {
                input: "putt".to_owned(),
            })
        );
    }
}
