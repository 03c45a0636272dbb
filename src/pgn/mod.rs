pub mod discovery;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path
};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::model::structures::{game_outcome::GameOutcome, game_record::GameRecord};

#[derive(Debug, Error)]
pub enum PgnError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error
    }
}

/// Tags accumulated for the game currently being read.
#[derive(Debug, Default)]
struct PendingGame {
    white: Option<String>,
    black: Option<String>,
    outcome: Option<GameOutcome>,
    date: Option<NaiveDate>,
    white_elo: Option<i32>,
    black_elo: Option<i32>
}

impl PendingGame {
    /// A game only counts once both player names were seen. A missing
    /// or unparseable result counts as a draw.
    fn finish(self) -> Option<GameRecord> {
        Some(GameRecord {
            white: self.white?,
            black: self.black?,
            outcome: self.outcome.unwrap_or(GameOutcome::Draw),
            date: self.date,
            white_elo: self.white_elo,
            black_elo: self.black_elo
        })
    }
}

/// Reads the game records of one tournament PGN file.
///
/// Only the tag pairs the rating engine consumes are extracted;
/// movetext is skipped. A new `[Event ...]` tag closes the previous
/// game, and the last game is flushed at end of file.
pub fn read_games(path: &Path) -> Result<Vec<GameRecord>, PgnError> {
    let file = File::open(path).map_err(|source| PgnError::Io {
        path: path.display().to_string(),
        source
    })?;
    let reader = BufReader::new(file);

    let mut games = Vec::new();
    let mut pending = PendingGame::default();

    for line in reader.lines() {
        let line = line.map_err(|source| PgnError::Io {
            path: path.display().to_string(),
            source
        })?;
        let line = line.trim();

        if line.starts_with("[Event ") {
            games.extend(std::mem::take(&mut pending).finish());
            continue;
        }

        let Some(value) = tag_value(line) else { continue };

        if line.starts_with("[White ") {
            pending.white = Some(value.to_string());
        } else if line.starts_with("[Black ") {
            pending.black = Some(value.to_string());
        } else if line.starts_with("[Result") {
            pending.outcome = Some(GameOutcome::from_result_tag(value));
        } else if line.starts_with("[Date ") {
            pending.date = parse_date(value);
        } else if line.starts_with("[WhiteElo ") {
            pending.white_elo = value.parse().ok();
        } else if line.starts_with("[BlackElo ") {
            pending.black_elo = value.parse().ok();
        }
    }

    games.extend(pending.finish());

    Ok(games)
}

fn tag_value(line: &str) -> Option<&str> {
    line.split('"').nth(1).map(str::trim)
}

/// PGN dates are `YYYY.MM.DD`; partially known dates use `?` for the
/// unknown parts and are treated as absent.
fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.contains('?') {
        return None;
    }

    match NaiveDate::parse_from_str(value, "%Y.%m.%d") {
        Ok(date) => Some(date),
        Err(_) => {
            debug!(value, "Unparseable date tag, treating as absent");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use crate::{
        model::structures::game_outcome::GameOutcome,
        pgn::{read_games, PgnError}
    };

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("wcc_rating_processor_pgn_tests");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_read_two_games() {
        let path = write_fixture(
            "two_games.pgn",
            r#"[Event "WCC 1972"]
[Site "Reykjavik ISL"]
[Date "1972.07.11"]
[White "Spassky, Boris"]
[Black "Fischer, Robert J."]
[Result "1-0"]
[WhiteElo "2660"]
[BlackElo "2785"]

1. d4 Nf6 2. c4 e6 3. Nf3 d5 1-0

[Event "WCC 1972"]
[Site "Reykjavik ISL"]
[Date "1972.07.16"]
[White "Fischer, Robert J."]
[Black "Spassky, Boris"]
[Result "0-1"]

1. c4 e6 2. Nf3 d5 0-1
"#
        );

        let games = read_games(&path).unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].white, "Spassky, Boris");
        assert_eq!(games[0].black, "Fischer, Robert J.");
        assert_eq!(games[0].outcome, GameOutcome::WhiteWin);
        assert_eq!(games[0].white_elo, Some(2660));
        assert_eq!(games[0].black_elo, Some(2785));
        assert_eq!(games[0].date.unwrap().to_string(), "1972-07-11");

        assert_eq!(games[1].outcome, GameOutcome::BlackWin);
        assert_eq!(games[1].white_elo, None);
    }

    #[test]
    fn test_unfinished_result_counts_as_draw() {
        let path = write_fixture(
            "unfinished.pgn",
            r#"[Event "Test"]
[White "A"]
[Black "B"]
[Result "*"]
"#
        );

        let games = read_games(&path).unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].outcome, GameOutcome::Draw);
    }

    #[test]
    fn test_missing_result_counts_as_draw() {
        let path = write_fixture(
            "missing_result.pgn",
            r#"[Event "Test"]
[White "A"]
[Black "B"]
"#
        );

        let games = read_games(&path).unwrap();

        assert_eq!(games[0].outcome, GameOutcome::Draw);
    }

    #[test]
    fn test_unknown_date_is_absent() {
        let path = write_fixture(
            "unknown_date.pgn",
            r#"[Event "Test"]
[Date "????.??.??"]
[White "A"]
[Black "B"]
[Result "1/2-1/2"]
"#
        );

        let games = read_games(&path).unwrap();

        assert!(games[0].date.is_none());
    }

    #[test]
    fn test_game_without_players_is_dropped() {
        let path = write_fixture(
            "no_players.pgn",
            r#"[Event "Test"]
[Date "2000.01.01"]
[Result "1-0"]

[Event "Test"]
[White "A"]
[Black "B"]
[Result "1-0"]
"#
        );

        let games = read_games(&path).unwrap();

        assert_eq!(games.len(), 1);
        assert_eq!(games[0].white, "A");
    }

    #[test]
    fn test_unparseable_elo_is_absent() {
        let path = write_fixture(
            "bad_elo.pgn",
            r#"[Event "Test"]
[White "A"]
[Black "B"]
[WhiteElo "unrated"]
[Result "1-0"]
"#
        );

        let games = read_games(&path).unwrap();

        assert!(games[0].white_elo.is_none());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("wcc_rating_processor_pgn_tests/does_not_exist.pgn");

        let result = read_games(&path);

        assert!(matches!(result, Err(PgnError::Io { .. })));
    }
}
