use chrono::NaiveDate;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::structures::{game_outcome::GameOutcome, game_record::GameRecord, tournament::Tournament};

pub fn generate_game(white: &str, black: &str, outcome: GameOutcome) -> GameRecord {
    GameRecord {
        white: white.to_string(),
        black: black.to_string(),
        outcome,
        date: None,
        white_elo: None,
        black_elo: None
    }
}

pub fn generate_dated_game(
    white: &str,
    black: &str,
    outcome: GameOutcome,
    date: Option<&str>,
    white_elo: Option<i32>,
    black_elo: Option<i32>
) -> GameRecord {
    GameRecord {
        white: white.to_string(),
        black: black.to_string(),
        outcome,
        date: date.map(|d| NaiveDate::parse_from_str(d, "%Y.%m.%d").expect("test dates must be YYYY.MM.DD")),
        white_elo,
        black_elo
    }
}

pub fn generate_tournament(id: &str, year: i32, games: Vec<GameRecord>) -> Tournament {
    Tournament {
        id: id.to_string(),
        year,
        games
    }
}

/// Single round robin between the given players, with outcomes drawn
/// from a seeded RNG for reproducible results.
pub fn generate_round_robin(id: &str, year: i32, players: &[&str]) -> Tournament {
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    let mut games = Vec::new();
    for i in 0..players.len() {
        for j in (i + 1)..players.len() {
            let outcome = match rng.random_range(0..3) {
                0 => GameOutcome::WhiteWin,
                1 => GameOutcome::Draw,
                _ => GameOutcome::BlackWin
            };
            games.push(generate_game(players[i], players[j], outcome));
        }
    }

    generate_tournament(id, year, games)
}
