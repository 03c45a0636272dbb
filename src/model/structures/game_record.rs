use chrono::NaiveDate;

use crate::model::structures::game_outcome::GameOutcome;

/// One game as extracted from a tournament PGN file. Consumed read-only
/// by the tournament processor.
///
/// Player identity is the raw name string, matched exactly. Two
/// spellings of the same person are distinct players.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub white: String,
    pub black: String,
    pub outcome: GameOutcome,
    pub date: Option<NaiveDate>,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>
}
