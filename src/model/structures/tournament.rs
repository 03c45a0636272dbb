use serde::Serialize;

use crate::model::structures::game_record::GameRecord;

/// A parsed tournament file, identified by its file stem
/// (e.g. `1972_Reykjavik`).
#[derive(Debug, Clone)]
pub struct Tournament {
    pub id: String,
    pub year: i32,
    pub games: Vec<GameRecord>
}

/// One output row per participant per tournament. Immutable once
/// created; rows accumulate in processing order and are never rewritten.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TournamentRow {
    pub tournament: String,
    pub player: String,
    pub rating: f64,
    #[serde(rename = "RD")]
    pub rd: f64,
    pub volatility: f64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub avg_elo: Option<i32>
}
