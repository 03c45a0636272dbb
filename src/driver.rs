use std::path::Path;

use tracing::{info, warn};

use crate::{
    model::{
        glicko_model::{GlickoConfig, GlickoModel},
        structures::tournament::{Tournament, TournamentRow}
    },
    pgn::{
        self,
        discovery::{discover_tournaments, TournamentFile},
        PgnError
    }
};

/// Runs the full pipeline: discover tournament files, load them, and
/// process them chronologically through a fresh rating model.
///
/// Individual bad files are skipped with a warning; only an unreadable
/// input directory is an error.
pub fn run(pgn_dir: &Path, min_year: i32, max_year: i32, config: GlickoConfig) -> Result<Vec<TournamentRow>, PgnError> {
    let files = discover_tournaments(pgn_dir, min_year, max_year)?;
    info!(count = files.len(), "Discovered tournament files");

    let tournaments = load_tournaments(&files);

    let mut model = GlickoModel::new(config);
    let rows = model.process(&tournaments);
    info!(
        rows = rows.len(),
        players = model.history_tracker.len(),
        "Finished processing"
    );

    Ok(rows)
}

/// Reads each discovered file into a [`Tournament`], preserving the
/// chronological order of `files`. Unreadable and empty files are
/// skipped, never fatal.
pub fn load_tournaments(files: &[TournamentFile]) -> Vec<Tournament> {
    let mut tournaments = Vec::new();
    for file in files {
        let games = match pgn::read_games(&file.path) {
            Ok(games) => games,
            Err(e) => {
                warn!(file = %file.path.display(), error = %e, "Skipping unreadable tournament file");
                continue;
            }
        };

        if games.is_empty() {
            warn!(file = %file.path.display(), "No games found, skipping");
            continue;
        }

        tournaments.push(Tournament {
            id: file.id.clone(),
            year: file.year,
            games
        });
    }

    tournaments
}
