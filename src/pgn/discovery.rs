use std::{
    fs,
    path::{Path, PathBuf}
};

use itertools::Itertools;
use tracing::warn;

use crate::pgn::PgnError;

/// A tournament file admitted for processing, keyed by the year parsed
/// from its `YYYY_*` filename prefix.
#[derive(Debug, Clone)]
pub struct TournamentFile {
    pub path: PathBuf,
    pub id: String,
    pub year: i32
}

/// Scans a directory for `YYYY_*.pgn` tournament files within the
/// plausible year range and returns them in chronological order, with
/// a lexicographic filename tiebreak within a year.
///
/// The ordering is the mechanism by which rating history accumulates;
/// directory listing order is never trusted. Files with unparseable or
/// out-of-range years are skipped with a warning.
pub fn discover_tournaments(directory: &Path, min_year: i32, max_year: i32) -> Result<Vec<TournamentFile>, PgnError> {
    let entries = fs::read_dir(directory).map_err(|source| PgnError::Io {
        path: directory.display().to_string(),
        source
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| PgnError::Io {
            path: directory.display().to_string(),
            source
        })?;
        let path = entry.path();

        if path.extension().and_then(|e| e.to_str()) != Some("pgn") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        match parse_year(stem) {
            Some(year) if (min_year..=max_year).contains(&year) => files.push(TournamentFile {
                path: path.clone(),
                id: stem.to_string(),
                year
            }),
            Some(year) => {
                warn!(file = %path.display(), year, "Year outside plausible range, skipping")
            }
            None => {
                warn!(file = %path.display(), "Cannot extract year from filename, skipping")
            }
        }
    }

    Ok(files
        .into_iter()
        .sorted_by(|a, b| (a.year, &a.id).cmp(&(b.year, &b.id)))
        .collect())
}

fn parse_year(stem: &str) -> Option<i32> {
    let prefix = stem.split('_').next()?;
    if prefix.len() != 4 || !(prefix.starts_with("19") || prefix.starts_with("20")) {
        return None;
    }

    prefix.parse().ok()
}
