use std::path::Path;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::info;

use crate::model::structures::tournament::TournamentRow;

const RATING_HEADERS: [&str; 8] = [
    "Tournament",
    "Player",
    "Rating",
    "RD",
    "Volatility",
    "StartDate",
    "EndDate",
    "AvgElo",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Merge file missing required column {0}")]
    MissingJoinColumn(&'static str)
}

/// Writes rating rows to `path`, one row per player per tournament, in
/// the order they were produced.
pub fn write_ratings(path: &Path, rows: &[TournamentRow]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source
    })?;

    info!(rows = rows.len(), path = %path.display(), "Wrote ratings");
    Ok(())
}

/// Outer-joins rating rows with a secondary CSV on
/// (Tournament, Player) and writes the combined table to `output`.
///
/// Matched rows gain the secondary file's extra columns; unmatched rows
/// on either side are preserved with empty-field fill, never dropped.
/// Secondary-only rows keep their original order after all rating rows.
pub fn merge_ratings(rows: &[TournamentRow], merge_path: &Path, output: &Path) -> Result<(), ExportError> {
    let mut reader = csv::Reader::from_path(merge_path)?;
    let headers = reader.headers()?.clone();

    let tournament_idx = column_index(&headers, "Tournament")?;
    let player_idx = column_index(&headers, "Player")?;
    let extra_indices: Vec<usize> = (0..headers.len())
        .filter(|i| *i != tournament_idx && *i != player_idx)
        .collect();

    let mut secondary: IndexMap<(String, String), csv::StringRecord> = IndexMap::new();
    for record in reader.records() {
        let record = record?;
        let key = (
            record.get(tournament_idx).unwrap_or_default().to_string(),
            record.get(player_idx).unwrap_or_default().to_string()
        );
        secondary.insert(key, record);
    }

    let mut writer = csv::Writer::from_path(output)?;

    let mut header_row: Vec<&str> = RATING_HEADERS.to_vec();
    for i in &extra_indices {
        header_row.push(&headers[*i]);
    }
    writer.write_record(&header_row)?;

    for row in rows {
        let mut record = rating_fields(row);
        let key = (row.tournament.clone(), row.player.clone());
        match secondary.shift_remove(&key) {
            Some(extra) => {
                for i in &extra_indices {
                    record.push(extra.get(*i).unwrap_or_default().to_string());
                }
            }
            None => record.extend(extra_indices.iter().map(|_| String::new()))
        }
        writer.write_record(&record)?;
    }

    // Secondary rows with no rating counterpart
    let unmatched = secondary.len();
    for ((tournament, player), extra) in secondary {
        let mut record = vec![tournament, player];
        record.extend((2..RATING_HEADERS.len()).map(|_| String::new()));
        for i in &extra_indices {
            record.push(extra.get(*i).unwrap_or_default().to_string());
        }
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|source| ExportError::Io {
        path: output.display().to_string(),
        source
    })?;

    info!(rows = rows.len(), unmatched, path = %output.display(), "Wrote merged ratings");
    Ok(())
}

fn column_index(headers: &csv::StringRecord, name: &'static str) -> Result<usize, ExportError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or(ExportError::MissingJoinColumn(name))
}

fn rating_fields(row: &TournamentRow) -> Vec<String> {
    vec![
        row.tournament.clone(),
        row.player.clone(),
        row.rating.to_string(),
        row.rd.to_string(),
        row.volatility.to_string(),
        row.start_date.clone().unwrap_or_default(),
        row.end_date.clone().unwrap_or_default(),
        row.avg_elo.map(|e| e.to_string()).unwrap_or_default(),
    ]
}
