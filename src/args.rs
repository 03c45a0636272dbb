use std::path::PathBuf;

use clap::Parser;

use crate::model::constants::{
    DEFAULT_TAU, MAX_YEAR, MIN_YEAR, SEED_DEVIATION, SEED_RATING, SEED_VOLATILITY
};

#[derive(Parser, Clone)]
#[command(
    display_name = "WCC Rating Processor",
    author = "chess-evaluation-tools",
    long_about = "Computes Glicko-2 ratings for chess players across a directory of \
    historical tournament PGN files, carrying rating state forward chronologically \
    and applying one batched rating-period update per tournament."
)]
pub struct Args {
    /// Directory containing per-tournament PGN files named YYYY_*.pgn
    #[arg(short, long, env, help = "Directory containing tournament PGN files")]
    pub pgn_dir: PathBuf,

    /// Destination for the ratings table
    #[arg(short, long, env, help = "Output CSV file path")]
    pub output_csv: PathBuf,

    /// Optional secondary CSV outer-joined on (Tournament, Player).
    /// Unmatched rows on either side are preserved with empty fields.
    #[arg(short, long, env, help = "Optional CSV to merge into the output")]
    pub merge_csv: Option<PathBuf>,

    #[arg(long, default_value_t = MIN_YEAR, help = "Earliest plausible tournament year")]
    pub min_year: i32,

    #[arg(long, default_value_t = MAX_YEAR, help = "Latest plausible tournament year")]
    pub max_year: i32,

    /// Starting rating for players with no history. The default assumes
    /// an elite corpus; lower it for open-level data.
    #[arg(long, default_value_t = SEED_RATING, help = "Seed rating for unseen players")]
    pub seed_rating: f64,

    #[arg(long, default_value_t = SEED_DEVIATION, help = "Seed rating deviation for unseen players")]
    pub seed_deviation: f64,

    #[arg(long, default_value_t = SEED_VOLATILITY, help = "Seed volatility for unseen players")]
    pub seed_volatility: f64,

    #[arg(long, default_value_t = DEFAULT_TAU, help = "Glicko-2 system constant tau")]
    pub tau: f64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(
        short,
        long,
        env = "RUST_LOG",
        default_value = "info",
        value_parser = ["trace", "debug", "info", "warn", "error"],
        help = "Sets the logging verbosity"
    )]
    pub log_level: String
}
