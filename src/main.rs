use clap::Parser;
use tracing_subscriber::EnvFilter;
use wcc_rating_processor::{
    args::Args,
    driver,
    export,
    model::glicko_model::GlickoConfig
};

fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .init();

    let config = GlickoConfig {
        seed_rating: args.seed_rating,
        seed_deviation: args.seed_deviation,
        seed_volatility: args.seed_volatility,
        tau: args.tau,
        ..GlickoConfig::default()
    };

    let rows = match driver::run(&args.pgn_dir, args.min_year, args.max_year, config) {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Failed to read tournament directory: {e}");
            std::process::exit(1);
        }
    };

    let result = match &args.merge_csv {
        Some(merge_csv) => export::merge_ratings(&rows, merge_csv, &args.output_csv),
        None => export::write_ratings(&args.output_csv, &rows)
    };

    if let Err(e) = result {
        eprintln!("Failed to export ratings: {e}");
        std::process::exit(1);
    }
}
