// Glicko-2 scale conversion factor (Glickman, step 2)
pub const GLICKO_SCALE: f64 = 173.7178;

// Base scale parameters. These anchor the internal/external scale
// conversion and are NOT per-player defaults.
pub const BASE_RATING: f64 = 1500.0;
pub const BASE_DEVIATION: f64 = 350.0;
pub const BASE_VOLATILITY: f64 = 0.06;

// System constant constraining volatility change per rating period
pub const DEFAULT_TAU: f64 = 1.0;

// Seed assigned to a player's first-ever appearance. The corpus is
// world-championship-level play, so unseen players enter as established
// elite players rather than at the 1500/350 base scale. Override via
// configuration for non-elite corpora.
pub const SEED_RATING: f64 = 2500.0;
pub const SEED_DEVIATION: f64 = 50.0;
pub const SEED_VOLATILITY: f64 = 0.05;

// Volatility solver bounds, part of the environment's contract
pub const CONVERGENCE_TOLERANCE: f64 = 0.000001;
pub const MAX_ITERATIONS: u32 = 100;

// Plausible year range for tournament files
pub const MIN_YEAR: i32 = 1978;
pub const MAX_YEAR: i32 = 2023;
