use std::collections::HashMap;

use chrono::NaiveDate;
use indexmap::IndexMap;
use itertools::{Itertools, MinMaxResult};
use tracing::warn;

use crate::{
    model::{
        constants::{BASE_DEVIATION, BASE_RATING, DEFAULT_TAU, SEED_DEVIATION, SEED_RATING, SEED_VOLATILITY},
        glicko::{Glicko2, Rating},
        history_tracker::HistoryTracker,
        structures::{
            game_record::GameRecord,
            tournament::{Tournament, TournamentRow}
        }
    },
    utils::progress_utils::progress_bar
};

const DATE_FORMAT: &str = "%Y.%m.%d";

/// Rating policy for a processing run.
///
/// The seed triple is what an unseen player starts from; it is a
/// corpus-level policy (elite by default), not a numerical constant of
/// the algorithm, so it always travels through this struct.
#[derive(Debug, Clone)]
pub struct GlickoConfig {
    pub seed_rating: f64,
    pub seed_deviation: f64,
    pub seed_volatility: f64,
    pub base_rating: f64,
    pub base_deviation: f64,
    pub tau: f64
}

impl Default for GlickoConfig {
    fn default() -> Self {
        GlickoConfig {
            seed_rating: SEED_RATING,
            seed_deviation: SEED_DEVIATION,
            seed_volatility: SEED_VOLATILITY,
            base_rating: BASE_RATING,
            base_deviation: BASE_DEVIATION,
            tau: DEFAULT_TAU
        }
    }
}

impl GlickoConfig {
    /// Starting rating for a player with no history.
    pub fn seed(&self) -> Rating {
        Rating::new(self.seed_rating, self.seed_deviation, self.seed_volatility)
    }
}

/// The multi-tournament rating engine: one Glicko-2 environment plus
/// the rating history threaded through tournaments in chronological
/// order.
pub struct GlickoModel {
    env: Glicko2,
    pub history_tracker: HistoryTracker,
    config: GlickoConfig
}

impl GlickoModel {
    pub fn new(config: GlickoConfig) -> GlickoModel {
        GlickoModel {
            env: Glicko2::new(config.base_rating, config.base_deviation, config.tau),
            history_tracker: HistoryTracker::new(),
            config
        }
    }

    pub fn env(&self) -> &Glicko2 {
        &self.env
    }

    /// Processes tournaments strictly in the order given, accumulating
    /// one output row per participant per tournament. Callers are
    /// responsible for chronological ordering.
    pub fn process(&mut self, tournaments: &[Tournament]) -> Vec<TournamentRow> {
        let bar = progress_bar(tournaments.len() as u64, "Processing tournament data");

        let mut rows = Vec::new();
        for tournament in tournaments {
            rows.extend(self.process_tournament(tournament));
            bar.inc(1);
        }

        rows
    }

    /// # Tournament processing
    ///
    /// One tournament is one Glicko-2 rating period:
    /// 1. Look up each participant's carried-over rating, or seed them.
    /// 2. Group every game into per-player result batches. Opponent
    ///    ratings in a batch are the opponent's *start-of-tournament*
    ///    values, never mid-tournament updates.
    /// 3. One environment call per participant with their full batch.
    /// 4. Write all updated ratings back to the history tracker, then
    ///    emit rows. Reads of starting ratings and writes of ending
    ///    ratings never interleave within a tournament.
    pub fn process_tournament(&mut self, tournament: &Tournament) -> Vec<TournamentRow> {
        let starting_ratings = self.starting_ratings(&tournament.games);
        let batches = Self::collect_batches(&tournament.games, &starting_ratings);
        let (start_date, end_date) = Self::date_span(&tournament.games);
        let average_elos = Self::average_elos(&tournament.games);

        let mut rows = Vec::with_capacity(starting_ratings.len());
        for (player, starting_rating) in &starting_ratings {
            let updated = match batches.get(player) {
                Some(batch) if !batch.is_empty() => match self.env.rate(starting_rating, batch) {
                    Ok(rating) => rating,
                    Err(e) => {
                        warn!(
                            tournament = %tournament.id,
                            player = %player,
                            error = %e,
                            "Rating update failed, retaining starting rating"
                        );
                        starting_rating.clone()
                    }
                },
                // A participant with no batch entries keeps their
                // starting rating, without the inactivity step.
                _ => starting_rating.clone()
            };

            self.history_tracker.insert_or_update(player, updated.clone());

            rows.push(TournamentRow {
                tournament: tournament.id.clone(),
                player: player.clone(),
                rating: updated.mu,
                rd: updated.phi,
                volatility: updated.sigma,
                start_date: start_date.map(|d| d.format(DATE_FORMAT).to_string()),
                end_date: end_date.map(|d| d.format(DATE_FORMAT).to_string()),
                avg_elo: average_elos.get(player).copied()
            });
        }

        rows
    }

    /// Start-of-tournament rating per participant, in first-appearance
    /// order. This order is what makes output rows deterministic.
    fn starting_ratings(&self, games: &[GameRecord]) -> IndexMap<String, Rating> {
        let mut ratings = IndexMap::new();
        for game in games {
            for player in [&game.white, &game.black] {
                if !ratings.contains_key(player.as_str()) {
                    let starting_rating = self
                        .history_tracker
                        .get_rating(player)
                        .cloned()
                        .unwrap_or_else(|| self.config.seed());
                    ratings.insert(player.clone(), starting_rating);
                }
            }
        }

        ratings
    }

    fn collect_batches(
        games: &[GameRecord],
        starting_ratings: &IndexMap<String, Rating>
    ) -> HashMap<String, Vec<(f64, Rating)>> {
        let mut batches: HashMap<String, Vec<(f64, Rating)>> = HashMap::new();
        for game in games {
            let white_start = starting_ratings[game.white.as_str()].clone();
            let black_start = starting_ratings[game.black.as_str()].clone();

            batches
                .entry(game.white.clone())
                .or_default()
                .push((game.outcome.white_score(), black_start));
            batches
                .entry(game.black.clone())
                .or_default()
                .push((game.outcome.black_score(), white_start));
        }

        batches
    }

    fn date_span(games: &[GameRecord]) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match games.iter().filter_map(|g| g.date).minmax() {
            MinMaxResult::NoElements => (None, None),
            MinMaxResult::OneElement(d) => (Some(d), Some(d)),
            MinMaxResult::MinMax(min, max) => (Some(min), Some(max))
        }
    }

    /// Mean declared Elo per player across their games in this
    /// tournament, rounded to an integer. Players with no declared Elo
    /// in any game are absent from the map.
    fn average_elos(games: &[GameRecord]) -> HashMap<String, i32> {
        let mut declared: HashMap<String, Vec<i32>> = HashMap::new();
        for game in games {
            if let Some(elo) = game.white_elo {
                declared.entry(game.white.clone()).or_default().push(elo);
            }
            if let Some(elo) = game.black_elo {
                declared.entry(game.black.clone()).or_default().push(elo);
            }
        }

        declared
            .into_iter()
            .map(|(player, elos)| {
                let mean = elos.iter().sum::<i32>() as f64 / elos.len() as f64;
                (player, mean.round() as i32)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use crate::{
        model::{
            glicko::Rating,
            glicko_model::{GlickoConfig, GlickoModel},
            structures::game_outcome::GameOutcome
        },
        utils::test_utils::{generate_dated_game, generate_game, generate_tournament}
    };

    fn model() -> GlickoModel {
        GlickoModel::new(GlickoConfig::default())
    }

    #[test]
    fn test_unseen_players_start_from_seed() {
        let mut model = model();
        let tournament = generate_tournament(
            "1978_Baguio",
            1978,
            vec![generate_game("Karpov", "Korchnoi", GameOutcome::WhiteWin)]
        );

        let rows = model.process_tournament(&tournament);

        // Both players were rated from exactly the seed triple
        let seed = GlickoConfig::default().seed();
        let expected_karpov = model.env().rate(&seed, &[(1.0, seed.clone())]).unwrap();
        let expected_korchnoi = model.env().rate(&seed, &[(0.0, seed.clone())]).unwrap();

        assert_eq!(rows[0].rating, expected_karpov.mu);
        assert_eq!(rows[1].rating, expected_korchnoi.mu);
    }

    #[test]
    fn test_two_unseen_players_single_game() {
        let mut model = model();
        let tournament = generate_tournament(
            "1978_Baguio",
            1978,
            vec![generate_game("Karpov", "Korchnoi", GameOutcome::WhiteWin)]
        );

        let rows = model.process_tournament(&tournament);

        let karpov = &rows[0];
        let korchnoi = &rows[1];

        assert!(karpov.rating > 2500.0);
        assert!(korchnoi.rating < 2500.0);

        // Exact agreement with the single-opponent batch formula
        let seed = GlickoConfig::default().seed();
        let expected = model.env().rate(&seed, &[(1.0, seed.clone())]).unwrap();
        assert_eq!(karpov.rating, expected.mu);
        assert_eq!(karpov.rd, expected.phi);
        assert_eq!(karpov.volatility, expected.sigma);
    }

    #[test]
    fn test_batched_update_not_sequential() {
        // Round robin constructed so that B's mid-tournament result
        // would contaminate C's update under sequential (per-game)
        // updating. The engine must match the batched formula only.
        let mut model = model();
        model
            .history_tracker
            .insert_or_update("A", Rating::new(2600.0, 80.0, 0.05));
        model
            .history_tracker
            .insert_or_update("B", Rating::new(2500.0, 80.0, 0.05));
        model
            .history_tracker
            .insert_or_update("C", Rating::new(2400.0, 80.0, 0.05));

        let a_start = model.history_tracker.get_rating("A").unwrap().clone();
        let b_start = model.history_tracker.get_rating("B").unwrap().clone();
        let c_start = model.history_tracker.get_rating("C").unwrap().clone();

        let tournament = generate_tournament(
            "1981_Merano",
            1981,
            vec![
                generate_game("A", "B", GameOutcome::WhiteWin),
                generate_game("B", "C", GameOutcome::WhiteWin),
                generate_game("C", "A", GameOutcome::Draw),
            ]
        );

        let rows = model.process_tournament(&tournament);
        let c_row = rows.iter().find(|r| r.player == "C").unwrap();

        // Batched: C's batch references B's and A's starting ratings
        let batched = model
            .env()
            .rate(&c_start, &[(0.0, b_start.clone()), (0.5, a_start.clone())])
            .unwrap();
        assert_eq!(c_row.rating, batched.mu);
        assert_eq!(c_row.rd, batched.phi);

        // Sequential: B already lost to A before facing C, and A already
        // beat B before drawing C. Updating live per game must disagree.
        let a_after_first = model.env().rate(&a_start, &[(1.0, b_start.clone())]).unwrap();
        let b_after_first = model.env().rate(&b_start, &[(0.0, a_start.clone())]).unwrap();
        let c_after_second = model.env().rate(&c_start, &[(0.0, b_after_first)]).unwrap();
        let sequential = model.env().rate(&c_after_second, &[(0.5, a_after_first)]).unwrap();
        assert!((c_row.rating - sequential.mu).abs() > 1e-9);
    }

    #[test]
    fn test_history_carry_over_across_skipped_tournaments() {
        let mut model = model();

        let first = generate_tournament(
            "1984_Moscow",
            1984,
            vec![generate_game("Karpov", "Kasparov", GameOutcome::Draw)]
        );
        model.process_tournament(&first);
        let karpov_after_first = model.history_tracker.get_rating("Karpov").unwrap().clone();

        // Karpov skips this one entirely
        let second = generate_tournament(
            "1986_London",
            1986,
            vec![generate_game("Kasparov", "Short", GameOutcome::WhiteWin)]
        );
        model.process_tournament(&second);

        assert_eq!(
            model.history_tracker.get_rating("Karpov").unwrap(),
            &karpov_after_first
        );

        // His next appearance starts exactly from the tournament-one value
        let third = generate_tournament(
            "1987_Seville",
            1987,
            vec![generate_game("Karpov", "Kasparov", GameOutcome::WhiteWin)]
        );
        let kasparov_start = model.history_tracker.get_rating("Kasparov").unwrap().clone();
        let rows = model.process_tournament(&third);

        let expected = model
            .env()
            .rate(&karpov_after_first, &[(1.0, kasparov_start)])
            .unwrap();
        let karpov_row = rows.iter().find(|r| r.player == "Karpov").unwrap();
        assert_eq!(karpov_row.rating, expected.mu);
        assert_eq!(karpov_row.rd, expected.phi);
    }

    #[test]
    fn test_absent_player_gets_no_row() {
        let mut model = model();
        model
            .history_tracker
            .insert_or_update("Spassky", Rating::new(2550.0, 60.0, 0.05));

        let tournament = generate_tournament(
            "1990_Lyon",
            1990,
            vec![generate_game("Karpov", "Kasparov", GameOutcome::Draw)]
        );
        let rows = model.process_tournament(&tournament);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.player != "Spassky"));
    }

    #[test]
    fn test_absent_player_left_unmodified() {
        let mut model = model();
        let spassky = Rating::new(2550.0, 60.0, 0.05);
        model.history_tracker.insert_or_update("Spassky", spassky.clone());

        let tournament = generate_tournament(
            "1990_Lyon",
            1990,
            vec![generate_game("Karpov", "Kasparov", GameOutcome::Draw)]
        );
        model.process_tournament(&tournament);

        assert_eq!(model.history_tracker.get_rating("Spassky").unwrap(), &spassky);
    }

    #[test]
    fn test_date_aggregation() {
        let mut model = model();
        let tournament = generate_tournament(
            "2021_Dubai",
            2021,
            vec![
                generate_dated_game("Carlsen", "Nepomniachtchi", GameOutcome::Draw, Some("2021.06.01"), None, None),
                generate_dated_game("Nepomniachtchi", "Carlsen", GameOutcome::Draw, Some("2021.06.15"), None, None),
                generate_dated_game("Carlsen", "Nepomniachtchi", GameOutcome::WhiteWin, None, None, None),
            ]
        );

        let rows = model.process_tournament(&tournament);

        for row in &rows {
            assert_eq!(row.start_date.as_deref(), Some("2021.06.01"));
            assert_eq!(row.end_date.as_deref(), Some("2021.06.15"));
        }
    }

    #[test]
    fn test_missing_dates_yield_no_span() {
        let mut model = model();
        let tournament = generate_tournament(
            "1993_London",
            1993,
            vec![generate_game("Kasparov", "Short", GameOutcome::WhiteWin)]
        );

        let rows = model.process_tournament(&tournament);

        assert!(rows[0].start_date.is_none());
        assert!(rows[0].end_date.is_none());
    }

    #[test]
    fn test_average_elo_per_player() {
        let mut model = model();
        let tournament = generate_tournament(
            "2000_London",
            2000,
            vec![
                generate_dated_game("Kramnik", "Kasparov", GameOutcome::WhiteWin, None, Some(2770), Some(2849)),
                generate_dated_game("Kasparov", "Kramnik", GameOutcome::Draw, None, Some(2851), Some(2771)),
                // One game without declared Elos
                generate_game("Kramnik", "Kasparov", GameOutcome::Draw),
            ]
        );

        let rows = model.process_tournament(&tournament);
        let kramnik = rows.iter().find(|r| r.player == "Kramnik").unwrap();
        let kasparov = rows.iter().find(|r| r.player == "Kasparov").unwrap();

        // Mean over declared Elos only, rounded to integer
        assert_eq!(kramnik.avg_elo, Some(2771)); // (2770 + 2771) / 2 = 2770.5
        assert_eq!(kasparov.avg_elo, Some(2850));
    }

    #[test]
    fn test_no_declared_elo_yields_missing_marker() {
        let mut model = model();
        let tournament = generate_tournament(
            "1978_Baguio",
            1978,
            vec![generate_game("Karpov", "Korchnoi", GameOutcome::Draw)]
        );

        let rows = model.process_tournament(&tournament);

        assert!(rows.iter().all(|r| r.avg_elo.is_none()));
    }

    #[test]
    fn test_row_order_is_first_appearance_order() {
        let mut model = model();
        let tournament = generate_tournament(
            "1995_New_York",
            1995,
            vec![
                generate_game("Anand", "Kasparov", GameOutcome::Draw),
                generate_game("Kasparov", "Anand", GameOutcome::WhiteWin),
            ]
        );

        let rows = model.process_tournament(&tournament);
        let players: Vec<&str> = rows.iter().map(|r| r.player.as_str()).collect();

        assert_eq!(players, vec!["Anand", "Kasparov"]);
    }

    #[test]
    fn test_empty_tournament_emits_nothing() {
        let mut model = model();
        let tournament = generate_tournament("1999_Empty", 1999, vec![]);

        let rows = model.process_tournament(&tournament);

        assert!(rows.is_empty());
        assert!(model.history_tracker.is_empty());
    }

    #[test]
    fn test_repeat_pairings_build_one_batch() {
        // Twelve draws between the same two players still mean exactly
        // one environment call per player, with a twelve-entry batch.
        let mut model = model();
        let games = (0..12)
            .map(|_| generate_game("Karpov", "Kasparov", GameOutcome::Draw))
            .collect();
        let tournament = generate_tournament("1984_Moscow", 1984, games);

        let rows = model.process_tournament(&tournament);

        let seed = GlickoConfig::default().seed();
        let batch: Vec<(f64, Rating)> = (0..12).map(|_| (0.5, seed.clone())).collect();
        let expected = model.env().rate(&seed, &batch).unwrap();

        let karpov = rows.iter().find(|r| r.player == "Karpov").unwrap();
        assert_eq!(karpov.rating, expected.mu);
        assert_abs_diff_eq!(karpov.rating, 2500.0, epsilon = 1e-9);
        assert_eq!(karpov.rd, expected.phi);
    }

    #[test]
    fn test_custom_seed_configuration() {
        let config = GlickoConfig {
            seed_rating: 1500.0,
            seed_deviation: 350.0,
            seed_volatility: 0.06,
            ..GlickoConfig::default()
        };
        let mut model = GlickoModel::new(config);

        let tournament = generate_tournament(
            "2005_Club",
            2005,
            vec![generate_game("Alice", "Bob", GameOutcome::WhiteWin)]
        );
        let rows = model.process_tournament(&tournament);

        let seed = Rating::new(1500.0, 350.0, 0.06);
        let expected = model.env().rate(&seed, &[(1.0, seed.clone())]).unwrap();
        assert_eq!(rows[0].rating, expected.mu);
        // A wide-deviation seed moves a lot on one game
        assert!(rows[0].rating > 1600.0);
    }
}
