use thiserror::Error;

use crate::model::constants::{
    BASE_DEVIATION, BASE_RATING, BASE_VOLATILITY, CONVERGENCE_TOLERANCE, DEFAULT_TAU, GLICKO_SCALE, MAX_ITERATIONS
};

#[derive(Debug, Error)]
pub enum RatingError {
    #[error("Invalid score {0}: expected 0.0, 0.5 or 1.0")]
    InvalidScore(f64),

    #[error("Volatility iteration failed to converge after {0} iterations")]
    FailedConvergence(u32)
}

/// A player's belief state at a point in time: rating (`mu`),
/// rating deviation (`phi`) and volatility (`sigma`).
///
/// Values are immutable once created. Updates always produce a new
/// `Rating` via [`Glicko2::rate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    pub mu: f64,
    pub phi: f64,
    pub sigma: f64
}

impl Rating {
    pub fn new(mu: f64, phi: f64, sigma: f64) -> Rating {
        Rating { mu, phi, sigma }
    }
}

/// Stateless Glicko-2 environment.
///
/// Parameterized with the base scale (rating/deviation anchoring the
/// internal scale conversion) and the system constant `tau`. The same
/// instance is reused for every computation in a run; `rate` is purely
/// functional and bit-for-bit deterministic.
#[derive(Debug, Clone)]
pub struct Glicko2 {
    base_rating: f64,
    base_deviation: f64,
    tau: f64
}

impl Default for Glicko2 {
    fn default() -> Self {
        Glicko2::new(BASE_RATING, BASE_DEVIATION, DEFAULT_TAU)
    }
}

impl Glicko2 {
    pub fn new(base_rating: f64, base_deviation: f64, tau: f64) -> Glicko2 {
        Glicko2 {
            base_rating,
            base_deviation,
            tau
        }
    }

    /// A rating at the base scale, the conventional starting point for
    /// players outside any seeding policy.
    pub fn default_rating(&self) -> Rating {
        Rating::new(self.base_rating, self.base_deviation, BASE_VOLATILITY)
    }

    /// Applies one rating-period update to `rating` given a batch of
    /// `(score, opponent)` results.
    ///
    /// Scores must be exactly 0.0, 0.5 or 1.0. An empty batch models an
    /// inactive period: `phi` grows by the standard inactivity step
    /// `sqrt(phi^2 + sigma^2)`, capped at the base deviation ceiling,
    /// while `mu` and `sigma` are unchanged.
    ///
    /// The volatility step solves Glickman's convergence equation with
    /// the Illinois variant of regula falsi, bounded by
    /// `CONVERGENCE_TOLERANCE` and `MAX_ITERATIONS`.
    pub fn rate(&self, rating: &Rating, results: &[(f64, Rating)]) -> Result<Rating, RatingError> {
        for (score, _) in results {
            if *score != 0.0 && *score != 0.5 && *score != 1.0 {
                return Err(RatingError::InvalidScore(*score));
            }
        }

        let mu = self.to_internal_mu(rating.mu);
        let phi = rating.phi / GLICKO_SCALE;

        if results.is_empty() {
            let phi_star = (phi.powi(2) + rating.sigma.powi(2)).sqrt();
            return Ok(Rating::new(
                rating.mu,
                (phi_star * GLICKO_SCALE).min(self.base_deviation),
                rating.sigma
            ));
        }

        // Estimated variance of the rating based on game outcomes (step 3)
        // and the estimated improvement delta (step 4)
        let mut v_inv = 0.0;
        let mut delta_sum = 0.0;
        for (score, opponent) in results {
            let opp_mu = self.to_internal_mu(opponent.mu);
            let opp_phi = opponent.phi / GLICKO_SCALE;

            let g = Self::g(opp_phi);
            let e = Self::expectation(mu, opp_mu, opp_phi);

            v_inv += g.powi(2) * e * (1.0 - e);
            delta_sum += g * (score - e);
        }
        let v = 1.0 / v_inv;
        let delta = v * delta_sum;

        let sigma_prime = self.solve_volatility(phi, v, delta, rating.sigma)?;

        let phi_star = (phi.powi(2) + sigma_prime.powi(2)).sqrt();
        let phi_prime = 1.0 / (1.0 / phi_star.powi(2) + 1.0 / v).sqrt();
        let mu_prime = mu + phi_prime.powi(2) * delta_sum;

        Ok(Rating::new(
            self.base_rating + mu_prime * GLICKO_SCALE,
            phi_prime * GLICKO_SCALE,
            sigma_prime
        ))
    }

    /// Probability of `first` beating `second`, on the external scale.
    pub fn expected_score(&self, first: &Rating, second: &Rating) -> f64 {
        let mu = self.to_internal_mu(first.mu);
        let opp_mu = self.to_internal_mu(second.mu);
        let opp_phi = second.phi / GLICKO_SCALE;

        Self::expectation(mu, opp_mu, opp_phi)
    }

    fn to_internal_mu(&self, mu: f64) -> f64 {
        (mu - self.base_rating) / GLICKO_SCALE
    }

    fn g(phi: f64) -> f64 {
        1.0 / (1.0 + 3.0 * phi.powi(2) / std::f64::consts::PI.powi(2)).sqrt()
    }

    fn expectation(mu: f64, opp_mu: f64, opp_phi: f64) -> f64 {
        1.0 / (1.0 + (-Self::g(opp_phi) * (mu - opp_mu)).exp())
    }

    /// Glickman step 5: iterative solve for the new volatility.
    fn solve_volatility(&self, phi: f64, v: f64, delta: f64, sigma: f64) -> Result<f64, RatingError> {
        let a = sigma.powi(2).ln();
        let tau_sq = self.tau.powi(2);
        let phi_sq = phi.powi(2);
        let delta_sq = delta.powi(2);

        let f = |x: f64| {
            let e_x = x.exp();
            e_x * (delta_sq - phi_sq - v - e_x) / (2.0 * (phi_sq + v + e_x).powi(2)) - (x - a) / tau_sq
        };

        let mut lower = a;
        let mut upper = if delta_sq > phi_sq + v {
            (delta_sq - phi_sq - v).ln()
        } else {
            let mut k = 1.0;
            let mut probes = 0;
            while f(a - k * self.tau) < 0.0 {
                k += 1.0;
                probes += 1;
                if probes >= MAX_ITERATIONS {
                    return Err(RatingError::FailedConvergence(probes));
                }
            }
            a - k * self.tau
        };

        let mut f_lower = f(lower);
        let mut f_upper = f(upper);

        let mut iterations = 0;
        while (upper - lower).abs() > CONVERGENCE_TOLERANCE {
            if iterations >= MAX_ITERATIONS {
                return Err(RatingError::FailedConvergence(iterations));
            }

            let midpoint = lower + (lower - upper) * f_lower / (f_upper - f_lower);
            let f_midpoint = f(midpoint);

            if f_midpoint * f_upper <= 0.0 {
                lower = upper;
                f_lower = f_upper;
            } else {
                f_lower /= 2.0;
            }
            upper = midpoint;
            f_upper = f_midpoint;

            iterations += 1;
        }

        Ok((lower / 2.0).exp())
    }
}
