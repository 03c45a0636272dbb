use strum_macros::EnumIter;

/// Outcome of a single game, from white's perspective.
///
/// Numeric Glicko-2 scores exist only at the environment boundary;
/// everywhere else the outcome stays a closed enum so white's and
/// black's scores can never drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum GameOutcome {
    WhiteWin,
    Draw,
    BlackWin
}

impl GameOutcome {
    /// Parses a PGN `Result` tag value. Absent or unrecognized results
    /// count as draws.
    pub fn from_result_tag(tag: &str) -> GameOutcome {
        if tag.contains("1-0") {
            GameOutcome::WhiteWin
        } else if tag.contains("0-1") {
            GameOutcome::BlackWin
        } else {
            GameOutcome::Draw
        }
    }

    pub fn white_score(self) -> f64 {
        match self {
            GameOutcome::WhiteWin => 1.0,
            GameOutcome::Draw => 0.5,
            GameOutcome::BlackWin => 0.0
        }
    }

    pub fn black_score(self) -> f64 {
        match self {
            GameOutcome::WhiteWin => 0.0,
            GameOutcome::Draw => 0.5,
            GameOutcome::BlackWin => 1.0
        }
    }
}
