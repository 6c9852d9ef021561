use serde::{Deserialize, Serialize};
use std::fmt;

/// Balls in one over.
pub const BALLS_PER_OVER: u32 = 6;
/// Overs in a T20 innings.
pub const MAX_OVERS: f64 = 20.0;
/// Balls in a full T20 innings.
pub const INNINGS_BALLS: i32 = 120;

/// Overs completed, as entered on the scorecard.
///
/// The digit after the point counts balls within the over (4.3 reads as
/// "4 overs, 3 balls"), but the model was fitted on `floor(overs * 6)`, so
/// `to_balls` keeps that exact conversion rather than reading the notation.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overs(f64);

impl Overs {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Balls bowled as the model counts them: `floor(overs * 6)`.
    pub fn to_balls(self) -> i32 {
        (self.0 * BALLS_PER_OVER as f64).floor() as i32
    }

    /// Balls remaining in the innings. Not clamped; may be zero or negative.
    pub fn balls_left(self) -> i32 {
        INNINGS_BALLS - self.to_balls()
    }

    pub fn is_in_range(self) -> bool {
        (0.0..=MAX_OVERS).contains(&self.0)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl fmt::Display for Overs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
