use serde::Serialize;

use crate::types::{City, MatchState, Team};

/// Column order the classifier was fitted on.
pub const FEATURE_COLUMNS: [&str; 9] = [
    "batting_team",
    "bowling_team",
    "city",
    "runs_left",
    "balls_left",
    "wickets",
    "total_runs_x",
    "crr",
    "rrr",
];

pub const CATEGORICAL_COLUMNS: [&str; 3] = ["batting_team", "bowling_team", "city"];
pub const NUMERIC_COLUMNS: [&str; 6] = ["runs_left", "balls_left", "wickets", "total_runs_x", "crr", "rrr"];

/// Numeric features derived from a validated match state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub runs_left: i64,
    pub balls_left: i32,
    pub wickets_remaining: i32,
    pub total_runs_target: u32,
    pub current_run_rate: f64,
    pub required_run_rate: f64,
}

impl FeatureVector {
    /// Derives features. Total on validated input; `required_run_rate` is 0
    /// once no balls remain. No rounding.
    pub fn derive(state: &MatchState) -> Self {
        let runs_left = state.target as i64 - state.score as i64;
        let balls_left = state.overs.balls_left();
        let wickets_remaining = 10 - state.wickets as i32;
        let current_run_rate = state.score as f64 / state.overs.value();
        let required_run_rate = if balls_left > 0 {
            (runs_left * 6) as f64 / balls_left as f64
        } else {
            0.0
        };

        Self {
            runs_left,
            balls_left,
            wickets_remaining,
            total_runs_target: state.target,
            current_run_rate,
            required_run_rate,
        }
    }
}

/// One row in the classifier's input schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInput {
    pub batting_team: Team,
    pub bowling_team: Team,
    pub city: City,
    pub runs_left: f64,
    pub balls_left: f64,
    pub wickets: f64,
    pub total_runs_x: f64,
    pub crr: f64,
    pub rrr: f64,
}

impl ModelInput {
    pub fn new(state: &MatchState, features: &FeatureVector) -> Self {
        Self {
            batting_team: state.batting_team,
            bowling_team: state.bowling_team,
            city: state.city,
            runs_left: features.runs_left as f64,
            balls_left: features.balls_left as f64,
            wickets: features.wickets_remaining as f64,
            total_runs_x: features.total_runs_target as f64,
            crr: features.current_run_rate,
            rrr: features.required_run_rate,
        }
    }

    pub fn categorical(&self, column: &str) -> Option<&'static str> {
        match column {
            "batting_team" => Some(self.batting_team.as_str()),
            "bowling_team" => Some(self.bowling_team.as_str()),
            "city" => Some(self.city.as_str()),
            _ => None,
        }
    }

    pub fn numeric(&self, column: &str) -> Option<f64> {
        match column {
            "runs_left" => Some(self.runs_left),
            "balls_left" => Some(self.balls_left),
            "wickets" => Some(self.wickets),
            "total_runs_x" => Some(self.total_runs_x),
            "crr" => Some(self.crr),
            "rrr" => Some(self.rrr),
            _ => None,
        }
    }

    /// Numeric values in schema order.
    pub fn numerics(&self) -> [f64; 6] {
        [self.runs_left, self.balls_left, self.wickets, self.total_runs_x, self.crr, self.rrr]
    }

    /// Columns holding NaN or infinite values.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        NUMERIC_COLUMNS
            .iter()
            .zip(self.numerics())
            .filter(|(_, v)| !v.is_finite())
            .map(|(name, _)| *name)
            .collect()
    }
}
