use serde::{Deserialize, Serialize};

use super::input::MatchInput;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 11;

/// Training-time column names, in the order the model expects them.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "Teams",
    "Venue",
    "Toss_Winner",
    "Toss_Decision",
    "Win_Type",
    "Win_Margin",
    "First_Innings_Score",
    "Second_Innings_Score",
    "Powerplay_Scores",
    "Middle_Overs_Scores",
    "Death_Overs_Scores",
];

/// Fixed-length ordered model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Build the raw feature vector: five category codes followed by the six
/// numeric fields, untouched.
pub fn encode(input: &MatchInput) -> FeatureVector {
    let [margin, first, second, powerplay, middle, death] = input.numeric_values();
    FeatureVector([
        input.team1.code() as f64,
        input.venue.code() as f64,
        input.toss_winner.code() as f64,
        input.toss_decision.code() as f64,
        input.win_type.code() as f64,
        margin as f64,
        first as f64,
        second as f64,
        powerplay as f64,
        middle as f64,
        death as f64,
    ])
}
