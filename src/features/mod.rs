pub mod categories;
pub mod input;
pub mod vector;

pub use categories::{TossDecision, Team, Venue, WinType};
pub use input::{team2_options, toss_winner_options, MatchInput, NUMERIC_BOUNDS};
pub use vector::{encode, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
