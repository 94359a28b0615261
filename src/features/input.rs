use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use super::categories::{TossDecision, Team, Venue, WinType};
use crate::error::PipelineError;

/// One match as described on the form. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInput {
    pub team1: Team,
    pub team2: Team,
    pub venue: Venue,
    pub toss_winner: Team,
    pub toss_decision: TossDecision,
    pub win_type: WinType,
    /// Runs or wickets, depending on `win_type`
    pub win_margin: u32,
    pub first_innings_score: u32,
    pub second_innings_score: u32,
    pub powerplay_score: u32,
    pub middle_overs_score: u32,
    pub death_overs_score: u32,
}

/// Accepted range and form default of a numeric field.
#[derive(Debug, Clone)]
pub struct NumericBound {
    pub name: &'static str,
    pub range: RangeInclusive<u32>,
    pub default: u32,
}

/// Numeric fields in feature order.
pub const NUMERIC_BOUNDS: [NumericBound; 6] = [
    NumericBound { name: "win_margin", range: 0..=200, default: 20 },
    NumericBound { name: "first_innings_score", range: 50..=300, default: 160 },
    NumericBound { name: "second_innings_score", range: 50..=300, default: 150 },
    NumericBound { name: "powerplay_score", range: 0..=100, default: 50 },
    NumericBound { name: "middle_overs_score", range: 0..=120, default: 70 },
    NumericBound { name: "death_overs_score", range: 0..=80, default: 40 },
];

impl MatchInput {
    /// What the form shows before the user touches anything.
    pub fn form_default() -> Self {
        let [margin, first, second, powerplay, middle, death] =
            NUMERIC_BOUNDS.map(|b| b.default);
        MatchInput {
            team1: Team::ALL[0],
            team2: Team::ALL[1],
            venue: Venue::ALL[0],
            toss_winner: Team::ALL[0],
            toss_decision: TossDecision::Bat,
            win_type: WinType::ALL[0],
            win_margin: margin,
            first_innings_score: first,
            second_innings_score: second,
            powerplay_score: powerplay,
            middle_overs_score: middle,
            death_overs_score: death,
        }
    }

    pub fn numeric_values(&self) -> [u32; 6] {
        [
            self.win_margin,
            self.first_innings_score,
            self.second_innings_score,
            self.powerplay_score,
            self.middle_overs_score,
            self.death_overs_score,
        ]
    }

    /// Constraints the form enforces before anything reaches the pipeline.
    pub fn check_constraints(&self) -> Result<(), PipelineError> {
        if self.team1 == self.team2 {
            return Err(PipelineError::InvalidInput(format!(
                "team2 must differ from team1 ({})",
                self.team1
            )));
        }
        if self.toss_winner != self.team1 && self.toss_winner != self.team2 {
            return Err(PipelineError::InvalidInput(format!(
                "toss winner {} is not playing in {} vs {}",
                self.toss_winner, self.team1, self.team2
            )));
        }
        for (bound, value) in NUMERIC_BOUNDS.iter().zip(self.numeric_values()) {
            if !bound.range.contains(&value) {
                return Err(PipelineError::InvalidInput(format!(
                    "{} must be between {} and {}, got {}",
                    bound.name,
                    bound.range.start(),
                    bound.range.end(),
                    value
                )));
            }
        }
        Ok(())
    }
}

/// Teams selectable as team2 once team1 is chosen.
pub fn team2_options(team1: Team) -> Vec<Team> {
    Team::ALL.iter().copied().filter(|t| *t != team1).collect()
}

/// Teams selectable as toss winner: only the two playing sides.
pub fn toss_winner_options(team1: Team, team2: Team) -> [Team; 2] {
    [team1, team2]
}

#[cfg(test)]
pub(crate) fn sample_input() -> MatchInput {
    MatchInput {
        team1: Team::MumbaiIndians,
        team2: Team::ChennaiSuperKings,
        venue: Venue::EdenGardens,
        toss_winner: Team::MumbaiIndians,
        toss_decision: TossDecision::Bat,
        win_type: WinType::Runs,
        win_margin: 20,
        first_innings_score: 160,
        second_innings_score: 150,
        powerplay_score: 50,
        middle_overs_score: 70,
        death_overs_score: 40,
    }
}
