//! Closed category tables.
//!
//! Declaration order is the encoding: the model and scaler were fit with these
//! exact codes, so reordering a variant silently changes every prediction.
//! `ALL` lists the variants in code order and drives both `code()` lookups in
//! tests and the option lists shown on the form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PipelineError;

/// IPL franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    #[serde(rename = "Chennai Super Kings")]
    ChennaiSuperKings,
    #[serde(rename = "Mumbai Indians")]
    MumbaiIndians,
    #[serde(rename = "Royal Challengers Bangalore")]
    RoyalChallengersBangalore,
    #[serde(rename = "Kolkata Knight Riders")]
    KolkataKnightRiders,
    #[serde(rename = "Rajasthan Royals")]
    RajasthanRoyals,
    #[serde(rename = "Delhi Capitals")]
    DelhiCapitals,
    #[serde(rename = "Sunrisers Hyderabad")]
    SunrisersHyderabad,
    #[serde(rename = "Punjab Kings")]
    PunjabKings,
    #[serde(rename = "Lucknow Super Giants")]
    LucknowSuperGiants,
    #[serde(rename = "Gujarat Titans")]
    GujaratTitans,
}

impl Team {
    pub const ALL: [Team; 10] = [
        Team::ChennaiSuperKings,
        Team::MumbaiIndians,
        Team::RoyalChallengersBangalore,
        Team::KolkataKnightRiders,
        Team::RajasthanRoyals,
        Team::DelhiCapitals,
        Team::SunrisersHyderabad,
        Team::PunjabKings,
        Team::LucknowSuperGiants,
        Team::GujaratTitans,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Team::ChennaiSuperKings => "Chennai Super Kings",
            Team::MumbaiIndians => "Mumbai Indians",
            Team::RoyalChallengersBangalore => "Royal Challengers Bangalore",
            Team::KolkataKnightRiders => "Kolkata Knight Riders",
            Team::RajasthanRoyals => "Rajasthan Royals",
            Team::DelhiCapitals => "Delhi Capitals",
            Team::SunrisersHyderabad => "Sunrisers Hyderabad",
            Team::PunjabKings => "Punjab Kings",
            Team::LucknowSuperGiants => "Lucknow Super Giants",
            Team::GujaratTitans => "Gujarat Titans",
        }
    }
}

/// Home ground of the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    #[serde(rename = "Wankhede Stadium")]
    Wankhede,
    #[serde(rename = "Eden Gardens")]
    EdenGardens,
    #[serde(rename = "M. A. Chidambaram Stadium")]
    Chidambaram,
    #[serde(rename = "Arun Jaitley Stadium")]
    ArunJaitley,
    #[serde(rename = "M. Chinnaswamy Stadium")]
    Chinnaswamy,
}

impl Venue {
    pub const ALL: [Venue; 5] = [
        Venue::Wankhede,
        Venue::EdenGardens,
        Venue::Chidambaram,
        Venue::ArunJaitley,
        Venue::Chinnaswamy,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Venue::Wankhede => "Wankhede Stadium",
            Venue::EdenGardens => "Eden Gardens",
            Venue::Chidambaram => "M. A. Chidambaram Stadium",
            Venue::ArunJaitley => "Arun Jaitley Stadium",
            Venue::Chinnaswamy => "M. Chinnaswamy Stadium",
        }
    }
}

/// How the match was won: by runs defended, wickets in hand, or a super over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinType {
    Runs,
    Wickets,
    SuperOver,
}

impl WinType {
    pub const ALL: [WinType; 3] = [WinType::Runs, WinType::Wickets, WinType::SuperOver];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            WinType::Runs => "runs",
            WinType::Wickets => "wickets",
            WinType::SuperOver => "super_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub const ALL: [TossDecision; 2] = [TossDecision::Bat, TossDecision::Field];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        }
    }
}

fn parse_label<T: Copy>(
    table: &'static str,
    all: &[T],
    label_of: fn(T) -> &'static str,
    s: &str,
) -> Result<T, PipelineError> {
    let wanted = s.trim();
    all.iter()
        .copied()
        .find(|v| label_of(*v) == wanted)
        .ok_or_else(|| PipelineError::UnknownCategory {
            table,
            label: s.to_string(),
        })
}

impl FromStr for Team {
    type Err = PipelineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("team", &Team::ALL, Team::label, s)
    }
}

impl FromStr for Venue {
    type Err = PipelineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("venue", &Venue::ALL, Venue::label, s)
    }
}

impl FromStr for WinType {
    type Err = PipelineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("win type", &WinType::ALL, WinType::label, s)
    }
}

impl FromStr for TossDecision {
    type Err = PipelineError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_label("toss decision", &TossDecision::ALL, TossDecision::label, s)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for WinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for TossDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
