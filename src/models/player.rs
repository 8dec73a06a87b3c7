//! Player, Ratings and Stats data structures.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a player (used in lineups, bases and stat deltas).
pub type PlayerId = Uuid;

/// Lowest value any rating can take. Non-applicable attributes sit here.
pub const RATING_MIN: u8 = 30;
/// Highest value any rating can take.
pub const RATING_MAX: u8 = 99;

/// Number of batting slots in a lineup.
pub const LINEUP_SIZE: usize = 9;

/// Primary fielding position.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
}

impl Position {
    /// The eight non-pitcher positions, in scorebook order.
    pub const FIELD: [Position; 8] = [
        Position::Catcher,
        Position::FirstBase,
        Position::SecondBase,
        Position::ThirdBase,
        Position::Shortstop,
        Position::LeftField,
        Position::CenterField,
        Position::RightField,
    ];

    pub fn is_pitcher(self) -> bool {
        self == Position::Pitcher
    }

    pub fn is_outfield(self) -> bool {
        matches!(
            self,
            Position::LeftField | Position::CenterField | Position::RightField
        )
    }

    /// Short scorebook label (P, C, 1B, ...).
    pub fn abbreviation(self) -> &'static str {
        match self {
            Position::Pitcher => "P",
            Position::Catcher => "C",
            Position::FirstBase => "1B",
            Position::SecondBase => "2B",
            Position::ThirdBase => "3B",
            Position::Shortstop => "SS",
            Position::LeftField => "LF",
            Position::CenterField => "CF",
            Position::RightField => "RF",
        }
    }
}

/// Throwing/batting side. Pitchers are never `Switch`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    #[default]
    Right,
    Left,
    Switch,
}

impl Handedness {
    /// The other throwing side (`Switch` maps to itself).
    pub fn opposite(self) -> Self {
        match self {
            Handedness::Right => Handedness::Left,
            Handedness::Left => Handedness::Right,
            Handedness::Switch => Handedness::Switch,
        }
    }
}

/// Attribute set on the 30-99 scale.
///
/// Pitchers carry `accuracy`/`heat`/`movement`, batters carry `contact`/`power`/`eye`;
/// the other role's three attributes stay at [`RATING_MIN`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ratings {
    pub potential: u8,
    pub injury: u8,
    pub accuracy: u8,
    pub heat: u8,
    pub movement: u8,
    pub contact: u8,
    pub power: u8,
    pub eye: u8,
    pub speed: u8,
    pub fielding: u8,
    pub handedness: Handedness,
}

impl Default for Ratings {
    fn default() -> Self {
        Self {
            potential: RATING_MIN,
            injury: RATING_MIN,
            accuracy: RATING_MIN,
            heat: RATING_MIN,
            movement: RATING_MIN,
            contact: RATING_MIN,
            power: RATING_MIN,
            eye: RATING_MIN,
            speed: RATING_MIN,
            fielding: RATING_MIN,
            handedness: Handedness::Right,
        }
    }
}

impl Ratings {
    /// All ten numeric attributes, for bound checks.
    pub fn values(&self) -> [u8; 10] {
        [
            self.potential,
            self.injury,
            self.accuracy,
            self.heat,
            self.movement,
            self.contact,
            self.power,
            self.eye,
            self.speed,
            self.fielding,
        ]
    }
}

/// Per-season counters. Also used as a per-game delta (rates are left at zero there).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    // Batting
    pub at_bats: u32,
    pub hits: u32,
    pub home_runs: u32,
    pub walks: u32,
    pub strikeouts: u32,
    pub runs: u32,
    pub rbis: u32,
    // Pitching
    pub at_bats_faced: u32,
    pub strikeouts_allowed: u32,
    pub walks_allowed: u32,
    pub hits_allowed: u32,
    pub home_runs_allowed: u32,
    pub innings_pitched: u32,
    pub saves: u32,
    // Fielding
    pub errors: u32,
    pub exceptional_plays: u32,
    pub plays_attempted: u32,
    pub bases_robbed: u32,
    // Derived
    pub batting_average: f64,
    pub batting_average_against: f64,
}

impl Stats {
    /// Add every counter of `delta` and recompute the derived rates.
    pub fn absorb(&mut self, delta: &Stats) {
        self.at_bats += delta.at_bats;
        self.hits += delta.hits;
        self.home_runs += delta.home_runs;
        self.walks += delta.walks;
        self.strikeouts += delta.strikeouts;
        self.runs += delta.runs;
        self.rbis += delta.rbis;
        self.at_bats_faced += delta.at_bats_faced;
        self.strikeouts_allowed += delta.strikeouts_allowed;
        self.walks_allowed += delta.walks_allowed;
        self.hits_allowed += delta.hits_allowed;
        self.home_runs_allowed += delta.home_runs_allowed;
        self.innings_pitched += delta.innings_pitched;
        self.saves += delta.saves;
        self.errors += delta.errors;
        self.exceptional_plays += delta.exceptional_plays;
        self.plays_attempted += delta.plays_attempted;
        self.bases_robbed += delta.bases_robbed;
        self.recompute_rates();
    }

    pub fn recompute_rates(&mut self) {
        self.batting_average = rate(self.hits, self.at_bats);
        self.batting_average_against = rate(self.hits_allowed, self.at_bats_faced);
    }
}

/// `numerator / denominator`, or 0 when nothing has been recorded.
pub fn rate(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator)
    }
}

/// A player in the franchise. Players are never removed, only mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub age: u32,
    pub team_id: TeamId,
    pub position: Position,
    pub ratings: Ratings,
    pub stats: Stats,
    /// Batting order slot 0-8, `None` when on the bench.
    pub lineup_slot: Option<u8>,
    pub is_starting_pitcher: bool,
}

impl Player {
    /// Create a bench player with zeroed stats.
    pub fn new(
        id: PlayerId,
        name: impl Into<String>,
        age: u32,
        team_id: TeamId,
        position: Position,
        ratings: Ratings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            team_id,
            position,
            ratings,
            stats: Stats::default(),
            lineup_slot: None,
            is_starting_pitcher: false,
        }
    }

    pub fn is_pitcher(&self) -> bool {
        self.position.is_pitcher()
    }
}
