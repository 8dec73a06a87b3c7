//! Plate-appearance outcomes, base occupancy, play events and game results.

use crate::models::league::ScheduleEntry;
use crate::models::player::{PlayerId, Stats};
use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};

/// Result of one plate appearance.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Strikeout,
    Walk,
    Single,
    Double,
    Triple,
    HomeRun,
    Out,
}

impl Outcome {
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            Outcome::Single | Outcome::Double | Outcome::Triple | Outcome::HomeRun
        )
    }

    /// Counts toward at-bats (everything but a walk).
    pub fn is_at_bat(self) -> bool {
        self != Outcome::Walk
    }

    pub fn records_out(self) -> bool {
        matches!(self, Outcome::Strikeout | Outcome::Out)
    }

    /// One level better for the batter after a fielding error.
    /// An out becomes a single; a home run cannot improve.
    pub fn upgraded(self) -> Self {
        match self {
            Outcome::Out => Outcome::Single,
            Outcome::Single => Outcome::Double,
            Outcome::Double => Outcome::Triple,
            Outcome::Triple | Outcome::HomeRun => Outcome::HomeRun,
            other => other,
        }
    }

    /// One level worse for the batter after an exceptional play.
    pub fn downgraded(self) -> Self {
        match self {
            Outcome::HomeRun => Outcome::Triple,
            Outcome::Triple => Outcome::Double,
            Outcome::Double => Outcome::Single,
            Outcome::Single | Outcome::Out => Outcome::Out,
            other => other,
        }
    }
}

/// What stands on a base.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "playerId")]
pub enum BaseOccupant {
    #[default]
    Empty,
    Runner(PlayerId),
    /// Extra-inning runner placed on second; scores runs but belongs to no player.
    GhostRunner,
}

impl BaseOccupant {
    pub fn is_occupied(self) -> bool {
        self != BaseOccupant::Empty
    }

    pub fn player_id(self) -> Option<PlayerId> {
        match self {
            BaseOccupant::Runner(id) => Some(id),
            _ => None,
        }
    }
}

/// First, second and third base for the current half-inning.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bases {
    pub first: BaseOccupant,
    pub second: BaseOccupant,
    pub third: BaseOccupant,
}

impl Bases {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start of an extra inning in the regular season.
    pub fn with_ghost_runner() -> Self {
        Self {
            second: BaseOccupant::GhostRunner,
            ..Self::default()
        }
    }

    pub fn any_occupied(&self) -> bool {
        self.first.is_occupied() || self.second.is_occupied() || self.third.is_occupied()
    }

    pub fn slots(&self) -> [BaseOccupant; 3] {
        [self.first, self.second, self.third]
    }

    /// True when no real player stands on two bases at once.
    pub fn has_distinct_runners(&self) -> bool {
        let ids: Vec<PlayerId> = self.slots().iter().filter_map(|o| o.player_id()).collect();
        ids.iter()
            .enumerate()
            .all(|(i, id)| !ids[i + 1..].contains(id))
    }

    /// Every runner moves up one base (wild throw). Returns who crossed the plate.
    pub fn advance_all(&mut self) -> Vec<BaseOccupant> {
        let mut scored = Vec::new();
        push_if_occupied(&mut scored, std::mem::take(&mut self.third));
        self.third = std::mem::take(&mut self.second);
        self.second = std::mem::take(&mut self.first);
        scored
    }

    /// Move runners for `outcome` with `batter` at the plate. Returns who crossed the plate,
    /// batter included on a home run. Outs and strikeouts leave the bases alone.
    pub fn apply_outcome(&mut self, outcome: Outcome, batter: PlayerId) -> Vec<BaseOccupant> {
        let batter = BaseOccupant::Runner(batter);
        let mut scored = Vec::new();
        match outcome {
            Outcome::Strikeout | Outcome::Out => {}
            Outcome::Walk => {
                if self.first.is_occupied() {
                    if self.second.is_occupied() {
                        if self.third.is_occupied() {
                            push_if_occupied(&mut scored, self.third);
                        }
                        self.third = self.second;
                    }
                    self.second = self.first;
                }
                self.first = batter;
            }
            Outcome::Single => {
                push_if_occupied(&mut scored, std::mem::take(&mut self.third));
                self.third = std::mem::take(&mut self.second);
                self.second = std::mem::take(&mut self.first);
                self.first = batter;
            }
            Outcome::Double => {
                push_if_occupied(&mut scored, std::mem::take(&mut self.third));
                push_if_occupied(&mut scored, std::mem::take(&mut self.second));
                self.third = std::mem::take(&mut self.first);
                self.second = batter;
            }
            Outcome::Triple => {
                for slot in [&mut self.third, &mut self.second, &mut self.first] {
                    push_if_occupied(&mut scored, std::mem::take(slot));
                }
                self.third = batter;
            }
            Outcome::HomeRun => {
                for slot in [&mut self.third, &mut self.second, &mut self.first] {
                    push_if_occupied(&mut scored, std::mem::take(slot));
                }
                scored.push(batter);
            }
        }
        scored
    }
}

fn push_if_occupied(scored: &mut Vec<BaseOccupant>, occupant: BaseOccupant) {
    if occupant.is_occupied() {
        scored.push(occupant);
    }
}

/// Which half of the inning is being played.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfInning {
    Top,
    Bottom,
}

/// Game state machine states.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    TopBatting,
    BottomBatting,
    InningAdvance,
    GameOver,
}

/// How a fielder was involved in a batted ball.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldingPlayKind {
    Routine,
    Error,
    ExceptionalPlay,
    HomeRunRobbed,
    /// Tried to rob a home run and missed.
    RobberyMissed,
}

/// Fielder credit for one play.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldingPlay {
    pub fielder_id: PlayerId,
    pub kind: FieldingPlayKind,
}

/// Per-player counters produced by one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatDelta {
    pub player_id: PlayerId,
    pub delta: Stats,
}

/// What happened in one plate appearance (for animated presentation).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    pub inning: u32,
    pub half: HalfInning,
    pub batter_id: PlayerId,
    pub pitcher_id: PlayerId,
    /// Wild throws before the pitch was put in play.
    pub wild_throws: u32,
    pub outcome: Outcome,
    /// Batted-ball angle in degrees (0 = third-base line), `None` for strikeouts and walks.
    pub angle: Option<f64>,
    pub fielding: Option<FieldingPlay>,
    pub runs_scored: u32,
    /// Outs after the play, before any half-inning reset.
    pub outs: u8,
    /// Bases after the play, before any half-inning reset.
    pub bases: Bases,
    pub home_score: u32,
    pub away_score: u32,
    pub half_inning_ended: bool,
    pub game_ended: bool,
}

/// Final result of one game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub fixture: ScheduleEntry,
    pub winner: TeamId,
    pub loser: TeamId,
    pub home_score: u32,
    pub away_score: u32,
    pub innings: u32,
    pub forfeit: bool,
    pub player_stat_deltas: Vec<PlayerStatDelta>,
}

impl GameResult {
    /// Nominal 1-0 home win with no stats, used when a lineup is invalid.
    pub fn forfeit(fixture: ScheduleEntry) -> Self {
        Self {
            fixture,
            winner: fixture.home_team_id,
            loser: fixture.away_team_id,
            home_score: 1,
            away_score: 0,
            innings: 0,
            forfeit: true,
            player_stat_deltas: Vec::new(),
        }
    }
}
