//! Data structures for the franchise: players, teams, league state, games.

mod game;
mod league;
mod player;
mod team;

pub use game::{
    BaseOccupant, Bases, FieldingPlay, FieldingPlayKind, GamePhase, GameResult, HalfInning,
    Outcome, PlayEvent, PlayerStatDelta,
};
pub use league::{ChampionRecord, LeagueError, LeagueState, ScheduleEntry};
pub use player::{
    rate, Handedness, Player, PlayerId, Position, Ratings, Stats, LINEUP_SIZE, RATING_MAX,
    RATING_MIN,
};
pub use team::{StandingEntry, Team, TeamId};
