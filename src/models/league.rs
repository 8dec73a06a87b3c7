//! LeagueState (the persisted franchise document), schedule entries and errors.

use crate::models::player::{Player, PlayerId};
use crate::models::team::{StandingEntry, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Errors that can occur during league operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LeagueError {
    /// Schedules and seasons need at least two teams.
    NotEnoughTeams { found: usize },
    /// Team id is not part of this league.
    TeamNotFound(TeamId),
    /// Player id is not part of this league.
    PlayerNotFound(PlayerId),
    /// Player exists but is not on the team being edited.
    PlayerNotOnTeam { player_id: PlayerId, team_id: TeamId },
    /// A lineup assignment is malformed (duplicate batter, pitcher batting, ...).
    InvalidLineupAssignment(String),
    /// A plate appearance was requested on a finished game.
    GameAlreadyOver,
    /// A final result was requested before the last out.
    GameInProgress,
    /// A result was offered for a game that is not the league's next fixture.
    UnexpectedFixture,
    /// No fixture left to play (season finished but not rolled over).
    NoFixtureRemaining,
}

impl std::fmt::Display for LeagueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeagueError::NotEnoughTeams { found } => {
                write!(f, "Need at least 2 teams (found {})", found)
            }
            LeagueError::TeamNotFound(_) => write!(f, "Team not found"),
            LeagueError::PlayerNotFound(_) => write!(f, "Player not found"),
            LeagueError::PlayerNotOnTeam { .. } => write!(f, "Player is not on this team"),
            LeagueError::InvalidLineupAssignment(reason) => {
                write!(f, "Invalid lineup: {}", reason)
            }
            LeagueError::GameAlreadyOver => write!(f, "Game is already over"),
            LeagueError::GameInProgress => write!(f, "Game is still in progress"),
            LeagueError::UnexpectedFixture => {
                write!(f, "Result does not match the next scheduled game")
            }
            LeagueError::NoFixtureRemaining => write!(f, "No game left to play"),
        }
    }
}

impl std::error::Error for LeagueError {}

/// One scheduled game.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl ScheduleEntry {
    pub fn new(home_team_id: TeamId, away_team_id: TeamId) -> Self {
        Self {
            home_team_id,
            away_team_id,
        }
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

/// A past season's champion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionRecord {
    pub year: u32,
    pub team_id: TeamId,
}

/// The whole franchise: one document per league.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueState {
    pub year: u32,
    pub players: BTreeMap<PlayerId, Player>,
    pub teams: BTreeMap<TeamId, Team>,
    pub schedule: Vec<ScheduleEntry>,
    /// Regular-season games completed (index of the next fixture).
    pub game_index: usize,
    pub standings: Vec<StandingEntry>,
    pub is_postseason: bool,
    /// Best-of-3 fixtures; empty outside the postseason.
    pub postseason_series: Vec<ScheduleEntry>,
    /// Series wins per postseason team.
    pub postseason_series_scores: BTreeMap<TeamId, u32>,
    /// Series games played so far.
    pub postseason_game_index: usize,
    pub championship_winner_id: Option<TeamId>,
    #[serde(default)]
    pub past_champions: Vec<ChampionRecord>,
}

impl LeagueState {
    /// Empty league for `year` with no teams.
    pub fn new(year: u32) -> Self {
        Self {
            year,
            players: BTreeMap::new(),
            teams: BTreeMap::new(),
            schedule: Vec::new(),
            game_index: 0,
            standings: Vec::new(),
            is_postseason: false,
            postseason_series: Vec::new(),
            postseason_series_scores: BTreeMap::new(),
            postseason_game_index: 0,
            championship_winner_id: None,
            past_champions: Vec::new(),
        }
    }

    pub fn team_ids(&self) -> Vec<TeamId> {
        self.teams.keys().copied().collect()
    }

    pub fn team(&self, id: TeamId) -> Result<&Team, LeagueError> {
        self.teams.get(&id).ok_or(LeagueError::TeamNotFound(id))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, LeagueError> {
        self.players.get(&id).ok_or(LeagueError::PlayerNotFound(id))
    }

    /// Players whose team reference points at `team_id`, in id order.
    pub fn team_players(&self, team_id: TeamId) -> impl Iterator<Item = &Player> {
        self.players.values().filter(move |p| p.team_id == team_id)
    }

    pub fn standing_mut(&mut self, team_id: TeamId) -> Option<&mut StandingEntry> {
        self.standings.iter_mut().find(|s| s.team_id == team_id)
    }

    /// True once every regular-season fixture has been played.
    pub fn regular_season_complete(&self) -> bool {
        self.game_index >= self.schedule.len()
    }
}
