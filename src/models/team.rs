//! Team and standings entries.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team.
pub type TeamId = Uuid;

/// A franchise team. `wins`/`losses` mirror the team's standings entry.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub roster: Vec<PlayerId>,
    pub wins: u32,
    pub losses: u32,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            roster: Vec::new(),
            wins: 0,
            losses: 0,
        }
    }
}

/// Regular-season record for one team.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingEntry {
    pub team_id: TeamId,
    pub wins: u32,
    pub losses: u32,
}

impl StandingEntry {
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            wins: 0,
            losses: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn team_and_standing_use_camel_case_ids() {
        let team = serde_json::to_value(Team::new(Uuid::from_u128(2), "Harbor Herons")).unwrap();
        assert!(team.get("roster").is_some());
        let entry = serde_json::to_value(StandingEntry::new(Uuid::from_u128(2))).unwrap();
        assert!(entry.get("teamId").is_some());
    }
}
