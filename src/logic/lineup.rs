//! Lineups: derive the batting order and starter from slot assignments, edit them, or pick them.

use crate::logic::ratings::{batter_overall, pitcher_overall};
use crate::models::{
    LeagueError, LeagueState, Player, PlayerId, Position, TeamId, LINEUP_SIZE,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Batting order (slots 0-8) plus the starting pitcher for one team.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    pub team_id: TeamId,
    pub batters: Vec<PlayerId>,
    pub pitcher: PlayerId,
}

/// Why a team cannot field a lineup. The game is forfeited, not aborted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidLineup {
    /// Fewer than 9 non-pitchers hold distinct slots 0-8.
    NotEnoughBatters { team_id: TeamId, found: usize },
    /// Two players claim the same batting slot.
    SlotConflict { team_id: TeamId, slot: u8 },
    /// No pitcher is flagged as the starter.
    NoPitcher { team_id: TeamId },
}

impl std::fmt::Display for InvalidLineup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidLineup::NotEnoughBatters { found, .. } => {
                write!(f, "Need 9 batters in the lineup (found {})", found)
            }
            InvalidLineup::SlotConflict { slot, .. } => {
                write!(f, "Batting slot {} is assigned twice", slot)
            }
            InvalidLineup::NoPitcher { .. } => write!(f, "No starting pitcher"),
        }
    }
}

/// Read the lineup off the players' slot assignments.
pub fn derive_lineup(state: &LeagueState, team_id: TeamId) -> Result<Lineup, InvalidLineup> {
    let mut slots: [Option<PlayerId>; LINEUP_SIZE] = [None; LINEUP_SIZE];
    for p in state.team_players(team_id).filter(|p| !p.is_pitcher()) {
        let Some(slot) = p.lineup_slot else { continue };
        let Some(entry) = slots.get_mut(slot as usize) else { continue };
        if entry.is_some() {
            return Err(InvalidLineup::SlotConflict { team_id, slot });
        }
        *entry = Some(p.id);
    }

    let batters: Vec<PlayerId> = slots.iter().flatten().copied().collect();
    if batters.len() != LINEUP_SIZE {
        return Err(InvalidLineup::NotEnoughBatters {
            team_id,
            found: batters.len(),
        });
    }

    let pitcher = state
        .team_players(team_id)
        .find(|p| p.is_pitcher() && p.is_starting_pitcher)
        .map(|p| p.id)
        .ok_or(InvalidLineup::NoPitcher { team_id })?;

    Ok(Lineup {
        team_id,
        batters,
        pitcher,
    })
}

/// Set a team's batting order and starter by hand. Everyone else on the team is benched.
pub fn assign_lineup(
    state: &LeagueState,
    team_id: TeamId,
    batting_order: &[PlayerId],
    starting_pitcher: PlayerId,
) -> Result<LeagueState, LeagueError> {
    state.team(team_id)?;
    if batting_order.len() != LINEUP_SIZE {
        return Err(LeagueError::InvalidLineupAssignment(format!(
            "batting order needs {} players (got {})",
            LINEUP_SIZE,
            batting_order.len()
        )));
    }
    for (i, &id) in batting_order.iter().enumerate() {
        let p = on_team(state, team_id, id)?;
        if p.is_pitcher() {
            return Err(LeagueError::InvalidLineupAssignment(format!(
                "{} is a pitcher",
                p.name
            )));
        }
        if batting_order[..i].contains(&id) {
            return Err(LeagueError::InvalidLineupAssignment(format!(
                "{} appears twice",
                p.name
            )));
        }
    }
    let pitcher = on_team(state, team_id, starting_pitcher)?;
    if !pitcher.is_pitcher() {
        return Err(LeagueError::InvalidLineupAssignment(format!(
            "{} is not a pitcher",
            pitcher.name
        )));
    }

    let mut next = state.clone();
    apply_assignment(&mut next, team_id, batting_order, Some(starting_pitcher));
    Ok(next)
}

/// Pick the best hitter at each field position, then the best remaining bat as the ninth,
/// ordered by batter overall; the pitcher with the lowest pitcher overall starts.
pub fn auto_assign_lineup(state: &LeagueState, team_id: TeamId) -> Result<LeagueState, LeagueError> {
    state.team(team_id)?;
    let mut next = state.clone();
    pick_lineup(&mut next, team_id);
    Ok(next)
}

/// In-place lineup pick, shared with league setup. Leaves the team short (and so
/// forfeiting) when the roster cannot supply nine bats or a pitcher.
pub(crate) fn pick_lineup(state: &mut LeagueState, team_id: TeamId) {
    let mut hitters: Vec<&Player> = state.team_players(team_id).filter(|p| !p.is_pitcher()).collect();
    hitters.sort_by(|a, b| by_batter_overall_desc(a, b));

    let mut chosen: Vec<&Player> = Vec::with_capacity(LINEUP_SIZE);
    for position in Position::FIELD {
        if let Some(p) = hitters.iter().copied().find(|p| p.position == position) {
            chosen.push(p);
        }
    }
    for &p in &hitters {
        if chosen.len() >= LINEUP_SIZE {
            break;
        }
        if !chosen.iter().any(|c| c.id == p.id) {
            chosen.push(p);
        }
    }
    chosen.sort_by(|a, b| by_batter_overall_desc(a, b));
    let order: Vec<PlayerId> = chosen.iter().map(|p| p.id).collect();

    let starter = state
        .team_players(team_id)
        .filter(|p| p.is_pitcher())
        .min_by(|a, b| {
            pitcher_overall(&a.ratings)
                .partial_cmp(&pitcher_overall(&b.ratings))
                .unwrap_or(Ordering::Equal)
        })
        .map(|p| p.id);

    apply_assignment(state, team_id, &order, starter);
}

fn by_batter_overall_desc(a: &Player, b: &Player) -> Ordering {
    batter_overall(&b.ratings)
        .partial_cmp(&batter_overall(&a.ratings))
        .unwrap_or(Ordering::Equal)
}

fn on_team(state: &LeagueState, team_id: TeamId, id: PlayerId) -> Result<&Player, LeagueError> {
    let p = state.player(id)?;
    if p.team_id != team_id {
        return Err(LeagueError::PlayerNotOnTeam {
            player_id: id,
            team_id,
        });
    }
    Ok(p)
}

fn clear_assignment(state: &mut LeagueState, team_id: TeamId) {
    for p in state.players.values_mut().filter(|p| p.team_id == team_id) {
        p.lineup_slot = None;
        p.is_starting_pitcher = false;
    }
}

fn apply_assignment(
    state: &mut LeagueState,
    team_id: TeamId,
    batting_order: &[PlayerId],
    starting_pitcher: Option<PlayerId>,
) {
    clear_assignment(state, team_id);
    for (slot, id) in batting_order.iter().enumerate() {
        if let Some(p) = state.players.get_mut(id) {
            p.lineup_slot = Some(slot as u8);
        }
    }
    if let Some(p) = starting_pitcher.and_then(|id| state.players.get_mut(&id)) {
        p.is_starting_pitcher = true;
    }
}
