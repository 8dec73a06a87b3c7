//! CSV export of season stats.

use crate::models::{LeagueState, Player};
use serde::Serialize;

#[derive(Serialize)]
struct StatRow<'a> {
    team: &'a str,
    player: &'a str,
    position: &'static str,
    age: u32,
    at_bats: u32,
    hits: u32,
    home_runs: u32,
    walks: u32,
    strikeouts: u32,
    runs: u32,
    rbis: u32,
    batting_average: String,
    innings_pitched: u32,
    strikeouts_allowed: u32,
    walks_allowed: u32,
    hits_allowed: u32,
    home_runs_allowed: u32,
    saves: u32,
    batting_average_against: String,
    errors: u32,
    exceptional_plays: u32,
    bases_robbed: u32,
}

impl<'a> StatRow<'a> {
    fn new(team: &'a str, p: &'a Player) -> Self {
        let s = &p.stats;
        Self {
            team,
            player: &p.name,
            position: p.position.abbreviation(),
            age: p.age,
            at_bats: s.at_bats,
            hits: s.hits,
            home_runs: s.home_runs,
            walks: s.walks,
            strikeouts: s.strikeouts,
            runs: s.runs,
            rbis: s.rbis,
            batting_average: format!("{:.3}", s.batting_average),
            innings_pitched: s.innings_pitched,
            strikeouts_allowed: s.strikeouts_allowed,
            walks_allowed: s.walks_allowed,
            hits_allowed: s.hits_allowed,
            home_runs_allowed: s.home_runs_allowed,
            saves: s.saves,
            batting_average_against: format!("{:.3}", s.batting_average_against),
            errors: s.errors,
            exceptional_plays: s.exceptional_plays,
            bases_robbed: s.bases_robbed,
        }
    }
}

/// One row per player, grouped by team, with a header line.
pub fn player_stats_csv(state: &LeagueState) -> Result<String, csv::Error> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for team in state.teams.values() {
        let mut players: Vec<&Player> = state.team_players(team.id).collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        for p in players {
            wtr.serialize(StatRow::new(&team.name, p))?;
        }
    }
    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
