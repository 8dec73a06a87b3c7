//! League setup: teams, generated rosters, starting lineups and the first schedule.

use crate::logic::lineup::pick_lineup;
use crate::logic::ratings::generate_ratings;
use crate::logic::schedule::generate_schedule;
use crate::models::{LeagueError, LeagueState, Player, Position, StandingEntry, Team};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::{Builder, Uuid};

const DEFAULT_TEAM_NAMES: [&str; 6] = [
    "Harbor Herons",
    "Granite Goats",
    "Prairie Owls",
    "Canyon Comets",
    "Riverside Rails",
    "Summit Foxes",
];

const FIRST_NAMES: [&str; 16] = [
    "Abe", "Bo", "Cal", "Dez", "Eli", "Finn", "Gus", "Hank", "Ike", "Jed", "Kit", "Lou", "Mo",
    "Ned", "Ozzie", "Pete",
];

const LAST_NAMES: [&str; 16] = [
    "Alvarez", "Brooks", "Castillo", "Dunn", "Ellis", "Fowler", "Garza", "Hayes", "Ibarra",
    "Jensen", "Kowalski", "Lopez", "Marsh", "Nakamura", "Ortiz", "Pryor",
];

/// Position players beyond the eight starters.
const BENCH_BATTERS: usize = 4;
const PITCHERS_PER_TEAM: usize = 5;
const MIN_START_AGE: u32 = 1;
const MAX_START_AGE: u32 = 6;

/// Options for a new franchise.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    #[serde(default = "default_team_names")]
    pub team_names: Vec<String>,
}

fn default_team_names() -> Vec<String> {
    DEFAULT_TEAM_NAMES.iter().map(|s| s.to_string()).collect()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            team_names: default_team_names(),
        }
    }
}

impl LeagueConfig {
    /// The first `count` default names, numbered past the list's end.
    pub fn with_team_count(count: usize) -> Self {
        let team_names = (0..count)
            .map(|i| match DEFAULT_TEAM_NAMES.get(i) {
                Some(name) => name.to_string(),
                None => format!("Team {}", i + 1),
            })
            .collect();
        Self { team_names }
    }
}

/// Id drawn from the simulation's random source, so seeded leagues are reproducible.
pub(crate) fn new_id<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    Builder::from_random_bytes(rng.gen()).into_uuid()
}

fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Sam");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    format!("{} {}", first, last)
}

fn generate_player<R: Rng + ?Sized>(team: &mut Team, position: Position, rng: &mut R) -> Player {
    let id = new_id(rng);
    let ratings = generate_ratings(position.is_pitcher(), rng);
    let age = rng.gen_range(MIN_START_AGE..=MAX_START_AGE);
    team.roster.push(id);
    Player::new(id, random_name(rng), age, team.id, position, ratings)
}

/// Create year 1 of a franchise: every team gets a starter at each field position,
/// a bench and a pitching staff, an automatic lineup, and a shuffled schedule.
pub fn new_league<R: Rng + ?Sized>(config: &LeagueConfig, rng: &mut R) -> Result<LeagueState, LeagueError> {
    let names: Vec<&str> = config
        .team_names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.len() < 2 {
        return Err(LeagueError::NotEnoughTeams { found: names.len() });
    }

    let mut state = LeagueState::new(1);
    for name in names {
        let mut team = Team::new(new_id(rng), name);
        let mut positions: Vec<Position> = Position::FIELD.to_vec();
        for _ in 0..BENCH_BATTERS {
            if let Some(&pos) = Position::FIELD.choose(rng) {
                positions.push(pos);
            }
        }
        positions.extend(std::iter::repeat(Position::Pitcher).take(PITCHERS_PER_TEAM));
        for position in positions {
            let player = generate_player(&mut team, position, rng);
            state.players.insert(player.id, player);
        }
        state.standings.push(StandingEntry::new(team.id));
        state.teams.insert(team.id, team);
    }

    for team_id in state.team_ids() {
        pick_lineup(&mut state, team_id);
    }
    state.standings.sort_by_key(|s| s.team_id);
    state.schedule = generate_schedule(&state.team_ids(), rng)?;
    log::info!(
        "Created league with {} teams and {} players",
        state.teams.len(),
        state.players.len()
    );
    Ok(state)
}
