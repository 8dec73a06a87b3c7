//! Season flow: regular-season fixtures, postseason seeding, the best-of-3 series and
//! the rollover into the next year.

use crate::logic::aging::advance_year;
use crate::logic::game::simulate_full_game;
use crate::logic::stats::fold_deltas;
use crate::models::{
    ChampionRecord, GameResult, LeagueError, LeagueState, ScheduleEntry, StandingEntry, TeamId,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// Series wins needed to take the championship.
const SERIES_WINS_NEEDED: u32 = 2;

/// What a recorded game did to the season.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SeasonEvent {
    RegularSeasonGame,
    /// Last regular-season game played; `seeds[0]` has home field.
    PostseasonStarted { seeds: [TeamId; 2] },
    SeriesGame { wins: BTreeMap<TeamId, u32> },
    /// The series is over and the league has rolled into the next year.
    SeasonComplete { year: u32, champion: TeamId },
}

/// Standings ranked by wins, ties going to fewer losses.
pub fn standings_table(state: &LeagueState) -> Vec<StandingEntry> {
    let mut table = state.standings.clone();
    table.sort_by_key(|s| (Reverse(s.wins), s.losses, s.team_id));
    table
}

/// The next game to play and whether it is a postseason game.
pub fn next_fixture(state: &LeagueState) -> Option<(ScheduleEntry, bool)> {
    if state.is_postseason {
        if state.championship_winner_id.is_some() {
            return None;
        }
        return state
            .postseason_series
            .get(state.postseason_game_index)
            .map(|&f| (f, true));
    }
    state.schedule.get(state.game_index).map(|&f| (f, false))
}

/// Seed the top two teams into a best-of-3 series: the higher seed hosts games 1 and 3.
pub fn start_postseason(state: &LeagueState) -> Result<LeagueState, LeagueError> {
    let table = standings_table(state);
    let (s1, s2) = match table.as_slice() {
        [first, second, ..] => (first.team_id, second.team_id),
        _ => return Err(LeagueError::NotEnoughTeams { found: table.len() }),
    };

    let mut next = state.clone();
    next.is_postseason = true;
    next.postseason_series = vec![
        ScheduleEntry::new(s1, s2),
        ScheduleEntry::new(s2, s1),
        ScheduleEntry::new(s1, s2),
    ];
    next.postseason_series_scores = [(s1, 0), (s2, 0)].into_iter().collect();
    next.postseason_game_index = 0;
    next.championship_winner_id = None;
    log::info!("Year {} postseason: {} vs {}", next.year, team_name(&next, s1), team_name(&next, s2));
    Ok(next)
}

/// Fold a finished game into the league. `fixture` must be the league's next fixture.
///
/// Regular-season results update standings; the last one seeds the postseason. Series
/// results update the series score; the clinching one crowns the champion, records it in
/// the champion history, and rolls the league into the next year.
pub fn record_game_result<R: Rng + ?Sized>(
    state: &LeagueState,
    fixture: ScheduleEntry,
    result: &GameResult,
    rng: &mut R,
) -> Result<(LeagueState, SeasonEvent), LeagueError> {
    let (expected, postseason) = next_fixture(state).ok_or(LeagueError::NoFixtureRemaining)?;
    if expected != fixture || result.fixture != fixture {
        return Err(LeagueError::UnexpectedFixture);
    }
    if !fixture.involves(result.winner) || !fixture.involves(result.loser) || result.winner == result.loser {
        return Err(LeagueError::UnexpectedFixture);
    }

    let mut next = state.clone();
    fold_deltas(&mut next.players, &result.player_stat_deltas);

    if !postseason {
        record_regular_season(&mut next, result);
        if next.regular_season_complete() {
            let seeded = start_postseason(&next)?;
            let seeds = [seeded.postseason_series[0].home_team_id, seeded.postseason_series[0].away_team_id];
            return Ok((seeded, SeasonEvent::PostseasonStarted { seeds }));
        }
        return Ok((next, SeasonEvent::RegularSeasonGame));
    }

    let wins = next.postseason_series_scores.entry(result.winner).or_insert(0);
    *wins += 1;
    let clinched = *wins >= SERIES_WINS_NEEDED;
    next.postseason_game_index += 1;
    if !clinched {
        let wins = next.postseason_series_scores.clone();
        return Ok((next, SeasonEvent::SeriesGame { wins }));
    }

    let year = next.year;
    next.championship_winner_id = Some(result.winner);
    next.past_champions.push(ChampionRecord {
        year,
        team_id: result.winner,
    });
    log::info!("{} won the year {} championship", team_name(&next, result.winner), year);
    let rolled = advance_year(&next, rng)?;
    Ok((
        rolled,
        SeasonEvent::SeasonComplete {
            year,
            champion: result.winner,
        },
    ))
}

/// Simulate the next fixture in batch mode and record it.
pub fn play_next_game<R: Rng + ?Sized>(
    state: &LeagueState,
    rng: &mut R,
) -> Result<(LeagueState, GameResult, SeasonEvent), LeagueError> {
    let seeded;
    let state = if !state.is_postseason && state.regular_season_complete() {
        seeded = start_postseason(state)?;
        &seeded
    } else {
        state
    };
    let (fixture, postseason) = next_fixture(state).ok_or(LeagueError::NoFixtureRemaining)?;
    let result = simulate_full_game(fixture, state, postseason, rng);
    let (next, event) = record_game_result(state, fixture, &result, rng)?;
    Ok((next, result, event))
}

fn record_regular_season(state: &mut LeagueState, result: &GameResult) {
    for (team_id, won) in [(result.winner, true), (result.loser, false)] {
        if let Some(entry) = state.standing_mut(team_id) {
            if won {
                entry.wins += 1;
            } else {
                entry.losses += 1;
            }
        }
        if let Some(team) = state.teams.get_mut(&team_id) {
            if won {
                team.wins += 1;
            } else {
                team.losses += 1;
            }
        }
    }
    state.game_index += 1;
}

fn team_name(state: &LeagueState, team_id: TeamId) -> String {
    state
        .teams
        .get(&team_id)
        .map(|t| t.name.clone())
        .unwrap_or_else(|| team_id.to_string())
}
