//! Year rollover: aging, attribute drift, fresh schedule and cleared season state.

use crate::logic::ratings::clamp_rating;
use crate::logic::schedule::generate_schedule;
use crate::logic::stats::reset_stats;
use crate::models::{LeagueError, LeagueState, Player, Ratings, StandingEntry};
use rand::Rng;

/// Base drift range before scaling: U(-0.5, 0.5) * 10.
const DRIFT_SCALE: f64 = 10.0;
/// Largest yearly injury increase once a player turns 4.
const MAX_INJURY_CREEP: u8 = 5;

/// Scale on the yearly drift by age: young players move more, veterans less.
pub fn age_factor(age: u32) -> f64 {
    match age {
        0..=2 => 1.5,
        4..=5 => 0.8,
        a if a >= 6 => 0.5,
        _ => 1.0,
    }
}

/// Drift for one skill attribute, before rounding.
pub fn attribute_drift(base: f64, age: u32, ratings: &Ratings) -> f64 {
    let potential = (f64::from(ratings.potential) - 50.0) / 100.0;
    let injury = (f64::from(ratings.injury) - 50.0) / 100.0;
    base * age_factor(age) * (1.0 + potential) * (1.0 - injury)
}

/// Age one player a year and drift every skill attribute of the player's role.
/// The other role's attributes stay pinned at the floor.
pub fn age_player<R: Rng + ?Sized>(player: &mut Player, rng: &mut R) {
    player.age += 1;
    let age = player.age;
    let is_pitcher = player.is_pitcher();
    let snapshot = player.ratings.clone();
    let r = &mut player.ratings;
    let skills = [
        (&mut r.contact, !is_pitcher),
        (&mut r.power, !is_pitcher),
        (&mut r.eye, !is_pitcher),
        (&mut r.speed, true),
        (&mut r.fielding, true),
        (&mut r.accuracy, is_pitcher),
        (&mut r.heat, is_pitcher),
        (&mut r.movement, is_pitcher),
    ];
    for (attr, applies) in skills {
        if !applies {
            continue;
        }
        let base = rng.gen_range(-0.5..0.5) * DRIFT_SCALE;
        *attr = clamp_rating(f64::from(*attr) + attribute_drift(base, age, &snapshot));
    }
    if age >= 4 {
        let creep = rng.gen_range(0..=MAX_INJURY_CREEP);
        r.injury = clamp_rating(f64::from(r.injury) + f64::from(creep));
    }
}

/// Roll the franchise into the next year: age everyone, zero stats, reset standings and team
/// records, clear the postseason, and draw a new schedule.
pub fn advance_year<R: Rng + ?Sized>(state: &LeagueState, rng: &mut R) -> Result<LeagueState, LeagueError> {
    let mut next = state.clone();
    next.year += 1;
    for p in next.players.values_mut() {
        age_player(p, rng);
    }
    reset_stats(&mut next.players);

    let team_ids = next.team_ids();
    next.schedule = generate_schedule(&team_ids, rng)?;
    next.game_index = 0;
    next.standings = team_ids.iter().map(|&id| StandingEntry::new(id)).collect();
    for team in next.teams.values_mut() {
        team.wins = 0;
        team.losses = 0;
    }
    next.is_postseason = false;
    next.postseason_series.clear();
    next.postseason_series_scores.clear();
    next.postseason_game_index = 0;
    next.championship_winner_id = None;

    log::info!("Advanced to year {}", next.year);
    Ok(next)
}
