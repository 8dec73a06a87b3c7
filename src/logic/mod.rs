//! Simulation logic: rating generation, scheduling, the plate-appearance resolvers, the game
//! state machine, and the season orchestrator.

mod aging;
mod at_bat;
mod fielding;
mod game;
mod lineup;
mod pre_at_bat;
mod ratings;
mod schedule;
mod season;
mod setup;
mod stats;
#[cfg(test)]
mod test_rng;

pub use aging::{advance_year, age_factor, age_player, attribute_drift};
pub use at_bat::{
    choose_outcome, draw_batted_ball_angle, effective_handedness, matchup_modifier,
    resolve_at_bat, AtBatOdds, AtBatResult,
};
pub use fielding::{
    error_probability, exceptional_play_probability, fielding_credit, resolve_fielding,
    robbery_probability, zone, zone_contains, FieldingResult,
};
pub use game::{
    advance_one_plate_appearance, simulate_full_game, start_game, GameSession, INNING_LIMIT,
};
pub use lineup::{assign_lineup, auto_assign_lineup, derive_lineup, InvalidLineup, Lineup};
pub use pre_at_bat::{resolve_wild_throw, wild_throw_probability, WildThrow};
pub use ratings::{
    batter_overall, clamp_rating, generate_handedness, generate_ratings, pitcher_overall,
};
pub use schedule::generate_schedule;
pub use season::{
    next_fixture, play_next_game, record_game_result, standings_table, start_postseason,
    SeasonEvent,
};
pub use setup::{new_league, LeagueConfig};
pub use stats::apply_stat_deltas;
