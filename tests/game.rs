//! Integration tests for the game state machine: stepped play, batch play and forfeits.

use franchise_sim::logic::INNING_LIMIT;
use franchise_sim::models::{Bases, FieldingPlayKind, HalfInning};
use franchise_sim::{
    advance_one_plate_appearance, new_league, simulate_full_game, start_game, GameSession,
    LeagueConfig, LeagueState, Outcome, PlayEvent, Stats,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Hard stop for runaway loops in tests.
const MAX_PLATE_APPEARANCES: usize = 5_000;

fn league(seed: u64) -> LeagueState {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    new_league(&LeagueConfig::with_team_count(2), &mut rng).unwrap()
}

fn play_out(mut game: GameSession, rng: &mut ChaCha8Rng) -> (GameSession, Vec<PlayEvent>) {
    let mut events = Vec::new();
    while !game.is_over() {
        assert!(events.len() < MAX_PLATE_APPEARANCES, "game never ended");
        let (next, event) = advance_one_plate_appearance(&game, rng).unwrap();
        events.push(event);
        game = next;
    }
    (game, events)
}

#[test]
fn half_innings_end_on_the_third_out_or_a_walk_off() {
    for seed in 0..20 {
        let state = league(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed + 100);
        let game = start_game(state.schedule[0], &state, false).unwrap();
        let (_, events) = play_out(game, &mut rng);

        for e in &events {
            assert!(e.outs <= 3);
            if e.outs == 3 {
                assert!(e.half_inning_ended);
            }
            if e.half_inning_ended && e.outs < 3 {
                // Only a walk-off cuts a half-inning short.
                assert!(e.game_ended);
                assert_eq!(e.half, HalfInning::Bottom);
                assert!(e.inning > INNING_LIMIT);
                assert!(e.home_score > e.away_score);
            }
        }
        let last = events.last().unwrap();
        assert!(last.game_ended);
        assert_ne!(last.home_score, last.away_score);
        assert!(last.inning >= INNING_LIMIT);
    }
}

#[test]
fn runners_on_base_are_always_distinct() {
    for seed in 0..20 {
        let state = league(seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let game = start_game(state.schedule[1], &state, false).unwrap();
        let (_, events) = play_out(game, &mut rng);
        assert!(events.iter().all(|e| e.bases.has_distinct_runners()));
    }
}

/// Bases at the start of every half-inning the game reaches, with the inning number.
fn half_inning_openings(mut game: GameSession, rng: &mut ChaCha8Rng) -> Vec<(u32, Bases)> {
    let mut openings = vec![(game.inning, game.bases)];
    let mut steps = 0;
    while !game.is_over() {
        assert!(steps < MAX_PLATE_APPEARANCES, "game never ended");
        let (next, event) = advance_one_plate_appearance(&game, rng).unwrap();
        if event.half_inning_ended && !event.game_ended {
            openings.push((next.inning, next.bases));
        }
        game = next;
        steps += 1;
    }
    openings
}

#[test]
fn ghost_runner_only_in_regular_season_extra_innings() {
    let mut saw_extra_innings = false;
    for seed in 0..60 {
        let state = league(seed);
        for postseason in [false, true] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed * 7 + 1);
            let game = start_game(state.schedule[0], &state, postseason).unwrap();
            for (inning, bases) in half_inning_openings(game, &mut rng) {
                if inning > INNING_LIMIT && !postseason {
                    saw_extra_innings = true;
                    assert_eq!(bases, Bases::with_ghost_runner());
                } else {
                    assert_eq!(bases, Bases::empty());
                }
            }
        }
    }
    assert!(saw_extra_innings, "no seed reached extra innings");
}

#[test]
fn batch_and_stepped_modes_agree() {
    let state = league(11);
    let fixture = state.schedule[2];

    let batch = simulate_full_game(fixture, &state, false, &mut ChaCha8Rng::seed_from_u64(42));

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let game = start_game(fixture, &state, false).unwrap();
    let (finished, _) = play_out(game, &mut rng);
    let stepped = finished.into_result().unwrap();

    assert_eq!(batch, stepped);
    assert!(!batch.forfeit);
    let (winner_score, loser_score) = if batch.winner == fixture.home_team_id {
        (batch.home_score, batch.away_score)
    } else {
        (batch.away_score, batch.home_score)
    };
    assert!(winner_score > loser_score);
}

#[test]
fn batting_stats_line_up_with_the_scoreboard() {
    let state = league(5);
    let fixture = state.schedule[0];
    let result = simulate_full_game(fixture, &state, false, &mut ChaCha8Rng::seed_from_u64(5));

    let runs: u32 = result.player_stat_deltas.iter().map(|d| d.delta.runs).sum();
    let ghost_free_runs = result.home_score + result.away_score;
    // Ghost runners score without a player to credit.
    assert!(runs <= ghost_free_runs);
    if result.innings <= INNING_LIMIT {
        assert_eq!(runs, ghost_free_runs);
    }
    for d in &result.player_stat_deltas {
        assert!(d.delta.hits <= d.delta.at_bats);
        assert!(d.delta.home_runs <= d.delta.hits);
    }
}

fn count(events: &[PlayEvent], pred: impl Fn(&PlayEvent) -> bool) -> u32 {
    events.iter().filter(|e| pred(e)).count() as u32
}

#[test]
fn stat_deltas_match_the_play_by_play() {
    for seed in 0..40 {
        let state = league(seed);
        for postseason in [false, true] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed * 13 + 5);
            let game = start_game(state.schedule[0], &state, postseason).unwrap();
            let (finished, events) = play_out(game, &mut rng);
            let result = finished.into_result().unwrap();

            let mut total = Stats::default();
            for d in &result.player_stat_deltas {
                total.absorb(&d.delta);
            }

            // Every wild throw charges the catcher with an error.
            let wild_throws: u32 = events.iter().map(|e| e.wild_throws).sum();
            let fielding_errors = count(&events, |e| {
                e.fielding.map(|f| f.kind) == Some(FieldingPlayKind::Error)
            });
            assert_eq!(total.errors, wild_throws + fielding_errors);
            assert_eq!(
                total.plays_attempted,
                wild_throws + count(&events, |e| e.fielding.is_some())
            );
            assert_eq!(
                total.exceptional_plays,
                count(&events, |e| matches!(
                    e.fielding.map(|f| f.kind),
                    Some(FieldingPlayKind::ExceptionalPlay | FieldingPlayKind::HomeRunRobbed)
                ))
            );

            // Batter and pitcher sides mirror each other.
            let strikeouts = count(&events, |e| e.outcome == Outcome::Strikeout);
            let walks = count(&events, |e| e.outcome == Outcome::Walk);
            let hits = count(&events, |e| e.outcome.is_hit());
            let home_runs = count(&events, |e| e.outcome == Outcome::HomeRun);
            assert_eq!((total.strikeouts, total.strikeouts_allowed), (strikeouts, strikeouts));
            assert_eq!((total.walks, total.walks_allowed), (walks, walks));
            assert_eq!((total.hits, total.hits_allowed), (hits, hits));
            assert_eq!((total.home_runs, total.home_runs_allowed), (home_runs, home_runs));
            assert_eq!(total.at_bats, total.at_bats_faced);
            assert_eq!(total.at_bats + total.walks, events.len() as u32);

            // One inning pitched per completed half-inning; a walk-off ends it short.
            let completed_halves = count(&events, |e| {
                let walk_off = e.half == HalfInning::Bottom
                    && e.inning > INNING_LIMIT
                    && e.home_score > e.away_score;
                e.outs == 3 && !walk_off
            });
            assert_eq!(total.innings_pitched, completed_halves);

            let scoreboard = result.home_score + result.away_score;
            assert_eq!(scoreboard, events.iter().map(|e| e.runs_scored).sum::<u32>());
            assert!(total.rbis <= scoreboard);
            if postseason {
                assert_eq!(total.runs, scoreboard);
            } else {
                assert!(total.runs <= scoreboard);
            }
        }
    }
}

#[test]
fn team_without_a_lineup_forfeits_one_nothing() {
    let mut state = league(3);
    let fixture = state.schedule[0];
    // Strip the away side down to three unassigned pitchers.
    let away = fixture.away_team_id;
    let mut kept_pitchers = 0;
    state.players.retain(|_, p| {
        if p.team_id != away {
            return true;
        }
        if p.is_pitcher() && kept_pitchers < 3 {
            kept_pitchers += 1;
            return true;
        }
        false
    });
    for p in state.players.values_mut().filter(|p| p.team_id == away) {
        p.is_starting_pitcher = false;
        p.lineup_slot = None;
    }

    assert!(start_game(fixture, &state, false).is_err());
    let result = simulate_full_game(fixture, &state, false, &mut ChaCha8Rng::seed_from_u64(3));
    assert!(result.forfeit);
    assert_eq!(result.winner, fixture.home_team_id);
    assert_eq!((result.home_score, result.away_score), (1, 0));
    assert!(result.player_stat_deltas.is_empty());
}
