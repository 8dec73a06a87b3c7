//! Fielding: who plays the ball, and whether an error or an exceptional play changes the outcome.

use crate::models::{FieldingPlay, FieldingPlayKind, Outcome, Player, Position, Stats};
use rand::seq::SliceRandom;
use rand::Rng;

/// Chance a home run is catchable at the wall at all.
const ROBBABLE_CHANCE: f64 = 0.02;
const ERROR_SCALE: f64 = 0.10;
const EXCEPTIONAL_SCALE: f64 = 0.03;
const OUTFIELD_SPEED_SCALE: f64 = 0.5;
const INFIELD_SPEED_SCALE: f64 = 0.2;
const ROBBED_HOME_RUN_BASES: u32 = 4;

/// Angular zone `[start, end)` in degrees from the third-base line; the last zone of
/// each band also owns 90. Catchers have none.
pub fn zone(position: Position) -> Option<(f64, f64)> {
    match position {
        Position::ThirdBase => Some((0.0, 18.0)),
        Position::Shortstop => Some((18.0, 36.0)),
        Position::Pitcher => Some((36.0, 54.0)),
        Position::SecondBase => Some((54.0, 72.0)),
        Position::FirstBase => Some((72.0, 90.0)),
        Position::LeftField => Some((0.0, 30.0)),
        Position::CenterField => Some((30.0, 60.0)),
        Position::RightField => Some((60.0, 90.0)),
        Position::Catcher => None,
    }
}

pub fn zone_contains(position: Position, angle: f64) -> bool {
    match zone(position) {
        Some((start, end)) => angle >= start && (angle < end || (end >= 90.0 && angle <= end)),
        None => false,
    }
}

/// Final outcome of a batted ball after the defense had its say.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldingResult {
    pub outcome: Outcome,
    pub play: Option<FieldingPlay>,
}

/// Error chance for a fielder: (100 - fielding)/100 * 0.10.
pub fn error_probability(fielder: &Player) -> f64 {
    f64::from(100 - u32::from(fielder.ratings.fielding).min(100)) / 100.0 * ERROR_SCALE
}

/// Exceptional-play chance: fielding/100 * 0.03 plus a speed term, larger for outfielders.
pub fn exceptional_play_probability(fielder: &Player) -> f64 {
    let speed_scale = if fielder.position.is_outfield() {
        OUTFIELD_SPEED_SCALE
    } else {
        INFIELD_SPEED_SCALE
    };
    f64::from(fielder.ratings.fielding) / 100.0 * EXCEPTIONAL_SCALE
        + f64::from(fielder.ratings.speed) / 100.0 * speed_scale
}

/// Chance an outfielder pulls back a robbable home run.
pub fn robbery_probability(fielder: &Player) -> f64 {
    0.8 * f64::from(fielder.ratings.fielding) / 100.0 + 0.2 * f64::from(fielder.ratings.speed) / 100.0
}

/// Stat counters a fielder earns for one play.
pub fn fielding_credit(kind: FieldingPlayKind) -> Stats {
    let mut delta = Stats {
        plays_attempted: 1,
        ..Stats::default()
    };
    match kind {
        FieldingPlayKind::Routine | FieldingPlayKind::RobberyMissed => {}
        FieldingPlayKind::Error => delta.errors = 1,
        FieldingPlayKind::ExceptionalPlay => {
            delta.exceptional_plays = 1;
            delta.bases_robbed = 1;
        }
        FieldingPlayKind::HomeRunRobbed => {
            delta.exceptional_plays = 1;
            delta.bases_robbed = ROBBED_HOME_RUN_BASES;
        }
    }
    delta
}

/// Resolve the defense on a batted ball. `defenders` is the fielding team on the field;
/// strikeouts and walks pass through untouched.
pub fn resolve_fielding<R: Rng + ?Sized>(
    outcome: Outcome,
    angle: f64,
    defenders: &[&Player],
    rng: &mut R,
) -> FieldingResult {
    match outcome {
        Outcome::Strikeout | Outcome::Walk => FieldingResult { outcome, play: None },
        Outcome::HomeRun => resolve_home_run(angle, defenders, rng),
        _ => resolve_ball_in_play(outcome, angle, defenders, rng),
    }
}

fn resolve_home_run<R: Rng + ?Sized>(angle: f64, defenders: &[&Player], rng: &mut R) -> FieldingResult {
    let untouched = FieldingResult {
        outcome: Outcome::HomeRun,
        play: None,
    };
    if rng.gen::<f64>() >= ROBBABLE_CHANCE {
        return untouched;
    }
    let outfielders: Vec<&Player> = eligible(Outcome::HomeRun, angle, defenders);
    let Some(&fielder) = outfielders.choose(rng) else {
        return untouched;
    };
    if rng.gen::<f64>() < robbery_probability(fielder) {
        FieldingResult {
            outcome: Outcome::Out,
            play: Some(FieldingPlay {
                fielder_id: fielder.id,
                kind: FieldingPlayKind::HomeRunRobbed,
            }),
        }
    } else {
        FieldingResult {
            outcome: Outcome::HomeRun,
            play: Some(FieldingPlay {
                fielder_id: fielder.id,
                kind: FieldingPlayKind::RobberyMissed,
            }),
        }
    }
}

fn resolve_ball_in_play<R: Rng + ?Sized>(
    outcome: Outcome,
    angle: f64,
    defenders: &[&Player],
    rng: &mut R,
) -> FieldingResult {
    let mut candidates = eligible(outcome, angle, defenders);
    if candidates.is_empty() {
        log::warn!(
            "No fielder zone covers {:.1} degrees for {:?}; picking any fielder",
            angle,
            outcome
        );
        candidates = defenders
            .iter()
            .copied()
            .filter(|p| p.position != Position::Catcher)
            .collect();
    }
    let Some(&fielder) = candidates.choose(rng) else {
        return FieldingResult { outcome, play: None };
    };

    let (outcome, kind) = if rng.gen::<f64>() < error_probability(fielder) {
        (outcome.upgraded(), FieldingPlayKind::Error)
    } else if outcome != Outcome::Out && rng.gen::<f64>() < exceptional_play_probability(fielder) {
        (outcome.downgraded(), FieldingPlayKind::ExceptionalPlay)
    } else {
        (outcome, FieldingPlayKind::Routine)
    };
    FieldingResult {
        outcome,
        play: Some(FieldingPlay {
            fielder_id: fielder.id,
            kind,
        }),
    }
}

/// Fielders whose zone holds the angle. Extra-base hits and home runs go to outfielders only.
fn eligible<'a>(outcome: Outcome, angle: f64, defenders: &[&'a Player]) -> Vec<&'a Player> {
    let outfield_only = matches!(outcome, Outcome::Double | Outcome::Triple | Outcome::HomeRun);
    defenders
        .iter()
        .copied()
        .filter(|p| !outfield_only || p.position.is_outfield())
        .filter(|p| zone_contains(p.position, angle))
        .collect()
}
