//! Plate appearance resolution: outcome odds, the handedness matchup, batted-ball angle.

use crate::logic::fielding::{resolve_fielding, FieldingResult};
use crate::models::{BaseOccupant, Bases, FieldingPlay, Handedness, Outcome, Player, Ratings};
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

const MATCHUP_PENALTY: f64 = -0.05;
const MATCHUP_BONUS: f64 = 0.05;
const PULL_ANGLE_RIGHT: f64 = 33.0;
const PULL_ANGLE_LEFT: f64 = 57.0;
const ANGLE_STD_DEV: f64 = 18.0;

/// Stage probabilities for one batter/pitcher pairing.
///
/// `strikeout`, `walk` and `hit` are sequential gates; `home_run`, `triple` and
/// `double` split a hit, with whatever is left becoming a single.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AtBatOdds {
    pub strikeout: f64,
    pub walk: f64,
    pub hit: f64,
    pub home_run: f64,
    pub triple: f64,
    pub double: f64,
}

fn unit(rating: u8) -> f64 {
    f64::from(rating) / 100.0
}

impl AtBatOdds {
    pub fn new(batter: &Ratings, pitcher: &Ratings) -> Self {
        let contact = unit(batter.contact);
        let power = unit(batter.power);
        let eye = unit(batter.eye);
        let speed = unit(batter.speed);
        let accuracy = unit(pitcher.accuracy);
        let heat = unit(pitcher.heat);
        let movement = unit(pitcher.movement);
        let modifier = matchup_modifier(
            effective_handedness(batter.handedness, pitcher.handedness),
            pitcher.handedness,
        );

        Self {
            strikeout: ((0.4 * heat + 0.3 * movement + 0.3 * (1.0 - eye)) / 1.5).max(0.0),
            walk: ((0.4 * eye + 0.6 * (1.0 - accuracy)) / 2.0).max(0.0),
            hit: ((0.6 * contact + 0.2 * eye + 0.2 * (1.0 - accuracy)) / 1.2 + modifier).max(0.0),
            home_run: ((0.7 * power + 0.3 * (1.0 - heat)) / 3.0).max(0.0),
            triple: ((0.4 * speed + 0.1 * contact) / 4.0).max(0.0),
            double: ((0.3 * power + 0.3 * contact) / 2.0).max(0.0),
        }
    }
}

/// Switch hitters bat from the side opposite the pitcher.
pub fn effective_handedness(batter: Handedness, pitcher: Handedness) -> Handedness {
    match batter {
        Handedness::Switch => pitcher.opposite(),
        side => side,
    }
}

/// -0.05 for a same-side matchup, +0.05 otherwise.
pub fn matchup_modifier(batter: Handedness, pitcher: Handedness) -> f64 {
    if batter == pitcher {
        MATCHUP_PENALTY
    } else {
        MATCHUP_BONUS
    }
}

/// Walk the stage gates with one uniform roll each.
pub fn choose_outcome<R: Rng + ?Sized>(odds: &AtBatOdds, rng: &mut R) -> Outcome {
    if rng.gen::<f64>() < odds.strikeout {
        return Outcome::Strikeout;
    }
    if rng.gen::<f64>() < odds.walk {
        return Outcome::Walk;
    }
    if rng.gen::<f64>() >= odds.hit {
        return Outcome::Out;
    }
    let roll = rng.gen::<f64>();
    if roll < odds.home_run {
        Outcome::HomeRun
    } else if roll < odds.home_run + odds.triple {
        Outcome::Triple
    } else if roll < odds.home_run + odds.triple + odds.double {
        Outcome::Double
    } else {
        Outcome::Single
    }
}

/// Batted-ball angle: N(33, 18) for right-handed swings, N(57, 18) for left, clamped to 0-90.
pub fn draw_batted_ball_angle<R: Rng + ?Sized>(batter: Handedness, rng: &mut R) -> f64 {
    let mean = match batter {
        Handedness::Left => PULL_ANGLE_LEFT,
        _ => PULL_ANGLE_RIGHT,
    };
    let z: f64 = rng.sample(StandardNormal);
    (mean + ANGLE_STD_DEV * z).clamp(0.0, 90.0)
}

/// Everything one at-bat produced.
#[derive(Clone, Debug, PartialEq)]
pub struct AtBatResult {
    pub outcome: Outcome,
    pub angle: Option<f64>,
    pub fielding: Option<FieldingPlay>,
    /// Bases after the play.
    pub bases: Bases,
    /// Runners (batter included) who crossed the plate on this play.
    pub scored: Vec<BaseOccupant>,
}

/// Resolve one at-bat against the current bases. `defenders` are the fielding team's
/// players on the field, pitcher included.
pub fn resolve_at_bat<R: Rng + ?Sized>(
    batter: &Player,
    pitcher: &Player,
    defenders: &[&Player],
    bases: &Bases,
    rng: &mut R,
) -> AtBatResult {
    let odds = AtBatOdds::new(&batter.ratings, &pitcher.ratings);
    let tentative = choose_outcome(&odds, rng);

    let (outcome, angle, fielding) = match tentative {
        Outcome::Strikeout | Outcome::Walk => (tentative, None, None),
        _ => {
            let side = effective_handedness(batter.ratings.handedness, pitcher.ratings.handedness);
            let angle = draw_batted_ball_angle(side, rng);
            let FieldingResult { outcome, play } = resolve_fielding(tentative, angle, defenders, rng);
            (outcome, Some(angle), play)
        }
    };

    let mut bases = *bases;
    let scored = bases.apply_outcome(outcome, batter.id);
    AtBatResult {
        outcome,
        angle,
        fielding,
        bases,
        scored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_rng::ScriptedRng;
    use crate::models::Position;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uuid::Uuid;

    fn batter(contact: u8, power: u8, eye: u8, handedness: Handedness) -> Ratings {
        Ratings {
            contact,
            power,
            eye,
            handedness,
            ..Ratings::default()
        }
    }

    fn pitcher(accuracy: u8, heat: u8, movement: u8, handedness: Handedness) -> Ratings {
        Ratings {
            accuracy,
            heat,
            movement,
            handedness,
            ..Ratings::default()
        }
    }

    #[test]
    fn switch_hitter_bats_opposite_the_pitcher() {
        assert_eq!(effective_handedness(Handedness::Switch, Handedness::Right), Handedness::Left);
        assert_eq!(effective_handedness(Handedness::Switch, Handedness::Left), Handedness::Right);
        assert_eq!(effective_handedness(Handedness::Left, Handedness::Left), Handedness::Left);
        assert_eq!(matchup_modifier(Handedness::Left, Handedness::Left), -0.05);
        assert_eq!(matchup_modifier(Handedness::Right, Handedness::Left), 0.05);
    }

    #[test]
    fn elite_contact_against_weak_pitcher() {
        let odds = AtBatOdds::new(
            &batter(99, 30, 30, Handedness::Right),
            &pitcher(30, 30, 30, Handedness::Left),
        );
        // (0.6*0.99 + 0.2*0.3 + 0.2*0.7) / 1.2 + 0.05
        let expected_hit = (0.594 + 0.06 + 0.14) / 1.2 + 0.05;
        assert!((odds.hit - expected_hit).abs() < 1e-9);
        assert!(odds.hit > 0.7);
        assert!((odds.strikeout - (0.12 + 0.09 + 0.21) / 1.5).abs() < 1e-9);
        assert!((odds.walk - (0.12 + 0.42) / 2.0).abs() < 1e-9);

        // Skip strikeout and walk, connect, then land past the extra-base bands.
        let mut rng = ScriptedRng::new(&[0.99, 0.99, 0.0, 0.99]);
        assert_eq!(choose_outcome(&odds, &mut rng), Outcome::Single);
        let mut rng = ScriptedRng::new(&[0.99, 0.99, 0.0, 0.0]);
        assert_eq!(choose_outcome(&odds, &mut rng), Outcome::HomeRun);
        let mut rng = ScriptedRng::new(&[0.99, 0.99, 0.95]);
        assert_eq!(choose_outcome(&odds, &mut rng), Outcome::Out);
        let mut rng = ScriptedRng::new(&[0.0]);
        assert_eq!(choose_outcome(&odds, &mut rng), Outcome::Strikeout);
        let mut rng = ScriptedRng::new(&[0.99, 0.1]);
        assert_eq!(choose_outcome(&odds, &mut rng), Outcome::Walk);
    }

    #[test]
    fn angle_is_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..1000 {
            let a = draw_batted_ball_angle(Handedness::Left, &mut rng);
            assert!((0.0..=90.0).contains(&a));
        }
    }

    #[test]
    fn resolved_bases_never_repeat_a_runner() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let defense: Vec<Player> = Position::FIELD
            .iter()
            .chain(std::iter::once(&Position::Pitcher))
            .enumerate()
            .map(|(i, &pos)| {
                let ratings = Ratings {
                    fielding: 70,
                    speed: 70,
                    ..Ratings::default()
                };
                Player::new(Uuid::from_u128(100 + i as u128), "D", 1, Uuid::nil(), pos, ratings)
            })
            .collect();
        let defenders: Vec<&Player> = defense.iter().collect();
        let arm_ratings = pitcher(60, 60, 60, Handedness::Right);
        let arm = Player::new(Uuid::from_u128(1), "P", 1, Uuid::nil(), Position::Pitcher, arm_ratings);
        let bat_ratings = batter(70, 70, 70, Handedness::Switch);

        let mut bases = Bases::empty();
        for n in 0..2000u128 {
            let id = Uuid::from_u128(1000 + n % 9);
            let hitter = Player::new(id, "B", 1, Uuid::nil(), Position::LeftField, bat_ratings.clone());
            if bases.slots().iter().any(|o| o.player_id() == Some(hitter.id)) {
                bases = Bases::empty();
            }
            let result = resolve_at_bat(&hitter, &arm, &defenders, &bases, &mut rng);
            assert!(result.bases.has_distinct_runners());
            assert_eq!(result.angle.is_none(), matches!(result.outcome, Outcome::Strikeout | Outcome::Walk));
            bases = result.bases;
        }
    }
}
