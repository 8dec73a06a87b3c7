//! Rating generation and the derived overall scores used for ranking.

use crate::models::{Handedness, Ratings, RATING_MAX, RATING_MIN};
use rand::Rng;
use rand_distr::StandardNormal;

const RATING_MEAN: f64 = 75.0;
const RATING_STD_DEV: f64 = 10.0;

/// Round and clamp a raw value onto the 30-99 scale.
pub fn clamp_rating(value: f64) -> u8 {
    value
        .round()
        .clamp(f64::from(RATING_MIN), f64::from(RATING_MAX)) as u8
}

fn sample_rating<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let z: f64 = rng.sample(StandardNormal);
    clamp_rating(RATING_MEAN + RATING_STD_DEV * z)
}

/// Pitchers: 75% right, 25% left. Batters: 65% right, 25% left, 10% switch.
pub fn generate_handedness<R: Rng + ?Sized>(is_pitcher: bool, rng: &mut R) -> Handedness {
    let roll = rng.gen::<f64>();
    if is_pitcher {
        if roll < 0.75 {
            Handedness::Right
        } else {
            Handedness::Left
        }
    } else if roll < 0.65 {
        Handedness::Right
    } else if roll < 0.90 {
        Handedness::Left
    } else {
        Handedness::Switch
    }
}

/// Generate a full attribute set for a pitcher or a position player.
///
/// Every applicable attribute is drawn from N(75, 10), rounded and clamped; the
/// other role's attributes are pinned at [`RATING_MIN`].
pub fn generate_ratings<R: Rng + ?Sized>(is_pitcher: bool, rng: &mut R) -> Ratings {
    let potential = sample_rating(rng);
    let injury = sample_rating(rng);
    let (accuracy, heat, movement, contact, power, eye) = if is_pitcher {
        (
            sample_rating(rng),
            sample_rating(rng),
            sample_rating(rng),
            RATING_MIN,
            RATING_MIN,
            RATING_MIN,
        )
    } else {
        (
            RATING_MIN,
            RATING_MIN,
            RATING_MIN,
            sample_rating(rng),
            sample_rating(rng),
            sample_rating(rng),
        )
    };
    let speed = sample_rating(rng);
    let fielding = sample_rating(rng);
    Ratings {
        potential,
        injury,
        accuracy,
        heat,
        movement,
        contact,
        power,
        eye,
        speed,
        fielding,
        handedness: generate_handedness(is_pitcher, rng),
    }
}

/// 0.4 contact + 0.3 power + 0.3 eye. Higher is better.
pub fn batter_overall(ratings: &Ratings) -> f64 {
    0.4 * f64::from(ratings.contact) + 0.3 * f64::from(ratings.power) + 0.3 * f64::from(ratings.eye)
}

/// 0.4 accuracy + 0.3 heat + 0.3 movement. Ranked ascending: lower is better.
pub fn pitcher_overall(ratings: &Ratings) -> f64 {
    0.4 * f64::from(ratings.accuracy)
        + 0.3 * f64::from(ratings.heat)
        + 0.3 * f64::from(ratings.movement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_rng::ScriptedRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn generated_ratings_stay_in_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for i in 0..500 {
            let r = generate_ratings(i % 2 == 0, &mut rng);
            assert!(r.values().iter().all(|v| (RATING_MIN..=RATING_MAX).contains(v)));
        }
    }

    #[test]
    fn non_applicable_attributes_sit_at_floor() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            let p = generate_ratings(true, &mut rng);
            assert_eq!((p.contact, p.power, p.eye), (30, 30, 30));
            assert_ne!(p.handedness, Handedness::Switch);
            let b = generate_ratings(false, &mut rng);
            assert_eq!((b.accuracy, b.heat, b.movement), (30, 30, 30));
        }
    }

    #[test]
    fn handedness_thresholds() {
        assert_eq!(generate_handedness(true, &mut ScriptedRng::new(&[0.74])), Handedness::Right);
        assert_eq!(generate_handedness(true, &mut ScriptedRng::new(&[0.76])), Handedness::Left);
        assert_eq!(generate_handedness(false, &mut ScriptedRng::new(&[0.64])), Handedness::Right);
        assert_eq!(generate_handedness(false, &mut ScriptedRng::new(&[0.80])), Handedness::Left);
        assert_eq!(generate_handedness(false, &mut ScriptedRng::new(&[0.95])), Handedness::Switch);
    }

    #[test]
    fn clamp_rounds_and_bounds() {
        assert_eq!(clamp_rating(12.0), 30);
        assert_eq!(clamp_rating(150.0), 99);
        assert_eq!(clamp_rating(74.5), 75);
        assert_eq!(clamp_rating(74.4), 74);
    }

    #[test]
    fn overall_weights() {
        let r = Ratings {
            contact: 80,
            power: 60,
            eye: 50,
            accuracy: 90,
            heat: 40,
            movement: 40,
            ..Ratings::default()
        };
        assert!((batter_overall(&r) - 65.0).abs() < 1e-9);
        assert!((pitcher_overall(&r) - 60.0).abs() < 1e-9);
    }
}
