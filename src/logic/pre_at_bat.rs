//! Wild throws: catcher errors that move runners up before the pitch is put in play.

use crate::models::{BaseOccupant, Bases, Player, PlayerId};
use rand::Rng;

/// A wild throw that happened. `bases` is the occupancy after every runner moved up.
#[derive(Clone, Debug, PartialEq)]
pub struct WildThrow {
    pub catcher_id: PlayerId,
    pub bases: Bases,
    pub scored: Vec<BaseOccupant>,
}

/// (1 - accuracy/100) * 0.05 + (1 - catcher fielding/100) * 0.07.
pub fn wild_throw_probability(pitcher: &Player, catcher: &Player) -> f64 {
    (1.0 - f64::from(pitcher.ratings.accuracy) / 100.0) * 0.05
        + (1.0 - f64::from(catcher.ratings.fielding) / 100.0) * 0.07
}

/// Roll for one wild throw. Needs a catcher and at least one runner (ghost included).
pub fn resolve_wild_throw<R: Rng + ?Sized>(
    bases: &Bases,
    pitcher: &Player,
    catcher: Option<&Player>,
    rng: &mut R,
) -> Option<WildThrow> {
    let catcher = catcher?;
    if !bases.any_occupied() {
        return None;
    }
    if rng.gen::<f64>() >= wild_throw_probability(pitcher, catcher) {
        return None;
    }
    let mut bases = *bases;
    let scored = bases.advance_all();
    Some(WildThrow {
        catcher_id: catcher.id,
        bases,
        scored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::test_rng::ScriptedRng;
    use crate::models::{Position, Ratings};
    use uuid::Uuid;

    fn player(n: u128, position: Position, ratings: Ratings) -> Player {
        Player::new(Uuid::from_u128(n), "P", 1, Uuid::nil(), position, ratings)
    }

    fn battery() -> (Player, Player) {
        let pitcher = player(1, Position::Pitcher, Ratings { accuracy: 50, ..Ratings::default() });
        let catcher = player(2, Position::Catcher, Ratings { fielding: 50, ..Ratings::default() });
        (pitcher, catcher)
    }

    #[test]
    fn probability_formula() {
        let (pitcher, catcher) = battery();
        assert!((wild_throw_probability(&pitcher, &catcher) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn no_throw_without_runners_or_catcher() {
        let (pitcher, catcher) = battery();
        let mut rng = ScriptedRng::new(&[0.0]);
        assert!(resolve_wild_throw(&Bases::empty(), &pitcher, Some(&catcher), &mut rng).is_none());
        assert!(resolve_wild_throw(&Bases::with_ghost_runner(), &pitcher, None, &mut rng).is_none());
    }

    #[test]
    fn successful_throw_advances_runners_and_scores_from_third() {
        let (pitcher, catcher) = battery();
        let runner = Uuid::from_u128(9);
        let bases = Bases {
            first: BaseOccupant::Empty,
            second: BaseOccupant::GhostRunner,
            third: BaseOccupant::Runner(runner),
        };
        let throw = resolve_wild_throw(&bases, &pitcher, Some(&catcher), &mut ScriptedRng::new(&[0.01]))
            .expect("roll under probability");
        assert_eq!(throw.catcher_id, catcher.id);
        assert_eq!(throw.scored, vec![BaseOccupant::Runner(runner)]);
        assert_eq!(throw.bases.third, BaseOccupant::GhostRunner);

        let miss = resolve_wild_throw(&bases, &pitcher, Some(&catcher), &mut ScriptedRng::new(&[0.5]));
        assert!(miss.is_none());
    }
}
