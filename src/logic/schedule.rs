//! Round-robin schedule generation.

use crate::models::{LeagueError, ScheduleEntry, TeamId};
use rand::seq::SliceRandom;
use rand::Rng;

/// Games each pair of teams hosts against the other per season.
const HOME_GAMES_PER_PAIR: usize = 2;

/// Build a shuffled round-robin: every unordered pair plays 4 times, 2 at each park.
///
/// Length is always `4 * C(n, 2)`.
pub fn generate_schedule<R: Rng + ?Sized>(
    team_ids: &[TeamId],
    rng: &mut R,
) -> Result<Vec<ScheduleEntry>, LeagueError> {
    if team_ids.len() < 2 {
        return Err(LeagueError::NotEnoughTeams {
            found: team_ids.len(),
        });
    }

    let mut schedule = Vec::with_capacity(team_ids.len() * (team_ids.len() - 1) * HOME_GAMES_PER_PAIR);
    for (i, &a) in team_ids.iter().enumerate() {
        for &b in &team_ids[i + 1..] {
            for _ in 0..HOME_GAMES_PER_PAIR {
                schedule.push(ScheduleEntry::new(a, b));
                schedule.push(ScheduleEntry::new(b, a));
            }
        }
    }
    schedule.shuffle(rng);
    Ok(schedule)
}
