//! Game simulation as a half-inning state machine.
//!
//! A [`GameSession`] advances one plate appearance per call to
//! [`GameSession::play_plate_appearance`], so a presentation layer can animate each play
//! before asking for the next. [`simulate_full_game`] drives the same machine to the end
//! without yielding.

use crate::logic::at_bat::resolve_at_bat;
use crate::logic::fielding::fielding_credit;
use crate::logic::lineup::{derive_lineup, InvalidLineup, Lineup};
use crate::logic::pre_at_bat::resolve_wild_throw;
use crate::models::{
    Bases, FieldingPlayKind, GamePhase, GameResult, HalfInning, LeagueError, LeagueState,
    Outcome, PlayEvent, Player, PlayerId, PlayerStatDelta, Position, ScheduleEntry, Stats,
    LINEUP_SIZE,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Regulation length of a game. Later innings are extra innings.
pub const INNING_LIMIT: u32 = 6;
const OUTS_PER_HALF_INNING: u8 = 3;
/// Widest winning margin that still earns the winning pitcher a save.
const SAVE_MARGIN: u32 = 3;

/// A game in progress. Self-contained: it carries copies of every player on the field,
/// so it can be stored between steps without the league state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub fixture: ScheduleEntry,
    pub is_postseason: bool,
    pub inning: u32,
    pub phase: GamePhase,
    pub outs: u8,
    pub bases: Bases,
    pub home_score: u32,
    pub away_score: u32,
    pub home: Lineup,
    pub away: Lineup,
    /// Next spot in each batting order (0-8).
    pub home_batter: usize,
    pub away_batter: usize,
    players: BTreeMap<PlayerId, Player>,
    deltas: BTreeMap<PlayerId, Stats>,
}

/// Build a session for `fixture`, or report why a side cannot take the field.
pub fn start_game(
    fixture: ScheduleEntry,
    state: &LeagueState,
    is_postseason: bool,
) -> Result<GameSession, InvalidLineup> {
    let home = derive_lineup(state, fixture.home_team_id)?;
    let away = derive_lineup(state, fixture.away_team_id)?;

    let players: BTreeMap<PlayerId, Player> = [&home, &away]
        .iter()
        .flat_map(|l| l.batters.iter().chain(std::iter::once(&l.pitcher)))
        .filter_map(|id| state.players.get(id))
        .map(|p| (p.id, p.clone()))
        .collect();

    let mut session = GameSession {
        fixture,
        is_postseason,
        inning: 1,
        phase: GamePhase::TopBatting,
        outs: 0,
        bases: Bases::empty(),
        home_score: 0,
        away_score: 0,
        home,
        away,
        home_batter: 0,
        away_batter: 0,
        players,
        deltas: BTreeMap::new(),
    };
    session.start_half_inning();
    Ok(session)
}

/// Stepped mode: one plate appearance on a copy of `session`.
pub fn advance_one_plate_appearance<R: Rng + ?Sized>(
    session: &GameSession,
    rng: &mut R,
) -> Result<(GameSession, PlayEvent), LeagueError> {
    let mut next = session.clone();
    let event = next.play_plate_appearance(rng)?;
    Ok((next, event))
}

/// Batch mode: play `fixture` to the end. An invalid lineup forfeits the game 1-0 to the
/// home team instead of failing.
pub fn simulate_full_game<R: Rng + ?Sized>(
    fixture: ScheduleEntry,
    state: &LeagueState,
    is_postseason: bool,
    rng: &mut R,
) -> GameResult {
    let mut session = match start_game(fixture, state, is_postseason) {
        Ok(session) => session,
        Err(reason) => {
            log::warn!(
                "Forfeit {} at {}: {}",
                fixture.away_team_id,
                fixture.home_team_id,
                reason
            );
            return GameResult::forfeit(fixture);
        }
    };
    while !session.is_over() {
        if let Err(e) = session.play_plate_appearance(rng) {
            log::warn!("Stopping game early: {}", e);
            break;
        }
    }
    session.finish()
}

fn credit(deltas: &mut BTreeMap<PlayerId, Stats>, id: PlayerId) -> &mut Stats {
    deltas.entry(id).or_default()
}

impl GameSession {
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Stat deltas accumulated so far.
    pub fn deltas(&self) -> &BTreeMap<PlayerId, Stats> {
        &self.deltas
    }

    /// Run wild-throw checks until none happens, then one at-bat, and apply the result.
    pub fn play_plate_appearance<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<PlayEvent, LeagueError> {
        let half = match self.phase {
            GamePhase::TopBatting => HalfInning::Top,
            GamePhase::BottomBatting => HalfInning::Bottom,
            GamePhase::InningAdvance | GamePhase::GameOver => {
                return Err(LeagueError::GameAlreadyOver)
            }
        };
        let (batting, fielding, spot) = match half {
            HalfInning::Top => (&self.away, &self.home, self.away_batter),
            HalfInning::Bottom => (&self.home, &self.away, self.home_batter),
        };
        let batter_id = batting.batters[spot % LINEUP_SIZE];
        let pitcher_id = fielding.pitcher;
        let batter = self
            .players
            .get(&batter_id)
            .ok_or(LeagueError::PlayerNotFound(batter_id))?;
        let pitcher = self
            .players
            .get(&pitcher_id)
            .ok_or(LeagueError::PlayerNotFound(pitcher_id))?;
        let defenders: Vec<&Player> = fielding
            .batters
            .iter()
            .chain(std::iter::once(&fielding.pitcher))
            .filter_map(|id| self.players.get(id))
            .collect();
        let catcher = defenders
            .iter()
            .copied()
            .find(|p| p.position == Position::Catcher);

        let mut bases = self.bases;
        let mut scored = Vec::new();
        let mut wild_throws = 0;
        while let Some(throw) = resolve_wild_throw(&bases, pitcher, catcher, rng) {
            wild_throws += 1;
            credit(&mut self.deltas, throw.catcher_id)
                .absorb(&fielding_credit(FieldingPlayKind::Error));
            bases = throw.bases;
            scored.extend(throw.scored);
        }

        let at_bat = resolve_at_bat(batter, pitcher, &defenders, &bases, rng);
        let outcome = at_bat.outcome;

        let mut bat = Stats::default();
        let mut arm = Stats::default();
        if outcome.is_at_bat() {
            bat.at_bats = 1;
            arm.at_bats_faced = 1;
        }
        match outcome {
            Outcome::Strikeout => {
                bat.strikeouts = 1;
                arm.strikeouts_allowed = 1;
            }
            Outcome::Walk => {
                bat.walks = 1;
                arm.walks_allowed = 1;
            }
            Outcome::Out => {}
            hit => {
                bat.hits = 1;
                arm.hits_allowed = 1;
                if hit == Outcome::HomeRun {
                    bat.home_runs = 1;
                    arm.home_runs_allowed = 1;
                }
            }
        }
        bat.rbis = at_bat.scored.len() as u32;
        credit(&mut self.deltas, batter_id).absorb(&bat);
        credit(&mut self.deltas, pitcher_id).absorb(&arm);
        if let Some(play) = at_bat.fielding {
            credit(&mut self.deltas, play.fielder_id).absorb(&fielding_credit(play.kind));
        }

        scored.extend(at_bat.scored.iter().copied());
        for runner in scored.iter().filter_map(|o| o.player_id()) {
            credit(&mut self.deltas, runner).runs += 1;
        }
        let runs = scored.len() as u32;
        match half {
            HalfInning::Top => {
                self.away_score += runs;
                self.away_batter = (self.away_batter + 1) % LINEUP_SIZE;
            }
            HalfInning::Bottom => {
                self.home_score += runs;
                self.home_batter = (self.home_batter + 1) % LINEUP_SIZE;
            }
        }
        if outcome.records_out() {
            self.outs += 1;
        }
        self.bases = at_bat.bases;

        let inning = self.inning;
        let outs = self.outs;
        let bases_after = self.bases;
        let walk_off = half == HalfInning::Bottom
            && self.inning > INNING_LIMIT
            && self.home_score > self.away_score;
        let mut half_inning_ended = false;
        if walk_off {
            half_inning_ended = true;
            self.phase = GamePhase::GameOver;
        } else if self.outs >= OUTS_PER_HALF_INNING {
            half_inning_ended = true;
            credit(&mut self.deltas, pitcher_id).innings_pitched += 1;
            match half {
                HalfInning::Top => {
                    self.phase = GamePhase::BottomBatting;
                    self.start_half_inning();
                }
                HalfInning::Bottom => {
                    self.phase = GamePhase::InningAdvance;
                    self.advance_inning();
                }
            }
        }

        Ok(PlayEvent {
            inning,
            half,
            batter_id,
            pitcher_id,
            wild_throws,
            outcome,
            angle: at_bat.angle,
            fielding: at_bat.fielding,
            runs_scored: runs,
            outs,
            bases: bases_after,
            home_score: self.home_score,
            away_score: self.away_score,
            half_inning_ended,
            game_ended: self.is_over(),
        })
    }

    /// Final result once the game is over.
    pub fn into_result(self) -> Result<GameResult, LeagueError> {
        if !self.is_over() {
            return Err(LeagueError::GameInProgress);
        }
        Ok(self.finish())
    }

    fn finish(mut self) -> GameResult {
        let home_won = self.home_score > self.away_score;
        let (winner, loser, winning_pitcher) = if home_won {
            (self.fixture.home_team_id, self.fixture.away_team_id, self.home.pitcher)
        } else {
            (self.fixture.away_team_id, self.fixture.home_team_id, self.away.pitcher)
        };
        if self.home_score.abs_diff(self.away_score) <= SAVE_MARGIN {
            credit(&mut self.deltas, winning_pitcher).saves += 1;
        }
        log::debug!(
            "Final after {}: {} {} - {} {}",
            self.inning,
            self.fixture.away_team_id,
            self.away_score,
            self.home_score,
            self.fixture.home_team_id
        );
        GameResult {
            fixture: self.fixture,
            winner,
            loser,
            home_score: self.home_score,
            away_score: self.away_score,
            innings: self.inning,
            forfeit: false,
            player_stat_deltas: self
                .deltas
                .into_iter()
                .map(|(player_id, delta)| PlayerStatDelta { player_id, delta })
                .collect(),
        }
    }

    fn start_half_inning(&mut self) {
        self.outs = 0;
        self.bases = if !self.is_postseason && self.inning > INNING_LIMIT {
            Bases::with_ghost_runner()
        } else {
            Bases::empty()
        };
    }

    /// Both halves done: end the game if regulation is over and someone leads, else
    /// start the next inning. There is no inning cap.
    fn advance_inning(&mut self) {
        if self.inning >= INNING_LIMIT && self.home_score != self.away_score {
            self.phase = GamePhase::GameOver;
        } else {
            self.inning += 1;
            self.phase = GamePhase::TopBatting;
            self.start_half_inning();
        }
    }
}
