//! Baseball franchise simulator: library with models, simulation logic, persistence and export.

pub mod export;
pub mod logic;
pub mod models;
pub mod store;

pub use export::player_stats_csv;
pub use logic::{
    advance_one_plate_appearance, advance_year, assign_lineup, auto_assign_lineup, derive_lineup,
    generate_schedule, new_league, next_fixture, play_next_game, record_game_result,
    simulate_full_game, standings_table, start_game, GameSession, InvalidLineup, LeagueConfig,
    Lineup, SeasonEvent,
};
pub use models::{
    GameResult, LeagueError, LeagueState, Outcome, PlayEvent, Player, PlayerId, ScheduleEntry,
    Stats, Team, TeamId,
};
pub use store::{ChangeNotice, FranchiseStore, MemoryStore, StoreError};
