//! Single binary web API for the franchise simulator.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Set SIM_SEED to a number for reproducible simulations.
//!
//! The franchise a browser is playing is remembered in a signed session cookie.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use franchise_sim::logic::start_postseason;
use franchise_sim::{
    advance_one_plate_appearance, advance_year, assign_lineup, auto_assign_lineup, new_league,
    next_fixture, play_next_game, player_stats_csv, record_game_result, standings_table,
    start_game, FranchiseStore, GameResult, GameSession, LeagueConfig, LeagueError, LeagueState,
    MemoryStore, PlayEvent, PlayerId, SeasonEvent, StoreError, TeamId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// Session cookie field holding the franchise key.
const FRANCHISE_COOKIE_FIELD: &str = "franchise";

/// Inactivity threshold: live games and franchises untouched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// A stepped game in progress + last activity time (for auto-cleanup).
struct LiveGame {
    session: GameSession,
    last_activity: Instant,
}

struct AppData {
    store: MemoryStore,
    /// At most one live game per franchise key.
    live: RwLock<HashMap<String, LiveGame>>,
    rng: Mutex<StdRng>,
}

type AppState = Data<AppData>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StandingRow {
    team_id: TeamId,
    name: String,
    wins: u32,
    losses: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GamePlayedResponse {
    result: GameResult,
    event: SeasonEvent,
    year: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepResponse {
    play: PlayEvent,
    game: GameSession,
    /// Present on the step that ends the game.
    result: Option<GameResult>,
    season_event: Option<SeasonEvent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineupBody {
    batting_order: Vec<PlayerId>,
    starting_pitcher: PlayerId,
}

/// Path segment: team id (e.g. /api/franchise/teams/{team_id}/lineup)
#[derive(Deserialize)]
struct TeamPath {
    team_id: TeamId,
}

fn bad_request(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
}

fn store_failure(e: StoreError) -> HttpResponse {
    match e {
        StoreError::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({ "error": "No franchise" })),
        other => {
            log::error!("Store failure: {}", other);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": other.to_string() }))
        }
    }
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

/// Franchise key from the session cookie, or the response to send instead.
fn franchise_key(session: &Session) -> Result<String, HttpResponse> {
    match session.get::<String>(FRANCHISE_COOKIE_FIELD) {
        Ok(Some(key)) => Ok(key),
        Ok(None) => Err(HttpResponse::NotFound().json(serde_json::json!({ "error": "No franchise" }))),
        Err(_) => Err(bad_request("Unreadable session cookie")),
    }
}

/// Load the session's franchise: its key and state.
fn load_franchise(state: &AppState, session: &Session) -> Result<(String, LeagueState), HttpResponse> {
    let key = franchise_key(session)?;
    let league = state.store.load(&key).map_err(store_failure)?;
    Ok((key, league))
}

fn has_live_game(state: &AppState, key: &str) -> Result<bool, HttpResponse> {
    let g = state.live.read().map_err(|_| lock_error())?;
    Ok(g.contains_key(key))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "franchise-sim",
    })
}

/// Create a new franchise and remember it in the session cookie.
#[post("/api/franchise")]
async fn api_create_franchise(
    state: AppState,
    session: Session,
    body: Option<Json<LeagueConfig>>,
) -> HttpResponse {
    let config = body.map(|b| b.into_inner()).unwrap_or_default();
    let league = {
        let mut rng = match state.rng.lock() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        match new_league(&config, &mut *rng) {
            Ok(league) => league,
            Err(e) => return bad_request(e),
        }
    };
    let key = Uuid::new_v4().to_string();
    if let Err(e) = state.store.save(&key, &league) {
        return store_failure(e);
    }
    if session.insert(FRANCHISE_COOKIE_FIELD, &key).is_err() {
        return HttpResponse::InternalServerError().body("session error");
    }
    log::info!("Created franchise {}", key);
    HttpResponse::Ok().json(&league)
}

#[get("/api/franchise")]
async fn api_get_franchise(state: AppState, session: Session) -> HttpResponse {
    match load_franchise(&state, &session) {
        Ok((_, league)) => HttpResponse::Ok().json(&league),
        Err(resp) => resp,
    }
}

/// Regular-season standings, best record first.
#[get("/api/franchise/standings")]
async fn api_standings(state: AppState, session: Session) -> HttpResponse {
    let (_, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let rows: Vec<StandingRow> = standings_table(&league)
        .into_iter()
        .map(|s| StandingRow {
            team_id: s.team_id,
            name: league.teams.get(&s.team_id).map(|t| t.name.clone()).unwrap_or_default(),
            wins: s.wins,
            losses: s.losses,
        })
        .collect();
    HttpResponse::Ok().json(rows)
}

/// Simulate the next fixture in one go.
#[post("/api/franchise/games/next")]
async fn api_play_next_game(state: AppState, session: Session) -> HttpResponse {
    let (key, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match has_live_game(&state, &key) {
        Ok(true) => return bad_request(LeagueError::GameInProgress),
        Ok(false) => {}
        Err(resp) => return resp,
    }
    let played = {
        let mut rng = match state.rng.lock() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        play_next_game(&league, &mut *rng)
    };
    let (next, result, event) = match played {
        Ok(v) => v,
        Err(e) => return bad_request(e),
    };
    if let Err(e) = state.store.save(&key, &next) {
        return store_failure(e);
    }
    HttpResponse::Ok().json(GamePlayedResponse {
        result,
        event,
        year: next.year,
    })
}

/// Start (or resume) a stepped game for the next fixture.
#[post("/api/franchise/games/live")]
async fn api_start_live_game(state: AppState, session: Session) -> HttpResponse {
    let (key, mut league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut live = match state.live.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Some(entry) = live.get_mut(&key) {
        entry.last_activity = Instant::now();
        return HttpResponse::Ok().json(&entry.session);
    }
    if !league.is_postseason && league.regular_season_complete() {
        league = match start_postseason(&league) {
            Ok(next) => next,
            Err(e) => return bad_request(e),
        };
        if let Err(e) = state.store.save(&key, &league) {
            return store_failure(e);
        }
    }
    let (fixture, postseason) = match next_fixture(&league) {
        Some(next) => next,
        None => return bad_request(LeagueError::NoFixtureRemaining),
    };
    let game = match start_game(fixture, &league, postseason) {
        Ok(game) => game,
        Err(reason) => return bad_request(reason),
    };
    let body = HttpResponse::Ok().json(&game);
    live.insert(
        key,
        LiveGame {
            session: game,
            last_activity: Instant::now(),
        },
    );
    body
}

/// Play one plate appearance of the live game. The final step records the result.
#[post("/api/franchise/games/live/step")]
async fn api_step_live_game(state: AppState, session: Session) -> HttpResponse {
    let (key, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut live = match state.live.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let Some(entry) = live.get_mut(&key) else {
        return HttpResponse::NotFound().json(serde_json::json!({ "error": "No live game" }));
    };
    let mut rng = match state.rng.lock() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let step = step_live_game(entry, &league, &mut *rng, |next| {
        state.store.save(&key, next).map(|_| ())
    });
    let response = match step {
        Ok(response) => response,
        Err(resp) => return resp,
    };
    if response.result.is_some() {
        live.remove(&key);
    }
    HttpResponse::Ok().json(response)
}

/// Play one plate appearance of `live`. The stored session only moves forward once the
/// step is fully applied, so a failed record or save leaves the game retryable.
fn step_live_game<R: Rng + ?Sized>(
    live: &mut LiveGame,
    league: &LeagueState,
    rng: &mut R,
    save: impl FnOnce(&LeagueState) -> Result<(), StoreError>,
) -> Result<StepResponse, HttpResponse> {
    let (game, play) = advance_one_plate_appearance(&live.session, rng).map_err(bad_request)?;
    live.last_activity = Instant::now();
    if !game.is_over() {
        live.session = game.clone();
        return Ok(StepResponse {
            play,
            game,
            result: None,
            season_event: None,
        });
    }

    let result = game.clone().into_result().map_err(bad_request)?;
    let (next, event) =
        record_game_result(league, result.fixture, &result, rng).map_err(bad_request)?;
    save(&next).map_err(store_failure)?;
    live.session = game.clone();
    Ok(StepResponse {
        play,
        game,
        result: Some(result),
        season_event: Some(event),
    })
}

/// Set a team's batting order and starting pitcher by hand.
#[put("/api/franchise/teams/{team_id}/lineup")]
async fn api_set_lineup(
    state: AppState,
    session: Session,
    path: Path<TeamPath>,
    body: Json<LineupBody>,
) -> HttpResponse {
    let (key, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match assign_lineup(&league, path.team_id, &body.batting_order, body.starting_pitcher) {
        Ok(next) => match state.store.save(&key, &next) {
            Ok(_) => HttpResponse::Ok().json(&next),
            Err(e) => store_failure(e),
        },
        Err(LeagueError::TeamNotFound(_)) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Team not found" }))
        }
        Err(e) => bad_request(e),
    }
}

/// Let the club pick its own lineup.
#[post("/api/franchise/teams/{team_id}/lineup/auto")]
async fn api_auto_lineup(state: AppState, session: Session, path: Path<TeamPath>) -> HttpResponse {
    let (key, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match auto_assign_lineup(&league, path.team_id) {
        Ok(next) => match state.store.save(&key, &next) {
            Ok(_) => HttpResponse::Ok().json(&next),
            Err(e) => store_failure(e),
        },
        Err(LeagueError::TeamNotFound(_)) => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": "Team not found" }))
        }
        Err(e) => bad_request(e),
    }
}

/// Skip the rest of the season and roll into the next year. Drops any live game.
#[post("/api/franchise/advance-year")]
async fn api_advance_year(state: AppState, session: Session) -> HttpResponse {
    let (key, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let next = {
        let mut rng = match state.rng.lock() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        match advance_year(&league, &mut *rng) {
            Ok(next) => next,
            Err(e) => return bad_request(e),
        }
    };
    if let Ok(mut live) = state.live.write() {
        live.remove(&key);
    }
    match state.store.save(&key, &next) {
        Ok(_) => HttpResponse::Ok().json(&next),
        Err(e) => store_failure(e),
    }
}

/// Season stats for every player as a CSV download.
#[get("/api/franchise/stats.csv")]
async fn api_stats_csv(state: AppState, session: Session) -> HttpResponse {
    let (_, league) = match load_franchise(&state, &session) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match player_stats_csv(&league) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"stats-year-{}.csv\"", league.year),
            ))
            .body(body),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({ "error": e.to_string() })),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn simulation_rng() -> StdRng {
    match std::env::var("SIM_SEED").ok().and_then(|s| s.parse::<u64>().ok()) {
        Some(seed) => {
            log::info!("Seeding simulation with SIM_SEED={}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(AppData {
        store: MemoryStore::new(),
        live: RwLock::new(HashMap::new()),
        rng: Mutex::new(simulation_rng()),
    });

    // Background task: log every franchise write
    let mut changes = state.store.subscribe();
    actix_web::rt::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(notice) => log::debug!("Franchise {} saved at {}", notice.key, notice.updated_at),
                Err(RecvError::Lagged(missed)) => log::debug!("Missed {} franchise change notices", missed),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Background task: every 30 minutes, remove live games and franchises inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            if let Ok(mut g) = state_cleanup.live.write() {
                let before = g.len();
                g.retain(|_, entry| entry.last_activity.elapsed() < INACTIVITY_TIMEOUT);
                let removed = before - g.len();
                if removed > 0 {
                    log::info!("Cleaned up {} inactive live game(s) (no activity for 12h)", removed);
                }
            }
            let cutoff = chrono::Duration::from_std(INACTIVITY_TIMEOUT)
                .map(|timeout| Utc::now() - timeout);
            if let Ok(cutoff) = cutoff {
                match state_cleanup.store.prune_before(cutoff) {
                    Ok(0) => {}
                    Ok(removed) => log::info!("Cleaned up {} inactive franchise(s) (no activity for 12h)", removed),
                    Err(e) => log::warn!("Franchise cleanup failed: {}", e),
                }
            }
        }
    });

    let key = Key::generate();
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware::new(CookieSessionStore::default(), key.clone()))
            .service(api_health)
            .service(api_create_franchise)
            .service(api_get_franchise)
            .service(api_standings)
            .service(api_play_next_game)
            .service(api_start_live_game)
            .service(api_step_live_game)
            .service(api_set_lineup)
            .service(api_auto_lineup)
            .service(api_advance_year)
            .service(api_stats_csv)
    })
    .bind(bind)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn failed_save_keeps_the_final_step_retryable() {
        let mut rng = ChaCha8Rng::seed_from_u64(31);
        let league = new_league(&LeagueConfig::with_team_count(2), &mut rng).unwrap();
        let (fixture, postseason) = next_fixture(&league).unwrap();
        let mut live = LiveGame {
            session: start_game(fixture, &league, postseason).unwrap(),
            last_activity: Instant::now(),
        };

        // Step until the next plate appearance would end the game.
        loop {
            let mut lookahead = rng.clone();
            let (next, _) = advance_one_plate_appearance(&live.session, &mut lookahead).unwrap();
            if next.is_over() {
                break;
            }
            let step = step_live_game(&mut live, &league, &mut rng, |_| Ok(())).unwrap();
            assert!(step.result.is_none());
        }

        let before = live.session.clone();
        let failed = step_live_game(&mut live, &league, &mut rng, |_| Err(StoreError::LockPoisoned));
        match failed {
            Err(resp) => assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR),
            Ok(_) => panic!("save failure was swallowed"),
        }
        assert_eq!(live.session, before);
        assert!(!live.session.is_over());

        let mut saved = None;
        loop {
            let step = step_live_game(&mut live, &league, &mut rng, |next| {
                saved = Some(next.clone());
                Ok(())
            })
            .unwrap();
            if step.result.is_some() {
                assert!(step.season_event.is_some());
                break;
            }
        }
        assert_eq!(saved.map(|s| s.game_index), Some(1));
    }
}
