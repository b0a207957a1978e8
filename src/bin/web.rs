//! Single binary web server exposing the tournament engine as a JSON API.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! INACTIVITY_TIMEOUT_HOURS, CLEANUP_INTERVAL_MINUTES.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, ResponseError,
};
use chrono::{DateTime, Utc};
use court_planner::{
    activate_next_stage, activate_round, advance_swiss_round, create_match, create_ranking,
    create_round, create_stage_item, delete_match, delete_ranking, delete_round,
    delete_stage_item, import_teams_csv, record_score, recalculate_ranking, reschedule_match,
    schedule_matches, standings, upcoming_matches, update_match, update_ranking,
    update_tournament_defaults,
    CourtId, InputId, MatchFilter, MatchId, MatchUpdate, RankingBody, RankingId,
    RescheduleRequest, RoundId, ServerConfig, StageDirection, StageItemCreate, StageItemId,
    Tournament, TournamentError, TournamentId, TournamentRegistry,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

type AppState = Data<TournamentRegistry>;

#[derive(Debug, Error)]
enum ApiError {
    #[error(transparent)]
    Tournament(#[from] TournamentError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        let ApiError::Tournament(e) = self;
        match e {
            TournamentError::NotFound { .. } | TournamentError::TournamentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            TournamentError::SchedulingInfeasible { .. }
            | TournamentError::CapacityExceeded { .. } => StatusCode::CONFLICT,
            TournamentError::InvalidConfiguration(_)
            | TournamentError::NoMatchesAvailable { .. }
            | TournamentError::InvalidState(_)
            | TournamentError::InvalidImport { .. } => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        })
    }
}

type ApiResult = Result<HttpResponse, ApiError>;

/// Run a mutation against one tournament and answer with the updated tournament.
async fn mutate<T>(
    state: &AppState,
    id: TournamentId,
    op: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
) -> ApiResult {
    let tournament = state
        .with_tournament(id, |t| {
            op(t)?;
            Ok(t.clone())
        })
        .await?;
    Ok(HttpResponse::Ok().json(tournament))
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    start_time: DateTime<Utc>,
    #[serde(default = "default_duration_minutes")]
    duration_minutes: i64,
    #[serde(default = "default_margin_minutes")]
    margin_minutes: i64,
}

fn default_duration_minutes() -> i64 {
    15
}

fn default_margin_minutes() -> i64 {
    5
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct DefaultsBody {
    start_time: DateTime<Utc>,
    duration_minutes: i64,
    margin_minutes: i64,
}

#[derive(Deserialize)]
struct ActivateStageBody {
    #[serde(default)]
    direction: StageDirection,
}

#[derive(Deserialize, Default)]
struct AdjustBody {
    #[serde(default)]
    adjust_to_time: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct CreateMatchBody {
    round_id: RoundId,
    input_1: InputId,
    input_2: InputId,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_1: u32,
    score_2: u32,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct StageItemPath {
    id: TournamentId,
    stage_item_id: StageItemId,
}

#[derive(Deserialize)]
struct RoundPath {
    id: TournamentId,
    round_id: RoundId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: TournamentId,
    match_id: MatchId,
}

#[derive(Deserialize)]
struct RankingPath {
    id: TournamentId,
    ranking_id: RankingId,
}

#[get("/api/health")]
async fn api_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true, "service": "court-planner" }))
}

/// Create a new tournament (returns it with id; client stores id for subsequent requests).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<CreateTournamentBody>) -> ApiResult {
    let body = body.into_inner();
    let tournament = Tournament::new(
        body.name,
        body.start_time,
        body.duration_minutes,
        body.margin_minutes,
    )?;
    let id = state.insert(tournament).await;
    Ok(HttpResponse::Ok().json(state.get(id).await?))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    Ok(HttpResponse::Ok().json(state.get(path.id).await?))
}

#[put("/api/tournaments/{id}/defaults")]
async fn api_update_defaults(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<DefaultsBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| {
        update_tournament_defaults(t, body.start_time, body.duration_minutes, body.margin_minutes)
    })
    .await
}

#[post("/api/tournaments/{id}/courts")]
async fn api_add_court(state: AppState, path: Path<TournamentPath>, body: Json<NameBody>) -> ApiResult {
    mutate(&state, path.id, |t| Ok::<CourtId, TournamentError>(t.add_court(body.name.trim()))).await
}

#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(state: AppState, path: Path<TournamentPath>, body: Json<NameBody>) -> ApiResult {
    mutate(&state, path.id, |t| Ok::<_, TournamentError>(t.add_team(body.name.trim()))).await
}

/// Import teams from a CSV body with a `name` header.
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(state: AppState, path: Path<TournamentPath>, body: String) -> ApiResult {
    mutate(&state, path.id, |t| import_teams_csv(t, body.as_bytes())).await
}

#[post("/api/tournaments/{id}/stages")]
async fn api_add_stage(state: AppState, path: Path<TournamentPath>, body: Json<NameBody>) -> ApiResult {
    mutate(&state, path.id, |t| Ok::<_, TournamentError>(t.add_stage(body.name.trim()))).await
}

#[post("/api/tournaments/{id}/stages/activate")]
async fn api_activate_stage(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<ActivateStageBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| activate_next_stage(t, body.direction)).await
}

/// Schedule matches left unplaced because no court existed when they were created.
#[post("/api/tournaments/{id}/schedule_matches")]
async fn api_schedule_matches(state: AppState, path: Path<TournamentPath>) -> ApiResult {
    mutate(&state, path.id, schedule_matches).await
}

#[post("/api/tournaments/{id}/rankings")]
async fn api_create_ranking(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<RankingBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| Ok::<_, TournamentError>(create_ranking(t, &body))).await
}

#[put("/api/tournaments/{id}/rankings/{ranking_id}")]
async fn api_update_ranking(
    state: AppState,
    path: Path<RankingPath>,
    body: Json<RankingBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| update_ranking(t, path.ranking_id, &body)).await
}

#[delete("/api/tournaments/{id}/rankings/{ranking_id}")]
async fn api_delete_ranking(state: AppState, path: Path<RankingPath>) -> ApiResult {
    mutate(&state, path.id, |t| delete_ranking(t, path.ranking_id)).await
}

#[post("/api/tournaments/{id}/stage_items")]
async fn api_create_stage_item(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<StageItemCreate>,
) -> ApiResult {
    mutate(&state, path.id, |t| create_stage_item(t, &body)).await
}

#[delete("/api/tournaments/{id}/stage_items/{stage_item_id}")]
async fn api_delete_stage_item(state: AppState, path: Path<StageItemPath>) -> ApiResult {
    mutate(&state, path.id, |t| delete_stage_item(t, path.stage_item_id)).await
}

#[get("/api/tournaments/{id}/stage_items/{stage_item_id}/standings")]
async fn api_standings(state: AppState, path: Path<StageItemPath>) -> ApiResult {
    let rows = state
        .with_tournament(path.id, |t| standings(t, path.stage_item_id))
        .await?;
    Ok(HttpResponse::Ok().json(rows))
}

#[post("/api/tournaments/{id}/stage_items/{stage_item_id}/recalculate")]
async fn api_recalculate(state: AppState, path: Path<StageItemPath>) -> ApiResult {
    mutate(&state, path.id, |t| recalculate_ranking(t, path.stage_item_id)).await
}

#[get("/api/tournaments/{id}/stage_items/{stage_item_id}/upcoming_matches")]
async fn api_upcoming_matches(
    state: AppState,
    path: Path<StageItemPath>,
    filter: Query<MatchFilter>,
) -> ApiResult {
    let suggestions = state
        .with_tournament(path.id, |t| upcoming_matches(t, path.stage_item_id, &filter))
        .await?;
    Ok(HttpResponse::Ok().json(suggestions))
}

#[post("/api/tournaments/{id}/stage_items/{stage_item_id}/start_next_round")]
async fn api_start_next_round(
    state: AppState,
    path: Path<StageItemPath>,
    filter: Query<MatchFilter>,
    body: Option<Json<AdjustBody>>,
) -> ApiResult {
    let adjust_to_time = body.and_then(|b| b.adjust_to_time);
    mutate(&state, path.id, |t| {
        advance_swiss_round(t, path.stage_item_id, adjust_to_time, &filter)
    })
    .await
}

#[post("/api/tournaments/{id}/stage_items/{stage_item_id}/rounds")]
async fn api_create_round(state: AppState, path: Path<StageItemPath>) -> ApiResult {
    mutate(&state, path.id, |t| create_round(t, path.stage_item_id)).await
}

#[post("/api/tournaments/{id}/rounds/{round_id}/activate")]
async fn api_activate_round(
    state: AppState,
    path: Path<RoundPath>,
    body: Option<Json<AdjustBody>>,
) -> ApiResult {
    let adjust_to_time = body.and_then(|b| b.adjust_to_time);
    mutate(&state, path.id, |t| activate_round(t, path.round_id, adjust_to_time)).await
}

#[delete("/api/tournaments/{id}/rounds/{round_id}")]
async fn api_delete_round(state: AppState, path: Path<RoundPath>) -> ApiResult {
    mutate(&state, path.id, |t| delete_round(t, path.round_id)).await
}

#[post("/api/tournaments/{id}/matches")]
async fn api_create_match(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<CreateMatchBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| {
        create_match(t, body.round_id, body.input_1, body.input_2)
    })
    .await
}

#[delete("/api/tournaments/{id}/matches/{match_id}")]
async fn api_delete_match(state: AppState, path: Path<MatchPath>) -> ApiResult {
    mutate(&state, path.id, |t| delete_match(t, path.match_id)).await
}

#[put("/api/tournaments/{id}/matches/{match_id}")]
async fn api_update_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<MatchUpdate>,
) -> ApiResult {
    mutate(&state, path.id, |t| update_match(t, path.match_id, &body)).await
}

#[put("/api/tournaments/{id}/matches/{match_id}/score")]
async fn api_record_score(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<ScoreBody>,
) -> ApiResult {
    mutate(&state, path.id, |t| {
        record_score(t, path.match_id, body.score_1, body.score_2)
    })
    .await
}

#[post("/api/tournaments/{id}/matches/{match_id}/reschedule")]
async fn api_reschedule_match(
    state: AppState,
    path: Path<MatchPath>,
    body: Json<RescheduleRequest>,
) -> ApiResult {
    mutate(&state, path.id, |t| reschedule_match(t, path.match_id, &body)).await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let registry = TournamentRegistry::new();

    // Background task: periodically remove tournaments that have been inactive too long
    let cleanup_registry = registry.clone();
    let (interval, timeout) = (config.cleanup_interval, config.inactivity_timeout);
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(interval);
        loop {
            interval.tick().await;
            cleanup_registry.remove_inactive(timeout).await;
        }
    });

    let state = Data::new(registry);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(actix_web::middleware::Logger::default())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_update_defaults)
            .service(api_add_court)
            .service(api_add_team)
            .service(api_import_teams)
            .service(api_add_stage)
            .service(api_activate_stage)
            .service(api_schedule_matches)
            .service(api_create_ranking)
            .service(api_update_ranking)
            .service(api_delete_ranking)
            .service(api_create_stage_item)
            .service(api_delete_stage_item)
            .service(api_standings)
            .service(api_recalculate)
            .service(api_upcoming_matches)
            .service(api_start_next_round)
            .service(api_create_round)
            .service(api_activate_round)
            .service(api_delete_round)
            .service(api_create_match)
            .service(api_delete_match)
            .service(api_update_match)
            .service(api_record_score)
            .service(api_reschedule_match)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
