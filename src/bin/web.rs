//! Bracket engine web server: JSON API over the in-memory bracket registry.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, BRACKET_IDLE_HOURS.

use actix_web::{
    get, post, put,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use bracket_engine::{
    read_roster, BracketError, BracketId, BracketRegistry, BracketType, MatchId, Participant,
    ParticipantId, SeedingMethod,
};
use serde::Deserialize;
use std::time::Duration;

type AppState = Data<BracketRegistry>;

/// How often idle brackets are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct ParticipantBody {
    #[serde(default)]
    id: Option<ParticipantId>,
    name: String,
}

#[derive(Deserialize)]
struct CreateBracketBody {
    participants: Vec<ParticipantBody>,
    #[serde(default)]
    bracket_type: BracketType,
    #[serde(default)]
    seeding: SeedingMethod,
    #[serde(default)]
    third_place_match: bool,
}

/// Seeding choice for CSV imports; manual seeds come from the file.
#[derive(Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ImportSeeding {
    #[default]
    RegistrationOrder,
    Random,
    Manual,
}

#[derive(Deserialize)]
struct ImportQuery {
    #[serde(default)]
    bracket_type: BracketType,
    #[serde(default)]
    seeding: ImportSeeding,
    #[serde(default)]
    third_place_match: bool,
}

#[derive(Deserialize)]
struct ReportResultBody {
    winner_id: ParticipantId,
    #[serde(default)]
    score_1: Option<u32>,
    #[serde(default)]
    score_2: Option<u32>,
}

/// Path segment: bracket id (e.g. /api/brackets/{id})
#[derive(Deserialize)]
struct BracketPath {
    id: BracketId,
}

/// Path segments: bracket id and match id (e.g. /api/brackets/{id}/matches/{match_id})
#[derive(Deserialize)]
struct BracketMatchPath {
    id: BracketId,
    match_id: MatchId,
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        BracketError::BracketNotFound(_)
        | BracketError::MatchNotFound(_)
        | BracketError::ParticipantNotFound(_) => HttpResponse::NotFound().json(body),
        BracketError::MatchAlreadyComplete(_) => HttpResponse::Conflict().json(body),
        BracketError::SlotOccupied(_) => HttpResponse::InternalServerError().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-engine",
    })
}

/// Create a bracket from a JSON roster.
#[post("/api/brackets")]
async fn api_create_bracket(state: AppState, body: Json<CreateBracketBody>) -> HttpResponse {
    let body = body.into_inner();
    let roster: Vec<Participant> = body
        .participants
        .into_iter()
        .map(|p| match p.id {
            Some(id) => Participant::with_id(id, p.name.trim()),
            None => Participant::new(p.name.trim()),
        })
        .collect();
    match state.create_bracket(roster, body.bracket_type, &body.seeding, body.third_place_match) {
        Ok(bracket) => HttpResponse::Created().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Create a bracket from a CSV roster (`name[,seed][,id]` with a header row).
#[post("/api/brackets/import")]
async fn api_import_bracket(
    state: AppState,
    query: Query<ImportQuery>,
    body: String,
) -> HttpResponse {
    let roster = match read_roster(body.as_bytes()) {
        Ok(roster) => roster,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() }))
        }
    };
    let seeding = match query.seeding {
        ImportSeeding::RegistrationOrder => SeedingMethod::RegistrationOrder,
        ImportSeeding::Random => SeedingMethod::Random,
        ImportSeeding::Manual => roster.manual_seeding(),
    };
    match state.create_bracket(
        roster.participants,
        query.bracket_type,
        &seeding,
        query.third_place_match,
    ) {
        Ok(bracket) => HttpResponse::Created().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Get a bracket by id (404 if not found).
#[get("/api/brackets/{id}")]
async fn api_get_bracket(state: AppState, path: Path<BracketPath>) -> HttpResponse {
    match state.get(path.id) {
        Ok(bracket) => HttpResponse::Ok().json(bracket),
        Err(e) => error_response(&e),
    }
}

/// Mark a READY match as in progress.
#[post("/api/brackets/{id}/matches/{match_id}/start")]
async fn api_start_match(state: AppState, path: Path<BracketMatchPath>) -> HttpResponse {
    match state.start_match(path.id, path.match_id) {
        Ok(events) => HttpResponse::Ok().json(serde_json::json!({ "events": events })),
        Err(e) => error_response(&e),
    }
}

/// Report the result of a match; returns the updated match and emitted events.
#[put("/api/brackets/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    path: Path<BracketMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    match state.report_result(path.id, path.match_id, body.winner_id, body.score_1, body.score_2) {
        Ok(report) => HttpResponse::Ok().json(serde_json::json!({
            "match": report.updated_match,
            "events": report.events,
            "bracket_completed": report.bracket_completed,
            "duplicate": report.duplicate,
        })),
        Err(e) => error_response(&e),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_idle_hours() -> u64 {
    12
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let idle_hours: u64 = std::env::var("BRACKET_IDLE_HOURS")
        .ok()
        .and_then(|h| h.parse().ok())
        .unwrap_or_else(default_idle_hours);
    let idle_timeout = Duration::from_secs(idle_hours.saturating_mul(3600));
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(BracketRegistry::new());

    // Background task: periodically remove idle brackets that are not in progress
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = state_cleanup.remove_inactive(idle_timeout);
            if removed > 0 {
                log::info!(
                    "Cleaned up {} inactive bracket(s) (no activity for {}h)",
                    removed,
                    idle_hours
                );
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_bracket)
            .service(api_import_bracket)
            .service(api_get_bracket)
            .service(api_start_match)
            .service(api_report_result)
    })
    .bind(bind)?
    .run()
    .await
}
