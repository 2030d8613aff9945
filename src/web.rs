use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use actix_web::http::StatusCode;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError, Result};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assign::{
    assign_single_roster, parse_time_window, DualTeamSolver, Participant, PoolKind, Seat, Status, Vacancies,
    TEAM_SLOTS,
};
use crate::config::Config;
use crate::error::{AssignError, OverrideRejection};
use crate::event::Event;
use crate::profile::{normalize_preferences, ProfileBook};
use crate::roles::Role;
use crate::store::{AssignmentStore, ShuffleStore};

pub struct AppState {
    pub events: Mutex<HashMap<String, Event>>,
    pub profiles: Mutex<ProfileBook>,
    pub assignments: AssignmentStore,
    pub shuffles: ShuffleStore,
    pub config: Config,
    next_event: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            events: Mutex::new(HashMap::new()),
            profiles: Mutex::new(ProfileBook::new()),
            assignments: AssignmentStore::new(),
            shuffles: ShuffleStore::new(),
            config,
            next_event: AtomicU64::new(1),
        }
    }

    fn authorized(&self, req: &HttpRequest) -> bool {
        let password = req
            .headers()
            .get("X-Admin-Password")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        password == self.config.admin_password
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResponseError for AssignError {
    fn status_code(&self) -> StatusCode {
        match self {
            AssignError::InsufficientParticipants { .. } | AssignError::NoFeasibleAssignment { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AssignError::SearchTimedOut { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AssignError::SlotAlreadyFilled(_) | AssignError::AlreadySeated(_) | AssignError::AlreadyJoined(_) => {
                StatusCode::CONFLICT
            }
            AssignError::InvalidOverride { .. } | AssignError::ProfileNotSet(_) => StatusCode::BAD_REQUEST,
            AssignError::UnknownAssignment(_) | AssignError::UnknownEvent(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({"success": false, "error": self.to_string()}))
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({"success": false, "error": "Unauthorized"}))
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    summary: String,
    #[serde(default)]
    start_time: String,
    #[serde(default)]
    notes: String,
    limit: Option<u32>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    participant_id: String,
    name: String,
    status: Status,
    #[serde(default)]
    roles: Vec<String>,
    time: Option<String>,
}

#[derive(Deserialize)]
pub struct ProfileRequest {
    roles: Vec<String>,
}

#[derive(Deserialize)]
pub struct PickRequest {
    role: String,
    participant_id: String,
}

#[derive(Deserialize)]
pub struct FillRequest {
    role: Role,
    participant_id: String,
    name: String,
}

#[derive(Deserialize)]
pub struct JoinRequest {
    participant_id: String,
    name: String,
}

#[derive(Serialize)]
pub struct HeadcountResponse {
    success: bool,
    headcount: String,
}

// Event creation endpoint
async fn create_event(
    req: HttpRequest,
    body: web::Json<CreateEventRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.authorized(&req) {
        return Ok(unauthorized());
    }
    let body = body.into_inner();
    let id = format!("evt-{}", state.next_event.fetch_add(1, Ordering::Relaxed));
    let mut event = Event::new(id.clone(), body.summary);
    event.start_time = body.start_time;
    event.notes = body.notes;
    event.limit = body.limit;
    lock(&state.events).insert(id.clone(), event);
    info!(event = %id, "event opened");

    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "event_id": id})))
}

async fn set_profile(
    participant_id: web::Path<String>,
    body: web::Json<ProfileRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let roles = normalize_preferences(body.roles.iter().map(String::as_str));
    lock(&state.profiles).set(participant_id.into_inner(), roles.clone());
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "roles": roles})))
}

async fn register(
    event_id: web::Path<String>,
    body: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let mut events = lock(&state.events);
    let event = events
        .get_mut(event_id.as_str())
        .ok_or_else(|| AssignError::UnknownEvent(event_id.to_string()))?;

    if body.status == Status::Withdrawn {
        event.withdraw(&body.participant_id);
    } else {
        let now = Utc::now();
        let time_window = (body.status == Status::Temporary).then(|| parse_time_window(body.time.as_deref().unwrap_or("")));
        let participant = Participant {
            id: body.participant_id,
            name: body.name,
            preferences: normalize_preferences(body.roles.iter().map(String::as_str)),
            signed_up_at: now,
            status: body.status,
            time_window,
        };
        let profiles = lock(&state.profiles);
        event.register(participant, &*profiles, now)?;
    }

    Ok(HttpResponse::Ok().json(HeadcountResponse {
        success: true,
        headcount: event.headcount_label(),
    }))
}

async fn withdraw(path: web::Path<(String, String)>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let (event_id, participant_id) = path.into_inner();
    let mut events = lock(&state.events);
    let event = events
        .get_mut(&event_id)
        .ok_or_else(|| AssignError::UnknownEvent(event_id.clone()))?;
    let removed = event.withdraw(&participant_id);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "removed": removed,
        "headcount": event.headcount_label(),
    })))
}

// Admin priority pick endpoint
async fn set_pick(
    req: HttpRequest,
    event_id: web::Path<String>,
    body: web::Json<PickRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.authorized(&req) {
        return Ok(unauthorized());
    }
    let role: Role = body.role.parse().map_err(|_| AssignError::InvalidOverride {
        role: body.role.clone(),
        participant_id: body.participant_id.clone(),
        reason: OverrideRejection::UnknownRole,
    })?;
    let mut events = lock(&state.events);
    let event = events
        .get_mut(event_id.as_str())
        .ok_or_else(|| AssignError::UnknownEvent(event_id.to_string()))?;
    event.set_priority_pick(role, body.participant_id.clone());
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "priority_picks": event.priority_picks})))
}

// Admin single-roster endpoint; closes the event
async fn assign_event(
    req: HttpRequest,
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.authorized(&req) {
        return Ok(unauthorized());
    }
    let event_id = event_id.into_inner();
    let event = lock(&state.events)
        .remove(&event_id)
        .ok_or_else(|| AssignError::UnknownEvent(event_id.clone()))?;

    let pool = event.pool(PoolKind::Roster);
    let assignment = assign_single_roster(&pool, &event.priority_picks);
    state.assignments.insert(event_id.clone(), assignment.clone());
    info!(event = %event_id, missing = assignment.missing_roles().len(), "roster published");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "assignment_id": event_id,
        "summary": event.summary,
        "assignment": assignment,
    })))
}

// Admin team split endpoint; closes the event once a split is found
async fn shuffle_event(
    req: HttpRequest,
    event_id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    if !state.authorized(&req) {
        return Ok(unauthorized());
    }
    let event_id = event_id.into_inner();
    let (pool, picks) = {
        let events = lock(&state.events);
        let event = events
            .get(&event_id)
            .ok_or_else(|| AssignError::UnknownEvent(event_id.clone()))?;
        (event.pool(PoolKind::Teams), event.priority_picks.clone())
    };
    if pool.len() < TEAM_SLOTS {
        return Err(AssignError::InsufficientParticipants {
            required: TEAM_SLOTS,
            available: pool.len(),
        }
        .into());
    }

    let budget = state.config.solver_timeout;
    let solver = DualTeamSolver::new(state.config.solver_attempts).with_time_budget(budget);
    // The solver stops itself at `budget`; the outer timeout only guards the blocking pool
    let search = web::block(move || solver.solve(&pool, &picks, &mut StdRng::from_entropy()));
    let solution = match tokio::time::timeout(budget * 2, search).await {
        Ok(joined) => joined.map_err(actix_web::error::ErrorInternalServerError)??,
        Err(_) => {
            warn!(event = %event_id, "team search abandoned");
            return Err(AssignError::SearchTimedOut { attempts: 0 }.into());
        }
    };

    lock(&state.events).remove(&event_id);
    state.shuffles.insert(event_id.clone(), solution.teams.clone());

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "shuffle_id": event_id,
        "teams": solution.teams,
        "stats": solution.stats,
    })))
}

async fn get_assignment(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let assignment = state
        .assignments
        .get(&id)
        .ok_or_else(|| AssignError::UnknownAssignment(id.to_string()))?;
    Ok(HttpResponse::Ok().json(assignment))
}

// Late arrival claims an open role
async fn fill_role(
    id: web::Path<String>,
    body: web::Json<FillRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let claimant = Seat::late_join(body.participant_id, body.name);
    let assignment = state.assignments.update(&id, |assignment| {
        assignment.claim(body.role, claimant)?;
        Ok(assignment.clone())
    })?;
    Ok(HttpResponse::Ok().json(assignment))
}

async fn get_shuffle(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let teams = state
        .shuffles
        .get(&id)
        .ok_or_else(|| AssignError::UnknownAssignment(id.to_string()))?;
    Ok(HttpResponse::Ok().json(teams))
}

async fn join_substitutes(
    id: web::Path<String>,
    body: web::Json<JoinRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let teams = state.shuffles.update(&id, |teams| {
        teams.join_substitutes(Seat::late_join(body.participant_id, body.name))?;
        Ok(teams.clone())
    })?;
    Ok(HttpResponse::Ok().json(teams))
}

// Admin cleanup of finished team splits
async fn cleanup_shuffles(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse> {
    if !state.authorized(&req) {
        return Ok(unauthorized());
    }
    let removed = state.shuffles.drain().len();
    info!(removed, "team splits cleaned up");
    Ok(HttpResponse::Ok().json(serde_json::json!({"success": true, "removed": removed})))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/events", web::post().to(create_event))
        .route("/api/profiles/{participant_id}", web::put().to(set_profile))
        .route("/api/events/{id}/participants", web::post().to(register))
        .route("/api/events/{id}/participants/{participant_id}", web::delete().to(withdraw))
        .route("/api/events/{id}/picks", web::post().to(set_pick))
        .route("/api/events/{id}/assign", web::post().to(assign_event))
        .route("/api/events/{id}/shuffle", web::post().to(shuffle_event))
        .route("/api/assignments/{id}", web::get().to(get_assignment))
        .route("/api/assignments/{id}/fill", web::post().to(fill_role))
        .route("/api/shuffles", web::delete().to(cleanup_shuffles))
        .route("/api/shuffles/{id}", web::get().to(get_shuffle))
        .route("/api/shuffles/{id}/substitutes", web::post().to(join_substitutes));
}

pub async fn start_server(config: Config) -> std::io::Result<()> {
    let port = config.port;
    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
