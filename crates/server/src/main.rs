// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod config;
mod coordinator;
mod live;
mod source;

use axum::{
    Json, Router,
    extract::{FromRef, Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use schulplan_api::{
    ApiError, ChangesResponse, ExamResponse, GradesResponse, HealthResponse, HomeworkResponse,
    LettersResponse, PublishedData, RefreshResponse, ScheduleViewResponse, StudentData,
    StudentListResponse, build_changes_response, build_exam_response, build_grades_response,
    build_health, build_homework_response, build_letters_response, build_schedule_view,
    build_student_list, find_student,
};
use schulplan_domain::StudentId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::config::{ServerConfig, Settings};
use crate::coordinator::{Coordinator, RefreshGate, RefreshStatus};
use crate::live::{LiveEventBroadcaster, live_events_handler};
use crate::source::FileSource;

/// Schulplan Server - polls the school portal and serves schedule views
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to bind the server to, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of exported portal payloads, overriding the configuration
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
}

/// Produces the school-local wall clock.
type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    coordinator: Arc<Coordinator>,
    gate: Arc<Mutex<RefreshGate>>,
    broadcaster: Arc<LiveEventBroadcaster>,
    clock: Clock,
}

impl FromRef<AppState> for Arc<LiveEventBroadcaster> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.broadcaster.clone()
    }
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// The school-local wall clock in `timezone`.
fn local_now(timezone: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&timezone).naive_local()
}

async fn require_published(app_state: &AppState) -> Result<Arc<PublishedData>, HttpError> {
    app_state
        .coordinator
        .published()
        .await
        .ok_or_else(|| HttpError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: String::from("No data published yet"),
        })
}

fn student(published: &PublishedData, student_id: i64) -> Result<&StudentData, HttpError> {
    find_student(published, StudentId::new(student_id)).map_err(HttpError::from)
}

/// Handler for GET `/health`.
async fn handle_health(AxumState(app_state): AxumState<AppState>) -> Json<HealthResponse> {
    let published: Option<Arc<PublishedData>> = app_state.coordinator.published().await;
    let status: RefreshStatus = app_state.coordinator.status().await;
    Json(build_health(
        published.as_deref(),
        status.last_error,
        status.stale,
    ))
}

/// Handler for GET `/students`.
async fn handle_list_students(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<StudentListResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    Ok(Json(build_student_list(&published)))
}

/// Handler for GET `/students/{id}/views`.
///
/// Views are derived from the stored snapshot at request time.
async fn handle_get_views(
    AxumState(app_state): AxumState<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<ScheduleViewResponse>, HttpError> {
    info!(student_id, "Handling get_views request");

    let published: Arc<PublishedData> = require_published(&app_state).await?;
    let data: &StudentData = student(&published, student_id)?;
    let stale: bool = app_state.coordinator.status().await.stale;
    let now: NaiveDateTime = (app_state.clock)();

    Ok(Json(build_schedule_view(
        data,
        &app_state.coordinator.options().timing,
        now,
        stale,
    )))
}

/// Handler for GET `/students/{id}/changes`.
async fn handle_get_changes(
    AxumState(app_state): AxumState<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<ChangesResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    Ok(Json(build_changes_response(student(&published, student_id)?)))
}

/// Handler for GET `/students/{id}/homework`.
async fn handle_get_homework(
    AxumState(app_state): AxumState<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<HomeworkResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    let today: NaiveDate = (app_state.clock)().date();
    Ok(Json(build_homework_response(
        student(&published, student_id)?,
        today,
    )))
}

/// Handler for GET `/students/{id}/grades`.
async fn handle_get_grades(
    AxumState(app_state): AxumState<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<GradesResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    Ok(Json(build_grades_response(student(&published, student_id)?)))
}

/// Handler for GET `/students/{id}/exams`.
async fn handle_get_exams(
    AxumState(app_state): AxumState<AppState>,
    Path(student_id): Path<i64>,
) -> Result<Json<ExamResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    let today: NaiveDate = (app_state.clock)().date();
    Ok(Json(build_exam_response(
        student(&published, student_id)?,
        today,
    )))
}

/// Handler for GET `/letters`.
async fn handle_get_letters(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<LettersResponse>, HttpError> {
    let published: Arc<PublishedData> = require_published(&app_state).await?;
    Ok(Json(build_letters_response(&published)))
}

/// Handler for POST `/refresh`.
///
/// Runs a cycle immediately unless one was requested within the cooldown.
async fn handle_refresh(
    AxumState(app_state): AxumState<AppState>,
) -> Result<(StatusCode, Json<RefreshResponse>), HttpError> {
    let acquired: bool = app_state.gate.lock().await.try_acquire(Instant::now());
    if !acquired {
        info!("Manual refresh rejected during cooldown");
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(RefreshResponse {
                accepted: false,
                message: String::from("A refresh was requested recently; try again later"),
            }),
        ));
    }

    info!("Running manual refresh");
    app_state.coordinator.refresh((app_state.clock)()).await?;
    Ok((
        StatusCode::OK,
        Json(RefreshResponse {
            accepted: true,
            message: String::from("Refresh complete"),
        }),
    ))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/students", get(handle_list_students))
        .route("/students/{student_id}/views", get(handle_get_views))
        .route("/students/{student_id}/changes", get(handle_get_changes))
        .route("/students/{student_id}/homework", get(handle_get_homework))
        .route("/students/{student_id}/grades", get(handle_get_grades))
        .route("/students/{student_id}/exams", get(handle_get_exams))
        .route("/letters", get(handle_get_letters))
        .route("/refresh", post(handle_refresh))
        .route("/live", get(live_events_handler))
        .with_state(app_state)
}

/// Runs a cycle on every tick, starting immediately.
async fn run_polling_loop(coordinator: Arc<Coordinator>, settings: Settings) {
    let mut ticker: tokio::time::Interval = tokio::time::interval(settings.update_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let now: NaiveDateTime = local_now(settings.timezone);
        if let Err(e) = coordinator.refresh(now).await {
            error!(error = %e, "Scheduled refresh failed");
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Schulplan Server");

    let mut config: ServerConfig = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            ServerConfig::load(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            ServerConfig::default()
        }
    };
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(source_dir) = args.source_dir {
        config.source_dir = source_dir;
    }
    let settings: Settings = config.resolve()?;

    info!(
        timezone = %settings.timezone,
        interval_secs = settings.update_interval.as_secs(),
        source_dir = %settings.source_dir.display(),
        "Configuration loaded"
    );

    let broadcaster: Arc<LiveEventBroadcaster> = Arc::new(LiveEventBroadcaster::new());
    let coordinator: Arc<Coordinator> = Arc::new(Coordinator::new(
        Arc::new(FileSource::new(settings.source_dir.clone())),
        settings.options.clone(),
        settings.novelty_capacity,
        broadcaster.clone(),
    ));

    let timezone: Tz = settings.timezone;
    let app_state: AppState = AppState {
        coordinator: coordinator.clone(),
        gate: Arc::new(Mutex::new(RefreshGate::new(settings.refresh_cooldown))),
        broadcaster,
        clock: Arc::new(move || local_now(timezone)),
    };

    let addr: std::net::SocketAddr = format!("{}:{}", settings.bind, settings.port).parse()?;
    tokio::spawn(run_polling_loop(coordinator, settings));

    let app: Router = build_router(app_state);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
