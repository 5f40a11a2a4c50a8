use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::warn;

use gridiron_common::{ContentKind, DebateRecord, Pool, PoolSelector, WarRoomError};

use crate::delivery::ScoutDelivery;
use crate::war_room::WarRoom;

pub const DEFAULT_RANKINGS_LIMIT: usize = 50;
pub const DEFAULT_CONTENT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 500;

pub struct AppState {
    pub war_room: WarRoom,
}

// --- Query structs ---

#[derive(Deserialize)]
pub struct RankingsQuery {
    pool: Option<String>,
    limit: Option<usize>,
}

#[derive(Deserialize)]
pub struct DossierQuery {
    name: Option<String>,
    pool: Option<String>,
}

#[derive(Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<usize>,
}

// --- Helpers ---

fn error_response(err: &WarRoomError) -> Response {
    let status = match err {
        WarRoomError::Validation(_) => StatusCode::BAD_REQUEST,
        WarRoomError::NotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        warn!(error = %err, "Request failed");
    }
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}

fn rejection_response(rejection: JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": rejection.body_text() })),
    )
        .into_response()
}

fn parse_pool(raw: Option<&str>) -> Result<PoolSelector, WarRoomError> {
    raw.map_or(Ok(PoolSelector::All), str::parse::<PoolSelector>)
}

/// A missing or zero limit means the default.
fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.filter(|&n| n > 0).unwrap_or(default).min(MAX_LIMIT)
}

// --- Handlers ---

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.war_room.health().await)
}

pub async fn scout_delivery(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScoutDelivery>, JsonRejection>,
) -> Response {
    let Json(delivery) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.war_room.receive_delivery(&delivery).await {
        Ok(report) => Json(serde_json::json!({
            "received": true,
            "runId": delivery.run_id,
            "prospectsGraded": report.graded,
        }))
        .into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn rankings(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RankingsQuery>,
) -> Response {
    let selector = match parse_pool(params.pool.as_deref()) {
        Ok(selector) => selector,
        Err(e) => return error_response(&e),
    };
    let limit = clamp_limit(params.limit, DEFAULT_RANKINGS_LIMIT);

    Json(state.war_room.rankings(selector, limit).await).into_response()
}

pub async fn dossier(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DossierQuery>,
) -> Response {
    let Some(name) = params.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        return error_response(&WarRoomError::Validation("name is required".into()));
    };
    let pool: Option<Pool> = match parse_pool(params.pool.as_deref()) {
        Ok(PoolSelector::Only(pool)) => Some(pool),
        Ok(PoolSelector::All) => None,
        Err(e) => return error_response(&e),
    };

    match state.war_room.dossier(name, pool).await {
        Ok(dossier) => Json(dossier).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn content(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContentQuery>,
) -> Response {
    let kind = match params
        .kind
        .as_deref()
        .map(str::parse::<ContentKind>)
        .transpose()
    {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };
    let limit = clamp_limit(params.limit, DEFAULT_CONTENT_LIMIT);

    Json(state.war_room.content(kind, limit).await).into_response()
}

pub async fn grade(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DebateRecord>, JsonRejection>,
) -> Response {
    let Json(record) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };

    match state.war_room.grade_preview(&record).await {
        Ok(dossier) => Json(dossier).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.war_room.status().await)
}

pub async fn debate_schema() -> impl IntoResponse {
    Json(schemars::schema_for!(DebateRecord))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        // Ingestion
        .route("/api/scout-delivery", post(scout_delivery))
        .route("/api/grade", post(grade))
        // Queries
        .route("/api/rankings", get(rankings))
        .route("/api/dossier", get(dossier))
        .route("/api/content", get(content))
        .route("/api/status", get(status))
        .route("/api/schema/debate", get(debate_schema))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
