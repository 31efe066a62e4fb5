use std::net::SocketAddr;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use server_api::{check_cg, check_drc, classify, generate_airfoil, list_propulsion};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        AirfoilRequest, AirfoilResponse, CgRequest, CgResponse, ClassifyRequest,
        ClassifyResponse, DrcRequest, DrcResponse, LogEntry, LogResponse, PropulsionRequest,
        PropulsionResponse, AIRFOIL_ROUTE, CG_ROUTE, CLASSIFY_ROUTE, DRC_ROUTE, LOG_ROUTE,
        PROPULSION_ROUTE,
    },
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::{info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{build_context, load_settings};

const MAX_BODY_BYTES: usize = 64 * 1024;

type HandlerError = (StatusCode, Json<ApiError>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let api = build_context(&settings)?;
    info!(
        options = api.catalog.options.len(),
        ruled_parts = api.drc_rules.parts(),
        samples = api.airfoil_samples,
        "computation data loaded"
    );
    let app = build_router(AppState::new(api));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    // browser panel runs on the CAD host origin
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(CLASSIFY_ROUTE, post(http_classify))
        .route(AIRFOIL_ROUTE, post(http_airfoil))
        .route(PROPULSION_ROUTE, post(http_propulsion))
        .route(CG_ROUTE, post(http_cg))
        .route(DRC_ROUTE, post(http_drc))
        .route(LOG_ROUTE, post(http_log))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "status": "Backend online" }))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_classify(Json(req): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
    let res = classify(&req.text);
    info!(intent = res.intent.as_str(), params = res.params.len(), "classified");
    Json(res)
}

async fn http_airfoil(
    State(state): State<AppState>,
    Json(req): Json<AirfoilRequest>,
) -> Result<Json<AirfoilResponse>, HandlerError> {
    generate_airfoil(&state.api, &req)
        .map(Json)
        .map_err(rejected)
}

async fn http_propulsion(
    State(state): State<AppState>,
    Json(req): Json<PropulsionRequest>,
) -> Result<Json<PropulsionResponse>, HandlerError> {
    list_propulsion(&state.api, &req)
        .map(Json)
        .map_err(rejected)
}

/// The body may be omitted entirely.
async fn http_cg(
    State(state): State<AppState>,
    req: Option<Json<CgRequest>>,
) -> Json<CgResponse> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    Json(check_cg(&state.api, &req))
}

async fn http_drc(
    State(state): State<AppState>,
    req: Option<Json<DrcRequest>>,
) -> Json<DrcResponse> {
    let req = req.map(|Json(req)| req).unwrap_or_default();
    let res = check_drc(&state.api, &req);
    info!(part_id = %req.part_id, violations = res.violations.len(), "drc checked");
    Json(res)
}

async fn http_log(Json(entry): Json<LogEntry>) -> Json<LogResponse> {
    info!(sender = ?entry.sender, text = %entry.text, "conversation turn");
    Json(LogResponse {
        status: "logged".into(),
        logged_at: Some(Utc::now()),
    })
}

fn rejected(error: ApiError) -> HandlerError {
    let status = match error.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(%status, message = %error.message, "request rejected");
    (status, Json(error))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
