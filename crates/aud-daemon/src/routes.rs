//! Axum router and HTTP handlers for aud-daemon. Every handler authenticates
//! the bearer token, enforces the role the endpoint requires, and delegates
//! to `aud-service`; transaction boundaries and collaborator calls all live
//! there.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use aud_db::sessions::SessionFilter;
use aud_engine::Role;
use aud_schemas::SessionStatus;
use aud_service::{action_builder, approval, apply, close, plans as plan_svc, report, resolution, scan, session_crud, snapshot};

use crate::api_types::{parse_plan_patch, CreatePlanRequest, CreateScanRequest, CreateSessionRequest, ResolveDiscrepancyRequest};
use crate::auth::{authenticate, require_role};
use crate::error::ApiError;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/plans", get(list_plans).post(create_plan))
        .route("/plans/:id", get(get_plan).patch(update_plan))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/start", post(start_session))
        .route("/sessions/:id/scans", post(create_scan))
        .route("/sessions/:id/expected", get(list_expected))
        .route("/sessions/:id/results", get(list_results))
        .route("/sessions/:id/discrepancies", get(list_discrepancies))
        .route("/sessions/:id/actions", get(list_actions))
        .route("/sessions/:id/close", post(close_session))
        .route("/sessions/:id/approve", post(approve_session))
        .route("/sessions/:id/build-actions", post(build_actions))
        .route("/sessions/:id/apply", post(apply_session))
        .route("/discrepancies/:id/resolve", post(resolve_discrepancy))
        .route("/reports/plans/:id", get(get_plan_report))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    100
}

// ---------------------------------------------------------------------------
// Plans
// ---------------------------------------------------------------------------

async fn list_plans(State(st): State<Arc<AppState>>, headers: HeaderMap, Query(page): Query<PageParams>) -> impl IntoResponse {
    match handle_list_plans(&st, &headers, page).await {
        Ok(plans) => Json(plans).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_plans(st: &AppState, headers: &HeaderMap, page: PageParams) -> Result<Vec<aud_schemas::Plan>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    plan_svc::list_plans(&st.pool, page.limit, page.offset).await
}

async fn get_plan(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_get_plan(&st, &headers, id).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_get_plan(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Plan, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    plan_svc::get_plan(&st.pool, id).await
}

async fn create_plan(State(st): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<CreatePlanRequest>) -> impl IntoResponse {
    match handle_create_plan(&st, &headers, body).await {
        Ok(plan) => (axum::http::StatusCode::CREATED, Json(plan)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_create_plan(st: &AppState, headers: &HeaderMap, body: CreatePlanRequest) -> Result<aud_schemas::Plan, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Auditor)?;
    plan_svc::create_plan(&st.pool, body.into_new_plan(caller.id)).await
}

async fn update_plan(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>, Json(body): Json<Value>) -> impl IntoResponse {
    match handle_update_plan(&st, &headers, id, body).await {
        Ok(plan) => Json(plan).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_update_plan(st: &AppState, headers: &HeaderMap, id: Uuid, body: Value) -> Result<aud_schemas::Plan, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Supervisor)?;
    let patch = parse_plan_patch(&body)?;
    plan_svc::update_plan(&st.pool, id, patch).await
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub location_id: Option<i64>,
    pub plan_id: Option<Uuid>,
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

async fn list_sessions(State(st): State<Arc<AppState>>, headers: HeaderMap, Query(q): Query<SessionQuery>) -> impl IntoResponse {
    match handle_list_sessions(&st, &headers, q).await {
        Ok(sessions) => Json(sessions).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_sessions(st: &AppState, headers: &HeaderMap, q: SessionQuery) -> Result<Vec<aud_schemas::Session>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    let status = q.status.as_deref().and_then(SessionStatus::parse);
    let filter = SessionFilter { location_id: q.location_id, plan_id: q.plan_id, status, limit: q.limit, offset: q.offset };
    session_crud::list_sessions(&st.pool, &filter).await
}

async fn get_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_get_session(&st, &headers, id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_get_session(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Session, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    session_crud::get_session(&st.pool, id).await
}

async fn create_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Json(body): Json<CreateSessionRequest>) -> impl IntoResponse {
    match handle_create_session(&st, &headers, body).await {
        Ok(session) => (axum::http::StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_create_session(st: &AppState, headers: &HeaderMap, body: CreateSessionRequest) -> Result<aud_schemas::Session, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Auditor)?;
    session_crud::create_session(&st.pool, &st.location, body.plan_id, body.location_id, &caller.token).await
}

async fn start_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_start_session(&st, &headers, id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_start_session(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Session, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Auditor)?;
    let session = snapshot::start_session(&st.pool, &st.inventory, id, caller.id, &caller.token).await?;
    st.notification
        .notify_best_effort(serde_json::json!({
            "kind": "audit_session_started",
            "session_id": session.id,
            "user_id": caller.id,
        }))
        .await;
    Ok(session)
}

async fn create_scan(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>, Json(body): Json<CreateScanRequest>) -> impl IntoResponse {
    match handle_create_scan(&st, &headers, id, body).await {
        Ok(s) => (axum::http::StatusCode::CREATED, Json(s)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_create_scan(st: &AppState, headers: &HeaderMap, id: Uuid, body: CreateScanRequest) -> Result<aud_schemas::Scan, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Auditor)?;
    let payload = scan::ScanPayload {
        item_id: body.item_id,
        barcode_value: body.barcode_value,
        found_location_id: body.found_location_id,
        notes: body.notes,
        photo_url: body.photo_url,
        client_scan_id: body.client_scan_id,
        extra: body.extra,
    };
    scan::create_scan(&st.pool, &st.inventory, id, payload, caller.id, &caller.token).await
}

async fn list_expected(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_list_expected(&st, &headers, id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_expected(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<Vec<aud_schemas::ExpectedItem>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    session_crud::get_session(&st.pool, id).await?;
    aud_db::expected_items::list_for_session(&st.pool, id).await.map_err(|e| aud_service::AuditError::StateConflict(e.to_string()))
}

async fn list_results(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_list_results(&st, &headers, id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_results(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<Vec<aud_schemas::ItemResult>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    session_crud::get_session(&st.pool, id).await?;
    aud_db::item_results::list_for_session(&st.pool, id).await.map_err(|e| aud_service::AuditError::StateConflict(e.to_string()))
}

async fn list_discrepancies(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_list_discrepancies(&st, &headers, id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_discrepancies(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<Vec<aud_schemas::Discrepancy>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    session_crud::get_session(&st.pool, id).await?;
    aud_db::discrepancies::list_for_session(&st.pool, id).await.map_err(|e| aud_service::AuditError::StateConflict(e.to_string()))
}

async fn list_actions(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_list_actions(&st, &headers, id).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_list_actions(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<Vec<aud_schemas::Action>, aud_service::AuditError> {
    authenticate(&st.auth, headers).await?;
    session_crud::get_session(&st.pool, id).await?;
    aud_db::actions::list_for_session(&st.pool, id).await.map_err(|e| aud_service::AuditError::StateConflict(e.to_string()))
}

async fn close_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_close_session(&st, &headers, id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_close_session(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Session, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Auditor)?;
    let session = close::close_session(&st.pool, id, caller.id).await?;
    st.notification
        .notify_best_effort(serde_json::json!({ "kind": "audit_session_closed", "session_id": session.id, "user_id": caller.id }))
        .await;
    Ok(session)
}

async fn approve_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_approve_session(&st, &headers, id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_approve_session(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Session, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Supervisor)?;
    let session = approval::approve_session(&st.pool, id, caller.id).await?;
    st.notification
        .notify_best_effort(serde_json::json!({ "kind": "audit_session_approved", "session_id": session.id, "user_id": caller.id }))
        .await;
    Ok(session)
}

async fn build_actions(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_build_actions(&st, &headers, id).await {
        Ok(count) => Json(serde_json::json!({ "actions_created": count })).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_build_actions(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<usize, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Supervisor)?;
    action_builder::build_actions_from_resolutions(&st.pool, id).await
}

async fn apply_session(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_apply_session(&st, &headers, id).await {
        Ok(session) => Json(session).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_apply_session(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<aud_schemas::Session, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::SystemAdmin)?;
    let session = apply::apply_session(&st.pool, &st.inventory, id, &caller.token).await?;
    if session.status == SessionStatus::Applied {
        st.notification
            .notify_best_effort(serde_json::json!({ "kind": "audit_session_applied", "session_id": session.id, "user_id": caller.id }))
            .await;
    }
    Ok(session)
}

// ---------------------------------------------------------------------------
// Discrepancies
// ---------------------------------------------------------------------------

async fn resolve_discrepancy(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>, Json(body): Json<ResolveDiscrepancyRequest>) -> impl IntoResponse {
    match handle_resolve_discrepancy(&st, &headers, id, body).await {
        Ok(d) => Json(d).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_resolve_discrepancy(st: &AppState, headers: &HeaderMap, id: Uuid, body: ResolveDiscrepancyRequest) -> Result<aud_schemas::Discrepancy, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Supervisor)?;
    resolution::resolve_discrepancy(&st.pool, id, body.resolution_status, body.resolution_payload).await
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

async fn get_plan_report(State(st): State<Arc<AppState>>, headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    match handle_get_plan_report(&st, &headers, id).await {
        Ok(report) => Json(plan_report_json(&report)).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

async fn handle_get_plan_report(st: &AppState, headers: &HeaderMap, id: Uuid) -> Result<report::PlanReport, aud_service::AuditError> {
    let caller = authenticate(&st.auth, headers).await?;
    require_role(&caller, &st.role_names, Role::Supervisor)?;
    report::get_plan_report(&st.pool, id).await
}

fn plan_report_json(report: &report::PlanReport) -> Value {
    let sessions: Vec<Value> = report
        .sessions
        .iter()
        .map(|s| {
            serde_json::json!({
                "session_id": s.session.id,
                "location_id": s.session.location_id,
                "status": s.session.status,
                "expected_total": s.figures.expected_total,
                "found_total": s.figures.found_total,
                "found_in_place": s.figures.found_in_place,
                "found_rate": s.figures.found_rate,
                "in_place_rate": s.figures.in_place_rate,
                "scan_count": s.scan_count,
                "unexpected": s.unexpected,
                "duplicate": s.duplicate,
                "unknown_barcode": s.unknown_barcode,
                "discrepancies_total": s.discrepancies_total,
                "discrepancies_open": s.discrepancies_open,
                "discrepancies_resolved": s.discrepancies_resolved,
                "discrepancies_ignored": s.discrepancies_ignored,
            })
        })
        .collect();

    serde_json::json!({
        "plan_id": report.plan_id,
        "rooms_done": report.rooms_done,
        "totals": {
            "expected_total": report.totals.expected_total,
            "found_total": report.totals.found_total,
            "found_in_place": report.totals.found_in_place,
            "found_rate": report.totals.found_rate,
            "in_place_rate": report.totals.in_place_rate,
        },
        "sessions": sessions,
    })
}
