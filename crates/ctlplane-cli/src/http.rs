//! Thin `axum` facade over `ctlplane-handlers`' CRUD dispatch and
//! `ctlplane-runtime`'s session broker. No middleware stack, no auth
//! verification — `Principal` is assumed authenticated per request.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use ctlplane_core::error::CoreError;
use ctlplane_core::{Kind, RequestContext};
use ctlplane_handlers::{status_code, HandlerRegistry};
use ctlplane_runtime::{CreateSessionRequest, SessionBroker};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub handlers: Arc<HandlerRegistry>,
    pub broker: Arc<SessionBroker>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/{kind}", post(create_entity).get(list_entities))
        .route("/v1/{kind}/{name}", get(get_entity).put(update_entity).delete(delete_entity))
        .route("/v1/sessions", post(create_session))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "ctlplane"}))
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }

    fn from_core(err: CoreError) -> Self {
        let status = StatusCode::from_u16(status_code(&err)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, message: err.to_string() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({"error": self.message}))).into_response()
    }
}

/// `X-Tenant`/`X-Project`/`X-Catalog`/`X-User-Id` identify the caller;
/// `X-Catalog-Id`/`X-Variant`/`X-Variant-Id`/`X-Namespace` scope the
/// operation the way `Metadata` does for declarative objects.
fn context_from_headers(headers: &HeaderMap) -> Result<RequestContext, ApiError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);

    let tenant = header("x-tenant").unwrap_or_else(|| "default".into());
    let project = header("x-project").unwrap_or_else(|| "default".into());
    let catalog = header("x-catalog").ok_or_else(|| ApiError::bad_request("missing X-Catalog header"))?;
    let user_id = header("x-user-id").unwrap_or_else(|| "anonymous".into());

    let mut ctx = RequestContext::new(tenant, project, catalog, user_id);
    if let Some(raw) = header("x-catalog-id") {
        ctx.catalog_id = Some(Uuid::parse_str(&raw).map_err(|e| ApiError::bad_request(format!("invalid X-Catalog-Id: {e}")))?);
    }
    if let Some(variant) = header("x-variant") {
        ctx = ctx.with_variant(variant);
    }
    if let Some(raw) = header("x-variant-id") {
        ctx.variant_id = Some(Uuid::parse_str(&raw).map_err(|e| ApiError::bad_request(format!("invalid X-Variant-Id: {e}")))?);
    }
    if let Some(namespace) = header("x-namespace") {
        ctx = ctx.with_namespace(namespace);
    }
    Ok(ctx)
}

fn parse_kind(raw: &str) -> Result<Kind, ApiError> {
    Kind::from_str(raw).map_err(ApiError::from_core)
}

async fn create_entity(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let ctx = context_from_headers(&headers)?;
    let handler = state.handlers.for_kind(parse_kind(&kind)?);
    let created = handler.create(&ctx, body).await.map_err(ApiError::from_core)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_entity(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = context_from_headers(&headers)?;
    let handler = state.handlers.for_kind(parse_kind(&kind)?);
    let found = handler.get(&ctx, &name).await.map_err(ApiError::from_core)?;
    Ok(Json(found))
}

async fn update_entity(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let ctx = context_from_headers(&headers)?;
    let handler = state.handlers.for_kind(parse_kind(&kind)?);
    let updated = handler.update(&ctx, &name, body).await.map_err(ApiError::from_core)?;
    Ok(Json(updated))
}

async fn delete_entity(
    State(state): State<AppState>,
    Path((kind, name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let ctx = context_from_headers(&headers)?;
    let handler = state.handlers.for_kind(parse_kind(&kind)?);
    handler.delete(&ctx, &name).await.map_err(ApiError::from_core)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_entities(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    let ctx = context_from_headers(&headers)?;
    let handler = state.handlers.for_kind(parse_kind(&kind)?);
    let listed = handler.list(&ctx).await.map_err(ApiError::from_core)?;
    Ok(Json(listed))
}

async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    let catalog = header("x-catalog").ok_or_else(|| ApiError::bad_request("missing X-Catalog header"))?;
    let user_id = header("x-user-id").ok_or_else(|| ApiError::bad_request("missing X-User-Id header"))?;
    let subject_is_user = header("x-subject-is-user").map(|v| v != "false").unwrap_or(true);

    let session_id = state
        .broker
        .new_session(&catalog, &user_id, subject_is_user, request, Utc::now())
        .await
        .map_err(ApiError::from_core)?;
    Ok((StatusCode::CREATED, Json(json!({"sessionId": session_id}))))
}
