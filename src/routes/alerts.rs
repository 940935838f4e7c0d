use crate::{
    error::{AppError, Result},
    models::alert::*,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_alerts))
        .route("/unread", get(list_unread_alerts))
        .route("/unread-count", get(unread_count))
        .route("/check", post(check_alerts))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/custom", post(create_custom_alert))
        .route("/read-all", post(mark_all_as_read))
        .route("/dismiss-all", post(dismiss_all))
        .route("/:id/read", post(mark_as_read))
        .route("/:id/dismiss", post(dismiss_alert))
        .route("/:id", delete(delete_alert))
}

/// List alerts, most urgent first
/// GET /api/alerts?unreadOnly=&showDismissed=&type=&priority=&limit=&includeSettings=
async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertQuery>,
) -> Result<Json<Value>> {
    if query.limit == Some(0) {
        return Err(AppError::BadRequest("limit must be greater than 0".to_string()));
    }

    let listing = state.alert_service.get_alerts(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": listing
    })))
}

/// GET /api/alerts/unread
async fn list_unread_alerts(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let listing = state.alert_service.get_unread_alerts().await?;

    Ok(Json(json!({
        "success": true,
        "data": listing
    })))
}

/// GET /api/alerts/unread-count
async fn unread_count(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let count = state.alert_service.unread_count().await?;

    Ok(Json(json!({
        "success": true,
        "data": { "count": count }
    })))
}

/// Run a stock scan now
/// POST /api/alerts/check
async fn check_alerts(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    debug!("Manual stock alert scan requested");

    let created = state.alert_service.check_and_generate_alerts().await?;

    Ok(Json(json!({
        "success": true,
        "data": created,
        "message": format!("{} new alert(s) generated", created.len())
    })))
}

/// GET /api/alerts/settings
async fn get_settings(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let settings = state.alert_service.get_settings_view().await?;

    Ok(Json(json!({
        "success": true,
        "data": settings
    })))
}

/// PUT /api/alerts/settings
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UpdateAlertSettingsRequest>,
) -> Result<Json<Value>> {
    let settings = state.alert_service.update_settings(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": settings,
        "message": "Alert settings updated successfully"
    })))
}

/// POST /api/alerts/custom
async fn create_custom_alert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCustomAlertRequest>,
) -> Result<Json<Value>> {
    let alert = state.alert_service.create_custom_alert(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": alert,
        "message": "Alert created successfully"
    })))
}

/// POST /api/alerts/read-all
async fn mark_all_as_read(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let count = state.alert_service.mark_all_as_read().await?;

    Ok(Json(json!({
        "success": true,
        "data": { "updated": count }
    })))
}

/// POST /api/alerts/dismiss-all
async fn dismiss_all(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let count = state.alert_service.dismiss_all().await?;

    Ok(Json(json!({
        "success": true,
        "data": { "updated": count }
    })))
}

/// POST /api/alerts/:id/read
async fn mark_as_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let alert = state.alert_service.mark_as_read(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": alert
    })))
}

/// POST /api/alerts/:id/dismiss
async fn dismiss_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let alert = state.alert_service.dismiss_alert(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": alert
    })))
}

/// DELETE /api/alerts/:id
async fn delete_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    state.alert_service.delete_alert(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Alert deleted successfully"
    })))
}
