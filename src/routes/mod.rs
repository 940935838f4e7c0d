use crate::state::AppState;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub mod alerts;
pub mod categories;
pub mod products;

/// 组装全部 API 路由，中间件层由调用方追加
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/categories", categories::router())
        .nest("/api/products", products::router())
        .nest("/api/alerts", alerts::router())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "ok"
    }))
}
