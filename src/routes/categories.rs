use crate::{
    error::{AppError, Result},
    models::category::*,
    state::AppState,
    utils::serde_helpers::non_empty,
};
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/tree", get(get_tree))
        .route("/:id", get(get_category).put(update_category).delete(delete_category))
        .route("/:id/children", get(get_children))
        .route("/:id/descendants", get(get_descendants))
        .route("/:id/ancestors", get(get_ancestors))
}

async fn ensure_exists(state: &AppState, id: &str) -> Result<()> {
    state
        .category_service
        .get_category(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Category"))
}

/// List categories
/// GET /api/categories?view=flat|tree&parentId=&rootOnly=&activeOnly=
async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<CategoryQuery>,
) -> Result<Json<Value>> {
    query.parent_id = non_empty(query.parent_id);

    let categories = state.category_service.list_categories(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": categories,
        "total": categories.len()
    })))
}

/// GET /api/categories/tree
async fn get_tree(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let tree = state.category_service.build_tree().await?;

    Ok(Json(json!({
        "success": true,
        "data": tree
    })))
}

/// Create a category
/// POST /api/categories
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<Json<Value>> {
    debug!("Creating category: {}", request.name);

    let category = state.category_service.create_category(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": category,
        "message": "Category created successfully"
    })))
}

/// Category with its ancestors and direct children
/// GET /api/categories/:id
async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let detail = state
        .category_service
        .get_category_detail(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Category"))?;

    Ok(Json(json!({
        "success": true,
        "data": detail
    })))
}

/// PUT /api/categories/:id
async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>> {
    debug!("Updating category: {}", id);

    let category = state.category_service.update_category(&id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": category,
        "message": "Category updated successfully"
    })))
}

/// Delete a category and its whole subtree
/// DELETE /api/categories/:id
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting category: {}", id);

    let result = state.category_service.delete_category(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": result,
        "message": format!("Deleted {} categories", result.deleted_ids.len())
    })))
}

/// GET /api/categories/:id/children
async fn get_children(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ensure_exists(&state, &id).await?;
    let children = state.category_service.get_children(Some(&id)).await?;

    Ok(Json(json!({
        "success": true,
        "data": children
    })))
}

/// GET /api/categories/:id/descendants
async fn get_descendants(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ensure_exists(&state, &id).await?;
    let descendants = state.category_service.get_descendants(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": descendants
    })))
}

/// GET /api/categories/:id/ancestors
async fn get_ancestors(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    ensure_exists(&state, &id).await?;
    let ancestors = state.category_service.get_ancestors(&id).await?;

    Ok(Json(json!({
        "success": true,
        "data": ancestors
    })))
}

#[cfg(test)]
mod tests {
    use crate::routes::test_support::{send, test_app};
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_category_lifecycle() {
        let (app, _) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Phone Cases"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let root_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["slug"], json!("phone-cases"));
        assert_eq!(body["data"]["level"], json!(0));

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Silicone", "parentId": root_id})),
        )
        .await;
        let child_id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["path"], json!(["phone-cases", "silicone"]));

        let (status, body) = send(&app, Method::GET, "/api/categories?view=tree", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["children"][0]["id"], json!(child_id));

        let (_, body) = send(&app, Method::GET, &format!("/api/categories/{}", child_id), None).await;
        assert_eq!(body["data"]["ancestors"][0]["id"], json!(root_id));

        let (status, body) = send(
            &app,
            Method::PUT,
            &format!("/api/categories/{}", root_id),
            Some(json!({"parentId": child_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], json!("INVALID_OPERATION"));

        let (status, body) = send(&app, Method::DELETE, &format!("/api/categories/{}", root_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["deletedIds"].as_array().unwrap().len(), 2);

        let (status, _) = send(&app, Method::GET, &format!("/api/categories/{}", child_id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_parent_and_traversal_of_unknown_id() {
        let (app, _) = test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Orphan", "parentId": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], json!("NOT_FOUND"));

        let (status, _) = send(&app, Method::GET, "/api/categories/nope/descendants", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_blocked_reports_products() {
        let (app, _) = test_app().await;

        let (_, body) = send(&app, Method::POST, "/api/categories", Some(json!({"name": "Chargers"}))).await;
        let chargers = body["data"]["id"].as_str().unwrap().to_string();
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/categories",
            Some(json!({"name": "Fast", "parentId": chargers})),
        )
        .await;
        let fast = body["data"]["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/products",
            Some(json!({"name": "65W GaN", "category": fast, "stockQuantity": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, Method::DELETE, &format!("/api/categories/{}", chargers), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], json!("CATEGORY_IN_USE"));
        assert_eq!(body["error"]["details"]["products"][0]["name"], json!("65W GaN"));

        let (_, body) = send(&app, Method::GET, "/api/categories", None).await;
        assert_eq!(body["total"], json!(2));
    }
}
