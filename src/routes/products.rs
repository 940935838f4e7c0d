use crate::{
    error::{AppError, Result},
    models::product::*,
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
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).put(update_product).delete(delete_product))
}

/// GET /api/products?category=&search=&activeOnly=
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<ProductQuery>,
) -> Result<Json<Value>> {
    query.category = non_empty(query.category);
    query.search = non_empty(query.search);

    let products = state.product_service.get_products(query).await?;

    Ok(Json(json!({
        "success": true,
        "data": products,
        "total": products.len()
    })))
}

/// GET /api/products/:id
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let product = state
        .product_service
        .get_product(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Product"))?;

    Ok(Json(json!({
        "success": true,
        "data": product
    })))
}

/// POST /api/products
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<Json<Value>> {
    debug!("Creating product: {}", request.name);

    let product = state.product_service.create_product(request).await?;

    Ok(Json(json!({
        "success": true,
        "data": product,
        "message": "Product created successfully"
    })))
}

/// PUT /api/products/:id
async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Value>> {
    debug!("Updating product: {}", id);

    let product = state.product_service.update_product(&id, request).await?;

    Ok(Json(json!({
        "success": true,
        "data": product,
        "message": "Product updated successfully"
    })))
}

/// DELETE /api/products/:id
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    debug!("Deleting product: {}", id);

    state.product_service.delete_product(&id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully"
    })))
}
