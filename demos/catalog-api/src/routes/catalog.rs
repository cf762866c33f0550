use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Json;
use catalog_engine::{CatalogPage, CatalogProduct, RawListParams};

use crate::error::AppError;
use crate::state::AppState;

/// GET /catalog?offset=0&limit=10&category=shoes&price_lt=20.00
///
/// All parameters arrive as strings; validation happens in the engine so
/// `limit=abc` becomes a 400 with a per-field message.
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawListParams>,
) -> Result<Json<CatalogPage>, AppError> {
    let page = state.catalog.list_products(params).await?;
    Ok(Json(page))
}

/// GET /catalog/{code}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<CatalogProduct>, AppError> {
    let product = state.catalog.get_product(&code).await?;
    Ok(Json(product))
}
