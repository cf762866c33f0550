use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use catalog_engine::{Category, NewCategory};

use crate::error::AppError;
use crate::state::AppState;

/// GET /categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.catalog.list_categories().await?))
}

/// POST /categories with `{"code": "...", "name": "..."}`
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let Json(new) = body.map_err(|_| AppError::bad_request("invalid JSON body"))?;
    let created = state.catalog.create_category(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
