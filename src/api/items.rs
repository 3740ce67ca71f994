use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use std::collections::HashMap;

use crate::api::extract::{ItemIdPath, JsonBody};
use crate::api::AppState;
use crate::domain::validation::{parse_item_patch, parse_new_item, parse_non_negative};
use crate::domain::{Item, ValidationErrors};
use crate::error::AppError;

pub async fn create_item(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Item>), AppError> {
    let new_item = parse_new_item(&body)?;
    let item = state.repo.create_item(&new_item).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn list_items(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Item>>, AppError> {
    let mut errors = ValidationErrors::default();
    let skip = parse_non_negative("skip", params.get("skip").map(String::as_str))
        .unwrap_or_else(|v| {
            errors.push(v);
            None
        })
        .unwrap_or(0);
    let limit = parse_non_negative("limit", params.get("limit").map(String::as_str))
        .unwrap_or_else(|v| {
            errors.push(v);
            None
        })
        .unwrap_or(state.config.default_list_limit);
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let items = state.repo.list_items(skip, limit).await?;
    Ok(Json(items))
}

pub async fn get_item(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
) -> Result<Json<Item>, AppError> {
    Ok(Json(state.repo.get_item(id).await?))
}

/// Serves both PUT and PATCH; only fields present in the body change.
pub async fn update_item(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
    JsonBody(body): JsonBody,
) -> Result<Json<Item>, AppError> {
    let patch = parse_item_patch(&body)?;
    Ok(Json(state.repo.update_item(id, &patch).await?))
}

pub async fn delete_item(
    State(state): State<AppState>,
    ItemIdPath(id): ItemIdPath,
) -> Result<StatusCode, AppError> {
    state.repo.delete_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
