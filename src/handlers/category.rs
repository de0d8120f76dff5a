use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::AppState;
use crate::db::models::Category;
use crate::db::queries;
use crate::error::StatusError;
use crate::schemas::CategoryEvent;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CategoryRequest {
    #[serde(default)]
    pub name: String,
}

#[utoipa::path(
    get,
    path = "/api/category/get",
    responses((status = 200, description = "All categories")),
    tag = "Categories"
)]
pub async fn get_categories(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, StatusError> {
    let categories = queries::list_categories(&state.db).await?;

    Ok(Json(json!({
        "status": 1,
        "msg": "Categories fetched successfully",
        "categories": categories,
    })))
}

#[utoipa::path(
    post,
    path = "/api/category/add",
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category added", body = Category),
        (status = 400, description = "Missing name"),
        (status = 409, description = "Name already exists")
    ),
    tag = "Categories"
)]
pub async fn add_category(
    State(state): State<AppState>,
    Json(req): Json<CategoryRequest>,
) -> Result<impl IntoResponse, StatusError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(StatusError::bad_request("Category name is required"));
    }

    if queries::find_category_by_name(&state.db, name)
        .await?
        .is_some()
    {
        return Err(StatusError::conflict("Category already exists"));
    }

    let category = Category::new(name.to_string());
    let saved = queries::insert_category(&state.db, &category)
        .await
        .map_err(|e| {
            // The unique index decides under concurrent adds.
            if queries::is_unique_violation(&e) {
                StatusError::conflict("Category already exists")
            } else {
                StatusError::from(e)
            }
        })?;

    // Fire-and-forget: the response never waits on subscriber delivery.
    let _ = state.category_events.send(CategoryEvent::added(&saved));

    Ok(Json(json!({
        "status": 1,
        "msg": "Category added successfully",
        "category": saved,
    })))
}

#[utoipa::path(
    put,
    path = "/api/category/update/{id}",
    request_body = CategoryRequest,
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category renamed", body = Category),
        (status = 400, description = "Missing name"),
        (status = 404, description = "Unknown category id")
    ),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<impl IntoResponse, StatusError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(StatusError::bad_request("Category name is required"));
    }

    let updated = queries::update_category(&state.db, id, name)
        .await
        .map_err(|e| {
            if queries::is_unique_violation(&e) {
                StatusError::conflict("Category already exists")
            } else {
                StatusError::from(e)
            }
        })?
        .ok_or_else(|| StatusError::not_found("Category not found"))?;

    let _ = state.category_events.send(CategoryEvent::updated(&updated));

    Ok(Json(json!({
        "status": 1,
        "msg": "Category updated successfully",
        "category": updated,
    })))
}

#[utoipa::path(
    delete,
    path = "/api/category/delete/{id}",
    params(("id" = Uuid, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "Unknown category id")
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusError> {
    let deleted = queries::delete_category(&state.db, id).await?;
    if !deleted {
        return Err(StatusError::not_found("Category not found"));
    }

    let _ = state.category_events.send(CategoryEvent::deleted(id));

    Ok(Json(json!({
        "status": 1,
        "msg": "Category deleted successfully",
    })))
}
