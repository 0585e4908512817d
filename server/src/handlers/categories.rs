use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::models::CategoryInput;
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppResult;

pub async fn list_categories(State(state): State<AppState>) -> AppResult<Response> {
    let categories = state.categories.list().await?;
    Ok(success(categories, "Categories retrieved"))
}

pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    let category = state.categories.get(id).await?;
    Ok(success(category, "Category retrieved"))
}

pub async fn create_category(
    State(state): State<AppState>,
    json: Result<Json<CategoryInput>, JsonRejection>,
) -> AppResult<Response> {
    let Json(input) = json?;
    let category = state.categories.create(input).await?;
    Ok(created(category, "Category added successfully!"))
}

pub async fn update_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    json: Result<Json<CategoryInput>, JsonRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    let Json(input) = json?;
    let category = state.categories.update(id, input).await?;
    Ok(success(category, "Category updated successfully!"))
}

pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    state.categories.delete(id).await?;
    Ok(empty_success("Category deleted successfully!"))
}
