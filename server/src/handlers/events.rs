use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Multipart, Path, Query, State};
use axum::response::Response;

use super::form::EventForm;
use crate::db::ListParams;
use crate::models::EventResponse;
use crate::state::AppState;
use crate::utils::response::{created, empty_success, success};
use crate::utils::AppResult;

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Response> {
    let listing = state.events.list(&params).await?;

    let message = if listing.warnings.is_empty() {
        "Events retrieved"
    } else {
        "Events retrieved; some filters were ignored"
    };
    Ok(success(listing, message))
}

pub async fn event_locations(State(state): State<AppState>) -> AppResult<Response> {
    let markers = state.events.markers().await?;
    Ok(success(markers, "Event locations retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    let event = state.events.get(id).await?;
    Ok(success(EventResponse::from(event), "Event retrieved"))
}

pub async fn create_event(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let (input, upload) = EventForm::from_multipart(multipart?).await?.into_input()?;
    let event = state.events.create(input, upload).await?;
    Ok(created(EventResponse::from(event), "Event created successfully!"))
}

pub async fn update_event(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    let (input, upload) = EventForm::from_multipart(multipart?).await?.into_input()?;
    let event = state.events.update(id, input, upload).await?;
    Ok(success(EventResponse::from(event), "Event updated successfully!"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Path(id) = path?;
    state.events.delete(id).await?;
    Ok(empty_success("Event deleted successfully!"))
}
