use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use crate::geocoding::{suggest, LocationSuggestion};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub query: String,
}

/// Address autocomplete. Answers with a bare array for the front end
/// widget; a failed lookup is an empty array with a 500.
pub async fn location_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Response {
    match suggest(state.geocoder.as_ref(), &params.query).await {
        Ok(suggestions) => Json(suggestions).into_response(),
        Err(err) => {
            error!(error = %err, "Error fetching location suggestions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Vec::<LocationSuggestion>::new()),
            )
                .into_response()
        }
    }
}
