use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::create_cors_layer;
use crate::handlers::categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
use crate::handlers::events::{
    create_event, delete_event, event_locations, get_event, list_events, update_event,
};
use crate::handlers::health_check;
use crate::handlers::locations::location_suggestions;
use crate::state::AppState;

/// Room for the non-file form fields on top of the attachment limit.
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_routes(state: AppState, cors_allowed_origins: Option<&str>) -> Router {
    let attachments = state.events.attachments();
    let body_limit = attachments.max_bytes() + FORM_OVERHEAD_BYTES;
    let uploads = ServeDir::new(attachments.root());

    Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/locations", get(event_locations))
        .route(
            "/api/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/categories", get(list_categories).post(create_category))
        .route(
            "/api/categories/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
        .route("/api/location-suggestions", get(location_suggestions))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(cors_allowed_origins))
        .with_state(state)
}
