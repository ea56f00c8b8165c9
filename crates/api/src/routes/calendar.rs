use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Google Calendar routes mounted at `/calendar`.
///
/// ```text
/// GET    /config                    -> get_config
/// GET    /events                    -> list_events (?timeMin=&timeMax=)
/// POST   /events                    -> create_event
/// PUT    /events/{id}               -> update_event
/// DELETE /events/{id}               -> delete_event
/// POST   /events/{id}/reschedule    -> reschedule_event
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/config", get(calendar::get_config))
        .route(
            "/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/events/{id}",
            put(calendar::update_event).delete(calendar::delete_event),
        )
        .route("/events/{id}/reschedule", post(calendar::reschedule_event))
}
