pub mod calendar;
pub mod health;
pub mod mattermost;
pub mod openproject;
pub mod projects;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /op/...          OpenProject proxy
/// /mm/...          Mattermost proxy and polled channel feeds
/// /calendar/...    Google Calendar (caller's access token)
/// /projects/...    local project and task workspace
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/op", openproject::router())
        .nest("/mm", mattermost::router())
        .nest("/calendar", calendar::router())
        .nest("/projects", projects::router())
}
