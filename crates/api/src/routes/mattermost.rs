use axum::routing::get;
use axum::Router;

use crate::handlers::mattermost;
use crate::state::AppState;

/// Mattermost proxy routes mounted at `/mm`.
///
/// ```text
/// GET    /messages             -> list_messages (?channelId=&limit=)
/// POST   /messages             -> send_message
/// GET    /channels/{id}        -> get_channel
/// GET    /users/{id}           -> get_user
/// GET    /feeds/{channel_id}   -> get_feed (background-polled channels)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/messages",
            get(mattermost::list_messages).post(mattermost::send_message),
        )
        .route("/channels/{id}", get(mattermost::get_channel))
        .route("/users/{id}", get(mattermost::get_user))
        .route("/feeds/{channel_id}", get(mattermost::get_feed))
}
