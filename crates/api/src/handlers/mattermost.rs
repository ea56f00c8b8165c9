//! Mattermost proxy handlers, plus read access to background-polled
//! channels.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use syncup_core::error::CoreError;
use syncup_upstream::mattermost::DEFAULT_POST_LIMIT;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesParams {
    pub channel_id: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessage {
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

fn require_channel_id(channel_id: Option<&str>) -> AppResult<&str> {
    channel_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("channelId is required".into()))
}

/// GET /api/mm/messages?channelId=&limit=
///
/// Returns the raw `{order, posts}` payload.
pub async fn list_messages(
    State(state): State<AppState>,
    Query(params): Query<MessagesParams>,
) -> AppResult<impl IntoResponse> {
    let channel_id = require_channel_id(params.channel_id.as_deref())?;
    let limit = params.limit.unwrap_or(DEFAULT_POST_LIMIT);

    let posts = state.mattermost.channel_posts(channel_id, limit).await?;
    Ok(Json(posts))
}

/// POST /api/mm/messages
pub async fn send_message(
    State(state): State<AppState>,
    Json(input): Json<SendMessage>,
) -> AppResult<impl IntoResponse> {
    let channel_id = require_channel_id(input.channel_id.as_deref())?;
    let text = input
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("text is required".into()))?;

    let post = state.mattermost.create_post(channel_id, text).await?;
    Ok(Json(post))
}

/// GET /api/mm/channels/{id}
pub async fn get_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let channel = state.mattermost.channel(&channel_id).await?;
    Ok(Json(channel))
}

/// GET /api/mm/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = state.mattermost.user(&user_id).await?;
    Ok(Json(user))
}

/// GET /api/mm/feeds/{channel_id}
///
/// Latest normalized snapshot of a watched channel; `data` is `null` until
/// the first poll completes.
pub async fn get_feed(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let feed = state
        .chat_feeds
        .get(&channel_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Channel feed",
            id: channel_id.clone(),
        }))?;

    let snapshot = feed.borrow().clone();
    Ok(Json(DataResponse { data: snapshot }))
}
