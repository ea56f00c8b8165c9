//! Google Calendar handlers.
//!
//! The caller's OAuth access token travels in the `Authorization: Bearer`
//! header and is forwarded as is; the gateway never stores it.

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use syncup_core::calendar::{CalendarEvent, EventDraft, UI_COLORS, UI_TO_GOOGLE_ID};
use syncup_upstream::RescheduleOutcome;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn access_token(headers: &HeaderMap) -> AppResult<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .ok_or_else(|| AppError::Unauthorized("Google access token required".into()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteEntry {
    pub hex: &'static str,
    pub google_color_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarSettings {
    pub client_id: Option<String>,
    pub palette: Vec<PaletteEntry>,
}

/// GET /api/calendar/config
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    let palette = UI_COLORS
        .iter()
        .zip(UI_TO_GOOGLE_ID)
        .map(|(hex, id)| PaletteEntry {
            hex: *hex,
            google_color_id: id.to_string(),
        })
        .collect();

    Json(DataResponse {
        data: CalendarSettings {
            client_id: state.config.calendar.google_client_id.clone(),
            palette,
        },
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
}

/// GET /api/calendar/events?timeMin=&timeMax=
pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(window): Query<EventWindow>,
) -> AppResult<impl IntoResponse> {
    if window.time_max <= window.time_min {
        return Err(AppError::BadRequest("timeMax must be after timeMin".into()));
    }
    let events = state
        .calendar(access_token(&headers)?)
        .list_events(window.time_min, window.time_max)
        .await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/calendar/events
pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<EventDraft>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .calendar(access_token(&headers)?)
        .insert_event(&draft)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// PUT /api/calendar/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .calendar(access_token(&headers)?)
        .update_event(&event_id, &draft)
        .await?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/calendar/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state
        .calendar(access_token(&headers)?)
        .delete_event(&event_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub original: CalendarEvent,
    pub moved: CalendarEvent,
}

#[derive(Debug, Serialize)]
pub struct RescheduleResponse {
    pub applied: bool,
    /// The event to display: the stored one, or the original when reverted.
    pub event: CalendarEvent,
}

/// POST /api/calendar/events/{id}/reschedule
///
/// Always 200; `applied: false` tells the caller to put the event back.
pub async fn reschedule_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
    Json(mut input): Json<RescheduleRequest>,
) -> AppResult<impl IntoResponse> {
    let api = state.calendar(access_token(&headers)?);
    input.original.id = event_id;

    let data = match api.reschedule(&input.original, &input.moved).await {
        RescheduleOutcome::Applied(event) => RescheduleResponse {
            applied: true,
            event,
        },
        RescheduleOutcome::Reverted(event) => RescheduleResponse {
            applied: false,
            event,
        },
    };
    Ok(Json(DataResponse { data }))
}
