//! Google Calendar API v3 client.
//!
//! The OAuth access token is obtained elsewhere (in the browser); this
//! client only attaches it as a bearer token.

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::Deserialize;
use syncup_core::calendar::{CalendarEvent, EventDraft, GoogleEvent};
use syncup_core::error::CoreError;

use crate::error::UpstreamError;
use crate::http::{check_status, endpoint, parse_response, trim_base};

pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";

/// The user's default calendar.
pub const PRIMARY_CALENDAR: &str = "primary";

/// Upper bound on events returned by a single listing.
pub const MAX_RESULTS: u32 = 2500;

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

/// Errors from calendar operations.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Result of pushing a moved or resized event upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
    /// The change was stored; carries the event as Google now has it.
    Applied(CalendarEvent),
    /// The update failed; carries the event as it was before the change so
    /// the view can be restored.
    Reverted(CalendarEvent),
}

#[derive(Clone)]
pub struct GoogleCalendarApi {
    client: reqwest::Client,
    api_url: String,
    calendar_id: String,
    access_token: String,
}

impl GoogleCalendarApi {
    pub fn new(client: reqwest::Client, access_token: String) -> Self {
        Self::with_base_url(client, GOOGLE_CALENDAR_API_URL, access_token)
    }

    /// Client against a non-default API root (a proxy or a test server).
    pub fn with_base_url(client: reqwest::Client, api_url: &str, access_token: String) -> Self {
        Self {
            client,
            api_url: trim_base(api_url),
            calendar_id: PRIMARY_CALENDAR.to_string(),
            access_token,
        }
    }

    /// Use a calendar other than `primary`.
    pub fn for_calendar(mut self, calendar_id: impl Into<String>) -> Self {
        self.calendar_id = calendar_id.into();
        self
    }

    fn events_url(&self, event_id: Option<&str>) -> Result<Url, UpstreamError> {
        let mut segments = vec!["calendars", self.calendar_id.as_str(), "events"];
        segments.extend(event_id);
        endpoint(&self.api_url, &segments)
    }

    /// Expanded single events overlapping `[time_min, time_max)`, ordered by
    /// start time. Deleted events are excluded.
    pub async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        let response = self
            .client
            .get(self.events_url(None)?)
            .bearer_auth(&self.access_token)
            .query(&[
                ("timeMin", time_min.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("timeMax", time_max.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("singleEvents", "true".to_string()),
                ("showDeleted", "false".to_string()),
                ("maxResults", MAX_RESULTS.to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(UpstreamError::from)?;

        let list: EventList = parse_response(response).await?;
        tracing::debug!(count = list.items.len(), "Calendar events listed");
        Ok(list.items.iter().map(CalendarEvent::from_google).collect())
    }

    pub async fn insert_event(&self, draft: &EventDraft) -> Result<CalendarEvent, CalendarError> {
        draft.validate()?;
        let response = self
            .client
            .post(self.events_url(None)?)
            .bearer_auth(&self.access_token)
            .json(&draft.to_resource())
            .send()
            .await
            .map_err(UpstreamError::from)?;

        let created: GoogleEvent = parse_response(response).await?;
        tracing::info!(event_id = %created.id, "Calendar event created");
        Ok(CalendarEvent::from_google(&created))
    }

    pub async fn update_event(
        &self,
        event_id: &str,
        draft: &EventDraft,
    ) -> Result<CalendarEvent, CalendarError> {
        draft.validate()?;
        let response = self
            .client
            .put(self.events_url(Some(event_id))?)
            .bearer_auth(&self.access_token)
            .json(&draft.to_resource())
            .send()
            .await
            .map_err(UpstreamError::from)?;

        let updated: GoogleEvent = parse_response(response).await?;
        tracing::info!(event_id, "Calendar event updated");
        Ok(CalendarEvent::from_google(&updated))
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let response = self
            .client
            .delete(self.events_url(Some(event_id))?)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(UpstreamError::from)?;

        check_status(response).await?;
        tracing::info!(event_id, "Calendar event deleted");
        Ok(())
    }

    /// Push a drag or resize of `original` to the new times in `moved`.
    ///
    /// Never fails: an upstream error is logged and reported as
    /// [`RescheduleOutcome::Reverted`] with the original event.
    pub async fn reschedule(
        &self,
        original: &CalendarEvent,
        moved: &CalendarEvent,
    ) -> RescheduleOutcome {
        match self
            .update_event(&original.id, &EventDraft::from_event(moved))
            .await
        {
            Ok(updated) => RescheduleOutcome::Applied(updated),
            Err(e) => {
                tracing::warn!(event_id = %original.id, error = %e, "Reschedule failed, reverting");
                RescheduleOutcome::Reverted(original.clone())
            }
        }
    }
}
