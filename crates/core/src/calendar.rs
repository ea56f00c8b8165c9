//! Calendar event shapes and color tables for the Google Calendar
//! integration.
//!
//! The UI offers a ten-color palette while Google Calendar knows eleven
//! numbered event colors; the mapping between the two is a static table.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// UI palette, in picker order.
pub const UI_COLORS: [&str; 10] = [
    "#EF4444", "#F97316", "#FACC15", "#4ADE80", "#22C55E", "#14B8A6", "#3B82F6", "#6366F1",
    "#A855F7", "#EC4899",
];

/// Google `colorId` chosen for each entry of [`UI_COLORS`].
pub const UI_TO_GOOGLE_ID: [u8; 10] = [11, 6, 5, 10, 2, 7, 9, 9, 3, 4];

/// Approximate hex for Google color ids `1..=11`, indexed by `id - 1`.
pub const GOOGLE_COLORS: [&str; 11] = [
    "#7986cb", "#33b679", "#8e24aa", "#e67c73", "#f6c026", "#f5511d", "#039be5", "#616161",
    "#3f51b5", "#0b8043", "#d50000",
];

/// Shown for events without a (valid) color id.
pub const DEFAULT_EVENT_COLOR: &str = "#3B82F6";

/// Placeholder title for events without a summary.
pub const UNTITLED_EVENT: &str = "(no title)";

/// Display hex for a Google `colorId` such as `"11"`.
pub fn google_color_hex(color_id: Option<&str>) -> &'static str {
    color_id
        .and_then(|id| id.trim().parse::<usize>().ok())
        .and_then(|id| id.checked_sub(1))
        .and_then(|idx| GOOGLE_COLORS.get(idx).copied())
        .unwrap_or(DEFAULT_EVENT_COLOR)
}

/// Google `colorId` for the UI palette entry at `index`.
pub fn google_id_for_ui_color(index: usize) -> Option<u8> {
    UI_TO_GOOGLE_ID.get(index).copied()
}

// ---------------------------------------------------------------------------
// Google wire shapes
// ---------------------------------------------------------------------------

/// `start` / `end` of a Google event: `date` for all-day, `dateTime` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
}

impl EventDateTime {
    fn value(&self) -> Option<&str> {
        self.date_time.as_deref().or(self.date.as_deref())
    }
}

/// Event as returned by the Calendar API `events.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventDateTime>,
    pub end: Option<EventDateTime>,
    pub color_id: Option<String>,
}

/// Body sent to `events.insert` / `events.update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub summary: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
}

// ---------------------------------------------------------------------------
// Display model
// ---------------------------------------------------------------------------

/// An event as shown on the calendar grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub description: String,
}

impl CalendarEvent {
    pub fn from_google(event: &GoogleEvent) -> Self {
        let start = event.start.clone().unwrap_or_default();
        Self {
            id: event.id.clone(),
            title: event
                .summary
                .clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| UNTITLED_EVENT.to_string()),
            start: start.value().unwrap_or_default().to_string(),
            end: event
                .end
                .as_ref()
                .and_then(|e| e.value())
                .map(String::from),
            all_day: start.date.is_some(),
            color: google_color_hex(event.color_id.as_deref()).to_string(),
            description: event.description.clone().unwrap_or_default(),
        }
    }
}

/// Editable event fields, as filled in by the create/edit form or produced
/// by a drag/resize on the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub title: String,
    /// ISO date or date-time; only the date part is used for all-day events.
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
    #[serde(default)]
    pub description: String,
    pub color_id: Option<String>,
}

fn date_part(value: &str) -> String {
    value.chars().take(10).collect()
}

impl EventDraft {
    /// Draft carrying an existing event's fields, used to push a moved or
    /// resized event back upstream. The color is left as it is upstream.
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            start: event.start.clone(),
            end: event.end.clone(),
            all_day: event.all_day,
            description: event.description.clone(),
            color_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Event title is required".into()));
        }
        if self.start.trim().is_empty() {
            return Err(CoreError::Validation("Event start is required".into()));
        }
        Ok(())
    }

    /// Convert to the Calendar API body. A missing end falls back to start.
    pub fn to_resource(&self) -> EventResource {
        let end = self
            .end
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.start);

        let (start, end) = if self.all_day {
            (
                EventDateTime {
                    date: Some(date_part(&self.start)),
                    date_time: None,
                },
                EventDateTime {
                    date: Some(date_part(end)),
                    date_time: None,
                },
            )
        } else {
            (
                EventDateTime {
                    date: None,
                    date_time: Some(self.start.clone()),
                },
                EventDateTime {
                    date: None,
                    date_time: Some(end.to_string()),
                },
            )
        };

        EventResource {
            summary: self.title.clone(),
            description: self.description.clone(),
            color_id: self.color_id.clone(),
            start,
            end,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn palette_tables_line_up() {
        assert_eq!(UI_COLORS.len(), UI_TO_GOOGLE_ID.len());
        assert!(UI_TO_GOOGLE_ID.iter().all(|id| (1..=11).contains(id)));
        assert_eq!(google_id_for_ui_color(0), Some(11));
        assert_eq!(google_id_for_ui_color(10), None);
    }

    #[test]
    fn google_color_lookup_with_default() {
        assert_eq!(google_color_hex(Some("1")), "#7986cb");
        assert_eq!(google_color_hex(Some("11")), "#d50000");
        assert_eq!(google_color_hex(Some("0")), DEFAULT_EVENT_COLOR);
        assert_eq!(google_color_hex(Some("12")), DEFAULT_EVENT_COLOR);
        assert_eq!(google_color_hex(Some("red")), DEFAULT_EVENT_COLOR);
        assert_eq!(google_color_hex(None), DEFAULT_EVENT_COLOR);
    }

    #[test]
    fn all_day_google_event_maps_to_display_model() {
        let event: GoogleEvent = serde_json::from_value(json!({
            "id": "evt1",
            "start": {"date": "2025-05-01"},
            "end": {"date": "2025-05-02"},
            "colorId": "2"
        }))
        .unwrap();

        let shown = CalendarEvent::from_google(&event);
        assert_eq!(shown.title, UNTITLED_EVENT);
        assert!(shown.all_day);
        assert_eq!(shown.start, "2025-05-01");
        assert_eq!(shown.end.as_deref(), Some("2025-05-02"));
        assert_eq!(shown.color, "#33b679");
    }

    #[test]
    fn timed_draft_defaults_end_to_start() {
        let draft = EventDraft {
            title: "Standup".into(),
            start: "2025-05-01T09:00:00+09:00".into(),
            end: None,
            all_day: false,
            description: String::new(),
            color_id: Some("9".into()),
        };

        let body = serde_json::to_value(draft.to_resource()).unwrap();
        assert_eq!(body["start"]["dateTime"], "2025-05-01T09:00:00+09:00");
        assert_eq!(body["end"]["dateTime"], "2025-05-01T09:00:00+09:00");
        assert_eq!(body["colorId"], "9");
        assert!(body["start"].get("date").is_none());
    }

    #[test]
    fn all_day_draft_uses_date_part() {
        let draft = EventDraft {
            title: "Offsite".into(),
            start: "2025-05-01T00:00:00".into(),
            end: Some("2025-05-03T00:00:00".into()),
            all_day: true,
            ..EventDraft::default()
        };

        let resource = draft.to_resource();
        assert_eq!(resource.start.date.as_deref(), Some("2025-05-01"));
        assert_eq!(resource.end.date.as_deref(), Some("2025-05-03"));
        assert!(resource.color_id.is_none());
    }

    #[test]
    fn draft_requires_title() {
        let draft = EventDraft {
            start: "2025-05-01".into(),
            ..EventDraft::default()
        };
        assert!(draft.validate().is_err());
    }
}
