//! Upstream clients against a throwaway local HTTP server.

use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use syncup_core::calendar::{CalendarEvent, EventDraft};
use syncup_upstream::calendar::CalendarError;
use syncup_upstream::openproject::{NewWorkPackage, DEFAULT_PAGE_SIZE};
use syncup_upstream::{
    GoogleCalendarApi, MattermostApi, OpenProjectApi, RescheduleOutcome, UpstreamError,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    uri: String,
    authorization: Option<String>,
    body: Value,
}

type Responder = Arc<dyn Fn(&Recorded) -> (StatusCode, String) + Send + Sync>;

#[derive(Clone)]
struct Mock {
    requests: Arc<Mutex<Vec<Recorded>>>,
    respond: Responder,
}

impl Mock {
    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }
}

async fn record(
    State(mock): State<Mock>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let recorded = Recorded {
        method,
        uri: uri.to_string(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    let (status, text) = (mock.respond)(&recorded);
    mock.requests.lock().unwrap().push(recorded);
    (status, [("content-type", "application/json")], text)
}

/// Start a server answering every request through `respond`.
async fn spawn_mock(
    respond: impl Fn(&Recorded) -> (StatusCode, String) + Send + Sync + 'static,
) -> (String, Mock) {
    let mock = Mock {
        requests: Arc::default(),
        respond: Arc::new(respond),
    };
    let app = Router::new().fallback(record).with_state(mock.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), mock)
}

fn ok(body: Value) -> (StatusCode, String) {
    (StatusCode::OK, body.to_string())
}

#[tokio::test]
async fn openproject_uses_api_prefix_and_basic_auth() {
    let (base, mock) = spawn_mock(|_| ok(json!({"_embedded": {"elements": []}}))).await;
    let api = OpenProjectApi::new(reqwest::Client::new(), &format!("{base}/"), "secret".into());

    api.list_projects().await.unwrap();
    api.list_work_packages("7", DEFAULT_PAGE_SIZE).await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].uri, "/api/v3/projects");
    // base64("apikey:secret")
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic YXBpa2V5OnNlY3JldA==")
    );
    assert_eq!(requests[1].uri, "/api/v3/projects/7/work_packages?pageSize=50");
}

#[tokio::test]
async fn openproject_error_body_is_kept_as_json() {
    let (base, mock) = spawn_mock(|_| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({"errorIdentifier": "PropertyConstraintViolation"}).to_string(),
        )
    })
    .await;
    let api = OpenProjectApi::new(reqwest::Client::new(), &base, "secret".into());
    let input: NewWorkPackage =
        serde_json::from_value(json!({"projectId": "7", "subject": "Fix bug"})).unwrap();

    let err = api.create_work_package(&input).await.unwrap_err();

    assert_matches!(&err, UpstreamError::Api { status: 422, .. });
    assert_eq!(err.body()["errorIdentifier"], "PropertyConstraintViolation");
    let sent = &mock.requests()[0];
    assert_eq!(sent.method, Method::POST);
    assert_eq!(sent.body["_links"], json!({"project": {"href": "/api/v3/projects/7"}}));
}

#[tokio::test]
async fn mattermost_reads_posts_with_paging_and_bearer() {
    let (base, mock) = spawn_mock(|_| ok(json!({"order": [], "posts": {}}))).await;
    let api = MattermostApi::new(reqwest::Client::new(), &format!("{base}/api/v4"), "tok".into());

    api.channel_posts("ch1", 20).await.unwrap();
    api.create_post("ch1", "hello").await.unwrap();

    let requests = mock.requests();
    assert_eq!(requests[0].uri, "/api/v4/channels/ch1/posts?page=0&per_page=20");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer tok"));
    assert_eq!(requests[1].uri, "/api/v4/posts");
    assert_eq!(requests[1].body, json!({"channel_id": "ch1", "message": "hello"}));
}

#[tokio::test]
async fn unreachable_upstream_maps_to_500() {
    let api = MattermostApi::new(reqwest::Client::new(), "http://127.0.0.1:1/api/v4", "t".into());
    let err = api.user("u1").await.unwrap_err();
    assert_matches!(err, UpstreamError::Request(_));
    assert_eq!(err.status(), 500);
}

#[tokio::test]
async fn calendar_lists_expanded_events_in_window() {
    let (base, mock) = spawn_mock(|_| {
        ok(json!({"items": [
            {"id": "e1", "summary": "Standup", "start": {"dateTime": "2025-05-01T09:00:00Z"},
             "end": {"dateTime": "2025-05-01T09:15:00Z"}, "colorId": "11"},
            {"id": "e2", "start": {"date": "2025-05-02"}, "end": {"date": "2025-05-03"}}
        ]}))
    })
    .await;
    let api = GoogleCalendarApi::with_base_url(reqwest::Client::new(), &base, "at".into());

    let events = api
        .list_events(
            Utc.with_ymd_and_hms(2025, 4, 27, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].color, "#d50000");
    assert!(events[1].all_day);
    assert_eq!(events[1].title, "(no title)");

    let uri = &mock.requests()[0].uri;
    assert!(uri.starts_with("/calendars/primary/events?"));
    for param in [
        "singleEvents=true",
        "showDeleted=false",
        "maxResults=2500",
        "orderBy=startTime",
        "timeMin=2025-04-27T00%3A00%3A00Z",
    ] {
        assert!(uri.contains(param), "{uri} is missing {param}");
    }
}

#[tokio::test]
async fn calendar_insert_rejects_blank_title_without_a_request() {
    let (base, mock) = spawn_mock(|_| ok(json!({}))).await;
    let api = GoogleCalendarApi::with_base_url(reqwest::Client::new(), &base, "at".into());

    let result = api
        .insert_event(&EventDraft {
            start: "2025-05-01".into(),
            all_day: true,
            ..EventDraft::default()
        })
        .await;

    assert_matches!(result, Err(CalendarError::Invalid(_)));
    assert!(mock.requests().is_empty());
}

fn standup(start: &str, end: &str) -> CalendarEvent {
    CalendarEvent {
        id: "e1".into(),
        title: "Standup".into(),
        start: start.into(),
        end: Some(end.into()),
        all_day: false,
        color: "#3B82F6".into(),
        description: String::new(),
    }
}

#[tokio::test]
async fn reschedule_reverts_on_upstream_failure() {
    let (base, mock) =
        spawn_mock(|_| (StatusCode::FORBIDDEN, json!({"error": "forbidden"}).to_string())).await;
    let api = GoogleCalendarApi::with_base_url(reqwest::Client::new(), &base, "at".into());
    let original = standup("2025-05-01T09:00:00Z", "2025-05-01T09:15:00Z");
    let moved = standup("2025-05-02T09:00:00Z", "2025-05-02T09:15:00Z");

    let outcome = api.reschedule(&original, &moved).await;

    assert_eq!(outcome, RescheduleOutcome::Reverted(original));
    let sent = &mock.requests()[0];
    assert_eq!(sent.method, Method::PUT);
    assert_eq!(sent.uri, "/calendars/primary/events/e1");
    assert_eq!(sent.body["start"]["dateTime"], "2025-05-02T09:00:00Z");
    assert!(sent.body.get("colorId").is_none());
}

#[tokio::test]
async fn reschedule_applies_on_success() {
    let (base, _mock) = spawn_mock(|req| {
        ok(json!({
            "id": "e1",
            "summary": req.body["summary"],
            "start": req.body["start"],
            "end": req.body["end"]
        }))
    })
    .await;
    let api = GoogleCalendarApi::with_base_url(reqwest::Client::new(), &base, "at".into());
    let original = standup("2025-05-01T09:00:00Z", "2025-05-01T09:15:00Z");
    let moved = standup("2025-05-02T09:00:00Z", "2025-05-02T09:15:00Z");

    let outcome = api.reschedule(&original, &moved).await;

    assert_matches!(outcome, RescheduleOutcome::Applied(event) if event.start == "2025-05-02T09:00:00Z");
}

#[tokio::test]
async fn calendar_event_ids_are_sent_as_one_segment() {
    let (base, mock) = spawn_mock(|_| (StatusCode::NO_CONTENT, String::new())).await;
    let api = GoogleCalendarApi::with_base_url(reqwest::Client::new(), &base, "at".into());

    api.delete_event("../../users/me/settings").await.unwrap();
    let result = api.delete_event("..").await;

    assert_matches!(
        result,
        Err(CalendarError::Upstream(UpstreamError::InvalidPath(_)))
    );
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(
        requests[0].uri,
        "/calendars/primary/events/..%2F..%2Fusers%2Fme%2Fsettings"
    );
}
