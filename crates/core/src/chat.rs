//! Normalization of chat (Mattermost) post payloads.
//!
//! The channel-posts endpoint normally answers `{ order: [...], posts: {...} }`,
//! but other shapes have been seen from proxies and older servers. Each known
//! shape is a [`PostsPayload`] variant with its own mapping; anything else is
//! [`PostsPayload::Unknown`] and normalizes to an empty list.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::Timestamp;

/// Placeholder user id for list items that carry no user reference.
pub const UNKNOWN_USER: &str = "unknown";

/// A chat message in display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: String,
    /// Known only when the payload embeds it; otherwise resolved later.
    pub username: Option<String>,
    pub content: String,
    pub timestamp: Option<Timestamp>,
}

/// The upstream response shapes we know how to read.
#[derive(Debug, Clone, PartialEq)]
pub enum PostsPayload {
    /// `{ order: [id...], posts: { id: post } }`, newest first.
    Ordered {
        order: Vec<String>,
        posts: Map<String, Value>,
    },
    /// A bare array of message-like objects.
    List(Vec<Value>),
    /// `{ messages: [...] }` or `{ data: [...] }`.
    Wrapped(Vec<Value>),
    Unknown,
}

impl PostsPayload {
    pub fn classify(raw: &Value) -> Self {
        match raw {
            Value::Array(items) => PostsPayload::List(items.clone()),
            Value::Object(obj) => {
                if let (Some(Value::Array(order)), Some(Value::Object(posts))) =
                    (obj.get("order"), obj.get("posts"))
                {
                    return PostsPayload::Ordered {
                        order: order
                            .iter()
                            .filter_map(|id| id.as_str().map(String::from))
                            .collect(),
                        posts: posts.clone(),
                    };
                }
                match obj.get("messages").or_else(|| obj.get("data")) {
                    Some(Value::Array(items)) => PostsPayload::Wrapped(items.clone()),
                    _ => PostsPayload::Unknown,
                }
            }
            _ => PostsPayload::Unknown,
        }
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            PostsPayload::Ordered { order, posts } => order
                .iter()
                .filter_map(|id| posts.get(id))
                .map(message_from_post)
                .collect(),
            PostsPayload::List(items) | PostsPayload::Wrapped(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| message_from_item(idx, item))
                .collect(),
            PostsPayload::Unknown => Vec::new(),
        }
    }
}

/// Convert any channel-posts payload into display messages. Never fails.
pub fn normalize_posts(raw: &Value) -> Vec<ChatMessage> {
    PostsPayload::classify(raw).into_messages()
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Epoch milliseconds or an RFC 3339 string.
fn parse_timestamp(value: &Value) -> Option<Timestamp> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

fn message_from_post(post: &Value) -> ChatMessage {
    ChatMessage {
        id: str_field(post, "id").unwrap_or_default().to_string(),
        user_id: str_field(post, "user_id").unwrap_or(UNKNOWN_USER).to_string(),
        username: None,
        content: str_field(post, "message").unwrap_or_default().to_string(),
        timestamp: post.get("create_at").and_then(parse_timestamp),
    }
}

fn message_from_item(idx: usize, item: &Value) -> ChatMessage {
    let id = match item.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => idx.to_string(),
    };

    let nested_user = item.get("user");
    let user_id = str_field(item, "user_id")
        .or_else(|| str_field(item, "userId"))
        .or_else(|| nested_user.and_then(|u| str_field(u, "id")))
        .unwrap_or(UNKNOWN_USER)
        .to_string();

    let username = str_field(item, "username")
        .or_else(|| nested_user.and_then(|u| str_field(u, "username")))
        .map(String::from);

    let content = str_field(item, "message")
        .or_else(|| str_field(item, "content"))
        .or_else(|| str_field(item, "text"))
        .unwrap_or_default()
        .to_string();

    let timestamp = ["timestamp", "create_at", "createAt"]
        .iter()
        .find_map(|key| item.get(*key).and_then(parse_timestamp));

    ChatMessage {
        id,
        user_id,
        username,
        content,
        timestamp,
    }
}

/// Best display name for a chat user record: username, nickname, first and
/// last name, then the id itself.
pub fn display_name(user: &Value, user_id: &str) -> String {
    if let Some(name) = str_field(user, "username").or_else(|| str_field(user, "nickname")) {
        return name.to_string();
    }
    let full = format!(
        "{}{}",
        str_field(user, "first_name").unwrap_or_default(),
        str_field(user, "last_name").unwrap_or_default()
    );
    if full.is_empty() {
        user_id.to_string()
    } else {
        full
    }
}

/// First eight characters of an id, shown while a name is unresolved.
pub fn short_id(id: &str) -> String {
    if id.is_empty() {
        return UNKNOWN_USER.to_string();
    }
    id.chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    #[test]
    fn ordered_payload_follows_order_and_skips_missing_posts() {
        let raw = json!({
            "order": ["b", "a", "ghost"],
            "posts": {
                "a": {"id": "a", "user_id": "u1", "message": "hello", "create_at": 1_700_000_000_000_i64},
                "b": {"id": "b", "user_id": "u2", "message": "world"}
            }
        });

        let messages = normalize_posts(&raw);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "b");
        assert_eq!(messages[0].timestamp, None);
        assert_eq!(messages[1].content, "hello");
        assert_eq!(messages[1].user_id, "u1");
        assert!(messages[1].timestamp.is_some());
        assert!(messages.iter().all(|m| m.username.is_none()));
    }

    #[test]
    fn list_payload_reads_alternate_keys() {
        let raw = json!([
            {"id": 7, "userId": "u1", "text": "hi", "createAt": "2025-03-01T09:00:00Z"},
            {"user": {"id": "u2", "username": "mina"}, "content": "yo"}
        ]);

        let messages = normalize_posts(&raw);
        assert_eq!(messages[0].id, "7");
        assert_eq!(messages[0].user_id, "u1");
        assert_eq!(messages[0].content, "hi");
        assert!(messages[0].timestamp.is_some());
        assert_eq!(messages[1].id, "1");
        assert_eq!(messages[1].username.as_deref(), Some("mina"));
    }

    #[test]
    fn wrapped_payload_is_unwrapped() {
        let raw = json!({"data": [{"message": "from data"}]});
        assert_matches!(PostsPayload::classify(&raw), PostsPayload::Wrapped(_));
        let messages = normalize_posts(&raw);
        assert_eq!(messages[0].content, "from data");
        assert_eq!(messages[0].user_id, UNKNOWN_USER);
    }

    #[test]
    fn malformed_payloads_normalize_to_empty() {
        for raw in [
            json!({"unexpected": true}),
            json!({"order": "nope", "posts": []}),
            json!({"messages": "not a list"}),
            json!("just text"),
            json!(42),
            Value::Null,
        ] {
            assert_eq!(PostsPayload::classify(&raw), PostsPayload::Unknown);
            assert!(normalize_posts(&raw).is_empty());
        }
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(display_name(&json!({"username": "jun"}), "u1"), "jun");
        assert_eq!(display_name(&json!({"nickname": "J"}), "u1"), "J");
        assert_eq!(
            display_name(&json!({"first_name": "Kim", "last_name": "Jun"}), "u1"),
            "KimJun"
        );
        assert_eq!(display_name(&json!({}), "u1"), "u1");
    }

    #[test]
    fn short_id_truncates() {
        assert_eq!(short_id("sif63njwbfbftc4ospi7wscc6r"), "sif63njw");
        assert_eq!(short_id(""), UNKNOWN_USER);
    }
}
