/// Project and task identifiers are opaque strings (UUID v4 when generated here).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh, never-reused entity identifier.
pub fn new_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
