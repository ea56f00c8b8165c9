//! Shared response envelope for the local workspace handlers.
//!
//! Workspace responses use a `{ "data": ... }` envelope. Proxied upstream
//! responses are relayed without one.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
