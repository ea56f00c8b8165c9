use serde_json::Value;

/// Errors from the upstream REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The upstream service returned a non-2xx status code.
    #[error("Upstream API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body: parsed JSON when possible, otherwise the raw text.
        body: Value,
    },

    /// A caller-supplied id cannot be used as a URL path segment.
    #[error("Invalid path segment: {0:?}")]
    InvalidPath(String),
}

impl UpstreamError {
    /// Status to relay to the caller: the upstream status, or 500 when no
    /// response was received.
    pub fn status(&self) -> u16 {
        match self {
            UpstreamError::Api { status, .. } => *status,
            UpstreamError::Request(e) => e.status().map(|s| s.as_u16()).unwrap_or(500),
            UpstreamError::InvalidPath(_) => 400,
        }
    }

    /// Payload to relay under the `error` key.
    pub fn body(&self) -> Value {
        match self {
            UpstreamError::Api { body, .. } => body.clone(),
            UpstreamError::Request(e) => Value::String(e.to_string()),
            UpstreamError::InvalidPath(_) => Value::String(self.to_string()),
        }
    }
}
