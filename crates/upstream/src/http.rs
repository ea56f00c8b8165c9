//! Response handling shared by the upstream clients.

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::UpstreamError;

/// Strip trailing slashes so paths can be appended with `format!`.
pub(crate) fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// `base` followed by `segments`, each percent-encoded as a single path
/// segment so ids cannot climb out of their position (`a/../b` is sent as
/// `a%2F..%2Fb`). Empty, `.` and `..` segments are rejected.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, UpstreamError> {
    if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
        return Err(UpstreamError::InvalidPath(bad.to_string()));
    }
    let mut url =
        Url::parse(base).map_err(|e| UpstreamError::InvalidPath(format!("{base}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| UpstreamError::InvalidPath(base.to_string()))?
        .extend(segments);
    Ok(url)
}

/// Turn an error response body into JSON: parsed when it is JSON, the raw
/// text otherwise, and a short `HTTP <status>` note when it is empty.
pub(crate) fn error_body(status: u16, text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::String(format!("HTTP {status}"));
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`UpstreamError::Api`] with the status and
/// body on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(UpstreamError::Api {
            status: status.as_u16(),
            body: error_body(status.as_u16(), &text),
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UpstreamError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Assert the response has a success status code, discarding the body.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<(), UpstreamError> {
    ensure_success(response).await?;
    Ok(())
}
