//! REST client for the Mattermost API v4.

use serde_json::{json, Value};

use crate::error::UpstreamError;
use crate::http::{endpoint, parse_response, trim_base};

/// Default number of posts fetched per channel read.
pub const DEFAULT_POST_LIMIT: u32 = 50;

/// HTTP client for one Mattermost server, authenticated with a bearer token.
#[derive(Clone)]
pub struct MattermostApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl MattermostApi {
    /// * `api_url` - Base URL already ending in `/api/v4`, e.g.
    ///   `http://chat.local:8065/api/v4`.
    pub fn new(client: reqwest::Client, api_url: &str, token: String) -> Self {
        Self {
            client,
            api_url: trim_base(api_url),
            token,
        }
    }

    /// Newest posts of a channel, as the raw `{order, posts}` payload.
    ///
    /// `GET /channels/{channel_id}/posts?page=0&per_page={limit}`
    pub async fn channel_posts(&self, channel_id: &str, limit: u32) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(endpoint(&self.api_url, &["channels", channel_id, "posts"])?)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("page", "0".to_string()), ("per_page", limit.to_string())])
            .send()
            .await?;

        parse_response(response).await
    }

    /// Post a message to a channel.
    ///
    /// `POST /posts {channel_id, message}`
    pub async fn create_post(&self, channel_id: &str, message: &str) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .post(endpoint(&self.api_url, &["posts"])?)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&json!({ "channel_id": channel_id, "message": message }))
            .send()
            .await?;

        tracing::debug!(channel_id, "Mattermost post created");
        parse_response(response).await
    }

    /// `GET /channels/{channel_id}`
    pub async fn channel(&self, channel_id: &str) -> Result<Value, UpstreamError> {
        self.get(&["channels", channel_id]).await
    }

    /// `GET /users/{user_id}`
    pub async fn user(&self, user_id: &str) -> Result<Value, UpstreamError> {
        self.get(&["users", user_id]).await
    }

    async fn get(&self, segments: &[&str]) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(endpoint(&self.api_url, segments)?)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        parse_response(response).await
    }
}
