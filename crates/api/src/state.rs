use std::collections::HashMap;
use std::sync::Arc;

use syncup_store::Workspace;
use syncup_upstream::poller::ChannelSnapshot;
use syncup_upstream::{GoogleCalendarApi, MattermostApi, OpenProjectApi};
use tokio::sync::{watch, Mutex};

use crate::config::ServerConfig;

/// Latest snapshot of each background-polled channel, keyed by channel id.
pub type ChatFeeds = HashMap<String, watch::Receiver<Option<ChannelSnapshot>>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Pooled HTTP client shared by every upstream call.
    pub http: reqwest::Client,
    pub openproject: OpenProjectApi,
    pub mattermost: MattermostApi,
    /// The local project/task workspace. Held only for synchronous store calls.
    pub workspace: Arc<Mutex<Workspace>>,
    /// Receivers for channels polled in the background.
    pub chat_feeds: Arc<ChatFeeds>,
}

impl AppState {
    /// Build the upstream clients from `config` around one pooled HTTP client.
    pub fn new(config: ServerConfig, workspace: Workspace) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout())
            .build()?;

        let openproject = OpenProjectApi::new(
            http.clone(),
            &config.openproject.base_url,
            config.openproject.token.clone(),
        );
        let mattermost = MattermostApi::new(
            http.clone(),
            &config.mattermost.api_url,
            config.mattermost.token.clone(),
        );

        Ok(Self {
            config: Arc::new(config),
            http,
            openproject,
            mattermost,
            workspace: Arc::new(Mutex::new(workspace)),
            chat_feeds: Arc::default(),
        })
    }

    pub fn with_chat_feeds(mut self, feeds: ChatFeeds) -> Self {
        self.chat_feeds = Arc::new(feeds);
        self
    }

    /// Calendar client acting with the caller's access token.
    pub fn calendar(&self, access_token: String) -> GoogleCalendarApi {
        GoogleCalendarApi::with_base_url(
            self.http.clone(),
            &self.config.calendar.api_url,
            access_token,
        )
    }
}
