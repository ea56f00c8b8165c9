use std::time::Duration;

use syncup_store::StoreConfig;

/// OpenProject connection settings.
#[derive(Debug, Clone)]
pub struct OpenProjectConfig {
    /// Instance root without the `/api/v3` suffix.
    pub base_url: String,
    /// API key, sent as the basic-auth password for user `apikey`.
    pub token: String,
}

/// Mattermost connection settings.
#[derive(Debug, Clone)]
pub struct MattermostConfig {
    /// API root, normally ending in `/api/v4`.
    pub api_url: String,
    /// Personal access or bot token.
    pub token: String,
    /// Channels polled in the background and served from memory.
    pub watch_channels: Vec<String>,
    /// Refresh interval for watched channels, in seconds (default: `5`).
    pub poll_interval_secs: u64,
}

/// Google Calendar settings. The access token comes with each request.
#[derive(Debug, Clone)]
pub struct CalendarConfig {
    /// OAuth client id handed to the browser for token acquisition.
    pub google_client_id: Option<String>,
    /// Calendar API root (default: `https://www.googleapis.com/calendar/v3`).
    pub api_url: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the OpenProject base URL have defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `4000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Timeout for each outbound upstream request in seconds (default: `15`).
    pub upstream_timeout_secs: u64,
    pub openproject: OpenProjectConfig,
    pub mattermost: MattermostConfig,
    pub calendar: CalendarConfig,
    pub store: StoreConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                                  |
    /// |--------------------------------|------------------------------------------|
    /// | `HOST`                         | `0.0.0.0`                                |
    /// | `PORT`                         | `4000`                                   |
    /// | `CORS_ORIGINS`                 | `http://localhost:3000`                  |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                                     |
    /// | `UPSTREAM_TIMEOUT_SECS`        | `15`                                     |
    /// | `OPENPROJECT_BASE_URL`         | required                                 |
    /// | `OPENPROJECT_TOKEN`            | empty                                    |
    /// | `MATTERMOST_URL`               | empty                                    |
    /// | `MATTERMOST_TOKEN`             | empty                                    |
    /// | `MATTERMOST_WATCH_CHANNELS`    | none                                     |
    /// | `MATTERMOST_POLL_INTERVAL_SECS`| `5`                                      |
    /// | `GOOGLE_CLIENT_ID`             | unset                                    |
    /// | `GOOGLE_CALENDAR_API_URL`      | `https://www.googleapis.com/calendar/v3` |
    /// | `DATA_DIR`, `CASCADE_DELETES`  | see [`StoreConfig::from_env`]            |
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "4000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = comma_list(&env_or("CORS_ORIGINS", "http://localhost:3000"));

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upstream_timeout_secs: u64 = env_or("UPSTREAM_TIMEOUT_SECS", "15")
            .parse()
            .expect("UPSTREAM_TIMEOUT_SECS must be a valid u64");

        let openproject = OpenProjectConfig {
            base_url: std::env::var("OPENPROJECT_BASE_URL")
                .expect("OPENPROJECT_BASE_URL must be set"),
            token: env_or("OPENPROJECT_TOKEN", ""),
        };

        let mattermost_url = env_or("MATTERMOST_URL", "");
        if mattermost_url.is_empty() {
            tracing::warn!("MATTERMOST_URL is not set, chat routes will fail");
        }
        let mattermost = MattermostConfig {
            api_url: mattermost_url,
            token: env_or("MATTERMOST_TOKEN", ""),
            watch_channels: comma_list(&env_or("MATTERMOST_WATCH_CHANNELS", "")),
            poll_interval_secs: positive_secs(&env_or("MATTERMOST_POLL_INTERVAL_SECS", "5"))
                .expect("MATTERMOST_POLL_INTERVAL_SECS must be a positive integer"),
        };

        let calendar = CalendarConfig {
            google_client_id: std::env::var("GOOGLE_CLIENT_ID")
                .ok()
                .filter(|s| !s.is_empty()),
            api_url: env_or(
                "GOOGLE_CALENDAR_API_URL",
                syncup_upstream::calendar::GOOGLE_CALENDAR_API_URL,
            ),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            upstream_timeout_secs,
            openproject,
            mattermost,
            calendar,
            store: StoreConfig::from_env(),
        }
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.mattermost.poll_interval_secs)
    }
}

/// Whole seconds greater than zero. A zero period would make the poll
/// ticker panic.
fn positive_secs(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|secs| *secs > 0)
}
