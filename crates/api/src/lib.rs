//! HTTP gateway for SyncUp: proxies OpenProject, Mattermost and Google
//! Calendar for the browser, and serves the local project/task workspace.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
