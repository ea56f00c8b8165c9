//! Typed HTTP clients for the services SyncUp talks to: OpenProject,
//! Mattermost and Google Calendar, plus the chat channel poller.

pub mod calendar;
pub mod error;
mod http;
pub mod mattermost;
pub mod openproject;
pub mod poller;

pub use calendar::{CalendarError, GoogleCalendarApi, RescheduleOutcome};
pub use error::UpstreamError;
pub use mattermost::MattermostApi;
pub use openproject::OpenProjectApi;
pub use poller::{ChannelPoller, ChannelSnapshot, MessageSource, UserDirectory};
