pub mod calendar;
pub mod mattermost;
pub mod openproject;
pub mod projects;
pub mod tasks;
