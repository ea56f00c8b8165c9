//! Domain model for SyncUp: projects, tasks and the derived views computed
//! from them, plus the pure mapping code shared by the upstream clients
//! (chat payload normalization, calendar colors and event shapes).
//!
//! This crate performs no I/O.

pub mod board;
pub mod calendar;
pub mod chat;
pub mod dates;
pub mod error;
pub mod project;
pub mod task;
pub mod types;
