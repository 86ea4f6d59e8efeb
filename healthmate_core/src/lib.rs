#![forbid(unsafe_code)]

//! Core domain model and persistence for HealthMate.
//!
//! This crate provides:
//! - Domain types (profile, meals, meal entries and their collections)
//! - Flat-file persistence for the profile, meal catalog and entry log
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
mod store;
pub mod history;
pub mod user_data;

// Re-export commonly used types
pub use error::{Error, LineError, Result};
pub use types::*;
pub use config::Config;
pub use history::{HistoryTracker, Loaded, SkippedLine};
pub use user_data::ProfileSave;
