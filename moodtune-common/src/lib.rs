//! # MoodTune Common Library
//!
//! Shared code for the MoodTune playlist service including:
//! - Mood input model (genre, weather, time of day)
//! - API request/response types
//! - Bootstrap configuration loading
//! - Common error type

pub mod api;
pub mod config;
pub mod error;
pub mod mood;

pub use error::{Error, Result};
pub use mood::{MoodInput, TimeOfDay, Weather};
