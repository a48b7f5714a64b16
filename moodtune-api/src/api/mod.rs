//! HTTP API handlers for moodtune-api

pub mod buildinfo;
pub mod health;
pub mod playlist;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use playlist::generate_playlist;
