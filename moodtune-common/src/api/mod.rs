//! Shared HTTP API types
//!
//! Request and response bodies of the playlist service. Kept free of any HTTP
//! framework dependency so clients can reuse them.

pub mod types;

pub use types::{ErrorBody, ErrorResponse, GeneratePlaylistRequest, HealthResponse, PlaylistResponse};
