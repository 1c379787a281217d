//! HTTP surface of the relay.
//!
//! [`routes`] holds the axum router and handlers; [`state`] wires the
//! collaborators they share.

pub mod routes;
pub mod state;

pub use routes::app_router;
pub use state::{AppState, MediaPaths};
