//! Voxstream Server
//!
//! Provides the WebSocket streaming speech channel and HTTP endpoints.

pub mod http;
pub mod rate_limit;
pub mod registry;
pub mod state;
pub mod websocket;

pub use http::create_router;
pub use rate_limit::{RateLimitError, RateLimiter};
pub use registry::{SessionHandle, SessionRegistry};
pub use state::AppState;
pub use websocket::WebSocketHandler;

use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session error: {0}")]
    Session(String),
}
