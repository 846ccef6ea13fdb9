//! HTTP surface of the proxy.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (x-request-id assigned / propagated)
//!     → availability.rs | rooms.rs (handlers)
//!     → response.rs (JSON envelopes)
//!     → client
//! ```

pub mod availability;
pub mod request;
pub mod response;
pub mod rooms;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer, Runtime, StartupError};
