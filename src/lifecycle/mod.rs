//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     trigger() or OS signal → server stops accepting → in-flight requests drain
//!
//! Signals (signals.rs):
//!     SIGTERM / Ctrl+C → graceful shutdown
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
