//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! proxy.toml
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → server builds a Runtime snapshot from it
//!
//! On change of proxy.toml or rooms.json:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → server swaps in a new Runtime (upstream client + catalog)
//! ```
//!
//! Listener, timeout and middleware settings are read once at startup.

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    CatalogConfig, DefaultRoomConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    ProxyConfig, SecurityConfig, TimeoutConfig, UpstreamConfig,
};
pub use watcher::ConfigWatcher;
