//! LibCal room availability proxy.
//!
//! Relays "is this room free today?" queries from the room-booking front end
//! to the LibCal availability grid, which cannot be called from a browser.
//! Also serves the read-only room catalog the front end lists and filters.

pub mod catalog;
pub mod config;
pub mod http;
pub mod libcal;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
