//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the availability proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The LibCal grid endpoint and the browser identity we present to it.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Room catalog source.
    pub catalog: CatalogConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security hardening settings.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound LibCal settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Full URL of the availability grid endpoint.
    pub endpoint: String,

    /// Value of the `Origin` header.
    pub origin: String,

    /// `Referer` used when the caller does not supply one.
    pub default_referer: String,

    /// Value of the `User-Agent` header.
    pub user_agent: String,

    /// Value of the `Accept-Language` header.
    pub accept_language: String,

    /// Value of the `Accept-Encoding` header. Omitted when unset.
    pub accept_encoding: Option<String>,

    /// IANA zone that decides what "today" is.
    pub timezone: String,

    /// `pageSize` form field.
    pub page_size: u32,

    /// Room queried when the caller names none.
    pub default_room: DefaultRoomConfig,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://libcal.wesleyan.edu/spaces/availability/grid".to_string(),
            origin: "https://libcal.wesleyan.edu".to_string(),
            default_referer: "https://libcal.wesleyan.edu/reserve".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            accept_encoding: Some("gzip, deflate, br".to_string()),
            timezone: "America/New_York".to_string(),
            page_size: 18,
            default_room: DefaultRoomConfig::default(),
        }
    }
}

/// Default `lid`/`gid`/`eid` triple (Olin 251).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct DefaultRoomConfig {
    pub lid: String,
    pub gid: String,
    pub eid: String,
}

impl Default for DefaultRoomConfig {
    fn default() -> Self {
        Self {
            lid: "8176".to_string(),
            gid: "14568".to_string(),
            eid: "107918".to_string(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout towards LibCal, in seconds.
    pub connect_secs: u64,

    /// Inbound request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Idle pooled connection timeout in seconds.
    pub idle_secs: u64,

    /// Total timeout for the outbound grid call. Unset, or anything longer
    /// than `request_secs`, means just under `request_secs`.
    pub upstream_secs: Option<u64>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
            idle_secs: 60,
            upstream_secs: None,
        }
    }
}

/// Where the static room catalog lives.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to `rooms.json`. Without it the catalog is empty.
    pub path: Option<PathBuf>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable the Prometheus scrape endpoint.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "availability_proxy=debug,tower_http=debug".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Add `nosniff` and `no-store` headers to every response.
    pub enable_headers: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            max_body_size: 64 * 1024, // 64KB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ProxyConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.upstream.page_size, 18);
        assert_eq!(config.upstream.default_room, DefaultRoomConfig::default());
        assert!(config.timeouts.upstream_secs.is_none());
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            timezone = "UTC"

            [upstream.default_room]
            eid = "1"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.timezone, "UTC");
        assert_eq!(config.upstream.origin, "https://libcal.wesleyan.edu");
        assert_eq!(config.upstream.default_room.lid, "8176");
        assert_eq!(config.upstream.default_room.eid, "1");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }
}
