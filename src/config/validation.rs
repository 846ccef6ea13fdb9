//! Configuration validation.
//!
//! Serde handles the syntax; this module checks the values that only fail
//! at runtime: addresses, the upstream URL, header values and the time zone.
//! Every failure is collected so one run reports all of them.

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use chrono_tz::Tz;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    let upstream = &config.upstream;
    match Url::parse(&upstream.endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "upstream.endpoint",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.endpoint", e.to_string())),
    }

    if let Err(e) = upstream.timezone.parse::<Tz>() {
        errors.push(ValidationError::new("upstream.timezone", e.to_string()));
    }

    if upstream.page_size == 0 {
        errors.push(ValidationError::new("upstream.page_size", "must be greater than 0"));
    }

    let headers = [
        ("upstream.origin", Some(&upstream.origin)),
        ("upstream.default_referer", Some(&upstream.default_referer)),
        ("upstream.user_agent", Some(&upstream.user_agent)),
        ("upstream.accept_language", Some(&upstream.accept_language)),
        ("upstream.accept_encoding", upstream.accept_encoding.as_ref()),
    ];
    for (field, value) in headers {
        if let Some(value) = value {
            if HeaderValue::from_str(value).is_err() {
                errors.push(ValidationError::new(field, "not a valid header value"));
            }
        }
    }

    let room = &upstream.default_room;
    for (field, value) in [
        ("upstream.default_room.lid", &room.lid),
        ("upstream.default_room.gid", &room.gid),
        ("upstream.default_room.eid", &room.eid),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0 when set"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
