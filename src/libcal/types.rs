//! Room identifiers, caller-supplied parameters and error definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::DefaultRoomConfig;
use crate::libcal::decode::ContentEncoding;

/// The `(lid, gid, eid)` key LibCal uses for a bookable space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomIds {
    pub lid: String,
    pub gid: String,
    pub eid: String,
}

impl RoomIds {
    pub fn new(lid: impl Into<String>, gid: impl Into<String>, eid: impl Into<String>) -> Self {
        Self {
            lid: lid.into(),
            gid: gid.into(),
            eid: eid.into(),
        }
    }

    /// Read a positional `[lid, gid, eid, ...]` array.
    ///
    /// Returns `None` unless there are at least three elements and the first
    /// three are strings or numbers.
    pub fn from_payload(values: &[Value]) -> Option<Self> {
        match values {
            [lid, gid, eid, ..] => Some(Self {
                lid: scalar_param(lid)?,
                gid: scalar_param(gid)?,
                eid: scalar_param(eid)?,
            }),
            _ => None,
        }
    }
}

impl From<&DefaultRoomConfig> for RoomIds {
    fn from(room: &DefaultRoomConfig) -> Self {
        Self::new(&room.lid, &room.gid, &room.eid)
    }
}

/// A fully resolved availability query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomQuery {
    pub ids: RoomIds,
    /// Overrides the configured default `Referer`.
    pub referer: Option<String>,
}

/// What a caller may send, from either a JSON body or a query string.
///
/// Values stay as raw JSON so numbers and strings are both accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityParams {
    pub payload: Option<Value>,
    pub lid: Option<Value>,
    pub gid: Option<Value>,
    pub eid: Option<Value>,
    pub referer: Option<Value>,
    pub link: Option<Value>,
}

impl AvailabilityParams {
    /// Parse a POST body. Anything that is not a JSON object yields no parameters.
    pub fn from_body(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
            Ok(_) => {
                tracing::debug!("Ignoring non-object availability body");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unparseable availability body");
                Self::default()
            }
        }
    }

    /// Parse a GET query string. `payload` is only honoured in bodies.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        let Some(query) = query else {
            return params;
        };
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(Value::String(value.into_owned()));
            match key.as_ref() {
                "lid" => params.lid = value,
                "gid" => params.gid = value,
                "eid" => params.eid = value,
                "referer" => params.referer = value,
                "link" => params.link = value,
                _ => {}
            }
        }
        params
    }

    /// Resolve against the defaults.
    ///
    /// A usable `payload` wins over named fields; `link` wins over `referer`.
    pub fn resolve(&self, defaults: &RoomIds) -> RoomQuery {
        let positional = self
            .payload
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|values| RoomIds::from_payload(values));

        let ids = positional.unwrap_or_else(|| RoomIds {
            lid: present(&self.lid).unwrap_or_else(|| defaults.lid.clone()),
            gid: present(&self.gid).unwrap_or_else(|| defaults.gid.clone()),
            eid: present(&self.eid).unwrap_or_else(|| defaults.eid.clone()),
        });

        let referer = present(&self.link).or_else(|| present(&self.referer));

        RoomQuery { ids, referer }
    }
}

/// Render a string or number as a form parameter.
///
/// Integral floats lose their fraction, so `8176.0` is sent as `8176`.
pub(crate) fn scalar_param(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{f:.0}")),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

fn present(value: &Option<Value>) -> Option<String> {
    value
        .as_ref()
        .and_then(scalar_param)
        .filter(|s| !s.is_empty())
}

/// Errors that can occur while querying LibCal.
#[derive(Debug, Error)]
pub enum LibcalError {
    /// The configured endpoint is not a usable URL.
    #[error("invalid LibCal endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// A configured header value cannot be sent.
    #[error("invalid value for header {0}")]
    InvalidHeader(&'static str),

    /// Building the HTTP client failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Connecting, sending or reading the body failed.
    #[error("failed to fetch data from LibCal: {0}")]
    Network(#[source] reqwest::Error),

    /// No complete reply arrived in time.
    #[error("LibCal did not respond within {} ms", .0.as_millis())]
    Timeout(std::time::Duration),

    /// LibCal answered with a non-success status.
    #[error("LibCal responded with status {0}")]
    Status(u16),

    /// The body could not be decompressed.
    #[error("failed to decode {encoding} response body: {source}")]
    Decode {
        encoding: ContentEncoding,
        #[source]
        source: std::io::Error,
    },

    /// The (decoded) body is not JSON.
    #[error("invalid JSON response from LibCal: {0}")]
    Json(#[from] serde_json::Error),
}
