//! HTTP client for the LibCal availability grid.
//!
//! Sends one form-encoded POST per call with the same headers the LibCal
//! booking page sends from a browser, then decodes and parses the reply.
//! There are no retries; every call is a single attempt.

use std::time::{Duration, Instant};

use axum::http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONTENT_ENCODING,
    CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT,
};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::libcal::dates::DateRange;
use crate::libcal::decode::ContentEncoding;
use crate::libcal::form::grid_form;
use crate::libcal::types::{LibcalError, RoomQuery};
use crate::observability::metrics;

const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Kept back from `request_secs`; the grid call must time out before the inbound request does.
const RESPONSE_MARGIN: Duration = Duration::from_millis(250);

/// A parsed grid reply.
#[derive(Debug, Clone)]
pub struct GridReply {
    pub body: Value,
    /// Size of the body as received, before decoding.
    pub wire_size: usize,
    pub encoding: ContentEncoding,
}

/// Client for the availability grid endpoint.
#[derive(Debug, Clone)]
pub struct LibcalClient {
    http: Client,
    endpoint: Url,
    base_headers: HeaderMap,
    default_referer: HeaderValue,
    page_size: u32,
    deadline: Duration,
}

impl LibcalClient {
    /// Build a client from the upstream and timeout settings.
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, LibcalError> {
        let endpoint = Url::parse(&upstream.endpoint).map_err(|e| LibcalError::InvalidEndpoint {
            endpoint: upstream.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let mut base_headers = HeaderMap::new();
        base_headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        base_headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        base_headers.insert(ACCEPT_LANGUAGE, header_value("Accept-Language", &upstream.accept_language)?);
        base_headers.insert(ORIGIN, header_value("Origin", &upstream.origin)?);
        base_headers.insert(USER_AGENT, header_value("User-Agent", &upstream.user_agent)?);
        base_headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        if let Some(encoding) = &upstream.accept_encoding {
            base_headers.insert(ACCEPT_ENCODING, header_value("Accept-Encoding", encoding)?);
        }

        let http = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .pool_idle_timeout(Duration::from_secs(timeouts.idle_secs))
            .build()
            .map_err(LibcalError::Client)?;

        Ok(Self {
            http,
            endpoint,
            base_headers,
            default_referer: header_value("Referer", &upstream.default_referer)?,
            page_size: upstream.page_size,
            deadline: upstream_deadline(timeouts),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query the grid for one room over `dates`.
    pub async fn fetch_grid(
        &self,
        query: &RoomQuery,
        dates: &DateRange,
    ) -> Result<GridReply, LibcalError> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.deadline, self.send(query, dates)).await {
            Ok(result) => result,
            Err(_) => Err(LibcalError::Timeout(self.deadline)),
        };
        let outcome = match &result {
            Ok(_) => "ok",
            Err(LibcalError::Timeout(_)) => "timeout",
            Err(LibcalError::Network(_)) => "network_error",
            Err(LibcalError::Status(_)) => "bad_status",
            Err(LibcalError::Decode { .. }) => "decode_error",
            Err(LibcalError::Json(_)) => "invalid_json",
            Err(_) => "error",
        };
        metrics::record_upstream(outcome, start);
        result
    }

    async fn send(&self, query: &RoomQuery, dates: &DateRange) -> Result<GridReply, LibcalError> {
        let form = grid_form(&query.ids, dates, self.page_size);

        let mut headers = self.base_headers.clone();
        headers.insert(REFERER, self.referer_for(query));

        tracing::debug!(
            lid = %query.ids.lid,
            gid = %query.ids.gid,
            eid = %query.ids.eid,
            start = %dates.start,
            end = %dates.end,
            "Querying LibCal availability grid"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .headers(headers)
            .body(form)
            .send()
            .await
            .map_err(LibcalError::Network)?;

        let status = response.status();
        let encoding = ContentEncoding::from_header(response.headers().get(CONTENT_ENCODING));
        let raw = response.bytes().await.map_err(LibcalError::Network)?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), body_bytes = raw.len(), "LibCal returned an error status");
            return Err(LibcalError::Status(status.as_u16()));
        }

        let decoded = encoding
            .decode(&raw)
            .map_err(|source| LibcalError::Decode { encoding, source })?;
        let text = String::from_utf8_lossy(&decoded);
        let body: Value = serde_json::from_str(&text)?;

        tracing::debug!(
            encoding = %encoding,
            wire_bytes = raw.len(),
            decoded_bytes = decoded.len(),
            "LibCal availability received"
        );

        Ok(GridReply {
            body,
            wire_size: raw.len(),
            encoding,
        })
    }

    fn referer_for(&self, query: &RoomQuery) -> HeaderValue {
        let Some(referer) = query.referer.as_deref() else {
            return self.default_referer.clone();
        };
        HeaderValue::from_str(referer).unwrap_or_else(|_| {
            tracing::warn!(referer = %referer, "Ignoring unusable referer override");
            self.default_referer.clone()
        })
    }
}

/// `timeouts.upstream_secs` when set, capped just below the inbound request timeout.
fn upstream_deadline(timeouts: &TimeoutConfig) -> Duration {
    let inbound = Duration::from_secs(timeouts.request_secs).saturating_sub(RESPONSE_MARGIN);
    match timeouts.upstream_secs {
        Some(secs) => Duration::from_secs(secs).min(inbound),
        None => inbound,
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, LibcalError> {
    HeaderValue::from_str(value).map_err(|_| LibcalError::InvalidHeader(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libcal::types::RoomIds;

    fn client() -> LibcalClient {
        LibcalClient::new(&UpstreamConfig::default(), &TimeoutConfig::default()).unwrap()
    }

    #[test]
    fn rejects_bad_endpoint() {
        let upstream = UpstreamConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        };
        let err = LibcalClient::new(&upstream, &TimeoutConfig::default()).unwrap_err();
        assert!(matches!(err, LibcalError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_bad_header_values() {
        let upstream = UpstreamConfig {
            origin: "https://libcal.example.edu\n".into(),
            ..Default::default()
        };
        let err = LibcalClient::new(&upstream, &TimeoutConfig::default()).unwrap_err();
        assert!(matches!(err, LibcalError::InvalidHeader("Origin")));
    }

    #[test]
    fn upstream_deadline_stays_under_request_timeout() {
        let mut timeouts = TimeoutConfig {
            request_secs: 30,
            upstream_secs: None,
            ..Default::default()
        };
        assert_eq!(upstream_deadline(&timeouts), Duration::from_millis(29_750));

        timeouts.upstream_secs = Some(5);
        assert_eq!(upstream_deadline(&timeouts), Duration::from_secs(5));

        timeouts.upstream_secs = Some(60);
        assert_eq!(upstream_deadline(&timeouts), Duration::from_millis(29_750));

        timeouts.request_secs = 1;
        timeouts.upstream_secs = None;
        assert_eq!(upstream_deadline(&timeouts), Duration::from_millis(750));
    }

    #[test]
    fn referer_override_falls_back_when_unusable() {
        let client = client();
        let mut query = RoomQuery {
            ids: RoomIds::new("1", "2", "3"),
            referer: None,
        };
        assert_eq!(client.referer_for(&query), "https://libcal.wesleyan.edu/reserve");

        query.referer = Some("https://libcal.wesleyan.edu/space/107918".into());
        assert_eq!(client.referer_for(&query), "https://libcal.wesleyan.edu/space/107918");

        query.referer = Some("bad\nvalue".into());
        assert_eq!(client.referer_for(&query), "https://libcal.wesleyan.edu/reserve");
    }
}
