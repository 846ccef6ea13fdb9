//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use serde_json::Value;
use tower::ServiceExt;

use availability_proxy::config::ProxyConfig;
use availability_proxy::libcal::FixedClock;
use availability_proxy::HttpServer;

pub const GRID_PATH: &str = "/spaces/availability/grid";

pub const ROOMS_JSON: &str = r#"{
  "rooms": [
    {
      "id": 1,
      "name": "Olin 251",
      "building": "Olin Library",
      "location": { "floor": 2, "roomNumber": "251" },
      "seats": 6,
      "features": ["Whiteboard", "Display Screen"],
      "description": "Group study room overlooking the reading room.",
      "link": "https://libcal.wesleyan.edu/space/107918",
      "payload": ["8176", "14568", "107918"]
    },
    {
      "id": 2,
      "name": "Science 12",
      "building": "Science Library",
      "location": { "floor": "B", "roomNumber": "12" },
      "seats": 4,
      "features": ["Whiteboard"],
      "link": "https://libcal.wesleyan.edu/space/112500",
      "payload": [8177, 14570, 112500]
    },
    {
      "id": 3,
      "name": "Olin Carrel",
      "building": "Olin Library",
      "seats": 1,
      "features": []
    },
    {
      "id": 4,
      "name": "Closed Room",
      "building": "",
      "seats": 8,
      "features": ["Projector"]
    }
  ]
}"#;

/// Noon UTC on 2024-06-01, i.e. 08:00 in New York.
pub fn june_first_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()))
}

/// Defaults pointed at a mock LibCal.
pub fn test_config(upstream_base: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.endpoint = format!("{upstream_base}{GRID_PATH}");
    config.timeouts.upstream_secs = Some(5);
    config
}

/// Write the sample catalog to a temp file that lives as long as the handle.
pub fn catalog_file() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rooms.json");
    std::fs::write(&path, ROOMS_JSON).unwrap();
    (dir, path)
}

pub fn router(config: ProxyConfig) -> Router {
    HttpServer::with_clock(config, june_first_clock())
        .expect("server should build")
        .router()
}

/// Drive one request through the router and decode the JSON reply.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap()
}

pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(bytes).unwrap();
    enc.finish().unwrap()
}

pub fn brotli(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut writer = ::brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
        writer.write_all(bytes).unwrap();
    }
    out
}
