//! The proxy on a real socket: concurrent traffic, hot reload, shutdown.

use std::time::{Duration, Instant};

use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_proxy::{HttpServer, Shutdown};

mod common;

#[tokio::test]
async fn serves_concurrent_clients_and_reloads_catalog() {
    // 1. Mock LibCal
    let libcal = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(common::GRID_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slots": [] })))
        .mount(&libcal)
        .await;

    // 2. Start the proxy with no catalog
    let config = common::test_config(&libcal.uri());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let shutdown = Shutdown::new();
    let (config_tx, config_updates) = mpsc::unbounded_channel();
    let server = HttpServer::with_clock(config.clone(), common::june_first_clock()).unwrap();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    let client = reqwest::Client::new();
    let health: Value = client.get(format!("{base}/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["rooms"], 0);

    // 3. Concurrent availability traffic
    let concurrency = 10;
    let requests_per_task = 10;
    let mut tasks = Vec::new();
    for _ in 0..concurrency {
        let client = client.clone();
        let url = format!("{base}/api/post");
        tasks.push(tokio::spawn(async move {
            let mut ok = 0;
            for _ in 0..requests_per_task {
                let res = client
                    .post(&url)
                    .json(&json!({ "payload": ["8176", "14568", "107918"] }))
                    .send()
                    .await
                    .unwrap();
                if res.status().is_success() {
                    ok += 1;
                }
            }
            ok
        }));
    }
    let mut succeeded = 0;
    for task in tasks {
        succeeded += task.await.unwrap();
    }
    assert_eq!(succeeded, concurrency * requests_per_task);
    assert_eq!(libcal.received_requests().await.unwrap().len(), succeeded);

    // 4. Hot reload with a catalog
    let (_dir, catalog) = common::catalog_file();
    let mut reloaded = config;
    reloaded.catalog.path = Some(catalog);
    config_tx.send(reloaded).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let health: Value = client.get(format!("{base}/health")).send().await.unwrap().json().await.unwrap();
        if health["rooms"] == 4 {
            break;
        }
        assert!(Instant::now() < deadline, "catalog was never reloaded");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    // 5. A broken reload keeps the current runtime
    let mut broken = common::test_config(&libcal.uri());
    broken.upstream.timezone = "Mars/Olympus_Mons".into();
    config_tx.send(broken).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    let rooms: Value = client.get(format!("{base}/api/rooms")).send().await.unwrap().json().await.unwrap();
    assert_eq!(rooms["rooms"].as_array().unwrap().len(), 4);

    // 6. Shutdown
    drop(client);
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
