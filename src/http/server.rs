//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the runtime snapshot (LibCal client, catalog, time zone)
//! - Create the Axum router with all handlers
//! - Wire up middleware (request id, tracing, body limit, timeout, CORS)
//! - Swap in a new runtime when the config watcher reports a change
//! - Serve until a shutdown trigger or OS signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::catalog::{CatalogError, RoomCatalog};
use crate::config::ProxyConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::{availability, rooms};
use crate::libcal::{Clock, LibcalClient, LibcalError, RoomIds, SystemClock};
use crate::lifecycle::{shutdown, signals};
use crate::observability::metrics;

/// Errors that prevent a runtime from being built.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid time zone '{0}'")]
    Timezone(String),

    #[error(transparent)]
    Libcal(#[from] LibcalError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Everything a request needs that can change on reload.
#[derive(Debug)]
pub struct Runtime {
    pub config: ProxyConfig,
    pub libcal: LibcalClient,
    pub catalog: RoomCatalog,
    pub timezone: Tz,
    pub default_room: RoomIds,
}

impl Runtime {
    pub fn build(config: ProxyConfig) -> Result<Self, StartupError> {
        let timezone = config
            .upstream
            .timezone
            .parse::<Tz>()
            .map_err(|_| StartupError::Timezone(config.upstream.timezone.clone()))?;
        let libcal = LibcalClient::new(&config.upstream, &config.timeouts)?;
        let catalog = RoomCatalog::load(config.catalog.path.as_deref())?;
        let default_room = RoomIds::from(&config.upstream.default_room);

        Ok(Self {
            config,
            libcal,
            catalog,
            timezone,
            default_room,
        })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<ArcSwap<Runtime>>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(runtime: Runtime, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(runtime)),
            clock,
        }
    }

    /// The current runtime snapshot.
    pub fn runtime(&self) -> Arc<Runtime> {
        self.inner.load_full()
    }

    pub fn replace(&self, runtime: Runtime) {
        self.inner.store(Arc::new(runtime));
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }
}

/// HTTP server for the availability proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server that reads the wall clock.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a server with an explicit clock.
    pub fn with_clock(config: ProxyConfig, clock: Arc<dyn Clock>) -> Result<Self, StartupError> {
        let runtime = Runtime::build(config.clone())?;
        tracing::info!(
            endpoint = %runtime.libcal.endpoint(),
            timezone = %runtime.timezone,
            rooms = runtime.catalog.len(),
            "Runtime ready"
        );

        let state = AppState::new(runtime, clock);
        let router = Self::build_router(&config, state.clone());
        Ok(Self {
            router,
            state,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/api/post", any(availability::availability))
            .route("/api/libcal-proxy.php", any(availability::availability))
            .route("/api/rooms", get(rooms::list_rooms))
            .route("/api/rooms/{id}", get(rooms::get_room))
            .route("/api/rooms/{id}/availability", get(rooms::room_availability))
            .route("/health", get(health))
            .route_layer(middleware::from_fn(record_metrics))
            .with_state(state);

        if config.security.enable_headers {
            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("no-store"),
                ));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request.headers().request_id(),
                    )
                }))
                .layer(propagate_request_id_layer())
                // Outside the timeout: the limiter's response body has no `Default`.
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
                .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
                .layer(cors()),
        )
    }

    /// The router, for serving or for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Configs received on `config_updates` replace the runtime; a failed
    /// rebuild keeps the current one. Returns after `shutdown` fires or an
    /// OS shutdown signal arrives and in-flight requests have drained.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let state = self.state.clone();
        let reloader = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match Runtime::build(config) {
                    Ok(runtime) => {
                        tracing::info!(rooms = runtime.catalog.len(), "Runtime reloaded");
                        state.replace(runtime);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Reload rejected, keeping current runtime");
                    }
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    () = shutdown::wait(shutdown) => tracing::info!("Shutdown requested"),
                    () = signals::shutdown_signal() => {}
                }
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn record_metrics(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    metrics::record_request(&route, method.as_str(), response.status().as_u16(), start);
    response
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    rooms: usize,
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        rooms: state.runtime().catalog.len(),
    })
}
