//! # Clinicbook API
//!
//! The API crate exposes the scheduling engine over HTTP. A chat assistant
//! (or anything else speaking JSON) lists free slots, books appointments and
//! checks how a free-text date is understood.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into engine calls
//! - **Middleware**: Map scheduling errors to HTTP responses
//! - **Config**: Environment-driven server and clinic settings
//!
//! The API uses Axum as the web framework. Storage is reached only through
//! the engine's [`AppointmentStore`], so the router runs the same against
//! Postgres or an in-memory store.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error mapping
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use clinicbook_core::{clock::SystemClock, store::AppointmentStore, SchedulingEngine};
use eyre::Result;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(ApiState { engine });
/// let app = clinicbook_api::build_router(state);
/// ```
pub struct ApiState {
    /// Slot listing, booking and date normalization
    pub engine: SchedulingEngine,
}

/// Installs the global `tracing` subscriber at `level`.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Builds the router with every endpoint and request tracing.
///
/// CORS and the request timeout are added by [`start_server`].
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Slot listing
        .merge(routes::slots::routes())
        // Booking
        .merge(routes::appointments::routes())
        // Date normalization probe
        .merge(routes::normalize::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(allowed)
}

/// Starts the API server on top of `store`.
///
/// # Example
///
/// ```ignore
/// let config = ApiConfig::from_env()?;
/// let pool = clinicbook_db::create_pool(&config.database_url).await?;
/// start_server(config, Arc::new(PgAppointmentStore::new(pool))).await?;
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn AppointmentStore>) -> Result<()> {
    info!(
        provider = %config.clinic.provider,
        timezone = %config.clinic.timezone,
        open = %config.clinic.business_start,
        close = %config.clinic.business_end,
        "Clinic calendar loaded"
    );

    let engine = SchedulingEngine::new(Arc::new(config.clinic.clone()), store, Arc::new(SystemClock))
        .with_slot_limit(config.slot_limit);
    let state = Arc::new(ApiState { engine });

    let app = build_router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)),
        None => app,
    };

    let app = app.layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)));

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
