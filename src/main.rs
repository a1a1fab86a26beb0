mod clients;
mod config;
mod docs;
mod handlers;
mod models;
mod routes;
mod state;
mod websocket;

use axum::{routing::get, Router};
use config::Config;
use docs::ApiDoc;
use routes::create_api_routes;
use state::AppState;
use std::panic;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// How often the reaper sweeps for half-open sessions.
const REAP_INTERVAL_SECS: u64 = 30;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "studysync=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Initialize the execution gateway client
    if let Err(e) = clients::exec_client::init_exec_gateway_client(
        config.exec_gateway_url.clone(),
        config.exec_gateway_timeout_secs,
    ) {
        error!("Failed to initialize execution gateway client: {}", e);
    }

    let app_state = Arc::new(AppState::new(&config));

    // Reclaim half-open sessions the socket layer never notices dropping
    spawn_session_reaper(app_state.clone(), config.session_idle_timeout_secs);

    // Combine all routes
    let app_routes = Router::new()
        // Mount API routes
        .nest("/api", create_api_routes())
        // WebSocket endpoint for the session hub
        .route("/ws", get(websocket::handler::websocket_handler))
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("🚀 Study session hub running on http://{}", config.server_address());
    info!("📡 WebSocket available at ws://{}/ws", config.server_address());
    info!("📚 Swagger UI available at http://{}/swagger", config.server_address());

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

/// Periodically remove sessions that have gone silent past the idle timeout,
/// emitting the same departure notices a clean disconnect would.
fn spawn_session_reaper(app_state: Arc<AppState>, idle_timeout_secs: i64) {
    if idle_timeout_secs <= 0 {
        warn!("Session idle timeout disabled; half-open connections will linger");
        return;
    }
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(REAP_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            let reaped = app_state
                .registry
                .reap_idle(idle_timeout_secs, |session, remaining| {
                    websocket::handler::announce_departure(&app_state.hub, session, remaining);
                })
                .await;
            for session in reaped {
                warn!(
                    "Reclaimed idle session {} ({})",
                    session.display_name, session.id
                );
            }
        }
    });
}
