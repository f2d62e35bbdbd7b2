use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use pad_core::geometry::Layout;
use pad_core::ontology::OntologyContext;
use pad_upstream::PadApi;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pad_api::app;
use pad_api::config::ServerConfig;
use pad_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pad_api=debug,pad_upstream=debug,pad_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Upstream ---
    let pad_api = PadApi::new(
        &config.pad_api_url,
        Duration::from_secs(config.pad_api_timeout_secs),
    )
    .expect("Failed to build PAD API client")
    .with_paging(config.paging());
    tracing::info!(base_url = %pad_api.base_url(), "PAD API client ready");

    // --- Layout ---
    let layout = load_layout(&config);
    layout
        .scale_to_width(config.display_width)
        .expect("DISPLAY_WIDTH must be between 1 and 7680");
    tracing::info!(
        version = layout.version().unwrap_or("unversioned"),
        lanes = layout.lane_count(),
        card_width = layout.card_width(),
        "Card layout loaded"
    );

    // --- Ontology ---
    let ontology = match &config.ontology_vocab {
        Some(vocab) => OntologyContext::pad_with_vocab(vocab.clone()),
        None => OntologyContext::pad(),
    };
    tracing::info!(vocab = %ontology.vocab(), "Ontology context loaded");

    // --- App state ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    let state = AppState {
        config: Arc::new(config),
        source: Arc::new(pad_api),
        layout: Arc::new(layout),
        ontology: Arc::new(ontology),
    };

    // --- Start server ---
    let app = app::build_router(state);
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// The layout from `LAYOUT_PATH`, or the built-in v2 design.
///
/// A configured file that cannot be read or parsed stops startup.
fn load_layout(config: &ServerConfig) -> Layout {
    let Some(path) = &config.layout_path else {
        return Layout::reference();
    };
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read layout file {}: {e}", path.display()));
    Layout::from_json(&text)
        .unwrap_or_else(|e| panic!("Invalid layout file {}: {e}", path.display()))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
