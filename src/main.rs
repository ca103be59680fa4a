use api_playground::{config::Config, open_store, router, AppState, HttpProxyService, ProxyExecutor};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_playground=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!("Starting API playground backend on port {}", config.port);

    let store = open_store(&config.storage).expect("failed to open history store");
    let executor =
        ProxyExecutor::new(config.proxy_timeout).expect("failed to build outbound HTTP client");
    let proxy = HttpProxyService::arc(executor, store.clone());
    let state = AppState::new(proxy, store, config.owner_header.clone());

    // Build CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind listen address");

    tracing::info!("Listening on http://{}", addr);
    axum::serve(listener, app).await.expect("server error");
}
