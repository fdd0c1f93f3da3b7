mod chat;
mod config;
mod frame;
mod probe;
mod routes;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    let state = state::AppState::new(config);

    // One-shot probe; failures leave the header in its loading state.
    let _probe = probe::spawn_startup_probe(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "veritas listening");
    axum::serve(listener, app).await.expect("server failed");
}
