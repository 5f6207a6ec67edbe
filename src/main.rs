mod config;
mod routes;
mod services;
mod state;

use config::ServerConfig;
use services::catalog::Catalog;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // A missing .env file is normal; a malformed one is worth a warning.
    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "ignoring unreadable .env"),
    }

    let config = ServerConfig::from_env()?;
    let catalog = Catalog::new(&config.data_dir);
    let state = state::AppState::new(catalog);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    let port = config.port;
    tracing::info!(%port, data_dir = %config.data_dir.display(), "docview listening");
    axum::serve(listener, app).await?;
    Ok(())
}
