use anyhow::Context;
use dotenvy::dotenv;
use mamnon::mamnon_config::{AssignmentPolicy, CorsConfig, ServerConfig, StorageConfig};
use mamnon::mamnon_observability::{LoggingConfig, init_tracing};
use mamnon::router::init_router;
use mamnon::state::init_app_state;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _log_guard = init_tracing(&LoggingConfig::from_env());

    let server = ServerConfig::from_env();
    let storage = StorageConfig::from_env()?;
    let policy = AssignmentPolicy::from_env();
    let cors = CorsConfig::from_env();

    info!(
        backend = ?storage.backend,
        exclusion_department = %policy.exclusion_department,
        "Starting Mamnon API"
    );

    let state = init_app_state(&storage, policy).await?;
    let app = init_router(state, &cors);

    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;

    info!("🚀 Server running on http://{}", address);
    info!("📚 Swagger UI available at http://{}/swagger-ui", address);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
