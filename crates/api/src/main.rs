use anyhow::Context;

use cargohold_infra::InfraConfig;

pub const ENV_BIND: &str = "CARGOHOLD_BIND";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cargohold_observability::init();

    let bind = std::env::var(ENV_BIND)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    let config = InfraConfig::from_env();
    tracing::info!(
        store = ?config.store,
        data_file = %config.data_file.display(),
        log_file = %config.log_file.display(),
        seed_sample = config.seed_sample,
        "opening cargo stores"
    );
    let services = cargohold_api::app::services::build_services(&config)?;
    let app = cargohold_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
