mod auth;
mod error;
mod guard;
mod handlers;
mod multipart;
mod setup;
mod state;
mod utils;

use convertia_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();

    convertia_infra::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let config = Config::from_env();
    let (state, router) = setup::initialize_app(config.clone())?;

    setup::server::start_server(&config, state, router).await?;

    convertia_infra::shutdown_telemetry().await;
    Ok(())
}
