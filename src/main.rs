mod config;
mod error;
mod ai {
    pub mod client;
    pub mod extract;
    pub mod prompts;
}
mod architect;
mod routes;

use ai::client::OllamaClient;
use architect::Architect;
use config::Config;
use dotenv::dotenv;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!(
        "Using model '{}' at {}",
        config.backend.model,
        config.backend.base_url
    );

    let architect = Architect::new(Arc::new(OllamaClient::new(config.backend.clone())?));
    let app = routes::router(architect).layer(routes::cors_layer(&config.cors_origins)?);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("DataAngelo AI database architect listening on http://{}", config.bind_addr);
    log::info!("  GET  /");
    log::info!("  GET  /models");
    log::info!("  POST /design-database");
    log::info!("  POST /validate-design");

    axum::serve(listener, app).await?;

    Ok(())
}
