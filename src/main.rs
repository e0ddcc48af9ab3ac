mod config;
mod relay;
mod web;

use std::sync::Arc;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{error, info, warn};

use config::Config;
use relay::{AdviceRelay, OpenRouterTransport};
use web::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting decision relay");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    if config.api_key.is_none() {
        warn!("OPENROUTER_API_KEY is not set; /ask will answer with a warning");
    }

    let transport = match OpenRouterTransport::new(
        &config.api_url,
        &config.referer,
        config.request_timeout,
    ) {
        Ok(transport) => transport,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    info!("Relaying to {} with model {}", config.api_url, config.model);

    let relay = Data::new(AdviceRelay::new(
        config.api_key.clone(),
        config.model.clone(),
        Arc::new(transport),
    ));

    let origins = config.allowed_origins.clone();
    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(routes::cors(&origins))
            .app_data(relay.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
