mod config;
mod error;
mod relay;
mod upstream;
mod web;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::{info, error};

use config::RelayConfig;
use upstream::UpstreamClient;
use web::routes;

// App state structure
pub struct AppState {
    upstream: UpstreamClient,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting chat relay");

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Build the upstream client once; it is shared by every worker
    let upstream = match UpstreamClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize upstream client: {:#}", e);
            std::process::exit(1);
        }
    };

    let app_state = Data::new(AppState { upstream });

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .configure(routes::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
