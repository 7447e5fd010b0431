mod analytics;
mod config;
mod handlers;
mod middlewares;
mod models;
mod routes;
mod state;
mod structs;
mod utils;

use crate::config::settings::Settings;
use crate::state::app_state::AppState;
use actix_cors::Cors;
use actix_web::{App, HttpServer, http, middleware::Logger, web};
use dotenv::dotenv;
use env_logger::Env;
use routes::init_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            log::error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Starting API v{} in {} mode",
        config::settings::VERSION,
        settings.environment
    );

    let bind = (settings.host.clone(), settings.port);
    let allowed_origins = settings.allowed_origins.clone();

    // Create shared state
    let app_state = web::Data::new(AppState::new(settings));

    HttpServer::new(move || {
        let logger = Logger::new("%a \"%r\" %s %b \"%{Referer}i\" \"%{User-Agent}i\" %D ms");
        let cors = allowed_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![http::header::ACCEPT, http::header::CONTENT_TYPE])
            .allowed_header("X-Session-ID")
            .allowed_header("X-User-Agent")
            .allowed_header("X-Referrer")
            .allowed_header("X-Screen-Resolution")
            .allowed_header("X-Timezone")
            .allowed_header("X-Platform")
            .allowed_header(middlewares::origin::TRAFFIC_ORIGIN_HEADER)
            .supports_credentials()
            .max_age(3600);
        App::new()
            .wrap(logger)
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(init_routes)
    })
    .bind(bind)?
    .run()
    .await
}
