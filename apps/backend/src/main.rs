use actix_web::{web, App, HttpServer};
use photoshare_backend::config::Config;
use photoshare_backend::infra::state::build_state;
use photoshare_backend::middleware::request_trace::RequestTrace;
use photoshare_backend::middleware::structured_logger::StructuredLogger;
use photoshare_backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_security(config.security())
        .with_rate_limit(config.rate_limit)
        .with_redis_url(config.redis_url.clone())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "Failed to build application state");
            std::process::exit(1);
        }
    };

    info!(host = %config.host, port = config.port, "Starting Photoshare backend");

    // Wrap AppState with web::Data before passing to HttpServer
    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(|cfg| routes::configure(cfg, &data))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
