use actix_web::{web, App, HttpServer};
use kboot::config::Config;
use kboot::errors::translator::{self, ProblemTranslator};
use kboot::middleware::{RequestTrace, StructuredLogger, TraceSpan};
use kboot::routes;
use kboot::state::AppState;
use tracing::{info, warn};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment
    // (docker env_file, or `set -a; . ./.env; set +a` locally).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if !translator::install(ProblemTranslator::new(config.problem_base_url.clone())) {
        warn!("problem translator was already installed");
    }

    info!(
        host = %config.host,
        port = config.port,
        faketoken = config.faketoken_enabled,
        issuer = %config.security.issuer,
        "starting kboot"
    );

    let data = web::Data::new(AppState::new(config.security.clone()));
    let faketoken_enabled = config.faketoken_enabled;

    HttpServer::new(move || {
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(|cfg| routes::configure(cfg, faketoken_enabled))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
