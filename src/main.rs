use std::sync::Arc;
use std::time::Duration;

use actix_files as fs;
use actix_web::{web::Data, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use log::{debug, info};

use medmind::completion::HttpCompletionClient;
use medmind::config::Config;
use medmind::session::SessionStore;
use medmind::web::{self, routes, AppState};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize environment
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting MedMind web application");

    let config = Config::from_env().context("failed to read configuration")?;
    debug!("Configuration: {:?}", config);

    let client = HttpCompletionClient::from_config(&config)
        .context("failed to build completion client")?;

    let tera = web::load_templates(&config.templates_dir)
        .with_context(|| format!("failed to parse templates in {}", config.templates_dir))?;

    let sessions = SessionStore::with_idle_timeout(config.session_idle);
    let app_state = Data::new(AppState::with_sessions(tera, Arc::new(client), sessions));

    // Release idle sessions even when no new ones arrive
    let sweeper = app_state.clone();
    actix_web::rt::spawn(async move {
        let mut tick = actix_web::rt::time::interval(SWEEP_INTERVAL);
        loop {
            tick.tick().await;
            let evicted = sweeper.sessions.sweep();
            if evicted > 0 {
                info!("Evicted {} idle session(s)", evicted);
            }
        }
    });

    let static_dir = config.static_dir.clone();

    info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure)
            .service(fs::Files::new("/static", &static_dir))
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("failed to bind {}:{}", config.host, config.port))?
    .run()
    .await?;

    Ok(())
}
