use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::{error, info};
use rollcall::attendance::SessionManager;
use rollcall::auth::AdminCredentials;
use rollcall::config::AppConfig;
use rollcall::db::Database;
use rollcall::job_controller::state::JobsState;
use rollcall::reports::ReportArchive;
use rollcall::services;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("configuration error: {}", e);
            std::process::exit(2);
        }
    };

    let db = Database::open(&config.database_path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    info!("database ready at {}", db.path().display());

    let manager = SessionManager::new(
        db.clone(),
        ReportArchive::new(&config.reports_dir),
        config.session_duration,
    );
    let jobs_state = JobsState::spawn();
    let credentials = AdminCredentials::new(&config.admin_username, &config.admin_password);

    let url = format!("http://{}:{}", config.host, config.port);
    info!("Server running at {}", url);

    let bind = (config.host.clone(), config.port);
    let max_upload = config.max_upload_bytes;
    let config = web::Data::new(config);
    let db = web::Data::new(db);
    let manager = web::Data::new(manager);
    let jobs_state = web::Data::new(jobs_state);
    let credentials = web::Data::new(credentials);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .app_data(web::PayloadConfig::default().limit(max_upload))
            .app_data(config.clone())
            .app_data(db.clone())
            .app_data(manager.clone())
            .app_data(jobs_state.clone())
            .app_data(credentials.clone())
            .service(services::admin::configure_routes())
            .service(services::jobs::configure_routes())
            .service(services::students::configure_routes())
            .service(services::attendance::configure_routes())
    })
    .bind(bind)?
    .run()
    .await
}
