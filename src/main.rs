use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware::{Logger, DefaultHeaders}, HttpResponse, Responder};
use coursebase_backend::{
    config::Config,
    helper::video_helpers::{MuxVideoHost, VideoHost},
    routes,
    setup::db_setup,
    AppState,
};
use std::fs;
use std::sync::Arc;
use clap::Parser;
use std::path::PathBuf;

/// A simple handler for the root URL.
async fn root_handler() -> impl Responder {
    HttpResponse::Ok().content_type("text/plain").body("OK")
}

#[derive(Parser, Debug)]
#[command(name = "coursebase_server", author, version, about = "Starts the CourseBase authoring server.")]
struct Cli {
    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    env_logger::init_from_env(env_logger::Env::new().default_filter_or(&config.log_level));

    let db_path = config.courses_db_path();
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create database directory");
    }
    if !db_path.exists() {
        panic!(
            "FATAL: {} not found. Run 'cargo run --bin setup_cli -- --env-file <path> db setup'",
            db_path.display()
        );
    }

    let pool = db_setup::open_pool(&db_path)
        .expect("FATAL: Failed to create Rusqlite connection pool.");

    let video_host: Arc<dyn VideoHost> = Arc::new(MuxVideoHost::new(&config.video));
    let app_state = web::Data::new(AppState { video_host });

    if config.trusted_gateway_ips.trim().is_empty() {
        log::warn!("TRUSTED_GATEWAY_IPS is empty. Every request will be treated as unauthenticated.");
    }

    let server_address = format!("{}:{}", config.web.host, config.web.port);
    log::info!("Server starting at http://{}", server_address);

    HttpServer::new(move || {
        let principal_header = actix_web::http::header::HeaderName::try_from(config.principal_header.as_str())
            .expect("PRINCIPAL_HEADER is validated when the config loads");
        let methods = vec!["GET", "POST", "PUT", "PATCH", "DELETE"];
        let headers = vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
            principal_header,
        ];

        let cors = {
            let allowed_origins_str = &config.allowed_origins;
            if allowed_origins_str.trim() == "*" {
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(methods)
                    .allowed_headers(headers)
                    .supports_credentials()
                    .max_age(3600)
            } else {
                let mut cors = Cors::default();
                let origins: Vec<&str> = allowed_origins_str.split(',').map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
                for origin in origins {
                    cors = cors.allowed_origin(origin);
                }
                cors.allowed_methods(methods)
                    .allowed_headers(headers)
                    .supports_credentials()
                    .max_age(3600)
            }
        };

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
            )
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(pool.clone()))
            .app_data(app_state.clone())
            .app_data(routes::json_config())
            // The narrower scope goes first: a matched `/api` scope never falls through.
            .configure(routes::teacher::config_api)
            .configure(routes::public::config_api)
            .route("/", web::get().to(root_handler))
    })
    .bind(server_address)?
    .run()
    .await
}
