use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;

use simbld_accounts::auth::JwtService;
use simbld_accounts::config::{load_config, AppConfig, StorageBackend};
use simbld_accounts::postgres::{create_pool, ensure_schema, health_check};
use simbld_accounts::store::{memory::InMemoryStore, Repositories};
use simbld_accounts::types::{StartupError, Storage};
use simbld_accounts::upload::PhotoProcessor;
use simbld_accounts::user::service::UserService;
use simbld_accounts::{configure_user_routes, health, AppState, SERVICE_NAME, VERSION};

/// Connect the configured backend and build its repositories
async fn init_storage(config: &AppConfig) -> Result<(Storage, Repositories), StartupError> {
    match config.database.backend {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database)?;
            health_check(&pool).await.map_err(StartupError::Database)?;
            ensure_schema(&pool).await?;
            log::info!(
                "Connected to PostgreSQL at {}:{}/{}",
                config.database.host,
                config.database.port,
                config.database.dbname
            );
            Ok((Storage::Postgres(pool.clone()), Repositories::postgres(pool)))
        },
        StorageBackend::Memory => {
            log::warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            Ok((Storage::Memory(store.clone()), Repositories::in_memory(store)))
        },
    }
}

fn build_cors(origins: &[String]) -> Cors {
    if origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }

    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

async fn run() -> Result<(), StartupError> {
    let config = load_config()?;

    let log_env = env_logger::Env::default().default_filter_or(config.log_level.0.as_str());
    env_logger::Builder::from_env(log_env).init();

    log::info!("Starting {} v{}", SERVICE_NAME, VERSION);

    let (storage, repos) = init_storage(&config).await?;
    let jwt_service = Arc::new(JwtService::new(&config.auth.jwt_secret, config.auth.token_ttl_minutes));
    let photos = PhotoProcessor::new(config.upload.clone());

    let state = web::Data::new(AppState::new(UserService::new(repos, photos)));
    let storage = web::Data::new(storage);
    let cors_origins = config.server.cors_origins.clone();

    let bind_address = (config.server.host.clone(), config.server.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    let mut server = HttpServer::new(move || {
        let jwt_service = jwt_service.clone();
        App::new()
            .wrap(Logger::default())
            .wrap(build_cors(&cors_origins))
            .app_data(state.clone())
            .app_data(storage.clone())
            .route("/health", web::get().to(health::health))
            .configure(|cfg| configure_user_routes(cfg, jwt_service))
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive_secs));

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    server
        .bind(bind_address)
        .map_err(|e| StartupError::ServerBind(e.to_string()))?
        .run()
        .await
        .map_err(|e| StartupError::ServerBind(e.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    run().await.map_err(|e| {
        log::error!("{}", e);
        std::io::Error::other(e.to_string())
    })
}
