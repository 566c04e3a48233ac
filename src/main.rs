use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;

use taskforge::auth::CredentialStore;
use taskforge::avatar::ImageAvatarProcessor;
use taskforge::config::Config;
use taskforge::notify::LogMailer;
use taskforge::store::{MemoryStore, PgStore};
use taskforge::{db, routes, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let token_ttl = chrono::Duration::hours(config.jwt_ttl_hours);
    let credentials = CredentialStore::new(config.bcrypt_cost);
    let mailer = Arc::new(LogMailer);
    let avatars = Arc::new(ImageAvatarProcessor::default());

    let (state, pool) = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::connect(database_url, &config)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
            db::migrate(&pool)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

            let store = Arc::new(PgStore::new(pool.clone()));
            let state = AppState::new(
                store,
                &config.jwt_secret,
                token_ttl,
                credentials,
                mailer,
                avatars,
            );
            (state, Some(pool))
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory only");
            let store = Arc::new(MemoryStore::new());
            let state = AppState::new(
                store,
                &config.jwt_secret,
                token_ttl,
                credentials,
                mailer,
                avatars,
            );
            (state, None)
        }
    };

    let state = web::Data::new(state);
    log::info!("Starting server at {}", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await?;

    if let Some(pool) = pool {
        db::close(pool).await;
    }
    Ok(())
}
