use std::sync::Arc;

use log::{info, warn};
use sarh_task_hub::{
    config,
    db::{
        app_storage::AppStorage,
        seed::{SeedFile, apply_seed},
    },
    error::AppError,
    middleware::auth::Auth,
    routes::build_router,
    state::AppState,
};
use tokio::{net::TcpListener, time};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::AppConfig::from_env()?;
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting application with config:");
    info!("  Host: {}", config.host);
    info!("  Port: {}", config.port);
    info!("  Database path: {}", config.database_root_path);
    info!("  Fetch limit: {}", config.fetch_limit);
    info!("  UTC offset (minutes): {}", config.utc_offset_minutes);

    let app_storage = AppStorage::new(&config.database_root_path, config.fetch_limit)?;

    match (&config.admin_email, &config.admin_password) {
        (Some(email), Some(password)) => match app_storage.users.ensure_admin(email, password) {
            Ok(admin) => info!("Bootstrap admin account: {}", admin.id),
            Err(AppError::Conflict(reason)) => warn!("Admin bootstrap skipped: {}", reason),
            Err(e) => return Err(e.into()),
        },
        (None, None) => {
            if app_storage.users.count() == 0 {
                warn!("No accounts exist and ADMIN_EMAIL/ADMIN_PASSWORD are unset");
            }
        }
        _ => warn!("Both ADMIN_EMAIL and ADMIN_PASSWORD are needed to bootstrap an admin"),
    }

    if let Some(path) = &config.seed_file {
        let seed = SeedFile::load(path)?;
        apply_seed(&app_storage, &seed)?;
    }

    let auth = Auth::with_ttl(config.jwt_secret.as_bytes(), config.jwt_ttl_secs);
    let shared_state = Arc::new(AppState::new(app_storage, config.clone(), auth));

    let app = build_router(shared_state.clone());

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&bind_address).await?;
    info!("Server starting on http://{}", bind_address);

    tokio::spawn(async move {
        let mut interval = time::interval(time::Duration::from_secs(120));
        loop {
            interval.tick().await;
            let counts = shared_state.storage.counts();
            info!(
                "Collections: {} subjects, {} topics, {} clients, {} tasks, {} tutors, {} users",
                counts.subjects,
                counts.topics,
                counts.clients,
                counts.tasks,
                counts.tutors,
                counts.users
            );
        }
    });

    axum::serve(listener, app).await?;

    Ok(())
}
