use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use common::database::{DatabaseConfig, init_pool};
use photo_store::{
    AppState, StorageBackend, StoreSettings, create_router,
    repositories::{MemoryPhotoRepository, PgPhotoRepository, PhotoRepository},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting photo store service");

    let settings = StoreSettings::load()?;

    let repository: Arc<dyn PhotoRepository> = match settings.backend {
        StorageBackend::Memory => {
            info!("Using in-memory photo storage");
            Arc::new(MemoryPhotoRepository::new())
        }
        StorageBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            // Check database connectivity
            if common::database::health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            let repository = PgPhotoRepository::new(pool);
            repository.ensure_schema().await?;
            Arc::new(repository)
        }
    };

    let listener = TcpListener::bind(&settings.bind_address).await?;
    info!("Photo store listening on {}", settings.bind_address);

    let app = create_router(AppState::new(repository, settings));
    axum::serve(listener, app).await?;

    Ok(())
}
