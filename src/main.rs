use fare_desk::{
    config::{self, settings::Settings},
    core::documents::UploadStore,
    errors::Result,
    web::{self, AppState},
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    let settings = Settings::from_env();
    info!("Starting fare desk with {:?}", settings.bind_addr);

    // 3. Connect and make sure the schema exists
    let db = config::database::create_connection(&settings.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    config::database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed fare types into an empty database
    config::fares::seed_fare_types(&db, &settings.fares_config)
        .await
        .inspect_err(|e| error!("Failed to seed fare types: {}", e))?;

    // 5. Serve
    let uploads = UploadStore::new(settings.uploads_dir);
    web::serve(&settings.bind_addr, AppState::new(db, uploads)).await
}
