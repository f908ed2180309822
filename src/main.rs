use std::sync::Arc;

use clinicbook_api::config::{parse_log_level, ApiConfig};
use clinicbook_db::{create_pool, schema::initialize_database, PgAppointmentStore};
use color_eyre::eyre::Result;
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Logging first so configuration fallbacks are reported
    let level = parse_log_level(&std::env::var("LOG_LEVEL").unwrap_or_default());
    clinicbook_api::init_tracing(level)?;

    let config = ApiConfig::from_env()?;

    let db_pool = create_pool(&config.database_url).await?;
    initialize_database(&db_pool).await?;

    let store = Arc::new(PgAppointmentStore::new(db_pool));
    clinicbook_api::start_server(config, store).await?;

    Ok(())
}
