use dotenvy::dotenv;
use terms_tracker::config::{database, terms};
use terms_tracker::core::catalog;
use terms_tracker::errors::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load terms configuration; run with defaults if there is no config.toml
    let config = terms::load_default_config().unwrap_or_else(|e| {
        warn!("Using default terms configuration: {}", e);
        terms::Config::default()
    });
    info!(
        "Not-agreed cache lifetime {}s, storing client addresses: {}",
        config.settings.cache_seconds, config.settings.store_ip_address
    );

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed configured documents
    catalog::seed_terms(&db, &config.documents)
        .await
        .inspect_err(|e| error!("Failed to seed terms: {}", e))?;

    // 6. Report what users will currently be asked to accept
    let active = catalog::get_active_all(&db).await?;
    if active.is_empty() {
        warn!("No terms are active yet");
    }
    for version in &active {
        info!(
            "Active: '{}' version {} (ID: {})",
            version.slug, version.version_number, version.id
        );
    }

    Ok(())
}
