use dotenvy::dotenv;
use fintrack::{
    config::{database, seed},
    core::audit,
    errors::Result,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();

    // 3. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Seed accounts and categories if a config file is present
    let config_path = seed::config_path();
    if config_path.exists() {
        let config = seed::load_config(&config_path)?;
        seed::seed_from_config(&db, &config)
            .await
            .inspect_err(|e| error!("Failed to seed from config: {}", e))?;
    } else {
        info!(path = %config_path.display(), "No seed config found, skipping seeding");
    }

    // 5. Check every stored balance against its history
    let audits = audit::audit_all(&db).await?;
    let drifted = audits.iter().filter(|a| !a.is_consistent()).count();
    for audit in audits.iter().filter(|a| !a.is_consistent()) {
        warn!(
            account_id = audit.account_id,
            user_id = %audit.user_id,
            stored = %audit.stored,
            expected = %audit.expected,
            drift = %audit.drift(),
            "Balance drift detected"
        );
    }
    info!(accounts = audits.len(), drifted, "Ledger audit complete");

    Ok(())
}
