//! Seed data loading from config.toml
//!
//! Lets a deployment start with accounts and categories already in place.
//! Seeding is idempotent: entries that already exist for the user (matched by
//! name) are left untouched, so the file can be applied on every start.

use crate::{
    core::{account, category},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Config file used when `FINTRACK_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Structure of the whole config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct SeedConfig {
    /// Accounts to create
    #[serde(default)]
    pub accounts: Vec<AccountSeed>,
    /// Categories to create
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

/// A single seeded account
#[derive(Debug, Deserialize, Clone)]
pub struct AccountSeed {
    /// Owner
    pub user_id: String,
    /// Account name, unique per user for seeding purposes
    pub name: String,
    /// Account type tag
    #[serde(default = "default_account_kind")]
    pub kind: String,
    /// Opening balance
    #[serde(default)]
    pub balance: Decimal,
}

fn default_account_kind() -> String {
    "bank".to_string()
}

/// A single seeded category
#[derive(Debug, Deserialize, Clone)]
pub struct CategorySeed {
    /// Owner
    pub user_id: String,
    /// Category name
    pub name: String,
}

/// What a seeding run created.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Accounts created
    pub accounts: usize,
    /// Categories created
    pub categories: usize,
}

/// Path of the seed file, from `FINTRACK_CONFIG` or [`DEFAULT_CONFIG_PATH`].
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var_os("FINTRACK_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from)
}

/// Loads seed configuration from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read {}: {e}", path.as_ref().display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.as_ref().display()),
    })
}

/// Creates every account and category in `config` that does not exist yet.
///
/// Runs in one database transaction.
#[instrument(skip(db, config))]
pub async fn seed_from_config(db: &DatabaseConnection, config: &SeedConfig) -> Result<SeedSummary> {
    let txn = db.begin().await?;
    let mut summary = SeedSummary::default();

    for seed in &config.accounts {
        if account::get_account_by_name(&txn, &seed.user_id, seed.name.trim())
            .await?
            .is_some()
        {
            debug!(user_id = %seed.user_id, name = %seed.name, "Account already seeded");
            continue;
        }
        account::create_account(&txn, &seed.user_id, &seed.name, &seed.kind, seed.balance).await?;
        summary.accounts += 1;
    }

    for seed in &config.categories {
        let (_, created) = category::ensure_category(&txn, &seed.user_id, &seed.name).await?;
        if created {
            summary.categories += 1;
        }
    }

    txn.commit().await?;

    info!(
        accounts = summary.accounts,
        categories = summary.categories,
        "Seeded from config"
    );
    Ok(summary)
}
