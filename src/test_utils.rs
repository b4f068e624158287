//! Shared test utilities for the ledger core.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        account, category,
        command::CreateTransactionCommand,
        transaction,
    },
    entities,
    errors::{Error, Result},
};
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Owner of everything the helpers create.
pub const TEST_USER: &str = "test_user";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
///
/// The pool holds a single connection so concurrently started operations
/// queue behind each other instead of seeing separate databases.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test account owned by [`TEST_USER`].
///
/// # Defaults
/// * `kind`: "bank"
pub async fn create_test_account(
    db: &DatabaseConnection,
    name: &str,
    opening_balance: Decimal,
) -> Result<entities::account::Model> {
    account::create_account(db, TEST_USER, name, "bank", opening_balance).await
}

/// Creates a test category owned by [`TEST_USER`].
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::category::Model> {
    category::create_category(db, TEST_USER, name).await
}

/// Records an expense through the engine.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    account_id: i64,
    amount: Decimal,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(
        db,
        TEST_USER,
        CreateTransactionCommand::expense(account_id, amount).with_description("Test expense"),
    )
    .await
}

/// Current stored balance of one of [`TEST_USER`]'s accounts.
pub async fn balance_of(db: &DatabaseConnection, account_id: i64) -> Result<Decimal> {
    account::get_account(db, TEST_USER, account_id)
        .await?
        .map(|a| a.balance)
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// An account model that never touched a database, for mock-backed tests.
#[must_use]
pub fn account_model(id: i64, balance: Decimal) -> entities::account::Model {
    let created = Utc
        .with_ymd_and_hms(2025, 5, 1, 0, 0, 0)
        .single()
        .unwrap_or_default();
    entities::account::Model {
        id,
        user_id: TEST_USER.to_string(),
        name: format!("Account {id}"),
        kind: "bank".to_string(),
        balance,
        opening_balance: balance,
        version: 0,
        created_at: created,
        updated_at: created,
    }
}

/// A stored expense that never touched a database, for mock-backed tests.
#[must_use]
pub fn expense_model(id: i64, account_id: i64, amount: Decimal) -> entities::transaction::Model {
    let created = account_model(account_id, Decimal::ZERO).created_at;
    entities::transaction::Model {
        id,
        user_id: TEST_USER.to_string(),
        kind: entities::TransactionKind::Expense,
        amount,
        account_id,
        destination_account_id: None,
        category_id: None,
        description: None,
        date: created,
        target_name: None,
        reminder_date: None,
        created_at: created,
        updated_at: created,
    }
}

/// Sets up a complete test environment with one account.
/// Returns (db, account) for common test scenarios.
pub async fn setup_with_account(
    opening_balance: Decimal,
) -> Result<(DatabaseConnection, entities::account::Model)> {
    let db = setup_test_db().await?;
    let account = create_test_account(&db, "Wallet", opening_balance).await?;
    Ok((db, account))
}
