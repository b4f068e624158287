//! Account entity - A place money lives (cash, bank, credit card, savings...).
//!
//! `balance` is the authoritative running total. It only changes through the
//! ledger engine, which bumps `version` on every write so concurrent writers
//! can detect each other.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    /// Unique identifier for the account
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Display name (e.g., "HDFC Bank", "Wallet")
    pub name: String,
    /// Free-form account type tag: `"cash"`, `"bank"`, `"credit"`, ...
    pub kind: String,
    /// Current balance
    pub balance: Decimal,
    /// Balance the account was created with
    pub opening_balance: Decimal,
    /// Incremented on every balance write
    pub version: i64,
    /// When the account was created
    pub created_at: DateTimeUtc,
    /// When the account was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Account and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One account is the source of many transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
