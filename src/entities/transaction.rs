//! Transaction entity - Represents every movement of money between accounts.
//!
//! Each transaction has an owning `user_id`, a positive `amount`, a `kind`
//! that decides which way the money moves, a source `account_id`, and the
//! kind-specific fields: `destination_account_id` for transfers, `target_name`
//! and `reminder_date` for loans given out.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which way a transaction moves money.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money arriving in the source account
    #[sea_orm(string_value = "income")]
    Income,
    /// Money leaving the source account
    #[sea_orm(string_value = "expense")]
    Expense,
    /// Money moving from the source to the destination account
    #[sea_orm(string_value = "transfer")]
    Transfer,
    /// Money lent out of the source account to someone else
    #[sea_orm(string_value = "lend")]
    Lend,
}

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Direction of the transaction
    pub kind: TransactionKind,
    /// Magnitude, always positive
    pub amount: Decimal,
    /// Account the money is taken from (or credited to, for income)
    pub account_id: i64,
    /// Receiving account, set only for transfers
    pub destination_account_id: Option<i64>,
    /// Optional category label
    pub category_id: Option<i64>,
    /// Free-text description
    pub description: Option<String>,
    /// When the transaction happened
    pub date: DateTimeUtc,
    /// Who the money was lent to, set only for loans
    pub target_name: Option<String>,
    /// When to chase the loan, set only for loans
    pub reminder_date: Option<DateTimeUtc>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Transaction and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each transaction draws on one source account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    SourceAccount,
    /// Transfers credit one destination account
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::DestinationAccountId",
        to = "super::account::Column::Id",
        on_delete = "Cascade"
    )]
    DestinationAccount,
    /// Optional category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SourceAccount.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
