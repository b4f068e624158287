//! Ledger audit - Checks that stored balances agree with the transactions.
//!
//! For every account, `balance == opening_balance + sum of the effects of its
//! live transactions` must hold whenever no operation is in flight. The audit
//! recomputes the right-hand side from scratch and reports any drift.

use crate::{
    core::{account, effect::Effect, transaction},
    entities::{Account, account as account_entity},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder};
use serde::Serialize;

/// Outcome of auditing one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceAudit {
    /// Audited account
    pub account_id: i64,
    /// Owner of the account
    pub user_id: String,
    /// Balance as stored
    pub stored: Decimal,
    /// Balance implied by the opening balance and the transactions
    pub expected: Decimal,
}

impl BalanceAudit {
    /// How far the stored balance is off.
    #[must_use]
    pub fn drift(&self) -> Decimal {
        self.stored - self.expected
    }

    /// Whether stored and expected balances agree.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.drift().is_zero()
    }
}

async fn audit<C>(db: &C, account: account_entity::Model) -> Result<BalanceAudit>
where
    C: ConnectionTrait,
{
    let transactions =
        transaction::get_transactions_for_account(db, &account.user_id, account.id).await?;

    let expected = transactions
        .iter()
        .map(|t| Effect::for_transaction(t).delta_for(account.id))
        .fold(account.opening_balance, |total, delta| total + delta);

    Ok(BalanceAudit {
        account_id: account.id,
        user_id: account.user_id,
        stored: account.balance,
        expected,
    })
}

/// Audits one of the user's accounts.
pub async fn audit_account<C>(db: &C, user_id: &str, account_id: i64) -> Result<BalanceAudit>
where
    C: ConnectionTrait,
{
    let account = account::require_account(db, user_id, account_id).await?;
    audit(db, account).await
}

/// Audits every account of a user.
pub async fn audit_user<C>(db: &C, user_id: &str) -> Result<Vec<BalanceAudit>>
where
    C: ConnectionTrait,
{
    let mut audits = Vec::new();
    for account in account::get_accounts_for_user(db, user_id).await? {
        audits.push(audit(db, account).await?);
    }
    Ok(audits)
}

/// Audits every account in the database.
pub async fn audit_all<C>(db: &C) -> Result<Vec<BalanceAudit>>
where
    C: ConnectionTrait,
{
    let accounts = Account::find()
        .order_by_asc(account_entity::Column::Id)
        .all(db)
        .await?;

    let mut audits = Vec::with_capacity(accounts.len());
    for account in accounts {
        audits.push(audit(db, account).await?);
    }
    Ok(audits)
}
