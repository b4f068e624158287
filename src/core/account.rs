//! Account business logic - Creation, user-scoped lookups and balance writes.
//!
//! Balance writes are optimistic: the new balance is computed from the row
//! read in the same operation and only stored if the row's `version` is still
//! the one that was read. A lost race surfaces as [`Error::Conflict`].

use crate::{
    core::money,
    entities::{Account, account},
    errors::{Error, Result},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Creates an account for `user_id` holding `opening_balance`.
///
/// The name and kind are trimmed and must not be empty. The opening balance
/// may be negative (credit cards).
pub async fn create_account<C>(
    db: &C,
    user_id: &str,
    name: &str,
    kind: &str,
    opening_balance: Decimal,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "account name cannot be empty"));
    }
    let kind = kind.trim();
    if kind.is_empty() {
        return Err(Error::validation("kind", "account kind cannot be empty"));
    }
    money::ensure_storable("opening_balance", opening_balance)?;

    let now = Utc::now();
    let account = account::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        kind: Set(kind.to_lowercase()),
        balance: Set(opening_balance),
        opening_balance: Set(opening_balance),
        version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = account.insert(db).await?;
    debug!(account_id = result.id, user_id, "created account");
    Ok(result)
}

/// Finds an account by id, returning None if it is missing or owned by someone else.
pub async fn get_account<C>(db: &C, user_id: &str, account_id: i64) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find_by_id(account_id)
        .filter(account::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_account`], but a missing account is an error.
pub async fn require_account<C>(db: &C, user_id: &str, account_id: i64) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    get_account(db, user_id, account_id)
        .await?
        .ok_or(Error::AccountNotFound { id: account_id })
}

/// Finds a user's account by its exact name.
pub async fn get_account_by_name<C>(
    db: &C,
    user_id: &str,
    name: &str,
) -> Result<Option<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::UserId.eq(user_id))
        .filter(account::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All accounts of a user, newest first.
pub async fn get_accounts_for_user<C>(db: &C, user_id: &str) -> Result<Vec<account::Model>>
where
    C: ConnectionTrait,
{
    Account::find()
        .filter(account::Column::UserId.eq(user_id))
        .order_by_desc(account::Column::CreatedAt)
        .order_by_desc(account::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds `delta` to the balance of `account`, as read earlier in the same operation.
///
/// The write only lands if nobody else has written the row since it was read:
/// `UPDATE accounts SET balance = :new, version = version + 1 WHERE id = :id AND version = :read`
///
/// # Returns
/// The account as stored after the write.
///
/// # Errors
/// [`Error::Validation`] if the new balance cannot be stored exactly,
/// [`Error::Conflict`] if the version no longer matches.
pub async fn write_balance<C>(
    db: &C,
    account: &account::Model,
    delta: Decimal,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let new_balance = account
        .balance
        .checked_add(delta)
        .ok_or_else(|| Error::validation("balance", "is out of range"))?;
    money::ensure_storable("balance", new_balance)?;
    let now = Utc::now();

    let result = Account::update_many()
        .col_expr(account::Column::Balance, Expr::value(new_balance))
        .col_expr(
            account::Column::Version,
            Expr::col(account::Column::Version).add(1),
        )
        .col_expr(account::Column::UpdatedAt, Expr::value(now))
        .filter(account::Column::Id.eq(account.id))
        .filter(account::Column::UserId.eq(account.user_id.as_str()))
        .filter(account::Column::Version.eq(account.version))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::Conflict {
            account_id: account.id,
        });
    }

    debug!(
        account_id = account.id,
        old_balance = %account.balance,
        new_balance = %new_balance,
        "balance updated"
    );

    Ok(account::Model {
        balance: new_balance,
        version: account.version + 1,
        updated_at: now,
        ..account.clone()
    })
}

/// Loads the account and adds `delta` to its balance.
pub async fn adjust_balance<C>(
    db: &C,
    user_id: &str,
    account_id: i64,
    delta: Decimal,
) -> Result<account::Model>
where
    C: ConnectionTrait,
{
    let account = require_account(db, user_id, account_id).await?;
    write_balance(db, &account, delta).await
}
