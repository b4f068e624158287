//! Transaction business logic - The ledger engine.
//!
//! Every operation here keeps account balances in step with the transactions
//! that reference them. Creating a transaction applies its balance effect,
//! deleting it applies the reverse, and updating it reverses the old effect
//! before applying the new one. Each operation runs inside a single database
//! transaction, so a failure at any step leaves both the transaction rows and
//! the balances exactly as they were. Balance writes are version-checked and
//! conflicting operations are retried from scratch.

use crate::{
    core::{
        account,
        category,
        command::{CreateTransactionCommand, TransactionDraft, UpdateTransactionCommand},
        effect::Effect,
        retry::{DEFAULT_CONFLICT_RETRIES, retry_on_conflict},
    },
    entities::{Transaction, account as account_entity, transaction},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Records a new transaction and applies its effect to the account balance(s).
///
/// Fails with [`Error::Validation`] before touching storage if the command is
/// structurally invalid. Otherwise, inside one database transaction:
/// 1. the source account must exist ([`Error::AccountNotFound`]),
/// 2. for every kind but income, its balance must cover the amount
///    ([`Error::InsufficientFunds`], the boundary is inclusive),
/// 3. a transfer's destination must exist,
/// 4. the category, if any, must exist ([`Error::CategoryNotFound`]),
/// 5. the row is inserted and the balances written.
#[instrument(skip(db, command))]
pub async fn create_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    command: CreateTransactionCommand,
) -> Result<transaction::Model> {
    let draft = command.into_draft(Utc::now());
    draft
        .validate()
        .inspect_err(|e| warn!("Rejected transaction: {e}"))?;

    let draft = &draft;
    let created = retry_on_conflict(DEFAULT_CONFLICT_RETRIES, move || {
        create_once(db, user_id, draft)
    })
    .await?;

    info!(
        transaction_id = created.id,
        kind = ?created.kind,
        amount = %created.amount,
        "Created transaction"
    );
    Ok(created)
}

async fn create_once(
    db: &DatabaseConnection,
    user_id: &str,
    draft: &TransactionDraft,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let (source, destination) = load_accounts(&txn, user_id, draft).await?;
    ensure_category(&txn, user_id, draft.category_id).await?;

    let now = Utc::now();
    let transaction_model = transaction::ActiveModel {
        user_id: Set(user_id.to_string()),
        kind: Set(draft.kind),
        amount: Set(draft.amount),
        account_id: Set(draft.account_id),
        destination_account_id: Set(draft.destination_account_id),
        category_id: Set(draft.category_id),
        description: Set(draft.description.clone()),
        date: Set(draft.date),
        target_name: Set(draft.trimmed_target_name()),
        reminder_date: Set(draft.reminder_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let result = transaction_model.insert(&txn).await?;

    apply_draft(&txn, draft, &source, destination.as_ref()).await?;

    txn.commit().await?;
    Ok(result)
}

/// Edits an existing transaction, keeping every touched balance consistent.
///
/// The stored transaction's effect is reversed on its old account(s) first,
/// then the merged transaction is checked against the accounts as they stand
/// after that reversal, and finally its new effect is applied. An edit that
/// does not change kind, amount or accounts leaves balances untouched.
#[instrument(skip(db, command))]
pub async fn update_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
    command: UpdateTransactionCommand,
) -> Result<transaction::Model> {
    let command = &command;
    let updated = retry_on_conflict(DEFAULT_CONFLICT_RETRIES, move || {
        update_once(db, user_id, transaction_id, command)
    })
    .await
    .inspect_err(|e| warn!("Failed to update transaction: {e}"))?;

    info!(
        transaction_id,
        amount = %updated.amount,
        "Updated transaction"
    );
    Ok(updated)
}

async fn update_once(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
    command: &UpdateTransactionCommand,
) -> Result<transaction::Model> {
    let txn = db.begin().await?;

    let existing = require_transaction(&txn, user_id, transaction_id).await?;
    let draft = command.clone().merge(&existing);
    draft.validate()?;

    let rebalance = command.touches_balances();
    if rebalance {
        let reversal = Effect::for_transaction(&existing).reversed();
        apply_effect(&txn, user_id, reversal).await?;
    }

    // Loaded after the reversal so funds are checked against what the account
    // would hold without the old version of this transaction.
    let accounts = if rebalance {
        Some(load_accounts(&txn, user_id, &draft).await?)
    } else {
        None
    };
    ensure_category(&txn, user_id, draft.category_id).await?;

    let mut transaction_model: transaction::ActiveModel = existing.into();
    transaction_model.kind = Set(draft.kind);
    transaction_model.amount = Set(draft.amount);
    transaction_model.account_id = Set(draft.account_id);
    transaction_model.destination_account_id = Set(draft.destination_account_id);
    transaction_model.category_id = Set(draft.category_id);
    transaction_model.description = Set(draft.description.clone());
    transaction_model.date = Set(draft.date);
    transaction_model.target_name = Set(draft.trimmed_target_name());
    transaction_model.reminder_date = Set(draft.reminder_date);
    transaction_model.updated_at = Set(Utc::now());
    let result = transaction_model.update(&txn).await?;

    if let Some((source, destination)) = accounts {
        apply_draft(&txn, &draft, &source, destination.as_ref()).await?;
    }

    txn.commit().await?;
    Ok(result)
}

/// Deletes a transaction and reverses its effect on the account balance(s).
///
/// Accounts that no longer exist are skipped; the row is removed regardless.
#[instrument(skip(db))]
pub async fn delete_transaction(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_id: i64,
) -> Result<()> {
    retry_on_conflict(DEFAULT_CONFLICT_RETRIES, move || {
        delete_once(db, user_id, transaction_id)
    })
    .await?;

    info!(transaction_id, "Deleted transaction");
    Ok(())
}

async fn delete_once(db: &DatabaseConnection, user_id: &str, transaction_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let transaction = require_transaction(&txn, user_id, transaction_id).await?;
    let reversal = Effect::for_transaction(&transaction).reversed();
    apply_effect(&txn, user_id, reversal).await?;
    transaction.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Deletes the given transactions of a user, reversing each one's effect.
///
/// The set is resolved once up front; ids that do not exist or belong to
/// another user are ignored. Each reversal-and-delete pair is atomic on its
/// own, but the batch is not: processing stops at the first failure and the
/// transactions already handled stay deleted.
///
/// # Returns
/// The number of transactions removed.
#[instrument(skip(db, transaction_ids), fields(requested = transaction_ids.len()))]
pub async fn delete_transactions(
    db: &DatabaseConnection,
    user_id: &str,
    transaction_ids: &[i64],
) -> Result<u64> {
    if transaction_ids.is_empty() {
        return Ok(0);
    }

    let targets = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::Id.is_in(transaction_ids.iter().copied()))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;

    delete_each(db, user_id, targets).await
}

/// Deletes every transaction of a user, reversing each one's effect.
///
/// Same best-effort semantics as [`delete_transactions`].
#[instrument(skip(db))]
pub async fn delete_all_transactions(db: &DatabaseConnection, user_id: &str) -> Result<u64> {
    let targets = Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_asc(transaction::Column::Id)
        .all(db)
        .await?;

    delete_each(db, user_id, targets).await
}

async fn delete_each(
    db: &DatabaseConnection,
    user_id: &str,
    targets: Vec<transaction::Model>,
) -> Result<u64> {
    let total = targets.len();
    let mut deleted = 0;

    for target in targets {
        let transaction_id = target.id;
        let outcome = retry_on_conflict(DEFAULT_CONFLICT_RETRIES, move || {
            delete_once(db, user_id, transaction_id)
        })
        .await;

        match outcome {
            Ok(()) => deleted += 1,
            // Removed by someone else since the set was fetched
            Err(Error::TransactionNotFound { .. }) => {
                debug!(transaction_id, "Transaction already gone, skipping");
            }
            Err(e) => {
                warn!(
                    transaction_id,
                    deleted, total, "Bulk delete stopped early: {e}"
                );
                return Err(e);
            }
        }
    }

    info!(deleted, total, "Deleted transactions");
    Ok(deleted)
}

/// Retrieves a transaction by id, returning None if it is missing or owned by someone else.
pub async fn get_transaction_by_id<C>(
    db: &C,
    user_id: &str,
    transaction_id: i64,
) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves all transactions of a user, newest first.
pub async fn get_transactions_for_user<C>(db: &C, user_id: &str) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every transaction touching an account, as source or as transfer
/// destination, newest first.
pub async fn get_transactions_for_account<C>(
    db: &C,
    user_id: &str,
    account_id: i64,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find()
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(transaction::Column::AccountId.eq(account_id))
                .add(transaction::Column::DestinationAccountId.eq(account_id)),
        )
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn require_transaction<C>(
    db: &C,
    user_id: &str,
    transaction_id: i64,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    get_transaction_by_id(db, user_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })
}

/// Loads and checks the accounts a draft will touch: source first, then the
/// funds check, then the transfer destination.
async fn load_accounts<C>(
    db: &C,
    user_id: &str,
    draft: &TransactionDraft,
) -> Result<(account_entity::Model, Option<account_entity::Model>)>
where
    C: ConnectionTrait,
{
    let source = account::require_account(db, user_id, draft.account_id).await?;

    if draft.kind.requires_funds() && source.balance < draft.amount {
        return Err(Error::InsufficientFunds {
            current: source.balance,
            required: draft.amount,
        });
    }

    let destination = match draft.destination_account_id {
        Some(id) => Some(account::require_account(db, user_id, id).await?),
        None => None,
    };

    Ok((source, destination))
}

async fn ensure_category<C>(db: &C, user_id: &str, category_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let Some(id) = category_id else {
        return Ok(());
    };
    if category::get_category(db, user_id, id).await?.is_none() {
        return Err(Error::CategoryNotFound { id });
    }
    Ok(())
}

/// Writes a draft's effect to accounts loaded earlier in the same operation.
async fn apply_draft<C>(
    db: &C,
    draft: &TransactionDraft,
    source: &account_entity::Model,
    destination: Option<&account_entity::Model>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    let effect = draft.effect();
    account::write_balance(db, source, effect.source.1).await?;

    if let (Some(destination), Some((_, delta))) = (destination, effect.destination) {
        account::write_balance(db, destination, delta).await?;
    }
    Ok(())
}

/// Applies an effect to whichever of its accounts still exist.
async fn apply_effect<C>(db: &C, user_id: &str, effect: Effect) -> Result<()>
where
    C: ConnectionTrait,
{
    let legs = std::iter::once(effect.source).chain(effect.destination);
    for (account_id, delta) in legs {
        match account::get_account(db, user_id, account_id).await? {
            Some(account) => {
                account::write_balance(db, &account, delta).await?;
            }
            None => debug!(account_id, "Account no longer exists, skipping balance reversal"),
        }
    }
    Ok(())
}
