//! Typed commands accepted by the ledger engine.
//!
//! Commands are plain data built by the caller. Before the engine touches any
//! account they are turned into a [`TransactionDraft`], the complete shape of
//! the transaction row, and validated. A draft that passes [`TransactionDraft::validate`]
//! satisfies every structural invariant of a stored transaction.

use crate::{
    core::{effect::Effect, money},
    entities::{TransactionKind, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Request to record a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionCommand {
    /// Direction of the transaction
    pub kind: TransactionKind,
    /// Positive magnitude
    pub amount: Decimal,
    /// Source account
    pub account_id: i64,
    /// Receiving account, transfers only
    pub destination_account_id: Option<i64>,
    /// Optional category
    pub category_id: Option<i64>,
    /// Optional description
    pub description: Option<String>,
    /// Event time, defaults to now
    pub date: Option<DateTime<Utc>>,
    /// Borrower's name, loans only
    pub target_name: Option<String>,
    /// When to chase the loan, loans only
    pub reminder_date: Option<DateTime<Utc>>,
}

impl CreateTransactionCommand {
    fn new(kind: TransactionKind, account_id: i64, amount: Decimal) -> Self {
        Self {
            kind,
            amount,
            account_id,
            destination_account_id: None,
            category_id: None,
            description: None,
            date: None,
            target_name: None,
            reminder_date: None,
        }
    }

    /// Money arriving in `account_id`.
    #[must_use]
    pub fn income(account_id: i64, amount: Decimal) -> Self {
        Self::new(TransactionKind::Income, account_id, amount)
    }

    /// Money spent from `account_id`.
    #[must_use]
    pub fn expense(account_id: i64, amount: Decimal) -> Self {
        Self::new(TransactionKind::Expense, account_id, amount)
    }

    /// Money moved from `account_id` to `destination_account_id`.
    #[must_use]
    pub fn transfer(account_id: i64, destination_account_id: i64, amount: Decimal) -> Self {
        Self {
            destination_account_id: Some(destination_account_id),
            ..Self::new(TransactionKind::Transfer, account_id, amount)
        }
    }

    /// Money lent from `account_id` to `target_name`, to be chased on `reminder_date`.
    #[must_use]
    pub fn lend(
        account_id: i64,
        amount: Decimal,
        target_name: impl Into<String>,
        reminder_date: DateTime<Utc>,
    ) -> Self {
        Self {
            target_name: Some(target_name.into()),
            reminder_date: Some(reminder_date),
            ..Self::new(TransactionKind::Lend, account_id, amount)
        }
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the event time.
    #[must_use]
    pub const fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Builds the draft row, defaulting the date to `now`.
    #[must_use]
    pub fn into_draft(self, now: DateTime<Utc>) -> TransactionDraft {
        TransactionDraft {
            kind: self.kind,
            amount: self.amount,
            account_id: self.account_id,
            destination_account_id: self.destination_account_id,
            category_id: self.category_id,
            description: self.description,
            date: self.date.unwrap_or(now),
            target_name: self.target_name,
            reminder_date: self.reminder_date,
        }
    }
}

/// Treats an explicit `null` as "clear the field" rather than "keep it".
fn present<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Partial update of an existing transaction. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionCommand {
    /// New direction
    pub kind: Option<TransactionKind>,
    /// New magnitude
    pub amount: Option<Decimal>,
    /// New source account
    pub account_id: Option<i64>,
    /// New receiving account
    pub destination_account_id: Option<i64>,
    /// New category, `Some(None)` clears it
    #[serde(default, deserialize_with = "present")]
    pub category_id: Option<Option<i64>>,
    /// New description, `Some(None)` clears it
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    /// New event time
    pub date: Option<DateTime<Utc>>,
    /// New borrower's name
    pub target_name: Option<String>,
    /// New reminder date
    pub reminder_date: Option<DateTime<Utc>>,
}

impl UpdateTransactionCommand {
    /// Whether the update changes anything that affects balances.
    #[must_use]
    pub const fn touches_balances(&self) -> bool {
        self.kind.is_some()
            || self.amount.is_some()
            || self.account_id.is_some()
            || self.destination_account_id.is_some()
    }

    /// Merges the provided fields over `existing`.
    ///
    /// Kind-specific fields of the stored row are only carried over while the
    /// merged kind still uses them, so turning a transfer into an expense drops
    /// its destination. Explicitly provided fields are always kept and left
    /// for [`TransactionDraft::validate`] to judge.
    #[must_use]
    pub fn merge(self, existing: &transaction::Model) -> TransactionDraft {
        let kind = self.kind.unwrap_or(existing.kind);
        let keeps = |k: TransactionKind| kind == k && existing.kind == k;

        TransactionDraft {
            kind,
            amount: self.amount.unwrap_or(existing.amount),
            account_id: self.account_id.unwrap_or(existing.account_id),
            destination_account_id: self.destination_account_id.or_else(|| {
                keeps(TransactionKind::Transfer)
                    .then_some(existing.destination_account_id)
                    .flatten()
            }),
            category_id: self.category_id.unwrap_or(existing.category_id),
            description: self
                .description
                .unwrap_or_else(|| existing.description.clone()),
            date: self.date.unwrap_or(existing.date),
            target_name: self.target_name.or_else(|| {
                keeps(TransactionKind::Lend)
                    .then(|| existing.target_name.clone())
                    .flatten()
            }),
            reminder_date: self.reminder_date.or_else(|| {
                keeps(TransactionKind::Lend)
                    .then_some(existing.reminder_date)
                    .flatten()
            }),
        }
    }
}

/// Complete shape of a transaction row before it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft {
    /// Direction
    pub kind: TransactionKind,
    /// Positive magnitude
    pub amount: Decimal,
    /// Source account
    pub account_id: i64,
    /// Receiving account
    pub destination_account_id: Option<i64>,
    /// Category
    pub category_id: Option<i64>,
    /// Description
    pub description: Option<String>,
    /// Event time
    pub date: DateTime<Utc>,
    /// Borrower's name
    pub target_name: Option<String>,
    /// Reminder date
    pub reminder_date: Option<DateTime<Utc>>,
}

impl TransactionDraft {
    /// Checks the structural invariants of a transaction.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::validation("amount", "must be positive"));
        }
        money::ensure_storable("amount", self.amount)?;

        match (self.kind, self.destination_account_id) {
            (TransactionKind::Transfer, None) => {
                return Err(Error::validation(
                    "destination_account_id",
                    "is required for transfers",
                ));
            }
            (TransactionKind::Transfer, Some(id)) if id == self.account_id => {
                return Err(Error::validation(
                    "destination_account_id",
                    "must differ from the source account",
                ));
            }
            (kind, Some(_)) if kind != TransactionKind::Transfer => {
                return Err(Error::validation(
                    "destination_account_id",
                    "only applies to transfers",
                ));
            }
            _ => {}
        }

        let is_lend = self.kind == TransactionKind::Lend;
        let has_target = self
            .target_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if is_lend && !has_target {
            return Err(Error::validation("target_name", "is required for loans"));
        }
        if is_lend && self.reminder_date.is_none() {
            return Err(Error::validation("reminder_date", "is required for loans"));
        }
        if !is_lend && self.target_name.is_some() {
            return Err(Error::validation("target_name", "only applies to loans"));
        }
        if !is_lend && self.reminder_date.is_some() {
            return Err(Error::validation("reminder_date", "only applies to loans"));
        }

        Ok(())
    }

    /// The balance effect this draft will have once stored.
    #[must_use]
    pub fn effect(&self) -> Effect {
        Effect::of(
            self.kind,
            self.amount,
            self.account_id,
            self.destination_account_id,
        )
    }

    /// Target name with surrounding whitespace removed.
    pub(crate) fn trimmed_target_name(&self) -> Option<String> {
        self.target_name.as_deref().map(|name| name.trim().to_string())
    }
}
