//! Balance effects - the single source of truth for how each transaction kind
//! moves money.
//!
//! | Kind     | Source  | Destination |
//! |----------|---------|-------------|
//! | income   | +amount | -           |
//! | expense  | -amount | -           |
//! | transfer | -amount | +amount     |
//! | lend     | -amount | -           |
//!
//! Creating a transaction applies its [`Effect`]; deleting it applies
//! [`Effect::reversed`]. Updating does both, old then new.

use crate::entities::{TransactionKind, transaction};
use rust_decimal::Decimal;

/// Signed balance deltas a transaction applies to the accounts it touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Effect {
    /// Source account and the delta added to its balance
    pub source: (i64, Decimal),
    /// Destination account and its delta, for transfers
    pub destination: Option<(i64, Decimal)>,
}

impl TransactionKind {
    /// Whether money leaves the source account, and therefore needs a funds check.
    #[must_use]
    pub const fn requires_funds(self) -> bool {
        !matches!(self, Self::Income)
    }

    /// Delta applied to the source account for a transaction of `amount`.
    #[must_use]
    pub fn source_delta(self, amount: Decimal) -> Decimal {
        match self {
            Self::Income => amount,
            Self::Expense | Self::Transfer | Self::Lend => -amount,
        }
    }

    /// Delta applied to the destination account, `None` for kinds without one.
    #[must_use]
    pub fn destination_delta(self, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Transfer => Some(amount),
            Self::Income | Self::Expense | Self::Lend => None,
        }
    }
}

impl Effect {
    /// Builds the effect of a transaction with the given shape.
    ///
    /// A destination account is only honoured for transfers.
    #[must_use]
    pub fn of(
        kind: TransactionKind,
        amount: Decimal,
        account_id: i64,
        destination_account_id: Option<i64>,
    ) -> Self {
        let destination = kind
            .destination_delta(amount)
            .zip(destination_account_id)
            .map(|(delta, id)| (id, delta));

        Self {
            source: (account_id, kind.source_delta(amount)),
            destination,
        }
    }

    /// The effect a stored transaction had when it was applied.
    #[must_use]
    pub fn for_transaction(transaction: &transaction::Model) -> Self {
        Self::of(
            transaction.kind,
            transaction.amount,
            transaction.account_id,
            transaction.destination_account_id,
        )
    }

    /// The effect that undoes this one.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            source: (self.source.0, -self.source.1),
            destination: self.destination.map(|(id, delta)| (id, -delta)),
        }
    }

    /// Net delta this effect applies to `account_id`.
    #[must_use]
    pub fn delta_for(&self, account_id: i64) -> Decimal {
        let mut delta = Decimal::ZERO;
        if self.source.0 == account_id {
            delta += self.source.1;
        }
        if let Some((id, dest_delta)) = self.destination {
            if id == account_id {
                delta += dest_delta;
            }
        }
        delta
    }
}
