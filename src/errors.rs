//! Unified error type for the ledger core.
//!
//! Every fallible operation in the crate returns [`Result`]. Callers that sit in
//! front of a client (an HTTP handler, a CLI) use [`Error::class`] to decide how
//! the failure is surfaced.

use rust_decimal::Decimal;
use thiserror::Error;

/// All errors produced by the ledger core.
#[derive(Debug, Error)]
pub enum Error {
    /// The account does not exist or belongs to another user
    #[error("Account not found: {id}")]
    AccountNotFound {
        /// Requested account id
        id: i64,
    },

    /// The transaction does not exist or belongs to another user
    #[error("Transaction not found: {id}")]
    TransactionNotFound {
        /// Requested transaction id
        id: i64,
    },

    /// The category does not exist or belongs to another user
    #[error("Category not found: {id}")]
    CategoryNotFound {
        /// Requested category id
        id: i64,
    },

    /// A debit would take more than the source account holds
    #[error("Insufficient funds: balance is {current}, transaction requires {required}")]
    InsufficientFunds {
        /// Balance of the source account at check time
        current: Decimal,
        /// Amount the transaction needs
        required: Decimal,
    },

    /// Structurally invalid input
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// Another writer changed the account between our read and our write
    #[error("Account {account_id} was modified concurrently")]
    Conflict {
        /// Account whose version check failed
        account_id: i64,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Persistence layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How an [`Error`] should be reported to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Referenced entity is missing (404)
    NotFound,
    /// The request cannot be honoured as given (400)
    BadRequest,
    /// Concurrent writers kept colliding (409)
    Conflict,
    /// Infrastructure failure, safe to retry the whole operation (500)
    Internal,
}

impl ErrorClass {
    /// HTTP status code conventionally used for this class.
    #[must_use]
    pub const fn status_code(self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::BadRequest => 400,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

impl Error {
    /// Classifies the error for the caller.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::AccountNotFound { .. }
            | Self::TransactionNotFound { .. }
            | Self::CategoryNotFound { .. } => ErrorClass::NotFound,
            Self::InsufficientFunds { .. } | Self::Validation { .. } => ErrorClass::BadRequest,
            Self::Conflict { .. } => ErrorClass::Conflict,
            Self::Config { .. } | Self::Database(_) | Self::Io(_) => ErrorClass::Internal,
        }
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
