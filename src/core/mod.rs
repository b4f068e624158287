//! Core business logic - framework-agnostic ledger operations.
//!
//! Everything that touches balances goes through [`transaction`]. The other
//! modules provide the pieces it is built from ([`effect`], [`command`],
//! [`account`], [`category`], [`money`], [`retry`]) and the operations that
//! sit next to it ([`onboarding`], [`audit`]).

/// Account lookups and version-checked balance writes
pub mod account;
/// Recomputes balances from history and reports drift
pub mod audit;
/// User categories and the default set
pub mod category;
/// Create and update requests, validated before any I/O
pub mod command;
/// Balance effect of a transaction kind
pub mod effect;
/// Money values the database can hold exactly
pub mod money;
/// First account and default categories for a new user
pub mod onboarding;
/// Re-running operations that lost an optimistic-concurrency race
pub mod retry;
/// The balance engine: create, update and delete transactions
pub mod transaction;
