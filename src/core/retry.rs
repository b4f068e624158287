//! Retry-on-conflict for operations that write balances optimistically.
//!
//! The operation passed in must be safe to run again from scratch, which the
//! engine guarantees by doing all its work inside one database transaction
//! that is rolled back when the conflict is detected.

use crate::errors::{Error, Result};
use std::future::Future;
use tracing::warn;

/// Attempts made before a conflict is handed back to the caller.
pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

/// Runs `operation`, re-running it while it fails with [`Error::Conflict`],
/// up to `attempts` runs in total. Every other outcome is returned as is.
pub async fn retry_on_conflict<T, F, Fut>(attempts: u32, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(Error::Conflict { account_id }) if attempt < attempts => {
                warn!(account_id, attempt, "balance write conflicted, retrying");
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}
