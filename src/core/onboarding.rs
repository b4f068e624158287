//! First-run onboarding - Gives a new user an account to start from and the
//! default set of categories.

use crate::{
    core::{
        account,
        category::{DEFAULT_CATEGORIES, ensure_category},
    },
    entities::{account as account_entity, category as category_entity},
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// What a user tells us when they sign up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingRequest {
    /// Name of the first account (usually their bank)
    pub account_name: String,
    /// Account type tag, `"bank"` when not given
    #[serde(default = "default_account_kind")]
    pub account_kind: String,
    /// What the account holds today
    pub opening_balance: Decimal,
}

fn default_account_kind() -> String {
    "bank".to_string()
}

impl OnboardingRequest {
    /// A bank account holding `opening_balance`.
    #[must_use]
    pub fn new(account_name: impl Into<String>, opening_balance: Decimal) -> Self {
        Self {
            account_name: account_name.into(),
            account_kind: default_account_kind(),
            opening_balance,
        }
    }
}

/// Everything onboarding created.
#[derive(Debug, Clone)]
pub struct Onboarding {
    /// The seeded account
    pub account: account_entity::Model,
    /// Default categories that did not exist yet
    pub categories: Vec<category_entity::Model>,
}

/// Creates the user's first account and any missing default categories,
/// all or nothing.
#[instrument(skip(db, request))]
pub async fn onboard_user(
    db: &DatabaseConnection,
    user_id: &str,
    request: OnboardingRequest,
) -> Result<Onboarding> {
    let txn = db.begin().await?;

    let account = account::create_account(
        &txn,
        user_id,
        &request.account_name,
        &request.account_kind,
        request.opening_balance,
    )
    .await?;

    let mut categories = Vec::new();
    for name in DEFAULT_CATEGORIES {
        let (category, created) = ensure_category(&txn, user_id, name).await?;
        if created {
            categories.push(category);
        }
    }

    txn.commit().await?;

    info!(
        account_id = account.id,
        opening_balance = %account.opening_balance,
        categories = categories.len(),
        "Onboarded user"
    );
    Ok(Onboarding {
        account,
        categories,
    })
}
