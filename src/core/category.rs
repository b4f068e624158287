//! Category business logic - Labels users attach to transactions.

use crate::{
    entities::{Category, category},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Categories every user starts with.
pub const DEFAULT_CATEGORIES: [&str; 7] = [
    "Groceries",
    "Utilities",
    "Entertainment",
    "Transport",
    "Rent",
    "Salary",
    "Lending",
];

/// Creates a category for `user_id`. The name is trimmed and must not be empty.
pub async fn create_category<C>(db: &C, user_id: &str, name: &str) -> Result<category::Model>
where
    C: ConnectionTrait,
{
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::validation("name", "category name cannot be empty"));
    }

    let category = category::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    Ok(category.insert(db).await?)
}

/// Finds a category by id, scoped to its owner.
pub async fn get_category<C>(
    db: &C,
    user_id: &str,
    category_id: i64,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a user's category by its exact name.
pub async fn get_category_by_name<C>(
    db: &C,
    user_id: &str,
    name: &str,
) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(category::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All categories of a user, alphabetically.
pub async fn get_categories_for_user<C>(db: &C, user_id: &str) -> Result<Vec<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates the named category unless the user already has one by that name.
///
/// Returns the category and whether it was newly created.
pub async fn ensure_category<C>(
    db: &C,
    user_id: &str,
    name: &str,
) -> Result<(category::Model, bool)>
where
    C: ConnectionTrait,
{
    if let Some(existing) = get_category_by_name(db, user_id, name.trim()).await? {
        return Ok((existing, false));
    }
    let created = create_category(db, user_id, name).await?;
    Ok((created, true))
}
