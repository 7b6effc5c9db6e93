//! User repository.

use std::sync::Arc;

use crate::entities::{User, user, user_profile};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr, TransactionTrait, prelude::DateTimeWithTimeZone, sea_query::Expr,
};
use tweeter_common::{AppError, AppResult};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by exact username.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a user together with an empty profile.
    ///
    /// Both rows are written in one transaction. A duplicate username surfaces
    /// as [`AppError::Conflict`].
    pub async fn create_with_profile(
        &self,
        user: user::ActiveModel,
        profile_id: String,
    ) -> AppResult<(user::Model, user_profile::Model)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let user = user.insert(&txn).await.map_err(map_insert_err)?;

        let profile = user_profile::ActiveModel {
            id: Set(profile_id),
            user_id: Set(user.id.clone()),
            display_name: Set(String::new()),
            bio: Set(String::new()),
            avatar_url: Set(String::new()),
            header_url: Set(String::new()),
            location: Set(String::new()),
            website: Set(String::new()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((user, profile))
    }

    /// Record a successful login.
    pub async fn touch_last_login(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::LastLogin,
                Expr::value(DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

fn map_insert_err(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("Username already taken.".to_string())
        }
        _ => AppError::Database(e.to_string()),
    }
}
