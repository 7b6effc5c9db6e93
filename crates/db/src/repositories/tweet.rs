//! Tweet repository.

use std::sync::Arc;

use crate::entities::{Like, Notification, Tweet, like, notification, tweet};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tweeter_common::{AppError, AppResult};

/// Tweet repository for database operations.
#[derive(Clone)]
pub struct TweetRepository {
    db: Arc<DatabaseConnection>,
}

impl TweetRepository {
    /// Create a new tweet repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tweet by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tweet::Model>> {
        Tweet::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tweet by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tweet::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tweet".to_string()))
    }

    /// Find tweets by IDs (unordered).
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tweet::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tweet::find()
            .filter(tweet::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All tweets, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<tweet::Model>> {
        Tweet::find()
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tweets authored by one user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<tweet::Model>> {
        Tweet::find()
            .filter(tweet::Column::UserId.eq(user_id))
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count tweets authored by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Tweet::find()
            .filter(tweet::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new tweet.
    pub async fn create(&self, model: tweet::ActiveModel) -> AppResult<tweet::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a tweet.
    pub async fn update(&self, model: tweet::ActiveModel) -> AppResult<tweet::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a tweet along with its likes and notifications.
    pub async fn delete_with_dependents(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Notification::delete_many()
            .filter(notification::Column::TweetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Like::delete_many()
            .filter(like::Column::TweetId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Tweet::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
