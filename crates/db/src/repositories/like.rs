//! Like repository.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entities::{Like, like};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QuerySelect, SqlErr, sea_query::Expr,
};
use tweeter_common::{AppError, AppResult};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and tweet.
    pub async fn find_by_user_and_tweet(
        &self,
        user_id: &str,
        tweet_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TweetId.eq(tweet_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like.
    ///
    /// Returns [`AppError::Conflict`] when the (user, tweet) pair already exists.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Already liked.".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a like by ID. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Like::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }

    /// Count likes on a tweet.
    pub async fn count_by_tweet(&self, tweet_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::TweetId.eq(tweet_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Like counts for several tweets in one query. Tweets without likes are absent.
    pub async fn count_by_tweets(&self, tweet_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if tweet_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Like::find()
            .select_only()
            .column(like::Column::TweetId)
            .column_as(Expr::col(like::Column::Id).count(), "like_count")
            .filter(like::Column::TweetId.is_in(tweet_ids.to_vec()))
            .group_by(like::Column::TweetId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    /// Which of the given tweets the user has liked.
    pub async fn liked_tweet_ids(
        &self,
        user_id: &str,
        tweet_ids: &[String],
    ) -> AppResult<HashSet<String>> {
        if tweet_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<String> = Like::find()
            .select_only()
            .column(like::Column::TweetId)
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TweetId.is_in(tweet_ids.to_vec()))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(ids.into_iter().collect())
    }

    /// Count likes given by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
