//! User profile repository.

use std::sync::Arc;

use crate::entities::{UserProfile, user_profile};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};
use tweeter_common::{AppError, AppResult};

/// User profile repository for database operations.
#[derive(Clone)]
pub struct UserProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl UserProfileRepository {
    /// Create a new user profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<user_profile::Model>> {
        UserProfile::find()
            .filter(user_profile::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find profiles for several users at once.
    pub async fn find_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<user_profile::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        UserProfile::find()
            .filter(user_profile::Column::UserId.is_in(user_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Return the user's profile, creating a blank one if missing.
    ///
    /// Two concurrent callers may both try to insert; the loser of the unique
    /// index race re-reads the winner's row.
    pub async fn get_or_create(
        &self,
        user_id: &str,
        new_id: String,
    ) -> AppResult<user_profile::Model> {
        if let Some(profile) = self.find_by_user_id(user_id).await? {
            return Ok(profile);
        }

        let model = user_profile::ActiveModel {
            id: Set(new_id),
            user_id: Set(user_id.to_string()),
            display_name: Set(String::new()),
            bio: Set(String::new()),
            avatar_url: Set(String::new()),
            header_url: Set(String::new()),
            location: Set(String::new()),
            website: Set(String::new()),
            created_at: Set(Utc::now().into()),
        };

        match model.insert(self.db.as_ref()).await {
            Ok(profile) => Ok(profile),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => self
                .find_by_user_id(user_id)
                .await?
                .ok_or_else(|| AppError::Database(e.to_string())),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Update a profile.
    pub async fn update(&self, model: user_profile::ActiveModel) -> AppResult<user_profile::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_profile(id: &str, user_id: &str) -> user_profile::Model {
        user_profile::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            display_name: "Alice".to_string(),
            bio: String::new(),
            avatar_url: String::new(),
            header_url: String::new(),
            location: String::new(),
            website: String::new(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_user_id() {
        let profile = create_test_profile("p1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.find_by_user_id("user1").await.unwrap();

        assert_eq!(result.unwrap().display_name, "Alice");
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing() {
        let profile = create_test_profile("p1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[profile.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_or_create("user1", "p2".to_string()).await.unwrap();

        assert_eq!(result.id, "p1");
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_when_missing() {
        let mut created = create_test_profile("p2", "user1");
        created.display_name = String::new();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_profile::Model>::new()])
                .append_query_results([[created.clone()]])
                .into_connection(),
        );

        let repo = UserProfileRepository::new(db);
        let result = repo.get_or_create("user1", "p2".to_string()).await.unwrap();

        assert_eq!(result.id, "p2");
        assert!(result.display_name.is_empty());
    }
}
