//! Session repository.

use std::sync::Arc;

use crate::entities::{Session, session};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    prelude::DateTimeWithTimeZone,
};
use tweeter_common::{AppError, AppResult};

/// Session repository for database operations.
#[derive(Clone)]
pub struct SessionRepository {
    db: Arc<DatabaseConnection>,
}

impl SessionRepository {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a session by key.
    pub async fn find_by_key(&self, session_key: &str) -> AppResult<Option<session::Model>> {
        Session::find_by_id(session_key)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new session.
    pub async fn create(&self, model: session::ActiveModel) -> AppResult<session::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a session by key. Missing keys are ignored.
    pub async fn delete(&self, session_key: &str) -> AppResult<()> {
        Session::delete_by_id(session_key)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove every session whose expiry has passed.
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Session::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_by_key() {
        let now = Utc::now();
        let session = session::Model {
            session_key: "abc".to_string(),
            user_id: "user1".to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::days(14)).into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[session.clone()]])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        let result = repo.find_by_key("abc").await.unwrap();

        assert_eq!(result.unwrap().user_id, "user1");
    }

    #[tokio::test]
    async fn test_delete_expired() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 3,
                }])
                .into_connection(),
        );

        let repo = SessionRepository::new(db);
        assert_eq!(repo.delete_expired().await.unwrap(), 3);
    }
}
