//! Server-side session service.

use chrono::{Duration, Utc};
use sea_orm::Set;
use tracing::debug;
use tweeter_common::{AppResult, IdGenerator};
use tweeter_db::{
    entities::{session, user},
    repositories::{SessionRepository, UserRepository},
};

/// Session service for business logic.
#[derive(Clone)]
pub struct SessionService {
    session_repo: SessionRepository,
    user_repo: UserRepository,
    max_age: Duration,
    id_gen: IdGenerator,
}

impl SessionService {
    /// Create a new session service. Sessions expire `max_age_secs` after login.
    #[must_use]
    pub fn new(session_repo: SessionRepository, user_repo: UserRepository, max_age_secs: i64) -> Self {
        Self {
            session_repo,
            user_repo,
            max_age: Duration::seconds(max_age_secs),
            id_gen: IdGenerator::new(),
        }
    }

    /// Session lifetime.
    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Open a new session for a user.
    pub async fn create(&self, user_id: &str) -> AppResult<session::Model> {
        let now = Utc::now();
        let model = session::ActiveModel {
            session_key: Set(self.id_gen.generate_token()),
            user_id: Set(user_id.to_string()),
            created_at: Set(now.into()),
            expires_at: Set((now + self.max_age).into()),
        };
        self.session_repo.create(model).await
    }

    /// Resolve a session key to its user.
    ///
    /// Expired sessions are deleted and resolve to `None`.
    pub async fn resolve(&self, session_key: &str) -> AppResult<Option<user::Model>> {
        let Some(session) = self.session_repo.find_by_key(session_key).await? else {
            return Ok(None);
        };

        if session.expires_at <= Utc::now() {
            debug!(user_id = %session.user_id, "Session expired");
            self.session_repo.delete(session_key).await?;
            return Ok(None);
        }

        self.user_repo.find_by_id(&session.user_id).await
    }

    /// Delete a session. Unknown keys are ignored.
    pub async fn destroy(&self, session_key: &str) -> AppResult<()> {
        self.session_repo.delete(session_key).await
    }

    /// Remove all expired sessions.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.session_repo.delete_expired().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::account::{AccountService, RegisterInput};
    use tweeter_db::{repositories::UserProfileRepository, test_utils::TestDatabase};

    async fn setup(max_age_secs: i64) -> (TestDatabase, SessionService, user::Model) {
        let db = TestDatabase::sqlite().await.unwrap();
        let accounts = AccountService::new(
            UserRepository::new(db.shared()),
            UserProfileRepository::new(db.shared()),
        );
        let (user, _) = accounts
            .register(RegisterInput {
                username: "alice".to_string(),
                email: None,
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        let sessions = SessionService::new(
            SessionRepository::new(db.shared()),
            UserRepository::new(db.shared()),
            max_age_secs,
        );
        (db, sessions, user)
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let (_db, sessions, user) = setup(3600).await;

        let session = sessions.create(&user.id).await.unwrap();
        assert_eq!(session.session_key.len(), 32);

        let resolved = sessions.resolve(&session.session_key).await.unwrap();
        assert_eq!(resolved.unwrap().id, user.id);
    }

    #[tokio::test]
    async fn test_destroyed_session_does_not_resolve() {
        let (_db, sessions, user) = setup(3600).await;

        let session = sessions.create(&user.id).await.unwrap();
        sessions.destroy(&session.session_key).await.unwrap();

        assert!(sessions.resolve(&session.session_key).await.unwrap().is_none());
        // Destroying twice is fine.
        assert!(sessions.destroy(&session.session_key).await.is_ok());
    }

    #[tokio::test]
    async fn test_expired_session_does_not_resolve() {
        let (_db, sessions, user) = setup(-1).await;

        let session = sessions.create(&user.id).await.unwrap();

        assert!(sessions.resolve(&session.session_key).await.unwrap().is_none());
        assert_eq!(sessions.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let (_db, sessions, user) = setup(-1).await;

        sessions.create(&user.id).await.unwrap();
        sessions.create(&user.id).await.unwrap();

        assert_eq!(sessions.purge_expired().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let (_db, sessions, _user) = setup(3600).await;
        assert!(sessions.resolve("nope").await.unwrap().is_none());
    }
}
