//! Like toggle service.

use chrono::Utc;
use sea_orm::Set;
use tracing::{debug, info};
use tweeter_common::{AppError, AppResult, IdGenerator};
use tweeter_db::{
    entities::{like, notification, notification::NotificationVerb},
    repositories::{LikeRepository, NotificationRepository, TweetRepository},
};

/// Outcome of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    tweet_repo: TweetRepository,
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        tweet_repo: TweetRepository,
        notification_repo: NotificationRepository,
    ) -> Self {
        Self {
            like_repo,
            tweet_repo,
            notification_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like the tweet if the user hasn't yet, otherwise remove the like.
    ///
    /// A fresh like on someone else's tweet notifies the author. Removing a
    /// like leaves any earlier notification in place.
    pub async fn toggle(&self, user_id: &str, tweet_id: &str) -> AppResult<LikeState> {
        let tweet = self.tweet_repo.get_by_id(tweet_id).await?;

        let liked = match self
            .like_repo
            .find_by_user_and_tweet(user_id, tweet_id)
            .await?
        {
            Some(existing) => {
                self.like_repo.delete(&existing.id).await?;
                false
            }
            None => {
                let model = like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    user_id: Set(user_id.to_string()),
                    tweet_id: Set(tweet_id.to_string()),
                    created_at: Set(Utc::now().into()),
                };

                match self.like_repo.create(model).await {
                    Ok(_) => {
                        if tweet.user_id != user_id {
                            self.notify_author(&tweet.user_id, user_id, tweet_id).await?;
                        }
                    }
                    // Lost a race with a concurrent toggle: the like exists.
                    Err(AppError::Conflict(_)) => {
                        debug!(user_id, tweet_id, "Concurrent like, treating as already liked");
                    }
                    Err(e) => return Err(e),
                }
                true
            }
        };

        let like_count = self.like_repo.count_by_tweet(tweet_id).await?;
        Ok(LikeState { liked, like_count })
    }

    async fn notify_author(&self, recipient_id: &str, actor_id: &str, tweet_id: &str) -> AppResult<()> {
        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            verb: Set(NotificationVerb::Like),
            tweet_id: Set(Some(tweet_id.to_string())),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        };
        let created = self.notification_repo.create(model).await?;
        info!(notification_id = %created.id, recipient_id, actor_id, "Created like notification");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::tweet::CreateTweetInput;
    use crate::test_support::{Fixture, register};

    async fn post(fx: &Fixture, author: &tweeter_db::entities::user::Model) -> String {
        fx.tweets
            .create(
                author,
                CreateTweetInput {
                    text: "hello world".to_string(),
                    photo: None,
                },
            )
            .await
            .unwrap()
            .tweet
            .id
    }

    #[tokio::test]
    async fn test_toggle_sequence() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;
        let tweet_id = post(&fx, &alice).await;

        let first = fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(first, LikeState { liked: true, like_count: 1 });

        let second = fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(second, LikeState { liked: false, like_count: 0 });

        let third = fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(third, LikeState { liked: true, like_count: 1 });
    }

    #[tokio::test]
    async fn test_like_count_tracks_distinct_users() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;
        let carol = register(&fx, "carol").await;
        let tweet_id = post(&fx, &alice).await;

        fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        let state = fx.likes.toggle(&carol.id, &tweet_id).await.unwrap();
        assert_eq!(state.like_count, 2);

        let state = fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(state, LikeState { liked: false, like_count: 1 });
    }

    #[tokio::test]
    async fn test_notifies_author_once_and_keeps_notification_on_unlike() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;
        let tweet_id = post(&fx, &alice).await;

        fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(fx.notifications.count_unread(&alice.id).await.unwrap(), 1);

        fx.likes.toggle(&bob.id, &tweet_id).await.unwrap();
        assert_eq!(fx.notifications.count_unread(&alice.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_liking_own_tweet_does_not_notify() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let tweet_id = post(&fx, &alice).await;

        let state = fx.likes.toggle(&alice.id, &tweet_id).await.unwrap();

        assert!(state.liked);
        assert_eq!(fx.notifications.count_unread(&alice.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_tweet() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;

        assert!(matches!(
            fx.likes.toggle(&alice.id, "missing").await,
            Err(AppError::NotFound(_))
        ));
    }
}
