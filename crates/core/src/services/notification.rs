//! Notification feed service.

use std::collections::HashMap;

use tweeter_common::AppResult;
use tweeter_db::{
    entities::notification,
    repositories::{NotificationRepository, TweetRepository, UserProfileRepository, UserRepository},
};

use crate::services::tweet::{Author, load_authors};

/// How many notifications the feed returns.
pub const FEED_LIMIT: u64 = 50;

/// Length of the tweet snippet attached to a notification, in characters.
pub const TWEET_SNIPPET_CHARS: usize = 80;

/// A notification with its actor and a snippet of the related tweet.
#[derive(Debug, Clone)]
pub struct NotificationDetails {
    pub notification: notification::Model,
    pub actor: Author,
    pub tweet_text: Option<String>,
}

/// The recipient's recent notifications plus their total unread count.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    pub notifications: Vec<NotificationDetails>,
    pub unread_count: u64,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    tweet_repo: TweetRepository,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        tweet_repo: TweetRepository,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            notification_repo,
            tweet_repo,
            user_repo,
            profile_repo,
        }
    }

    /// The most recent notifications, newest first.
    pub async fn feed(&self, recipient_id: &str) -> AppResult<NotificationFeed> {
        let rows = self
            .notification_repo
            .find_by_recipient(recipient_id, FEED_LIMIT)
            .await?;
        let unread_count = self.notification_repo.count_unread(recipient_id).await?;

        let mut actor_ids: Vec<String> = rows.iter().map(|n| n.actor_id.clone()).collect();
        actor_ids.sort();
        actor_ids.dedup();
        let actors = load_authors(&self.user_repo, &self.profile_repo, &actor_ids).await?;

        let tweet_ids: Vec<String> = rows.iter().filter_map(|n| n.tweet_id.clone()).collect();
        let snippets: HashMap<String, String> = self
            .tweet_repo
            .find_by_ids(&tweet_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, snippet(&t.text)))
            .collect();

        let notifications = rows
            .into_iter()
            .filter_map(|n| {
                // Cascades remove notifications whose actor is gone.
                let actor = actors.get(&n.actor_id)?.clone();
                let tweet_text = n.tweet_id.as_ref().and_then(|id| snippets.get(id).cloned());
                Some(NotificationDetails {
                    notification: n,
                    actor,
                    tweet_text,
                })
            })
            .collect();

        Ok(NotificationFeed {
            notifications,
            unread_count,
        })
    }

    /// Count unread notifications.
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }

    /// Mark every unread notification as read.
    pub async fn mark_all_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }
}

fn snippet(text: &str) -> String {
    text.chars().take(TWEET_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::tweet::CreateTweetInput;
    use crate::test_support::{Fixture, register};
    use tweeter_db::entities::notification::NotificationVerb;

    #[test]
    fn test_snippet_counts_characters() {
        let long = "ü".repeat(100);
        assert_eq!(snippet(&long).chars().count(), 80);
        assert_eq!(snippet("short"), "short");
    }

    #[tokio::test]
    async fn test_feed_and_mark_all_read() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;

        let text = "x".repeat(120);
        let tweet = fx
            .tweets
            .create(
                &alice,
                CreateTweetInput {
                    text: text.clone(),
                    photo: None,
                },
            )
            .await
            .unwrap();
        fx.likes.toggle(&bob.id, &tweet.tweet.id).await.unwrap();

        let feed = fx.notifications.feed(&alice.id).await.unwrap();
        assert_eq!(feed.unread_count, 1);
        assert_eq!(feed.notifications.len(), 1);

        let entry = &feed.notifications[0];
        assert_eq!(entry.notification.verb, NotificationVerb::Like);
        assert_eq!(entry.actor.user.username, "bob");
        assert_eq!(entry.tweet_text.as_deref(), Some(&text[..80]));

        assert_eq!(fx.notifications.mark_all_read(&alice.id).await.unwrap(), 1);

        let feed = fx.notifications.feed(&alice.id).await.unwrap();
        assert_eq!(feed.unread_count, 0);
        assert!(feed.notifications.iter().all(|n| n.notification.is_read));
    }

    #[tokio::test]
    async fn test_feed_is_limited_but_unread_count_is_not() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;

        let mut likers = Vec::new();
        for i in 0..55 {
            likers.push(register(&fx, &format!("user{i}")).await);
        }
        let tweet = fx
            .tweets
            .create(
                &alice,
                CreateTweetInput {
                    text: "popular".to_string(),
                    photo: None,
                },
            )
            .await
            .unwrap();
        for liker in &likers {
            fx.likes.toggle(&liker.id, &tweet.tweet.id).await.unwrap();
        }

        let feed = fx.notifications.feed(&alice.id).await.unwrap();
        assert_eq!(feed.notifications.len(), 50);
        assert_eq!(feed.unread_count, 55);
    }

    #[tokio::test]
    async fn test_empty_feed() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;

        let feed = fx.notifications.feed(&alice.id).await.unwrap();
        assert!(feed.notifications.is_empty());
        assert_eq!(feed.unread_count, 0);
    }
}
