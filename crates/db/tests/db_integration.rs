//! Database integration tests.
//!
//! Repository tests run against an in-memory `SQLite` database with the real
//! schema. The `PostgreSQL` tests are ignored by default.
//! Run them with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `tweeter_test`)
//!   `TEST_DB_PASSWORD` (default: `tweeter_test`)
//!   `TEST_DB_NAME` (default: `tweeter_test`)

#![allow(clippy::unwrap_used)]

use chrono::{Duration, Utc};
use sea_orm::Set;
use tweeter_common::AppError;
use tweeter_db::entities::{like, notification, notification::NotificationVerb, tweet, user};
use tweeter_db::repositories::{
    LikeRepository, NotificationRepository, TweetRepository, UserProfileRepository,
    UserRepository,
};
use tweeter_db::test_utils::{TestDatabase, TestDbConfig};

fn new_user(id: &str, username: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        email: Set(String::new()),
        password: Set("hash".to_string()),
        date_joined: Set(Utc::now().into()),
        last_login: Set(None),
    }
}

fn new_tweet(id: &str, user_id: &str, text: &str, age_secs: i64) -> tweet::ActiveModel {
    let at = Utc::now() - Duration::seconds(age_secs);
    tweet::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        text: Set(text.to_string()),
        photo: Set(None),
        created_at: Set(at.into()),
        updated_at: Set(at.into()),
    }
}

fn new_like(id: &str, user_id: &str, tweet_id: &str) -> like::ActiveModel {
    like::ActiveModel {
        id: Set(id.to_string()),
        user_id: Set(user_id.to_string()),
        tweet_id: Set(tweet_id.to_string()),
        created_at: Set(Utc::now().into()),
    }
}

#[tokio::test]
async fn test_create_with_profile_rejects_duplicate_username() {
    let db = TestDatabase::sqlite().await.unwrap();
    let users = UserRepository::new(db.shared());
    let profiles = UserProfileRepository::new(db.shared());

    let (alice, profile) = users
        .create_with_profile(new_user("u1", "alice"), "p1".to_string())
        .await
        .unwrap();
    assert_eq!(profile.user_id, alice.id);
    assert!(profiles.find_by_user_id("u1").await.unwrap().is_some());

    let dup = users
        .create_with_profile(new_user("u2", "alice"), "p2".to_string())
        .await;
    assert!(matches!(dup, Err(AppError::Conflict(_))));

    // Lookup is case-sensitive.
    assert!(users.find_by_username("Alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_like_pair_is_unique() {
    let db = TestDatabase::sqlite().await.unwrap();
    let users = UserRepository::new(db.shared());
    let tweets = TweetRepository::new(db.shared());
    let likes = LikeRepository::new(db.shared());

    users
        .create_with_profile(new_user("u1", "alice"), "p1".to_string())
        .await
        .unwrap();
    tweets.create(new_tweet("t1", "u1", "hello", 0)).await.unwrap();

    likes.create(new_like("l1", "u1", "t1")).await.unwrap();
    let again = likes.create(new_like("l2", "u1", "t1")).await;

    assert!(matches!(again, Err(AppError::Conflict(_))));
    assert_eq!(likes.count_by_tweet("t1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_listing_order_and_grouped_counts() {
    let db = TestDatabase::sqlite().await.unwrap();
    let users = UserRepository::new(db.shared());
    let tweets = TweetRepository::new(db.shared());
    let likes = LikeRepository::new(db.shared());

    for (id, name, profile) in [("u1", "alice", "p1"), ("u2", "bob", "p2")] {
        users
            .create_with_profile(new_user(id, name), profile.to_string())
            .await
            .unwrap();
    }
    tweets.create(new_tweet("t1", "u1", "old", 60)).await.unwrap();
    tweets.create(new_tweet("t2", "u2", "new", 0)).await.unwrap();
    likes.create(new_like("l1", "u1", "t2")).await.unwrap();
    likes.create(new_like("l2", "u2", "t2")).await.unwrap();

    let all = tweets.find_all().await.unwrap();
    assert_eq!(
        all.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
        ["t2", "t1"]
    );

    let ids = vec!["t1".to_string(), "t2".to_string()];
    let counts = likes.count_by_tweets(&ids).await.unwrap();
    assert_eq!(counts.get("t2"), Some(&2));
    assert_eq!(counts.get("t1"), None);

    let liked = likes.liked_tweet_ids("u1", &ids).await.unwrap();
    assert!(liked.contains("t2"));
    assert!(!liked.contains("t1"));
}

#[tokio::test]
async fn test_delete_with_dependents_removes_likes_and_notifications() {
    let db = TestDatabase::sqlite().await.unwrap();
    let users = UserRepository::new(db.shared());
    let tweets = TweetRepository::new(db.shared());
    let likes = LikeRepository::new(db.shared());
    let notifications = NotificationRepository::new(db.shared());

    users
        .create_with_profile(new_user("u1", "alice"), "p1".to_string())
        .await
        .unwrap();
    users
        .create_with_profile(new_user("u2", "bob"), "p2".to_string())
        .await
        .unwrap();
    tweets.create(new_tweet("t1", "u1", "hello", 0)).await.unwrap();
    likes.create(new_like("l1", "u2", "t1")).await.unwrap();
    notifications
        .create(notification::ActiveModel {
            id: Set("n1".to_string()),
            recipient_id: Set("u1".to_string()),
            actor_id: Set("u2".to_string()),
            verb: Set(NotificationVerb::Like),
            tweet_id: Set(Some("t1".to_string())),
            is_read: Set(false),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    tweets.delete_with_dependents("t1").await.unwrap();

    assert!(tweets.find_by_id("t1").await.unwrap().is_none());
    assert_eq!(likes.count_by_tweet("t1").await.unwrap(), 0);
    assert_eq!(notifications.count_by_tweet("t1").await.unwrap(), 0);
    assert_eq!(notifications.count_unread("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_profile_get_or_create_is_idempotent() {
    let db = TestDatabase::sqlite().await.unwrap();
    let users = UserRepository::new(db.shared());
    let profiles = UserProfileRepository::new(db.shared());

    users
        .create_with_profile(new_user("u1", "alice"), "p1".to_string())
        .await
        .unwrap();

    let first = profiles.get_or_create("u1", "px".to_string()).await.unwrap();
    let second = profiles.get_or_create("u1", "py".to_string()).await.unwrap();

    assert_eq!(first.id, "p1");
    assert_eq!(second.id, "p1");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_postgres_unique_database_lifecycle() {
    let db = TestDatabase::create_unique()
        .await
        .expect("Failed to create database");

    use sea_orm::ConnectionTrait;
    let result = db
        .connection()
        .execute(sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await;
    assert!(result.is_ok(), "Query failed: {:?}", result.err());

    db.drop_database().await.expect("Failed to drop database");
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}
