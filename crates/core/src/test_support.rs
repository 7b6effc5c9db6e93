//! Shared fixtures for service tests.

#![allow(clippy::unwrap_used)]

use chrono::Utc;
use sea_orm::Set;
use tweeter_db::{
    entities::user,
    repositories::{
        LikeRepository, NotificationRepository, TweetRepository, UserProfileRepository,
        UserRepository,
    },
    test_utils::TestDatabase,
};

use crate::services::{LikeService, NotificationService, ProfileService, TweetService};

/// Services wired to a fresh in-memory database.
pub struct Fixture {
    pub db: TestDatabase,
    pub users: UserRepository,
    pub tweets: TweetService,
    pub likes: LikeService,
    pub notifications: NotificationService,
    pub profiles: ProfileService,
}

impl Fixture {
    pub async fn new() -> Self {
        let db = TestDatabase::sqlite().await.unwrap();
        let conn = db.shared();

        let users = UserRepository::new(conn.clone());
        let profiles = UserProfileRepository::new(conn.clone());
        let tweets = TweetRepository::new(conn.clone());
        let likes = LikeRepository::new(conn.clone());
        let notifications = NotificationRepository::new(conn);

        Self {
            tweets: TweetService::new(
                tweets.clone(),
                likes.clone(),
                users.clone(),
                profiles.clone(),
            ),
            likes: LikeService::new(likes.clone(), tweets.clone(), notifications.clone()),
            notifications: NotificationService::new(
                notifications,
                tweets.clone(),
                users.clone(),
                profiles.clone(),
            ),
            profiles: ProfileService::new(users.clone(), profiles, tweets, likes),
            users,
            db,
        }
    }
}

/// Insert a user with a profile, skipping password hashing.
pub async fn register(fx: &Fixture, username: &str) -> user::Model {
    let model = user::ActiveModel {
        id: Set(tweeter_common::IdGenerator::new().generate()),
        username: Set(username.to_string()),
        email: Set(String::new()),
        password: Set("!unusable".to_string()),
        date_joined: Set(Utc::now().into()),
        last_login: Set(None),
    };
    fx.users
        .create_with_profile(model, tweeter_common::IdGenerator::new().generate())
        .await
        .unwrap()
        .0
}
