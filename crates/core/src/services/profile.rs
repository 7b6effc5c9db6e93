//! Profile service.

use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tweeter_common::{AppError, AppResult, IdGenerator};
use tweeter_db::{
    entities::{user, user_profile},
    repositories::{LikeRepository, TweetRepository, UserProfileRepository, UserRepository},
};
use url::Url;
use validator::{Validate, ValidationError};

/// Longest accepted URL field, in characters.
pub const URL_MAX_CHARS: usize = 200;

/// A user's profile with activity counters.
#[derive(Debug, Clone)]
pub struct ProfileDetails {
    pub user: user::Model,
    pub profile: user_profile::Model,
    pub tweet_count: u64,
    /// Likes given by the user.
    pub like_count: u64,
}

/// Partial profile update. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 50, message = "Ensure this field has no more than 50 characters."))]
    pub display_name: Option<String>,

    #[validate(length(max = 160, message = "Ensure this field has no more than 160 characters."))]
    pub bio: Option<String>,

    #[validate(custom(function = "validate_blank_or_url"))]
    pub avatar_url: Option<String>,

    #[validate(custom(function = "validate_blank_or_url"))]
    pub header_url: Option<String>,

    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub location: Option<String>,

    #[validate(custom(function = "validate_blank_or_url"))]
    pub website: Option<String>,
}

fn validate_blank_or_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    if value.chars().count() > URL_MAX_CHARS {
        return Err(ValidationError::new("max_length")
            .with_message("Ensure this field has no more than 200 characters.".into()));
    }
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => Ok(()),
        _ => Err(ValidationError::new("url").with_message("Enter a valid URL.".into())),
    }
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    tweet_repo: TweetRepository,
    like_repo: LikeRepository,
    id_gen: IdGenerator,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
        tweet_repo: TweetRepository,
        like_repo: LikeRepository,
    ) -> Self {
        Self {
            user_repo,
            profile_repo,
            tweet_repo,
            like_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Look up a profile by username, creating a blank one if missing.
    pub async fn get(&self, username: &str) -> AppResult<ProfileDetails> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound("User".to_string()))?;
        let profile = self
            .profile_repo
            .get_or_create(&user.id, self.id_gen.generate())
            .await?;
        self.with_counts(user, profile).await
    }

    /// Update `username`'s profile. Only that user may do this.
    pub async fn update(
        &self,
        username: &str,
        caller: &user::Model,
        input: UpdateProfileInput,
    ) -> AppResult<ProfileDetails> {
        if caller.username != username {
            return Err(AppError::Forbidden("Not allowed".to_string()));
        }

        input.validate()?;

        let profile = self
            .profile_repo
            .get_or_create(&caller.id, self.id_gen.generate())
            .await?;

        let mut model: user_profile::ActiveModel = profile.into();
        if let Some(v) = input.display_name {
            model.display_name = Set(v);
        }
        if let Some(v) = input.bio {
            model.bio = Set(v);
        }
        if let Some(v) = input.avatar_url {
            model.avatar_url = Set(v.trim().to_string());
        }
        if let Some(v) = input.header_url {
            model.header_url = Set(v.trim().to_string());
        }
        if let Some(v) = input.location {
            model.location = Set(v);
        }
        if let Some(v) = input.website {
            model.website = Set(v.trim().to_string());
        }

        let profile = self.profile_repo.update(model).await?;
        info!(user_id = %caller.id, "Updated profile");

        self.with_counts(caller.clone(), profile).await
    }

    async fn with_counts(
        &self,
        user: user::Model,
        profile: user_profile::Model,
    ) -> AppResult<ProfileDetails> {
        let tweet_count = self.tweet_repo.count_by_user(&user.id).await?;
        let like_count = self.like_repo.count_by_user(&user.id).await?;
        Ok(ProfileDetails {
            user,
            profile,
            tweet_count,
            like_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::tweet::CreateTweetInput;
    use crate::test_support::{Fixture, register};

    #[test]
    fn test_blank_or_url() {
        assert!(validate_blank_or_url("").is_ok());
        assert!(validate_blank_or_url("https://example.com/me").is_ok());
        assert!(validate_blank_or_url("ftp://example.com").is_err());
        assert!(validate_blank_or_url("not a url").is_err());
        assert!(validate_blank_or_url(&format!("https://e.com/{}", "a".repeat(200))).is_err());
    }

    #[tokio::test]
    async fn test_get_counts_tweets_and_likes_given() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;

        let tweet = fx
            .tweets
            .create(
                &alice,
                CreateTweetInput {
                    text: "hi".to_string(),
                    photo: None,
                },
            )
            .await
            .unwrap();
        fx.likes.toggle(&bob.id, &tweet.tweet.id).await.unwrap();

        let alice_profile = fx.profiles.get("alice").await.unwrap();
        assert_eq!(alice_profile.tweet_count, 1);
        assert_eq!(alice_profile.like_count, 0);

        let bob_profile = fx.profiles.get("bob").await.unwrap();
        assert_eq!(bob_profile.tweet_count, 0);
        assert_eq!(bob_profile.like_count, 1);
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let fx = Fixture::new().await;
        assert!(matches!(
            fx.profiles.get("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_own_profile() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;

        let updated = fx
            .profiles
            .update(
                "alice",
                &alice,
                UpdateProfileInput {
                    display_name: Some("Alice".to_string()),
                    bio: Some("hello".to_string()),
                    website: Some("https://alice.example".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.profile.display_name, "Alice");
        assert_eq!(updated.profile.bio, "hello");
        assert_eq!(updated.profile.website, "https://alice.example");
        assert_eq!(updated.profile.location, "");
    }

    #[tokio::test]
    async fn test_update_other_profile_forbidden() {
        let fx = Fixture::new().await;
        register(&fx, "alice").await;
        let bob = register(&fx, "bob").await;

        let result = fx
            .profiles
            .update(
                "alice",
                &bob,
                UpdateProfileInput {
                    bio: Some("pwned".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(fx.profiles.get("alice").await.unwrap().profile.bio, "");
    }

    #[tokio::test]
    async fn test_update_validates_lengths() {
        let fx = Fixture::new().await;
        let alice = register(&fx, "alice").await;

        let result = fx
            .profiles
            .update(
                "alice",
                &alice,
                UpdateProfileInput {
                    bio: Some("b".repeat(161)),
                    ..Default::default()
                },
            )
            .await;

        match result {
            Err(AppError::Validation(fields)) => assert!(fields.contains_key("bio")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
