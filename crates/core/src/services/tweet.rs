//! Tweet service.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use tweeter_common::{AppError, AppResult, IdGenerator};
use tweeter_db::{
    entities::{tweet, user, user_profile},
    repositories::{LikeRepository, TweetRepository, UserProfileRepository, UserRepository},
};
use validator::{Validate, ValidationError};

/// A user together with their profile, as embedded in other payloads.
#[derive(Debug, Clone)]
pub struct Author {
    pub user: user::Model,
    pub profile: Option<user_profile::Model>,
}

impl Author {
    /// Display name, falling back to the username when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .map(|p| p.display_name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.user.username)
    }

    /// Avatar URL, or `""` when unset.
    #[must_use]
    pub fn avatar_url(&self) -> &str {
        self.profile.as_ref().map_or("", |p| p.avatar_url.as_str())
    }
}

/// A tweet with its author and like state relative to a viewer.
#[derive(Debug, Clone)]
pub struct TweetDetails {
    pub tweet: tweet::Model,
    pub author: Author,
    pub like_count: u64,
    pub is_liked: bool,
}

/// Input for creating a tweet.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTweetInput {
    #[serde(default)]
    #[validate(custom(function = "validate_tweet_text"))]
    pub text: String,

    /// Public URL of an already stored photo.
    #[serde(default)]
    pub photo: Option<String>,
}

/// Input for updating a tweet. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTweetInput {
    #[validate(custom(function = "validate_tweet_text"))]
    pub text: Option<String>,

    /// `Some(None)` clears the photo.
    #[serde(default, deserialize_with = "double_option")]
    pub photo: Option<Option<String>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn validate_tweet_text(text: &str) -> Result<(), ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::new("blank").with_message("This field may not be blank.".into()));
    }
    if text.chars().count() > tweet::TEXT_MAX_CHARS as usize {
        return Err(ValidationError::new("max_length")
            .with_message("Ensure this field has no more than 280 characters.".into()));
    }
    Ok(())
}

/// Tweet service for business logic.
#[derive(Clone)]
pub struct TweetService {
    tweet_repo: TweetRepository,
    like_repo: LikeRepository,
    user_repo: UserRepository,
    profile_repo: UserProfileRepository,
    id_gen: IdGenerator,
}

impl TweetService {
    /// Create a new tweet service.
    #[must_use]
    pub const fn new(
        tweet_repo: TweetRepository,
        like_repo: LikeRepository,
        user_repo: UserRepository,
        profile_repo: UserProfileRepository,
    ) -> Self {
        Self {
            tweet_repo,
            like_repo,
            user_repo,
            profile_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// All tweets, newest first.
    pub async fn list_all(&self, viewer_id: Option<&str>) -> AppResult<Vec<TweetDetails>> {
        let tweets = self.tweet_repo.find_all().await?;
        self.hydrate(tweets, viewer_id).await
    }

    /// A user's tweets, newest first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<TweetDetails>> {
        let tweets = self.tweet_repo.find_by_user(user_id).await?;
        self.hydrate(tweets, viewer_id).await
    }

    /// Get a single tweet.
    pub async fn get(&self, id: &str, viewer_id: Option<&str>) -> AppResult<TweetDetails> {
        let tweet = self.tweet_repo.get_by_id(id).await?;
        self.hydrate_one(tweet, viewer_id).await
    }

    /// Post a tweet as `author`.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreateTweetInput,
    ) -> AppResult<TweetDetails> {
        input.validate()?;

        let now = Utc::now();
        let model = tweet::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            text: Set(input.text.trim().to_string()),
            photo: Set(input.photo.filter(|p| !p.is_empty())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let tweet = self.tweet_repo.create(model).await?;
        info!(tweet_id = %tweet.id, user_id = %author.id, "Created tweet");

        self.hydrate_one(tweet, Some(&author.id)).await
    }

    /// Update a tweet. Only the author may do this.
    pub async fn update(
        &self,
        id: &str,
        caller_id: &str,
        input: UpdateTweetInput,
    ) -> AppResult<TweetDetails> {
        let tweet = self.authorize(id, Some(caller_id)).await?;

        input.validate()?;

        let mut model: tweet::ActiveModel = tweet.into();
        if let Some(text) = input.text {
            model.text = Set(text.trim().to_string());
        }
        if let Some(photo) = input.photo {
            model.photo = Set(photo.filter(|p| !p.is_empty()));
        }
        model.updated_at = Set(Utc::now().into());

        let tweet = self.tweet_repo.update(model).await?;
        self.hydrate_one(tweet, Some(caller_id)).await
    }

    /// Delete a tweet with its likes and notifications. Only the author may do this.
    pub async fn delete(&self, id: &str, caller_id: &str) -> AppResult<()> {
        let tweet = self.authorize(id, Some(caller_id)).await?;

        self.tweet_repo.delete_with_dependents(&tweet.id).await?;
        info!(tweet_id = %tweet.id, "Deleted tweet");
        Ok(())
    }

    /// Load a tweet the caller may modify.
    ///
    /// A missing tweet is reported before a missing or foreign caller.
    pub async fn authorize(&self, id: &str, caller_id: Option<&str>) -> AppResult<tweet::Model> {
        let tweet = self.tweet_repo.get_by_id(id).await?;
        match caller_id {
            None => Err(AppError::NotAuthenticated),
            Some(caller) if caller != tweet.user_id => {
                Err(AppError::Forbidden("Not allowed".to_string()))
            }
            Some(_) => Ok(tweet),
        }
    }

    async fn hydrate_one(
        &self,
        tweet: tweet::Model,
        viewer_id: Option<&str>,
    ) -> AppResult<TweetDetails> {
        self.hydrate(vec![tweet], viewer_id)
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal("tweet hydration returned nothing".to_string()))
    }

    /// Attach authors, like counts and the viewer's like state, preserving order.
    async fn hydrate(
        &self,
        tweets: Vec<tweet::Model>,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<TweetDetails>> {
        if tweets.is_empty() {
            return Ok(vec![]);
        }

        let tweet_ids: Vec<String> = tweets.iter().map(|t| t.id.clone()).collect();
        let mut author_ids: Vec<String> = tweets.iter().map(|t| t.user_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors = load_authors(&self.user_repo, &self.profile_repo, &author_ids).await?;
        let counts = self.like_repo.count_by_tweets(&tweet_ids).await?;
        let liked = match viewer_id {
            Some(viewer) => self.like_repo.liked_tweet_ids(viewer, &tweet_ids).await?,
            None => Default::default(),
        };

        tweets
            .into_iter()
            .map(|tweet| {
                let author = authors
                    .get(&tweet.user_id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound("User".to_string()))?;
                Ok(TweetDetails {
                    like_count: counts.get(&tweet.id).copied().unwrap_or(0),
                    is_liked: liked.contains(&tweet.id),
                    author,
                    tweet,
                })
            })
            .collect()
    }
}

/// Load users and their profiles keyed by user ID.
pub(crate) async fn load_authors(
    user_repo: &UserRepository,
    profile_repo: &UserProfileRepository,
    user_ids: &[String],
) -> AppResult<HashMap<String, Author>> {
    let users = user_repo.find_by_ids(user_ids).await?;
    let mut profiles: HashMap<String, user_profile::Model> = profile_repo
        .find_by_user_ids(user_ids)
        .await?
        .into_iter()
        .map(|p| (p.user_id.clone(), p))
        .collect();

    Ok(users
        .into_iter()
        .map(|user| {
            let profile = profiles.remove(&user.id);
            (user.id.clone(), Author { user, profile })
        })
        .collect())
}
