//! API response types shared across endpoints.

#![allow(missing_docs)]

use serde::Serialize;
use tweeter_core::{Author, TweetDetails};

/// Compact user representation embedded in tweets and notifications.
#[derive(Debug, Serialize)]
pub struct UserMini {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl From<&Author> for UserMini {
    fn from(author: &Author) -> Self {
        Self {
            id: author.user.id.clone(),
            username: author.user.username.clone(),
            display_name: author.display_name().to_string(),
            avatar_url: author.avatar_url().to_string(),
        }
    }
}

/// Tweet response.
#[derive(Debug, Serialize)]
pub struct TweetResponse {
    pub id: String,
    pub user: UserMini,
    pub text: String,
    pub photo_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub like_count: u64,
    pub is_liked: bool,
}

impl From<TweetDetails> for TweetResponse {
    fn from(details: TweetDetails) -> Self {
        let user = UserMini::from(&details.author);
        let t = details.tweet;
        Self {
            id: t.id,
            user,
            text: t.text,
            photo_url: t.photo,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
            like_count: details.like_count,
            is_liked: details.is_liked,
        }
    }
}

/// Serialize a list of tweets.
#[must_use]
pub fn tweet_list(tweets: Vec<TweetDetails>) -> Vec<TweetResponse> {
    tweets.into_iter().map(Into::into).collect()
}

/// `{"success": true}` body.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}
