//! Profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use tweeter_common::AppResult;
use tweeter_core::{ProfileDetails, UpdateProfileInput};

use crate::{
    extractors::{ApiJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{TweetResponse, tweet_list},
};

/// Profile response.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub bio: String,
    pub avatar_url: String,
    pub header_url: String,
    pub location: String,
    pub website: String,
    pub date_joined: String,
    pub tweet_count: u64,
    pub like_count: u64,
}

impl From<ProfileDetails> for ProfileResponse {
    fn from(d: ProfileDetails) -> Self {
        let p = d.profile;
        Self {
            id: p.id,
            username: d.user.username,
            email: d.user.email,
            display_name: p.display_name,
            bio: p.bio,
            avatar_url: p.avatar_url,
            header_url: p.header_url,
            location: p.location,
            website: p.website,
            date_joined: d.user.date_joined.to_rfc3339(),
            tweet_count: d.tweet_count,
            like_count: d.like_count,
        }
    }
}

/// Show a user's profile.
async fn get_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.get(&username).await?;
    Ok(Json(profile.into()))
}

/// Update the caller's own profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
    ApiJson(input): ApiJson<UpdateProfileInput>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state.profile_service.update(&username, &user, input).await?;
    Ok(Json(profile.into()))
}

/// List a user's tweets.
async fn user_tweets(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<TweetResponse>>> {
    let author = state.account_service.get_by_username(&username).await?;
    let tweets = state
        .tweet_service
        .list_by_user(&author.id, viewer.id())
        .await?;
    Ok(Json(tweet_list(tweets)))
}

/// Create the profile router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile/{username}/", get(get_profile).put(update_profile))
        .route("/profile/{username}/tweets/", get(user_tweets))
}
