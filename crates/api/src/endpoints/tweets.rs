//! Tweet and like endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    routing::{get, post},
};
use serde::Serialize;
use tweeter_common::{AppError, AppResult};
use tweeter_core::{CreateTweetInput, LikeState, UpdateTweetInput};

use crate::{
    extractors::{ApiJson, AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{TweetResponse, tweet_list},
};

/// Like toggle response.
#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

impl From<LikeState> for LikeResponse {
    fn from(s: LikeState) -> Self {
        Self {
            liked: s.liked,
            like_count: s.like_count,
        }
    }
}

/// Fields read from a multipart tweet form.
#[derive(Default)]
struct TweetForm {
    text: Option<String>,
    /// `Some("")` when the form cleared the photo.
    photo: Option<String>,
    /// Bytes of an uploaded photo file, stored only once the request is allowed.
    upload: Option<Bytes>,
}

impl TweetForm {
    /// Store the uploaded file, if any, and point `photo` at it.
    ///
    /// Returns the storage key so the caller can discard it on failure.
    async fn store_upload(&mut self, state: &AppState, user_id: &str) -> AppResult<Option<String>> {
        let Some(data) = self.upload.take() else {
            return Ok(None);
        };
        let uploaded = state.media_service.store_photo(user_id, &data).await?;
        self.photo = Some(uploaded.url);
        Ok(Some(uploaded.key))
    }
}

/// List all tweets.
async fn list_tweets(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TweetResponse>>> {
    let tweets = state.tweet_service.list_all(viewer.id()).await?;
    Ok(Json(tweet_list(tweets)))
}

/// Post a tweet from a JSON body or a multipart form with a photo file.
async fn create_tweet(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    req: Request,
) -> AppResult<(StatusCode, Json<TweetResponse>)> {
    let (input, stored) = if is_multipart(&req) {
        let mut form = read_form(&state, req).await?;
        let stored = form.store_upload(&state, &user.id).await?;
        let input = CreateTweetInput {
            text: form.text.unwrap_or_default(),
            photo: form.photo,
        };
        (input, stored)
    } else {
        let ApiJson(input) = ApiJson::<CreateTweetInput>::from_request(req, &state).await?;
        (input, None)
    };

    let result = state.tweet_service.create(&user, input).await;
    let tweet = discard_on_error(&state, stored, result).await?;
    Ok((StatusCode::CREATED, Json(tweet.into())))
}

/// Get a tweet.
async fn get_tweet(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TweetResponse>> {
    let tweet = state.tweet_service.get(&id, viewer.id()).await?;
    Ok(Json(tweet.into()))
}

/// Update a tweet.
///
/// A missing tweet is 404 even for anonymous callers.
async fn update_tweet(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request,
) -> AppResult<Json<TweetResponse>> {
    let tweet = state.tweet_service.authorize(&id, viewer.id()).await?;
    let caller_id = tweet.user_id;

    let (input, stored) = if is_multipart(&req) {
        let mut form = read_form(&state, req).await?;
        let stored = form.store_upload(&state, &caller_id).await?;
        let input = UpdateTweetInput {
            text: form.text,
            photo: form.photo.map(|p| Some(p).filter(|p| !p.is_empty())),
        };
        (input, stored)
    } else {
        let ApiJson(input) = ApiJson::<UpdateTweetInput>::from_request(req, &state).await?;
        (input, None)
    };

    let result = state.tweet_service.update(&id, &caller_id, input).await;
    let tweet = discard_on_error(&state, stored, result).await?;
    Ok(Json(tweet.into()))
}

/// Delete a tweet.
///
/// A missing tweet is 404 even for anonymous callers.
async fn delete_tweet(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let tweet = state.tweet_service.authorize(&id, viewer.id()).await?;
    state.tweet_service.delete(&tweet.id, &tweet.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Like or unlike a tweet.
async fn toggle_like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LikeResponse>> {
    let like = state.like_service.toggle(&user.id, &id).await?;
    Ok(Json(like.into()))
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

/// Remove a photo stored for a write that did not go through.
async fn discard_on_error<T>(
    state: &AppState,
    stored: Option<String>,
    result: AppResult<T>,
) -> AppResult<T> {
    if let (Err(_), Some(key)) = (&result, stored) {
        state.media_service.discard(&key).await;
    }
    result
}

/// Read `text` and `photo` from a multipart form.
///
/// A `photo` part with a filename is kept as raw bytes; a plain `photo`
/// field is taken as a URL.
async fn read_form(state: &AppState, req: Request) -> AppResult<TweetForm> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut form = TweetForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "text" => form.text = Some(field.text().await?),
            "photo" if field.file_name().is_some() => {
                let data = field.bytes().await?;
                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    form.upload = Some(data);
                }
            }
            "photo" => form.photo = Some(field.text().await?.trim().to_string()),
            _ => {}
        }
    }

    Ok(form)
}

/// Create the tweets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tweets/", get(list_tweets).post(create_tweet))
        .route(
            "/tweets/{id}/",
            get(get_tweet).put(update_tweet).delete(delete_tweet),
        )
        .route("/tweets/{id}/like/", post(toggle_like))
}
