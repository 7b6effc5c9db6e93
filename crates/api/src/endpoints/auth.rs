//! Authentication endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use axum_extra::extract::cookie::SignedCookieJar;
use serde::{Deserialize, Serialize};
use tracing::info;
use tweeter_common::AppResult;
use tweeter_core::{Author, RegisterInput};
use tweeter_db::entities::user;

use crate::{
    extractors::{ApiJson, MaybeAuthUser},
    middleware::AppState,
    response::{SuccessResponse, UserMini},
};

/// Auth status response.
#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserMini>,
}

/// Login and registration response.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub user: UserMini,
}

/// Login request. Missing fields fail as bad credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Report whether the caller has a session.
async fn status(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<AuthStatusResponse>> {
    let Some(user) = user else {
        return Ok(Json(AuthStatusResponse {
            is_authenticated: false,
            user: None,
        }));
    };

    let user = mini_user(&state, user).await?;
    Ok(Json(AuthStatusResponse {
        is_authenticated: true,
        user: Some(user),
    }))
}

/// Log in with a username and password.
async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<(SignedCookieJar, Json<AuthResponse>)> {
    let user = state
        .account_service
        .authenticate(&req.username, &req.password)
        .await?;

    let jar = open_session(&state, jar, &user.id).await?;
    info!(user_id = %user.id, "User logged in");

    let user = mini_user(&state, user).await?;
    Ok((
        jar,
        Json(AuthResponse {
            success: true,
            user,
        }),
    ))
}

/// End the current session.
async fn logout(
    State(state): State<AppState>,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Json<SuccessResponse>)> {
    if let Some(cookie) = jar.get(&state.cookies.name) {
        state.session_service.destroy(cookie.value()).await?;
    }

    let jar = jar.remove(state.cookies.removal_cookie());
    Ok((jar, Json(SuccessResponse::OK)))
}

/// Create an account and log it in.
async fn register(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    ApiJson(input): ApiJson<RegisterInput>,
) -> AppResult<(StatusCode, SignedCookieJar, Json<AuthResponse>)> {
    let (user, profile) = state.account_service.register(input).await?;

    let jar = open_session(&state, jar, &user.id).await?;

    let author = Author {
        user,
        profile: Some(profile),
    };
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            success: true,
            user: UserMini::from(&author),
        }),
    ))
}

/// Replace any session the client carries with a new one for `user_id`.
async fn open_session(
    state: &AppState,
    jar: SignedCookieJar,
    user_id: &str,
) -> AppResult<SignedCookieJar> {
    if let Some(previous) = jar.get(&state.cookies.name) {
        state.session_service.destroy(previous.value()).await?;
    }

    let session = state.session_service.create(user_id).await?;
    Ok(jar.add(state.cookies.session_cookie(session.session_key)))
}

async fn mini_user(state: &AppState, user: user::Model) -> AppResult<UserMini> {
    let profile = state.account_service.ensure_profile(&user.id).await?;
    let author = Author {
        user,
        profile: Some(profile),
    };
    Ok(UserMini::from(&author))
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/status/", get(status))
        .route("/auth/login/", post(login))
        .route("/auth/logout/", post(logout))
        .route("/auth/register/", post(register))
}
