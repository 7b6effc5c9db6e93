//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::{FromRef, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use tracing::{debug, error};
use tweeter_common::{AppResult, config::SessionConfig, derive_signing_key};
use tweeter_core::{
    AccountService, LikeService, MediaService, NotificationService, ProfileService,
    SessionService, TweetService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub tweet_service: TweetService,
    pub like_service: LikeService,
    pub notification_service: NotificationService,
    pub profile_service: ProfileService,
    pub media_service: MediaService,
    pub cookies: CookieSettings,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookies.key.clone()
    }
}

/// How the session cookie is named, signed and scoped.
#[derive(Clone)]
pub struct CookieSettings {
    pub key: Key,
    pub name: String,
    pub max_age_secs: i64,
    pub secure: bool,
}

impl CookieSettings {
    /// Derive the signing key and cookie attributes from the session config.
    pub fn from_config(config: &SessionConfig) -> AppResult<Self> {
        let key = derive_signing_key(&config.secret)?;
        Ok(Self {
            key: Key::from(&key[..]),
            name: config.cookie_name.clone(),
            max_age_secs: config.max_age_secs,
            secure: config.secure,
        })
    }

    /// Cookie carrying a freshly opened session key.
    #[must_use]
    pub fn session_cookie(&self, session_key: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), session_key))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(time::Duration::seconds(self.max_age_secs))
            .build()
    }

    /// Cookie that clears the session cookie on the client.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone()).path("/").build()
    }
}

/// Session middleware.
///
/// Resolves the signed session cookie and stores the session's user in the
/// request extensions. Unknown, tampered or expired cookies leave the request
/// anonymous; a failed lookup is a server error.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(&state.cookies.name) {
        match state.session_service.resolve(cookie.value()).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => debug!("Ignoring unknown session"),
            Err(e) => {
                error!(error = %e, "Failed to resolve session");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}
