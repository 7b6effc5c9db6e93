//! API endpoints.

mod auth;
mod csrf;
mod notifications;
mod profile;
mod tweets;

use axum::Router;

use crate::middleware::AppState;

pub use csrf::CSRF_COOKIE_NAME;

/// Create the API router. Paths keep their trailing slash.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(csrf::router())
        .merge(auth::router())
        .merge(tweets::router())
        .merge(notifications::router())
        .merge(profile::router())
}
