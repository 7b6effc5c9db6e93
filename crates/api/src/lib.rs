//! HTTP API layer for tweeter.
//!
//! This crate provides the JSON API served under `/api`:
//!
//! - **Endpoints**: auth, tweets, likes, notifications and profiles
//! - **Extractors**: session user lookup for handlers
//! - **Middleware**: signed session cookie resolution
//!
//! Built on Axum 0.8 with signed cookies from `axum-extra`.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, CookieSettings, session_middleware};

/// Mount the API under `/api` behind the session middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}
