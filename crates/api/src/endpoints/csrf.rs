//! CSRF bootstrap endpoint.

use axum::{Json, Router, routing::get};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tweeter_common::IdGenerator;

use crate::middleware::AppState;

/// Name of the readable CSRF cookie.
pub const CSRF_COOKIE_NAME: &str = "csrftoken";

#[derive(Serialize)]
struct CsrfResponse {
    detail: &'static str,
}

/// Hand out a CSRF cookie. Tokens are not checked by any endpoint.
async fn csrf(jar: CookieJar) -> (CookieJar, Json<CsrfResponse>) {
    let jar = if jar.get(CSRF_COOKIE_NAME).is_some() {
        jar
    } else {
        let cookie = Cookie::build((CSRF_COOKIE_NAME, IdGenerator::new().generate_token()))
            .path("/")
            .same_site(SameSite::Lax)
            .build();
        jar.add(cookie)
    };

    (
        jar,
        Json(CsrfResponse {
            detail: "CSRF cookie set",
        }),
    )
}

/// Create the CSRF router.
pub fn router() -> Router<AppState> {
    Router::new().route("/csrf/", get(csrf))
}
