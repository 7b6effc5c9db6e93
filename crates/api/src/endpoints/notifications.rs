//! Notifications endpoints.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::debug;
use tweeter_common::AppResult;
use tweeter_core::NotificationDetails;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{SuccessResponse, UserMini},
};

/// Notification response.
#[derive(Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub actor: UserMini,
    pub verb: &'static str,
    pub tweet: Option<String>,
    pub tweet_text: Option<String>,
    pub is_read: bool,
    pub created_at: String,
}

impl From<NotificationDetails> for NotificationResponse {
    fn from(d: NotificationDetails) -> Self {
        let actor = UserMini::from(&d.actor);
        let n = d.notification;
        Self {
            id: n.id,
            actor,
            verb: n.verb.as_str(),
            tweet: n.tweet_id,
            tweet_text: d.tweet_text,
            is_read: n.is_read,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

/// Notifications list response.
#[derive(Serialize)]
pub struct NotificationsListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub unread_count: u64,
}

/// Get the caller's recent notifications.
async fn get_notifications(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<NotificationsListResponse>> {
    let feed = state.notification_service.feed(&user.id).await?;

    Ok(Json(NotificationsListResponse {
        notifications: feed.notifications.into_iter().map(Into::into).collect(),
        unread_count: feed.unread_count,
    }))
}

/// Mark all notifications as read.
async fn mark_all_as_read(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<SuccessResponse>> {
    let count = state.notification_service.mark_all_read(&user.id).await?;
    debug!(user_id = %user.id, count, "Marked notifications as read");
    Ok(Json(SuccessResponse::OK))
}

/// Create the notifications router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/notifications/",
        get(get_notifications).post(mark_all_as_read),
    )
}
