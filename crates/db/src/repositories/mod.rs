//! Repositories wrapping entity queries.

mod like;
mod notification;
mod session;
mod tweet;
mod user;
mod user_profile;

pub use like::LikeRepository;
pub use notification::NotificationRepository;
pub use session::SessionRepository;
pub use tweet::TweetRepository;
pub use user::UserRepository;
pub use user_profile::UserProfileRepository;
