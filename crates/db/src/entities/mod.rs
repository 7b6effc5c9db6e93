//! Database entities.

#![allow(missing_docs)]

pub mod like;
pub mod notification;
pub mod session;
pub mod tweet;
pub mod user;
pub mod user_profile;

pub use like::Entity as Like;
pub use notification::Entity as Notification;
pub use session::Entity as Session;
pub use tweet::Entity as Tweet;
pub use user::Entity as User;
pub use user_profile::Entity as UserProfile;
