//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod like;
pub mod media;
pub mod notification;
pub mod profile;
pub mod session;
pub mod tweet;

pub use account::{AccountService, RegisterInput};
pub use like::{LikeService, LikeState};
pub use media::{MediaService, StorageService};
pub use notification::{NotificationDetails, NotificationFeed, NotificationService};
pub use profile::{ProfileDetails, ProfileService, UpdateProfileInput};
pub use session::SessionService;
pub use tweet::{Author, CreateTweetInput, TweetDetails, TweetService, UpdateTweetInput};
