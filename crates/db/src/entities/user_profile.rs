//! User profile entity (public profile fields shown next to tweets).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Longest accepted display name, in characters.
pub const DISPLAY_NAME_MAX_CHARS: u64 = 50;
/// Longest accepted bio, in characters.
pub const BIO_MAX_CHARS: u64 = 160;
/// Longest accepted location, in characters.
pub const LOCATION_MAX_CHARS: u64 = 100;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning user (1:1)
    #[sea_orm(unique)]
    pub user_id: String,

    /// Display name; blank falls back to the username
    pub display_name: String,

    #[sea_orm(column_type = "Text")]
    pub bio: String,

    pub avatar_url: String,

    pub header_url: String,

    pub location: String,

    pub website: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
