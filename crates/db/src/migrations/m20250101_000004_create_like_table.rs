//! Create like table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TweetLike::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TweetLike::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TweetLike::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(TweetLike::TweetId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TweetLike::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_like_user")
                            .from(TweetLike::Table, TweetLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tweet_like_tweet")
                            .from(TweetLike::Table, TweetLike::TweetId)
                            .to(Tweet::Table, Tweet::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, tweet_id) - one like per user per tweet
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_like_user_tweet")
                    .table(TweetLike::Table)
                    .col(TweetLike::UserId)
                    .col(TweetLike::TweetId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: tweet_id (like counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_tweet_like_tweet_id")
                    .table(TweetLike::Table)
                    .col(TweetLike::TweetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TweetLike::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TweetLike {
    Table,
    Id,
    UserId,
    TweetId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Tweet {
    Table,
    Id,
}
