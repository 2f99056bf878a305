use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Post: feeds filter by author/group and sort by pub_date
        manager
            .create_index(
                Index::create()
                    .name("idx_post_author")
                    .table(Post::Table)
                    .col(Post::AuthorId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_post_group")
                    .table(Post::Table)
                    .col(Post::GroupId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_post_pub_date")
                    .table(Post::Table)
                    .col(Post::PubDate)
                    .to_owned(),
            )
            .await?;

        // Comment: index on post_id
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_post")
                    .table(Comment::Table)
                    .col(Comment::PostId)
                    .to_owned(),
            )
            .await?;

        // Follow: composite unique (author_id, user_id)
        manager
            .create_index(
                Index::create()
                    .name("unique_author_user")
                    .table(Follow::Table)
                    .col(Follow::AuthorId)
                    .col(Follow::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_post_author").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_group").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_post_pub_date").table(Post::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_comment_post").table(Comment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("unique_author_user").table(Follow::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Post { Table, AuthorId, GroupId, PubDate }

#[derive(DeriveIden)]
enum Comment { Table, PostId }

#[derive(DeriveIden)]
enum Follow { Table, AuthorId, UserId }
