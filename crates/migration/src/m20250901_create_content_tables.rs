use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Articles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Articles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Articles::Title).string().not_null())
                    .col(
                        ColumnDef::new(Articles::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Articles::Excerpt).string_len(500))
                    .col(ColumnDef::new(Articles::Body).text().not_null())
                    .col(ColumnDef::new(Articles::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Articles::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Articles::CoverPath).string())
                    .col(ColumnDef::new(Articles::PublishedAt).timestamp())
                    .col(ColumnDef::new(Articles::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Articles::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ArticleImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ArticleImages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ArticleImages::ArticleId).uuid().not_null())
                    .col(ColumnDef::new(ArticleImages::Path).string().not_null())
                    .col(ColumnDef::new(ArticleImages::Position).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-article_images-article_id")
                            .from(ArticleImages::Table, ArticleImages::ArticleId)
                            .to(Articles::Table, Articles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Media::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Media::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Media::Title).string().not_null())
                    .col(ColumnDef::new(Media::Description).text())
                    .col(ColumnDef::new(Media::Kind).string_len(32).not_null())
                    .col(ColumnDef::new(Media::FilePath).string().not_null())
                    .col(
                        ColumnDef::new(Media::IsPublic)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Media::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Media::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Clubs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Clubs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Clubs::Name).string().not_null())
                    .col(ColumnDef::new(Clubs::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Clubs::Description).text().not_null())
                    .col(ColumnDef::new(Clubs::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Clubs::LogoPath).string())
                    .col(ColumnDef::new(Clubs::ContactEmail).string().not_null())
                    .col(ColumnDef::new(Clubs::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Clubs::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Clubs::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Clubs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Media::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ArticleImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Articles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Articles {
    Table,
    Id,
    Title,
    Slug,
    Excerpt,
    Body,
    Category,
    Status,
    CoverPath,
    PublishedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum ArticleImages {
    Table,
    Id,
    ArticleId,
    Path,
    Position,
}

#[derive(Iden)]
pub(crate) enum Media {
    Table,
    Id,
    Title,
    Description,
    Kind,
    FilePath,
    IsPublic,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Clubs {
    Table,
    Id,
    Name,
    Slug,
    Description,
    Category,
    LogoPath,
    ContactEmail,
    Status,
    CreatedAt,
    UpdatedAt,
}
