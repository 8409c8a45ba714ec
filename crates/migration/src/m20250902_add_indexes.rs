use crate::m20250901_create_activity_tables::{
    CompetitionRegistrations, EventRegistrations, Events, Reservations,
};
use crate::m20250901_create_content_tables::{ArticleImages, Articles};
use crate::m20250901_create_formation_tables::{
    Certificates, FormationRegistrations, ModuleCompletions, Modules,
};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per pair; concurrent duplicates fail here
        manager
            .create_index(
                Index::create()
                    .name("idx_module_completions_pair")
                    .table(ModuleCompletions::Table)
                    .col(ModuleCompletions::StudentId)
                    .col(ModuleCompletions::ModuleId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_formation_registrations_pair")
                    .table(FormationRegistrations::Table)
                    .col(FormationRegistrations::StudentId)
                    .col(FormationRegistrations::FormationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_registrations_pair")
                    .table(EventRegistrations::Table)
                    .col(EventRegistrations::EventId)
                    .col(EventRegistrations::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_competition_registrations_pair")
                    .table(CompetitionRegistrations::Table)
                    .col(CompetitionRegistrations::CompetitionId)
                    .col(CompetitionRegistrations::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_certificates_pair")
                    .table(Certificates::Table)
                    .col(Certificates::StudentId)
                    .col(Certificates::FormationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_modules_formation_position")
                    .table(Modules::Table)
                    .col(Modules::FormationId)
                    .col(Modules::Position)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_events_starts_at")
                    .table(Events::Table)
                    .col(Events::StartsAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reservations_email_status")
                    .table(Reservations::Table)
                    .col(Reservations::Email)
                    .col(Reservations::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_articles_status_published_at")
                    .table(Articles::Table)
                    .col(Articles::Status)
                    .col(Articles::PublishedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_article_images_article_id")
                    .table(ArticleImages::Table)
                    .col(ArticleImages::ArticleId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_article_images_article_id",
            "idx_articles_status_published_at",
            "idx_reservations_email_status",
            "idx_events_starts_at",
            "idx_modules_formation_position",
            "idx_certificates_pair",
            "idx_competition_registrations_pair",
            "idx_event_registrations_pair",
            "idx_formation_registrations_pair",
            "idx_module_completions_pair",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }

        Ok(())
    }
}
