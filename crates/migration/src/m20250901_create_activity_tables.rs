use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::Title).string().not_null())
                    .col(ColumnDef::new(Events::Slug).string().not_null().unique_key())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::Location).string().not_null())
                    .col(ColumnDef::new(Events::ImagePath).string())
                    .col(ColumnDef::new(Events::StartsAt).timestamp().not_null())
                    .col(ColumnDef::new(Events::EndsAt).timestamp().not_null())
                    .col(ColumnDef::new(Events::MaxAttendees).integer())
                    .col(
                        ColumnDef::new(Events::RequiresApproval)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Events::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Events::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Events::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // user_id has no foreign key: registrations outlive deleted accounts
        manager
            .create_table(
                Table::create()
                    .table(EventRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventRegistrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventRegistrations::EventId).uuid().not_null())
                    .col(ColumnDef::new(EventRegistrations::UserId).uuid().not_null())
                    .col(ColumnDef::new(EventRegistrations::Name).string().not_null())
                    .col(ColumnDef::new(EventRegistrations::Email).string().not_null())
                    .col(ColumnDef::new(EventRegistrations::Phone).string_len(30))
                    .col(
                        ColumnDef::new(EventRegistrations::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRegistrations::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-event_registrations-event_id")
                            .from(EventRegistrations::Table, EventRegistrations::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Competitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Competitions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Competitions::Title).string().not_null())
                    .col(
                        ColumnDef::new(Competitions::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Competitions::Description).text().not_null())
                    .col(ColumnDef::new(Competitions::Location).string())
                    .col(ColumnDef::new(Competitions::ImagePath).string())
                    .col(ColumnDef::new(Competitions::HeldOn).date().not_null())
                    .col(ColumnDef::new(Competitions::Deadline).timestamp().not_null())
                    .col(
                        ColumnDef::new(Competitions::MaxParticipants)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Competitions::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Competitions::MaxTeamSize).integer())
                    .col(
                        ColumnDef::new(Competitions::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Competitions::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Competitions::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompetitionRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompetitionRegistrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::CompetitionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::UserId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::Email)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompetitionRegistrations::TeamName).string())
                    .col(
                        ColumnDef::new(CompetitionRegistrations::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionRegistrations::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-competition_registrations-competition_id")
                            .from(
                                CompetitionRegistrations::Table,
                                CompetitionRegistrations::CompetitionId,
                            )
                            .to(Competitions::Table, Competitions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CompetitionTeamMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CompetitionTeamMembers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CompetitionTeamMembers::RegistrationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CompetitionTeamMembers::Name)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CompetitionTeamMembers::Email).string())
                    .col(
                        ColumnDef::new(CompetitionTeamMembers::Position)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-competition_team_members-registration_id")
                            .from(
                                CompetitionTeamMembers::Table,
                                CompetitionTeamMembers::RegistrationId,
                            )
                            .to(
                                CompetitionRegistrations::Table,
                                CompetitionRegistrations::Id,
                            )
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reservations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reservations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reservations::Name).string().not_null())
                    .col(ColumnDef::new(Reservations::Email).string().not_null())
                    .col(ColumnDef::new(Reservations::Phone).string_len(30))
                    .col(ColumnDef::new(Reservations::Resource).string_len(32).not_null())
                    .col(ColumnDef::new(Reservations::ReservedOn).date().not_null())
                    .col(ColumnDef::new(Reservations::StartsAt).time().not_null())
                    .col(ColumnDef::new(Reservations::EndsAt).time().not_null())
                    .col(ColumnDef::new(Reservations::Purpose).text().not_null())
                    .col(ColumnDef::new(Reservations::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Reservations::AdminNote).text())
                    .col(ColumnDef::new(Reservations::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Reservations::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reservations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompetitionTeamMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CompetitionRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Competitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EventRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Events {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Location,
    ImagePath,
    StartsAt,
    EndsAt,
    MaxAttendees,
    RequiresApproval,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum EventRegistrations {
    Table,
    Id,
    EventId,
    UserId,
    Name,
    Email,
    Phone,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Competitions {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Location,
    ImagePath,
    HeldOn,
    Deadline,
    MaxParticipants,
    Kind,
    MaxTeamSize,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum CompetitionRegistrations {
    Table,
    Id,
    CompetitionId,
    UserId,
    Name,
    Email,
    TeamName,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum CompetitionTeamMembers {
    Table,
    Id,
    RegistrationId,
    Name,
    Email,
    Position,
}

#[derive(Iden)]
pub(crate) enum Reservations {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Resource,
    ReservedOn,
    StartsAt,
    EndsAt,
    Purpose,
    Status,
    AdminNote,
    CreatedAt,
    UpdatedAt,
}
