use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Subject)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Role).string_len(16).not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Formations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Formations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Formations::Title).string().not_null())
                    .col(
                        ColumnDef::new(Formations::Slug)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Formations::Description).text().not_null())
                    .col(ColumnDef::new(Formations::Level).string())
                    .col(ColumnDef::new(Formations::DurationHours).integer())
                    .col(ColumnDef::new(Formations::ImagePath).string())
                    .col(ColumnDef::new(Formations::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Formations::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Formations::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Modules::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Modules::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Modules::FormationId).uuid().not_null())
                    .col(ColumnDef::new(Modules::Title).string().not_null())
                    .col(ColumnDef::new(Modules::Description).text().not_null())
                    .col(ColumnDef::new(Modules::Content).text())
                    .col(
                        ColumnDef::new(Modules::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Modules::FilePath).string())
                    .col(ColumnDef::new(Modules::FileMime).string())
                    .col(ColumnDef::new(Modules::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Modules::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-modules-formation_id")
                            .from(Modules::Table, Modules::FormationId)
                            .to(Formations::Table, Formations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ModuleCompletions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ModuleCompletions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ModuleCompletions::StudentId).uuid().not_null())
                    .col(ColumnDef::new(ModuleCompletions::ModuleId).uuid().not_null())
                    .col(
                        ColumnDef::new(ModuleCompletions::CompletedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-module_completions-student_id")
                            .from(ModuleCompletions::Table, ModuleCompletions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-module_completions-module_id")
                            .from(ModuleCompletions::Table, ModuleCompletions::ModuleId)
                            .to(Modules::Table, Modules::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FormationRegistrations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FormationRegistrations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FormationRegistrations::StudentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FormationRegistrations::FormationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FormationRegistrations::EnrolledAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-formation_registrations-student_id")
                            .from(
                                FormationRegistrations::Table,
                                FormationRegistrations::StudentId,
                            )
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-formation_registrations-formation_id")
                            .from(
                                FormationRegistrations::Table,
                                FormationRegistrations::FormationId,
                            )
                            .to(Formations::Table, Formations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Certificates::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Certificates::FormationId).uuid().not_null())
                    .col(
                        ColumnDef::new(Certificates::VerificationCode)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Certificates::FilePath).string())
                    .col(
                        ColumnDef::new(Certificates::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Certificates::IssuedAt).timestamp())
                    .col(ColumnDef::new(Certificates::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Certificates::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-certificates-student_id")
                            .from(Certificates::Table, Certificates::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-certificates-formation_id")
                            .from(Certificates::Table, Certificates::FormationId)
                            .to(Formations::Table, Formations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Children first
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FormationRegistrations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ModuleCompletions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Modules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Formations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
pub(crate) enum Users {
    Table,
    Id,
    Subject,
    Name,
    Email,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Formations {
    Table,
    Id,
    Title,
    Slug,
    Description,
    Level,
    DurationHours,
    ImagePath,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum Modules {
    Table,
    Id,
    FormationId,
    Title,
    Description,
    Content,
    Position,
    FilePath,
    FileMime,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
pub(crate) enum ModuleCompletions {
    Table,
    Id,
    StudentId,
    ModuleId,
    CompletedAt,
}

#[derive(Iden)]
pub(crate) enum FormationRegistrations {
    Table,
    Id,
    StudentId,
    FormationId,
    EnrolledAt,
}

#[derive(Iden)]
pub(crate) enum Certificates {
    Table,
    Id,
    StudentId,
    FormationId,
    VerificationCode,
    FilePath,
    Status,
    IssuedAt,
    CreatedAt,
    UpdatedAt,
}
