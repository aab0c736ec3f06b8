//! Initial schema: users and bugs tables

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // 1. Create users table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Name, 100).not_null())
                    .col(string_len(User::Email, 255).not_null().unique_key())
                    .col(string_len(User::PasswordHash, 255).not_null())
                    .col(string_len(User::Role, 32).not_null().default("user"))
                    .col(
                        timestamp_with_time_zone(User::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(User::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_email")
                    .table(User::Table)
                    .col(User::Email)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // 2. Create bugs table
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Bug::Table)
                    .if_not_exists()
                    .col(uuid(Bug::Id).primary_key())
                    .col(string_len(Bug::Title, 100).not_null())
                    .col(text(Bug::Description).not_null())
                    .col(string_len(Bug::Status, 32).not_null().default("open"))
                    .col(string_len(Bug::Priority, 32).not_null())
                    .col(string_len(Bug::Severity, 32).not_null())
                    .col(string_len(Bug::CreatedBy, 50).not_null())
                    .col(
                        timestamp_with_time_zone(Bug::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        timestamp_with_time_zone(Bug::UpdatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Filterable columns and the default sort column
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bugs_status")
                    .table(Bug::Table)
                    .col(Bug::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bugs_priority")
                    .table(Bug::Table)
                    .col(Bug::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bugs_severity")
                    .table(Bug::Table)
                    .col(Bug::Severity)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bugs_created_by")
                    .table(Bug::Table)
                    .col(Bug::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_bugs_created_at")
                    .table(Bug::Table)
                    .col(Bug::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bug::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Name,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Bug {
    Table,
    Id,
    Title,
    Description,
    Status,
    Priority,
    Severity,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
