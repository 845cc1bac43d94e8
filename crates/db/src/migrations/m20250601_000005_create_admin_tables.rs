//! Create admin_users and admin_sessions tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUser::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AdminUser::Email)
                            .string_len(512)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AdminUser::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(AdminUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminSession::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminSession::UserId).string().not_null())
                    .col(
                        ColumnDef::new(AdminSession::TokenHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(AdminSession::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AdminSession::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_admin_session_user")
                            .from(AdminSession::Table, AdminSession::UserId)
                            .to(AdminUser::Table, AdminUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_session_expires_at")
                    .table(AdminSession::Table)
                    .col(AdminSession::ExpiresAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminSession::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AdminUser::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum AdminUser {
    #[iden = "admin_users"]
    Table,
    Id,
    Email,
    PasswordHash,
    CreatedAt,
}

#[derive(Iden)]
enum AdminSession {
    #[iden = "admin_sessions"]
    Table,
    Id,
    UserId,
    TokenHash,
    CreatedAt,
    ExpiresAt,
}
