use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AlertRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlertRules::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AlertRules::Name).string().not_null())
                    .col(ColumnDef::new(AlertRules::BindingKind).string().not_null())
                    .col(ColumnDef::new(AlertRules::OwnerId).string().null())
                    .col(ColumnDef::new(AlertRules::ResourceId).string().null())
                    .col(ColumnDef::new(AlertRules::ResourceType).string().not_null())
                    .col(ColumnDef::new(AlertRules::TriggerType).string().not_null())
                    .col(ColumnDef::new(AlertRules::Conditions).text().not_null())
                    .col(ColumnDef::new(AlertRules::Severity).string().not_null())
                    .col(ColumnDef::new(AlertRules::DeliveryMode).string().not_null())
                    .col(
                        ColumnDef::new(AlertRules::CooldownSeconds)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AlertRules::Recipients).text().not_null())
                    .col(
                        ColumnDef::new(AlertRules::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AlertRules::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AlertRules::UpdatedAt)
                            .timestamp_with_time_zone()
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
                    .name("idx_alert_rules_resource_id")
                    .table(AlertRules::Table)
                    .col(AlertRules::ResourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_alert_rules_owner_resource_type")
                    .table(AlertRules::Table)
                    .col(AlertRules::OwnerId)
                    .col(AlertRules::ResourceType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AlertRules {
    Table,
    Id,
    Name,
    BindingKind,
    OwnerId,
    ResourceId,
    ResourceType,
    TriggerType,
    Conditions,
    Severity,
    DeliveryMode,
    CooldownSeconds,
    Recipients,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
