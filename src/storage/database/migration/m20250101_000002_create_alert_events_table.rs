use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Audit rows outlive their rule, so there is no foreign key to alert_rules
        manager
            .create_table(
                Table::create()
                    .table(AlertEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AlertEvents::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AlertEvents::RuleId).string().not_null())
                    .col(ColumnDef::new(AlertEvents::ResourceId).string().not_null())
                    .col(
                        ColumnDef::new(AlertEvents::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AlertEvents::Payload).text().not_null())
                    .col(ColumnDef::new(AlertEvents::DeliveryStatus).string().not_null())
                    .col(ColumnDef::new(AlertEvents::ChannelType).string().not_null())
                    .col(ColumnDef::new(AlertEvents::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(AlertEvents::CreatedAt)
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
                    .name("idx_alert_events_rule_resource_timestamp")
                    .table(AlertEvents::Table)
                    .col(AlertEvents::RuleId)
                    .col(AlertEvents::ResourceId)
                    .col(AlertEvents::Timestamp)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlertEvents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AlertEvents {
    Table,
    Id,
    RuleId,
    ResourceId,
    Timestamp,
    Payload,
    DeliveryStatus,
    ChannelType,
    ErrorMessage,
    CreatedAt,
}
