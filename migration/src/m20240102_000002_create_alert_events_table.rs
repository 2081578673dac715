use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertEvents::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertEvents::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertEvents::RuleId).uuid().not_null())
                .col(ColumnDef::new(AlertEvents::Context).text())
                .col(ColumnDef::new(AlertEvents::Message).text().not_null())
                .col(ColumnDef::new(AlertEvents::CreatedAt).timestamp_with_time_zone().not_null())
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_alert_events_rule_id")
                        .from(AlertEvents::Table, AlertEvents::RuleId)
                        .to(AlertRules::Table, AlertRules::Id)
                        .on_delete(ForeignKeyAction::Cascade)
                )
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_events_rule_id")
                .table(AlertEvents::Table)
                .col(AlertEvents::RuleId)
                .to_owned()
        ).await?;

        // Recent-events feed and cooldown lookups both read newest first
        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_events_created_at")
                .table(AlertEvents::Table)
                .col(AlertEvents::CreatedAt)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertEvents::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertEvents {
    Table,
    Id,
    RuleId,
    Context,
    Message,
    CreatedAt,
}

#[derive(Iden)]
enum AlertRules {
    Table,
    Id,
}
