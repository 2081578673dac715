use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(AlertRules::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertRules::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(AlertRules::OwnerId).string_len(255))
                .col(ColumnDef::new(AlertRules::RuleText).text().not_null())
                .col(ColumnDef::new(AlertRules::RuleType).string_len(32).not_null()) // "crypto", "news"
                .col(ColumnDef::new(AlertRules::Params).json().not_null())
                .col(ColumnDef::new(AlertRules::Active).boolean().not_null().default(true))
                .col(ColumnDef::new(AlertRules::CreatedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(AlertRules::UpdatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_rules_owner_id")
                .table(AlertRules::Table)
                .col(AlertRules::OwnerId)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_rules_rule_type")
                .table(AlertRules::Table)
                .col(AlertRules::RuleType)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_alert_rules_active")
                .table(AlertRules::Table)
                .col(AlertRules::Active)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AlertRules::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum AlertRules {
    Table,
    Id,
    OwnerId,
    RuleText,
    RuleType,
    Params,
    Active,
    CreatedAt,
    UpdatedAt,
}
