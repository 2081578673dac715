use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.create_table(
            Table::create()
                .table(News::Table)
                .if_not_exists()
                .col(ColumnDef::new(News::Id).string_len(255).not_null().primary_key())
                .col(ColumnDef::new(News::Title).text().not_null())
                .col(ColumnDef::new(News::Link).text().not_null())
                .col(ColumnDef::new(News::Source).string_len(255).not_null())
                .col(ColumnDef::new(News::PublishedAt).timestamp_with_time_zone().not_null())
                .col(ColumnDef::new(News::CreatedAt).timestamp_with_time_zone().not_null())
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_news_published_at")
                .table(News::Table)
                .col(News::PublishedAt)
                .to_owned()
        ).await?;

        manager.create_index(
            Index::create()
                .if_not_exists()
                .name("idx_news_source")
                .table(News::Table)
                .col(News::Source)
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(News::Table).to_owned()).await
    }
}

#[derive(Iden)]
enum News {
    Table,
    Id,
    Title,
    Link,
    Source,
    PublishedAt,
    CreatedAt,
}
