use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use sea_orm::{ ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder };

use crate::db::entity::{ news, News };
use crate::error::Result;
use crate::providers::{ NewsItem, NewsStore };

impl From<news::Model> for NewsItem {
    fn from(model: news::Model) -> Self {
        NewsItem {
            id: model.id,
            title: model.title,
            source: model.source,
            published_at: model.published_at,
        }
    }
}

pub struct NewsRepository {
    db: DatabaseConnection,
}

impl NewsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NewsStore for NewsRepository {
    async fn published_since(&self, since: DateTime<Utc>) -> Result<Vec<NewsItem>> {
        let rows = News::find()
            .filter(news::Column::PublishedAt.gte(since))
            .order_by_desc(news::Column::PublishedAt)
            .all(&self.db).await?;

        Ok(rows.into_iter().map(NewsItem::from).collect())
    }
}
