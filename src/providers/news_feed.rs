use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Items published at or after `since`, newest first.
    async fn published_since(&self, since: DateTime<Utc>) -> Result<Vec<NewsItem>>;
}
