use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{ DateTime, Local, NaiveTime, TimeZone, Utc };

use super::{ fetch_with_timeout, RuleChecker, Trigger };
use crate::enums::{ NewsWindow, RuleKind };
use crate::error::{ AppError, Result };
use crate::providers::{ NewsItem, NewsStore };
use crate::rules::{ AlertRule, NewsMultiSourceParams, RuleParams };

/// Start of the window a news rule counts over.
///
/// `SameDay` starts at local midnight of `now`'s calendar day. If that
/// midnight does not exist locally (DST gap) the naive midnight read as UTC is used.
pub fn window_start(window: NewsWindow, now: DateTime<Utc>) -> DateTime<Utc> {
    match window {
        NewsWindow::SameDay => {
            let midnight = now.with_timezone(&Local).date_naive().and_time(NaiveTime::MIN);
            Local.from_local_datetime(&midnight)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| midnight.and_utc())
        }
        NewsWindow::Last24Hours => now - chrono::Duration::hours(24),
    }
}

/// Distinct sources whose item titles contain `keyword`, ignoring case.
/// Plain substring match, no word boundaries.
pub fn matching_sources<'a>(items: &'a [NewsItem], keyword: &str) -> BTreeSet<&'a str> {
    let keyword = keyword.to_lowercase();

    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&keyword))
        .map(|item| item.source.as_str())
        .collect()
}

/// Fires when a keyword shows up in headlines from at least `min_sources` outlets.
pub struct NewsMultiSourceChecker {
    news_store: Arc<dyn NewsStore>,
    fetch_timeout: Duration,
}

impl NewsMultiSourceChecker {
    pub fn new(news_store: Arc<dyn NewsStore>, fetch_timeout: Duration) -> Self {
        Self {
            news_store,
            fetch_timeout,
        }
    }

    fn format_trigger(params: &NewsMultiSourceParams, source_count: usize) -> Trigger {
        let period = match params.window {
            NewsWindow::SameDay => "today",
            NewsWindow::Last24Hours => "in the last 24h",
        };

        Trigger {
            context: None,
            message: format!(
                "ALERT: \"{keyword}\" appeared in {count} sources {period} (threshold {min})",
                keyword = params.keyword,
                count = source_count,
                period = period,
                min = params.min_sources,
            ),
        }
    }
}

#[async_trait]
impl RuleChecker for NewsMultiSourceChecker {
    fn kind(&self) -> RuleKind {
        RuleKind::NewsMultiSource
    }

    async fn check(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<Option<Trigger>> {
        let RuleParams::NewsMultiSource(params) = &rule.params else {
            return Err(
                AppError::RuleEvaluation(
                    format!("{} checker received {} params", self.kind(), rule.params.kind())
                )
            );
        };

        let since = window_start(params.window, now);

        let items = fetch_with_timeout(self.fetch_timeout, "News fetch", async {
            self.news_store.published_since(since).await.map(Some)
        }).await?;

        let Some(items) = items else {
            return Ok(None);
        };

        let sources = matching_sources(&items, &params.keyword);

        tracing::debug!(
            rule_id = %rule.id,
            keyword = %params.keyword,
            items = items.len(),
            sources = sources.len(),
            "News sources counted"
        );

        if sources.len() >= params.min_sources as usize {
            Ok(Some(Self::format_trigger(params, sources.len())))
        } else {
            Ok(None)
        }
    }
}
