//! In-memory stand-ins for the store and gateway traits, used by unit tests.

use std::collections::{ HashMap, HashSet };
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use uuid::Uuid;

use crate::enums::NewsWindow;
use crate::error::{ AppError, Result };
use crate::providers::{ AlertStore, MarketDataGateway, NewsItem, NewsStore, PriceChart, PricePoint };
use crate::rules::{
    AlertEvent,
    AlertRule,
    CryptoDropPercentParams,
    NewAlertRule,
    NewsMultiSourceParams,
    RuleParams,
};

pub fn crypto_rule(symbol: &str, percent: f64, timeframe_hours: u32) -> AlertRule {
    AlertRule::create(
        NewAlertRule {
            rule_text: format!("{} cair mais de {}% em {}h", symbol, percent, timeframe_hours),
            params: RuleParams::CryptoDropPercent(CryptoDropPercentParams {
                symbol: symbol.to_string(),
                percent,
                timeframe_hours,
            }),
            owner_id: None,
        },
        Utc::now()
    )
}

pub fn news_rule(keyword: &str, min_sources: u32) -> AlertRule {
    AlertRule::create(
        NewAlertRule {
            rule_text: format!("{} aparecer em mais de {} fontes no mesmo dia", keyword, min_sources),
            params: RuleParams::NewsMultiSource(NewsMultiSourceParams {
                keyword: keyword.to_string(),
                min_sources,
                window: NewsWindow::SameDay,
            }),
            owner_id: None,
        },
        Utc::now()
    )
}

pub fn news_item(id: &str, title: &str, source: &str, published_at: DateTime<Utc>) -> NewsItem {
    NewsItem {
        id: id.to_string(),
        title: title.to_string(),
        source: source.to_string(),
        published_at,
    }
}

/// Prices spread evenly from `now - hours` to `now`, first point exactly on the cutoff.
pub fn series(now: DateTime<Utc>, hours: i64, prices: &[f64]) -> PriceChart {
    let end = now.timestamp_millis();
    let start = (now - chrono::Duration::hours(hours)).timestamp_millis();

    let points = match prices.len() {
        0 => Vec::new(),
        1 => vec![PricePoint { timestamp_ms: end, price: prices[0] }],
        n => {
            let step = (end - start) / ((n - 1) as i64);
            prices
                .iter()
                .enumerate()
                .map(|(i, price)| PricePoint {
                    timestamp_ms: start + step * (i as i64),
                    price: *price,
                })
                .collect()
        }
    };

    PriceChart { prices: points }
}

#[derive(Default)]
pub struct StaticMarketData {
    charts: HashMap<String, PriceChart>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, u32)>>,
}

impl StaticMarketData {
    pub fn with_chart(mut self, asset_id: &str, chart: PriceChart) -> Self {
        self.charts.insert(asset_id.to_string(), chart);
        self
    }

    pub fn with_failure(mut self, asset_id: &str) -> Self {
        self.failing.insert(asset_id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataGateway for StaticMarketData {
    async fn get_chart(&self, asset_id: &str, days: u32) -> Result<Option<PriceChart>> {
        self.requests.lock().unwrap().push((asset_id.to_string(), days));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(asset_id) {
            return Err(AppError::DataUnavailable(format!("{} upstream failure", asset_id)));
        }
        Ok(self.charts.get(asset_id).cloned())
    }
}

#[derive(Default)]
pub struct StaticNews {
    items: Vec<NewsItem>,
}

impl StaticNews {
    pub fn new(items: Vec<NewsItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl NewsStore for StaticNews {
    async fn published_since(&self, since: DateTime<Utc>) -> Result<Vec<NewsItem>> {
        let mut items: Vec<NewsItem> = self.items
            .iter()
            .filter(|item| item.published_at >= since)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        Ok(items)
    }
}

#[derive(Default)]
pub struct InMemoryAlertStore {
    rules: Mutex<Vec<AlertRule>>,
    events: Mutex<Vec<AlertEvent>>,
    fail_event_writes: bool,
}

impl InMemoryAlertStore {
    pub fn with_rules(rules: Vec<AlertRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            ..Self::default()
        }
    }

    pub fn failing_event_writes(mut self) -> Self {
        self.fail_event_writes = true;
        self
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn push_event(&self, rule_id: Uuid, created_at: DateTime<Utc>) {
        self.events.lock().unwrap().push(AlertEvent {
            id: Uuid::new_v4(),
            rule_id,
            context: None,
            message: "earlier event".to_string(),
            created_at,
        });
    }
}

#[async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn list_active_rules(&self) -> Result<Vec<AlertRule>> {
        Ok(
            self.rules
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.active)
                .cloned()
                .collect()
        )
    }

    async fn list_rules(&self) -> Result<Vec<AlertRule>> {
        let mut rules = self.rules.lock().unwrap().clone();
        rules.reverse();
        Ok(rules)
    }

    async fn get_rule(&self, id: Uuid) -> Result<Option<AlertRule>> {
        Ok(
            self.rules
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned()
        )
    }

    async fn insert_rule(&self, rule: NewAlertRule) -> Result<AlertRule> {
        let rule = AlertRule::create(rule, Utc::now());
        self.rules.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<AlertRule> {
        let mut rules = self.rules.lock().unwrap();
        let rule = rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AppError::RuleNotFound)?;
        rule.active = active;
        rule.updated_at = Utc::now();
        Ok(rule.clone())
    }

    async fn delete_rule(&self, id: Uuid) -> Result<()> {
        let mut rules = self.rules.lock().unwrap();
        let before = rules.len();
        rules.retain(|r| r.id != id);
        if rules.len() == before {
            return Err(AppError::RuleNotFound);
        }
        self.events.lock().unwrap().retain(|e| e.rule_id != id);
        Ok(())
    }

    async fn insert_event(
        &self,
        rule_id: Uuid,
        context: Option<String>,
        message: String
    ) -> Result<AlertEvent> {
        if self.fail_event_writes {
            return Err(AppError::Database(sea_orm::DbErr::Custom("event insert failed".to_string())));
        }

        let event = AlertEvent {
            id: Uuid::new_v4(),
            rule_id,
            context,
            message,
            created_at: Utc::now(),
        };
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn last_event_at(&self, rule_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        Ok(
            self.events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.rule_id == rule_id)
                .map(|e| e.created_at)
                .max()
        )
    }

    async fn list_recent_events(&self, limit: u64) -> Result<Vec<AlertEvent>> {
        let mut events = self.events.lock().unwrap().clone();
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events.truncate(limit as usize);
        Ok(events)
    }
}
