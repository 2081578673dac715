//! Rule checkers.
//!
//! Each [`RuleKind`] is served by one [`RuleChecker`]. The evaluator looks the
//! checker up in a [`CheckerRegistry`] instead of branching on the kind itself,
//! so a new rule kind only needs a params variant, a checker and a
//! `register` call.

pub mod crypto_drop;
pub mod news_multi_source;

pub use crypto_drop::CryptoDropChecker;
pub use news_multi_source::NewsMultiSourceChecker;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };

use crate::enums::RuleKind;
use crate::error::Result;
use crate::providers::{ MarketDataGateway, NewsStore };
use crate::rules::AlertRule;

/// What a checker reports when its rule's condition holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    pub context: Option<String>,
    pub message: String,
}

#[async_trait]
pub trait RuleChecker: Send + Sync {
    fn kind(&self) -> RuleKind;

    /// `Ok(None)` covers both "condition not met" and "no usable data this tick".
    async fn check(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<Option<Trigger>>;
}

#[derive(Clone, Default)]
pub struct CheckerRegistry {
    checkers: HashMap<RuleKind, Arc<dyn RuleChecker>>,
}

impl CheckerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the crypto drop and news multi-source checkers.
    pub fn standard(
        market_data: Arc<dyn MarketDataGateway>,
        news_store: Arc<dyn NewsStore>,
        fetch_timeout: Duration
    ) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CryptoDropChecker::new(market_data, fetch_timeout)));
        registry.register(Arc::new(NewsMultiSourceChecker::new(news_store, fetch_timeout)));
        registry
    }

    /// Replaces any checker already registered for the same kind.
    pub fn register(&mut self, checker: Arc<dyn RuleChecker>) {
        self.checkers.insert(checker.kind(), checker);
    }

    pub fn get(&self, kind: RuleKind) -> Option<Arc<dyn RuleChecker>> {
        self.checkers.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<RuleKind> {
        self.checkers.keys().copied().collect()
    }
}

/// Run an external fetch under `limit`. A timeout is reported as `None`,
/// the same as a source with nothing to return.
pub(crate) async fn fetch_with_timeout<T, F>(
    limit: Duration,
    what: &str,
    fetch: F
) -> Result<Option<T>>
    where F: Future<Output = Result<Option<T>>>
{
    match tokio::time::timeout(limit, fetch).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "{} timed out", what);
            Ok(None)
        }
    }
}
