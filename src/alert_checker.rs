use std::sync::Arc;

use chrono::{ DateTime, Utc };

use crate::checkers::{ CheckerRegistry, Trigger };
use crate::error::{ AppError, Result };
use crate::providers::AlertStore;
use crate::rules::AlertRule;

/// Runs one evaluation pass over the active rules and records an event for
/// every rule whose condition holds.
///
/// Rules are checked one at a time. A failing rule is logged and skipped;
/// only store failures abort the pass.
pub struct AlertChecker {
    store: Arc<dyn AlertStore>,
    registry: CheckerRegistry,
    cooldown: Option<chrono::Duration>,
}

impl AlertChecker {
    pub fn new(
        store: Arc<dyn AlertStore>,
        registry: CheckerRegistry,
        cooldown: Option<chrono::Duration>
    ) -> Self {
        Self {
            store,
            registry,
            cooldown,
        }
    }

    /// Load active rules and evaluate them. Returns the number of events written.
    pub async fn run_pass(&self, now: DateTime<Utc>) -> Result<usize> {
        let rules = self.store.list_active_rules().await?;
        self.evaluate(&rules, now).await
    }

    pub async fn evaluate(&self, rules: &[AlertRule], now: DateTime<Utc>) -> Result<usize> {
        let mut emitted = 0;

        for rule in rules.iter().filter(|r| r.active) {
            let trigger = match self.check_rule(rule, now).await {
                Ok(Some(trigger)) => trigger,
                Ok(None) => {
                    continue;
                }
                Err(AppError::DataUnavailable(reason)) => {
                    tracing::debug!(rule_id = %rule.id, reason = %reason, "Data unavailable, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(
                        rule_id = %rule.id,
                        kind = %rule.params.kind(),
                        error = %e,
                        "Rule evaluation failed, skipping"
                    );
                    continue;
                }
            };

            if self.is_cooling_down(rule, now).await? {
                tracing::debug!(rule_id = %rule.id, "Trigger suppressed (cooldown)");
                continue;
            }

            let Trigger { context, message } = trigger;
            let event = self.store.insert_event(rule.id, context, message).await?;

            tracing::info!(
                rule_id = %rule.id,
                event_id = %event.id,
                message = %event.message,
                "Alert triggered"
            );

            emitted += 1;
        }

        Ok(emitted)
    }

    async fn check_rule(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<Option<Trigger>> {
        let kind = rule.params.kind();
        let checker = self.registry
            .get(kind)
            .ok_or_else(|| AppError::RuleEvaluation(format!("No checker registered for {}", kind)))?;

        checker.check(rule, now).await
    }

    async fn is_cooling_down(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<bool> {
        let Some(cooldown) = self.cooldown else {
            return Ok(false);
        };

        let last = self.store.last_event_at(rule.id).await?;
        Ok(last.is_some_and(|last| now - last < cooldown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::checkers::{ CryptoDropChecker, NewsMultiSourceChecker };
    use crate::testing::{
        crypto_rule,
        news_item,
        news_rule,
        series,
        InMemoryAlertStore,
        StaticMarketData,
        StaticNews,
    };

    fn registry(market_data: StaticMarketData, news: StaticNews) -> CheckerRegistry {
        CheckerRegistry::standard(Arc::new(market_data), Arc::new(news), Duration::from_secs(1))
    }

    fn nvidia_news(now: DateTime<Utc>, sources: &[&str]) -> StaticNews {
        StaticNews::new(
            sources
                .iter()
                .enumerate()
                .map(|(i, source)| news_item(&i.to_string(), "NVIDIA lança novo chip", source, now))
                .collect()
        )
    }

    #[tokio::test]
    async fn test_eth_drop_end_to_end() {
        let now = Utc::now();
        let rule = crypto_rule("eth", 10.0, 6);
        let rule_id = rule.id;
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![rule]));

        let mut chart = series(now, 6, &[2000.0, 1950.0, 1900.0, 1820.0, 1750.0]);
        // Outside the 6h window; must not become the start price.
        chart.prices.insert(0, crate::providers::PricePoint {
            timestamp_ms: (now - chrono::Duration::hours(10)).timestamp_millis(),
            price: 1500.0,
        });
        let market_data = StaticMarketData::default().with_chart("ethereum", chart);

        let checker = AlertChecker::new(
            store.clone(),
            registry(market_data, StaticNews::default()),
            None
        );

        let emitted = checker.run_pass(now).await.unwrap();
        assert_eq!(emitted, 1);

        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].rule_id, rule_id);
        assert_eq!(events[0].context.as_deref(), Some("ETH 6h"));
        for expected in ["ETH", "12.50%", "6h", "10%"] {
            assert!(events[0].message.contains(expected), "missing {expected} in {}", events[0].message);
        }
    }

    #[tokio::test]
    async fn test_failing_rule_does_not_block_others() {
        let now = Utc::now();
        let failing = crypto_rule("btc", 5.0, 1);
        let healthy = news_rule("nvidia", 3);
        let healthy_id = healthy.id;
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![failing, healthy]));

        let checker = AlertChecker::new(
            store.clone(),
            registry(
                StaticMarketData::default().with_failure("bitcoin"),
                nvidia_news(now, &["g1", "folha", "valor"])
            ),
            None
        );

        assert_eq!(checker.run_pass(now).await.unwrap(), 1);

        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].rule_id, healthy_id);
    }

    #[tokio::test]
    async fn test_oversized_timeframe_does_not_block_others() {
        let now = Utc::now();
        let oversized = crypto_rule("btc", 5.0, 3_000_000_000);
        let healthy = news_rule("nvidia", 3);
        let healthy_id = healthy.id;
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![oversized, healthy]));

        let checker = AlertChecker::new(
            store.clone(),
            registry(
                StaticMarketData::default().with_chart("bitcoin", series(now, 1, &[100.0, 50.0])),
                nvidia_news(now, &["g1", "folha", "valor"])
            ),
            None
        );

        assert_eq!(checker.run_pass(now).await.unwrap(), 1);

        let events = store.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].rule_id, healthy_id);
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_skipped() {
        let now = Utc::now();
        let store = Arc::new(
            InMemoryAlertStore::with_rules(vec![news_rule("nvidia", 1), crypto_rule("btc", 5.0, 1)])
        );

        let mut registry = CheckerRegistry::new();
        registry.register(
            Arc::new(
                CryptoDropChecker::new(
                    Arc::new(
                        StaticMarketData::default().with_chart("bitcoin", series(now, 1, &[100.0, 90.0]))
                    ),
                    Duration::from_secs(1)
                )
            )
        );

        let checker = AlertChecker::new(store.clone(), registry, None);

        assert_eq!(checker.run_pass(now).await.unwrap(), 1);
        assert!(store.events()[0].message.contains("BTC"));
    }

    #[tokio::test]
    async fn test_inactive_rules_are_not_evaluated() {
        let now = Utc::now();
        let mut rule = news_rule("nvidia", 1);
        rule.active = false;
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![rule.clone()]));

        let checker = AlertChecker::new(
            store.clone(),
            registry(StaticMarketData::default(), nvidia_news(now, &["g1"])),
            None
        );

        assert_eq!(checker.run_pass(now).await.unwrap(), 0);
        assert_eq!(checker.evaluate(&[rule], now).await.unwrap(), 0);
        assert!(store.events().is_empty());
    }

    #[tokio::test]
    async fn test_refires_every_pass_without_cooldown() {
        let now = Utc::now();
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![news_rule("nvidia", 2)]));

        let checker = AlertChecker::new(
            store.clone(),
            registry(StaticMarketData::default(), nvidia_news(now, &["g1", "folha"])),
            None
        );

        checker.run_pass(now).await.unwrap();
        checker.run_pass(now).await.unwrap();

        assert_eq!(store.events().len(), 2);
    }

    #[tokio::test]
    async fn test_cooldown_suppresses_repeat() {
        let now = Utc::now();
        let rule = news_rule("nvidia", 2);
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![rule.clone()]));
        store.push_event(rule.id, now - chrono::Duration::minutes(10));

        let checker = AlertChecker::new(
            store.clone(),
            registry(StaticMarketData::default(), nvidia_news(now, &["g1", "folha"])),
            Some(chrono::Duration::hours(1))
        );

        assert_eq!(checker.run_pass(now).await.unwrap(), 0);
        assert_eq!(store.events().len(), 1);
    }

    #[tokio::test]
    async fn test_cooldown_expired_fires_again() {
        let now = Utc::now();
        let rule = news_rule("nvidia", 2);
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![rule.clone()]));
        store.push_event(rule.id, now - chrono::Duration::hours(2));

        let checker = AlertChecker::new(
            store.clone(),
            registry(StaticMarketData::default(), nvidia_news(now, &["g1", "folha"])),
            Some(chrono::Duration::hours(1))
        );

        assert_eq!(checker.run_pass(now).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_store_write_failure_aborts_pass() {
        let now = Utc::now();
        let store = Arc::new(
            InMemoryAlertStore::with_rules(vec![news_rule("nvidia", 1)]).failing_event_writes()
        );

        let checker = AlertChecker::new(
            store,
            CheckerRegistry::standard(
                Arc::new(StaticMarketData::default()),
                Arc::new(nvidia_news(now, &["g1"])),
                Duration::from_secs(1)
            ),
            None
        );

        assert!(matches!(checker.run_pass(now).await, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_news_checker_alone() {
        let now = Utc::now();
        let store = Arc::new(InMemoryAlertStore::with_rules(vec![news_rule("nvidia", 3)]));

        let mut registry = CheckerRegistry::new();
        registry.register(
            Arc::new(
                NewsMultiSourceChecker::new(
                    Arc::new(nvidia_news(now, &["g1", "folha"])),
                    Duration::from_secs(1)
                )
            )
        );

        let checker = AlertChecker::new(store.clone(), registry, None);

        assert_eq!(checker.run_pass(now).await.unwrap(), 0);
    }
}
