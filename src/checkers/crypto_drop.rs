use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{ DateTime, Utc };

use super::{ fetch_with_timeout, RuleChecker, Trigger };
use crate::enums::RuleKind;
use crate::error::{ AppError, Result };
use crate::providers::{ MarketDataGateway, PricePoint };
use crate::rules::{ AlertRule, CryptoDropPercentParams, RuleParams, MAX_TIMEFRAME_HOURS };

/// Map a ticker symbol to its market-data asset id. Unknown symbols are used as-is.
pub fn asset_id_for_symbol(symbol: &str) -> String {
    let id = match symbol.to_lowercase().as_str() {
        "btc" => "bitcoin",
        "eth" => "ethereum",
        "sol" => "solana",
        "ada" => "cardano",
        "dot" => "polkadot",
        "link" => "chainlink",
        "bnb" => "binancecoin",
        other => {
            return other.to_string();
        }
    };
    id.to_string()
}

/// Whole days of history needed to cover `timeframe_hours`, at least one.
pub fn history_days(timeframe_hours: u32) -> u32 {
    timeframe_hours.div_ceil(24).max(1)
}

/// Start of the `timeframe_hours` window ending at `now`. Timeframes above
/// [`MAX_TIMEFRAME_HOURS`] or a start before the representable range are rule errors.
pub fn window_cutoff(now: DateTime<Utc>, timeframe_hours: u32) -> Result<DateTime<Utc>> {
    if timeframe_hours > MAX_TIMEFRAME_HOURS {
        return Err(
            AppError::RuleEvaluation(
                format!(
                    "Timeframe of {}h exceeds the {}h limit",
                    timeframe_hours,
                    MAX_TIMEFRAME_HOURS
                )
            )
        );
    }

    now.checked_sub_signed(chrono::Duration::hours(i64::from(timeframe_hours))).ok_or_else(||
        AppError::RuleEvaluation(format!("Timeframe of {}h is out of range", timeframe_hours))
    )
}

/// Endpoint-to-endpoint change in percent over the points at or after
/// `cutoff_ms`. `None` when fewer than two points remain or the first price is zero.
pub fn percent_change_since(prices: &[PricePoint], cutoff_ms: i64) -> Option<f64> {
    let mut window: Vec<&PricePoint> = prices
        .iter()
        .filter(|p| p.timestamp_ms >= cutoff_ms)
        .collect();

    if window.len() < 2 {
        return None;
    }

    window.sort_by_key(|p| p.timestamp_ms);

    let start = window.first()?.price;
    let end = window.last()?.price;

    if start == 0.0 {
        return None;
    }

    Some(((end - start) / start) * 100.0)
}

/// Fires when a symbol has fallen by at least `percent` over the last `timeframe_hours`.
pub struct CryptoDropChecker {
    market_data: Arc<dyn MarketDataGateway>,
    fetch_timeout: Duration,
}

impl CryptoDropChecker {
    pub fn new(market_data: Arc<dyn MarketDataGateway>, fetch_timeout: Duration) -> Self {
        Self {
            market_data,
            fetch_timeout,
        }
    }

    fn format_trigger(params: &CryptoDropPercentParams, change: f64) -> Trigger {
        let symbol = params.symbol.to_uppercase();
        let hours = params.timeframe_hours;

        Trigger {
            context: Some(format!("{} {}h", symbol, hours)),
            message: format!(
                "ALERT: {symbol} dropped {change:.2}% in the last {hours}h (threshold {threshold}%)",
                symbol = symbol,
                change = change,
                hours = hours,
                threshold = params.percent,
            ),
        }
    }
}

#[async_trait]
impl RuleChecker for CryptoDropChecker {
    fn kind(&self) -> RuleKind {
        RuleKind::CryptoDropPercent
    }

    async fn check(&self, rule: &AlertRule, now: DateTime<Utc>) -> Result<Option<Trigger>> {
        let RuleParams::CryptoDropPercent(params) = &rule.params else {
            return Err(
                AppError::RuleEvaluation(
                    format!("{} checker received {} params", self.kind(), rule.params.kind())
                )
            );
        };

        let cutoff = window_cutoff(now, params.timeframe_hours)?;
        let asset_id = asset_id_for_symbol(&params.symbol);
        let days = history_days(params.timeframe_hours);

        let chart = fetch_with_timeout(
            self.fetch_timeout,
            "Price chart fetch",
            self.market_data.get_chart(&asset_id, days)
        ).await?;

        let Some(chart) = chart.filter(|c| !c.prices.is_empty()) else {
            tracing::debug!(rule_id = %rule.id, asset_id = %asset_id, "No price data, skipping");
            return Ok(None);
        };

        let Some(change) = percent_change_since(&chart.prices, cutoff.timestamp_millis()) else {
            tracing::debug!(
                rule_id = %rule.id,
                asset_id = %asset_id,
                points = chart.prices.len(),
                "Not enough price points in window, skipping"
            );
            return Ok(None);
        };

        if change <= -params.percent {
            Ok(Some(Self::format_trigger(params, change)))
        } else {
            Ok(None)
        }
    }
}
