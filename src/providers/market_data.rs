use async_trait::async_trait;
use serde::{ Deserialize, Serialize };

use crate::error::Result;

/// One `[timestamp_ms, price]` sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(i64, f64)", into = "(i64, f64)")]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

impl From<(i64, f64)> for PricePoint {
    fn from((timestamp_ms, price): (i64, f64)) -> Self {
        Self { timestamp_ms, price }
    }
}

impl From<PricePoint> for (i64, f64) {
    fn from(point: PricePoint) -> Self {
        (point.timestamp_ms, point.price)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PriceChart {
    #[serde(default)]
    pub prices: Vec<PricePoint>,
}

/// Historical price source keyed by market-data asset id (e.g. `"bitcoin"`).
#[async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Price history covering the last `days` days. `Ok(None)` means there is no
    /// history for the id. `Err(AppError::DataUnavailable)` means the source could
    /// not serve it this time; callers skip the rule rather than fail.
    async fn get_chart(&self, asset_id: &str, days: u32) -> Result<Option<PriceChart>>;
}
