use std::collections::HashMap;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::{ AppError, Result };
use crate::providers::{ MarketDataGateway, PriceChart };

const MAX_RETRIES: u32 = 3;

/// Backoff before retrying after a 429 on `attempt`. None on the last attempt.
fn retry_delay(attempt: u32) -> Option<Duration> {
    (attempt + 1 < MAX_RETRIES).then(|| Duration::from_secs(2u64.pow(attempt + 1)))
}

#[derive(Debug, Clone)]
struct CachedChart {
    chart: PriceChart,
    fetched_at: Instant,
}

/// CoinGecko `market_chart` client.
pub struct CoinGeckoClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache_ttl: Duration,
    cache: Arc<RwLock<HashMap<(String, u32), CachedChart>>>,
}

impl CoinGeckoClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client
            ::builder()
            .timeout(config.fetch_timeout())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.coingecko_api_url.clone(),
            api_key: config.coingecko_api_key.clone(),
            cache_ttl: config.price_cache_ttl(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// `market_chart` URL for `asset_id` over `days` days, in USD.
    pub fn chart_url(&self, asset_id: &str, days: u32) -> String {
        let interval = if days > 90 { "daily" } else { "hourly" };
        format!(
            "{}/coins/{}/market_chart?vs_currency=usd&days={}&interval={}",
            self.base_url,
            urlencoding::encode(asset_id),
            days,
            interval
        )
    }

    async fn get_from_cache(&self, key: &(String, u32)) -> Option<PriceChart> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|cached| cached.fetched_at.elapsed() < self.cache_ttl)
            .map(|cached| cached.chart.clone())
    }

    async fn update_cache(&self, key: (String, u32), chart: PriceChart) {
        let mut cache = self.cache.write().await;
        cache.retain(|_, cached| cached.fetched_at.elapsed() < self.cache_ttl);
        cache.insert(key, CachedChart {
            chart,
            fetched_at: Instant::now(),
        });
    }

    /// Fetch a URL with retry on 429 rate-limit responses
    async fn fetch_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            let mut request = self.client.get(url);
            if let Some(ref key) = self.api_key {
                request = request.header("x-cg-demo-api-key", key);
            }

            let response = request
                .send().await
                .map_err(|e| AppError::External(format!("CoinGecko API error: {}", e)))?;

            if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
                last_err = Some(AppError::External("CoinGecko rate limited".to_string()));
                if let Some(wait) = retry_delay(attempt) {
                    tracing::debug!(attempt, wait_secs = wait.as_secs(), "CoinGecko rate limited, backing off");
                    tokio::time::sleep(wait).await;
                }
                continue;
            }

            if !response.status().is_success() {
                return Err(
                    AppError::External(format!("CoinGecko API returned status: {}", response.status()))
                );
            }

            return Ok(response);
        }
        Err(
            last_err.unwrap_or_else(||
                AppError::External("CoinGecko API request failed after retries".to_string())
            )
        )
    }

    async fn fetch_chart(&self, asset_id: &str, days: u32) -> Result<PriceChart> {
        let url = self.chart_url(asset_id, days);
        let response = self.fetch_with_retry(&url).await?;

        response
            .json::<PriceChart>().await
            .map_err(|e| AppError::External(format!("Failed to parse CoinGecko response: {}", e)))
    }
}

#[async_trait]
impl MarketDataGateway for CoinGeckoClient {
    async fn get_chart(&self, asset_id: &str, days: u32) -> Result<Option<PriceChart>> {
        let key = (asset_id.to_string(), days);

        if let Some(cached) = self.get_from_cache(&key).await {
            return Ok(Some(cached));
        }

        match self.fetch_chart(asset_id, days).await {
            Ok(chart) => {
                self.update_cache(key, chart.clone()).await;
                Ok(Some(chart))
            }
            Err(e) => Err(AppError::DataUnavailable(format!("{} price chart: {}", asset_id, e))),
        }
    }
}
