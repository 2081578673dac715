use std::env;
use std::time::Duration;

const DEFAULT_COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub scheduler_enabled: bool,
    pub alert_check_interval_secs: u64,
    /// 0 disables repeat suppression: a rule fires on every tick its condition holds.
    pub alert_cooldown_secs: u64,
    pub fetch_timeout_secs: u64,
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    pub price_cache_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn std::error::Error>>
        where F: Fn(&str) -> Option<String>
    {
        let database_url = lookup("DATABASE_URL").ok_or("DATABASE_URL must be set")?;

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()?;

        let scheduler_enabled = match lookup("SCHEDULER_ENABLED") {
            None => true,
            Some(value) =>
                match value.to_lowercase().as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => {
                        return Err("SCHEDULER_ENABLED must be 'true' or 'false'".into());
                    }
                }
        };

        let alert_check_interval_secs: u64 = lookup("ALERT_CHECK_INTERVAL_SECS")
            .unwrap_or_else(|| "300".to_string())
            .parse()?;

        if alert_check_interval_secs == 0 {
            return Err("ALERT_CHECK_INTERVAL_SECS must be greater than zero".into());
        }

        let alert_cooldown_secs = lookup("ALERT_COOLDOWN_SECS")
            .unwrap_or_else(|| "0".to_string())
            .parse()?;

        let fetch_timeout_secs: u64 = lookup("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()?;

        if fetch_timeout_secs == 0 {
            return Err("FETCH_TIMEOUT_SECS must be greater than zero".into());
        }

        let coingecko_api_url = lookup("COINGECKO_API_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_COINGECKO_API_URL.to_string());
        let coingecko_api_key = lookup("COINGECKO_API_KEY").filter(|key| !key.trim().is_empty());

        let price_cache_secs = lookup("PRICE_CACHE_SECS")
            .unwrap_or_else(|| "60".to_string())
            .parse()?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            scheduler_enabled,
            alert_check_interval_secs,
            alert_cooldown_secs,
            fetch_timeout_secs,
            coingecko_api_url,
            coingecko_api_key,
            price_cache_secs,
        })
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.alert_check_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Repeat-suppression window, `None` when disabled.
    pub fn alert_cooldown(&self) -> Option<chrono::Duration> {
        if self.alert_cooldown_secs == 0 {
            return None;
        }
        i64::try_from(self.alert_cooldown_secs).ok().map(chrono::Duration::seconds)
    }

    pub fn price_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.price_cache_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, Box<dyn std::error::Error>> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/alerts")]).unwrap();

        assert_eq!(config.server_port, 8080);
        assert!(config.scheduler_enabled);
        assert_eq!(config.check_interval(), Duration::from_secs(300));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.alert_cooldown(), None);
        assert_eq!(config.coingecko_api_url, DEFAULT_COINGECKO_API_URL);
        assert!(config.coingecko_api_key.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(config_from(&[]).is_err());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/alerts"),
            ("ALERT_CHECK_INTERVAL_SECS", "0"),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/alerts"),
            ("ALERT_CHECK_INTERVAL_SECS", "60"),
            ("ALERT_COOLDOWN_SECS", "900"),
            ("SCHEDULER_ENABLED", "false"),
            ("COINGECKO_API_URL", "http://localhost:9999/api/"),
            ("COINGECKO_API_KEY", "demo-key"),
        ]).unwrap();

        assert_eq!(config.check_interval(), Duration::from_secs(60));
        assert_eq!(config.alert_cooldown(), Some(chrono::Duration::minutes(15)));
        assert!(!config.scheduler_enabled);
        assert_eq!(config.coingecko_api_url, "http://localhost:9999/api");
        assert_eq!(config.coingecko_api_key.as_deref(), Some("demo-key"));
    }

    #[test]
    fn test_rejects_garbage_port() {
        let result = config_from(&[
            ("DATABASE_URL", "postgres://localhost/alerts"),
            ("SERVER_PORT", "eighty"),
        ]);
        assert!(result.is_err());
    }
}
