pub mod alert_rule_service;
pub mod price_service;

pub use alert_rule_service::AlertRuleService;
pub use price_service::CoinGeckoClient;
