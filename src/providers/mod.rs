pub mod alert_store;
pub mod market_data;
pub mod news_feed;

pub use alert_store::AlertStore;
pub use market_data::{ MarketDataGateway, PriceChart, PricePoint };
pub use news_feed::{ NewsItem, NewsStore };
