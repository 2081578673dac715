pub mod entity;
pub use entity::*;

mod alert_repository;
pub use alert_repository::AlertRepository;

mod news_repository;
pub use news_repository::NewsRepository;
