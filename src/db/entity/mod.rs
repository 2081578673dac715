pub mod alert_event;
pub mod alert_rule;
pub mod news;

pub use alert_event::Entity as AlertEvent;
pub use alert_rule::Entity as AlertRule;
pub use news::Entity as News;
