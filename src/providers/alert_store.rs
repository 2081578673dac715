use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use uuid::Uuid;

use crate::error::Result;
use crate::rules::{ AlertEvent, AlertRule, NewAlertRule };

/// Persistence for rules and their emitted events.
///
/// The evaluator only needs `list_active_rules`, `last_event_at` and
/// `insert_event`; the rest serves the rule-management and display surfaces.
#[async_trait]
pub trait AlertStore: Send + Sync {
    async fn list_active_rules(&self) -> Result<Vec<AlertRule>>;

    /// All rules, newest first.
    async fn list_rules(&self) -> Result<Vec<AlertRule>>;

    async fn get_rule(&self, id: Uuid) -> Result<Option<AlertRule>>;

    async fn insert_rule(&self, rule: NewAlertRule) -> Result<AlertRule>;

    /// Fails with `RuleNotFound` for unknown ids.
    async fn set_active(&self, id: Uuid, active: bool) -> Result<AlertRule>;

    /// Removes the rule together with its events. Fails with `RuleNotFound` for unknown ids.
    async fn delete_rule(&self, id: Uuid) -> Result<()>;

    async fn insert_event(
        &self,
        rule_id: Uuid,
        context: Option<String>,
        message: String
    ) -> Result<AlertEvent>;

    /// Creation time of the rule's newest event, if any.
    async fn last_event_at(&self, rule_id: Uuid) -> Result<Option<DateTime<Utc>>>;

    /// Newest first.
    async fn list_recent_events(&self, limit: u64) -> Result<Vec<AlertEvent>>;
}
