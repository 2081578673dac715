use std::sync::Arc;

use uuid::Uuid;

use crate::error::{ AppError, Result };
use crate::providers::AlertStore;
use crate::rules::{ parse_rule, AlertEvent, AlertRule, NewAlertRule, RuleParams };

const MIN_RULE_TEXT_CHARS: usize = 5;
pub const DEFAULT_EVENT_LIMIT: u64 = 50;
pub const MAX_EVENT_LIMIT: u64 = 200;

/// Rule-management boundary: turns user text into stored rules and
/// exposes the rule list, toggles and the recent-event feed.
#[derive(Clone)]
pub struct AlertRuleService {
    store: Arc<dyn AlertStore>,
}

impl AlertRuleService {
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    /// Parse `text` and store it as an active rule. Unparseable text is
    /// rejected with `RuleNotUnderstood` and nothing is stored.
    pub async fn create_rule_from_text(
        &self,
        text: &str,
        owner_id: Option<String>
    ) -> Result<AlertRule> {
        let params = self.preview(text)?;

        let rule = self.store.insert_rule(NewAlertRule {
            rule_text: text.to_string(),
            params,
            owner_id,
        }).await?;

        tracing::info!(
            rule_id = %rule.id,
            kind = %rule.params.kind(),
            owner_id = ?rule.owner_id,
            "Alert rule created"
        );

        Ok(rule)
    }

    /// Parse without storing.
    pub fn preview(&self, text: &str) -> Result<RuleParams> {
        if text.trim().chars().count() < MIN_RULE_TEXT_CHARS {
            return Err(
                AppError::InvalidInput(
                    format!("Rule text must be at least {} characters", MIN_RULE_TEXT_CHARS)
                )
            );
        }

        parse_rule(text).ok_or(AppError::RuleNotUnderstood)
    }

    pub async fn list_rules(&self) -> Result<Vec<AlertRule>> {
        self.store.list_rules().await
    }

    pub async fn get_rule(&self, id: Uuid) -> Result<AlertRule> {
        self.store.get_rule(id).await?.ok_or(AppError::RuleNotFound)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<AlertRule> {
        let rule = self.store.set_active(id, active).await?;
        tracing::info!(rule_id = %id, active, "Alert rule toggled");
        Ok(rule)
    }

    pub async fn delete_rule(&self, id: Uuid) -> Result<()> {
        self.store.delete_rule(id).await?;
        tracing::info!(rule_id = %id, "Alert rule deleted");
        Ok(())
    }

    /// Newest events first. `None` means the default page size; larger requests are capped.
    pub async fn list_recent_events(&self, limit: Option<u64>) -> Result<Vec<AlertEvent>> {
        let limit = limit.unwrap_or(DEFAULT_EVENT_LIMIT).clamp(1, MAX_EVENT_LIMIT);
        self.store.list_recent_events(limit).await
    }
}
