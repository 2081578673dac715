use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use sea_orm::{
    ActiveModelTrait,
    ColumnTrait,
    DatabaseConnection,
    EntityTrait,
    QueryFilter,
    QueryOrder,
    QuerySelect,
    Set,
};
use uuid::Uuid;

use crate::db::entity::{ alert_event, alert_rule, AlertEvent as AlertEventEntity, AlertRule as AlertRuleEntity };
use crate::enums::RuleType;
use crate::error::{ AppError, Result };
use crate::providers::AlertStore;
use crate::rules::{ AlertEvent, AlertRule, NewAlertRule, RuleParams };

impl TryFrom<alert_rule::Model> for AlertRule {
    type Error = AppError;

    /// Decode the stored params and check they agree with `rule_type`.
    fn try_from(model: alert_rule::Model) -> Result<Self> {
        let params: RuleParams = serde_json
            ::from_value(model.params)
            .map_err(|e| AppError::RuleEvaluation(format!("Invalid params for rule {}: {}", model.id, e)))?;

        let rule_type: RuleType = model.rule_type.parse()?;
        if rule_type != params.rule_type() {
            return Err(
                AppError::RuleEvaluation(
                    format!(
                        "Rule {} has type {} but {} params",
                        model.id,
                        rule_type,
                        params.kind()
                    )
                )
            );
        }

        Ok(AlertRule {
            id: model.id,
            rule_text: model.rule_text,
            rule_type,
            params,
            active: model.active,
            owner_id: model.owner_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl From<alert_event::Model> for AlertEvent {
    fn from(model: alert_event::Model) -> Self {
        AlertEvent {
            id: model.id,
            rule_id: model.rule_id,
            context: model.context,
            message: model.message,
            created_at: model.created_at,
        }
    }
}

/// Convert rows, logging and dropping any that fail to decode.
fn decode_rules(models: Vec<alert_rule::Model>) -> Vec<AlertRule> {
    models
        .into_iter()
        .filter_map(|model| {
            let id = model.id;
            match AlertRule::try_from(model) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    tracing::warn!(rule_id = %id, error = %e, "Skipping undecodable alert rule");
                    None
                }
            }
        })
        .collect()
}

pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> Result<alert_rule::Model> {
        AlertRuleEntity::find_by_id(id).one(&self.db).await?.ok_or(AppError::RuleNotFound)
    }
}

#[async_trait]
impl AlertStore for AlertRepository {
    async fn list_active_rules(&self) -> Result<Vec<AlertRule>> {
        let models = AlertRuleEntity::find()
            .filter(alert_rule::Column::Active.eq(true))
            .order_by_asc(alert_rule::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(decode_rules(models))
    }

    async fn list_rules(&self) -> Result<Vec<AlertRule>> {
        let models = AlertRuleEntity::find()
            .order_by_desc(alert_rule::Column::CreatedAt)
            .all(&self.db).await?;

        Ok(decode_rules(models))
    }

    async fn get_rule(&self, id: Uuid) -> Result<Option<AlertRule>> {
        AlertRuleEntity::find_by_id(id).one(&self.db).await?.map(AlertRule::try_from).transpose()
    }

    async fn insert_rule(&self, rule: NewAlertRule) -> Result<AlertRule> {
        let now = Utc::now();
        let params = serde_json
            ::to_value(&rule.params)
            .map_err(|e| AppError::Internal(format!("Failed to encode rule params: {}", e)))?;

        let model = alert_rule::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(rule.owner_id),
            rule_text: Set(rule.rule_text),
            rule_type: Set(rule.params.rule_type().to_string()),
            params: Set(params),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = model.insert(&self.db).await?;
        AlertRule::try_from(model)
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<AlertRule> {
        let model = self.find_model(id).await?;

        let mut model: alert_rule::ActiveModel = model.into();
        model.active = Set(active);
        model.updated_at = Set(Utc::now());

        let model = model.update(&self.db).await?;
        AlertRule::try_from(model)
    }

    async fn delete_rule(&self, id: Uuid) -> Result<()> {
        // alert_events.rule_id cascades on delete
        let result = AlertRuleEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::RuleNotFound);
        }
        Ok(())
    }

    async fn insert_event(
        &self,
        rule_id: Uuid,
        context: Option<String>,
        message: String
    ) -> Result<AlertEvent> {
        let model = alert_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            rule_id: Set(rule_id),
            context: Set(context),
            message: Set(message),
            created_at: Set(Utc::now()),
        };

        let model = model.insert(&self.db).await?;
        Ok(model.into())
    }

    async fn last_event_at(&self, rule_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let latest = AlertEventEntity::find()
            .filter(alert_event::Column::RuleId.eq(rule_id))
            .order_by_desc(alert_event::Column::CreatedAt)
            .one(&self.db).await?;

        Ok(latest.map(|event| event.created_at))
    }

    async fn list_recent_events(&self, limit: u64) -> Result<Vec<AlertEvent>> {
        let events = AlertEventEntity::find()
            .order_by_desc(alert_event::Column::CreatedAt)
            .limit(limit)
            .all(&self.db).await?;

        Ok(events.into_iter().map(AlertEvent::from).collect())
    }
}
