//! Alert rule and event model.
//!
//! A rule's structured thresholds live in [`RuleParams`], a closed tagged enum
//! whose JSON form (`{"kind": "crypto_drop_percent", ...}`) is what the
//! `alert_rules.params` column stores. The rule's [`RuleType`] is always derived
//! from the params, so the two can never disagree.

pub mod parser;

pub use parser::parse_rule;

use chrono::{ DateTime, Utc };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::enums::{ NewsWindow, RuleKind, RuleType };

/// Longest crypto drop timeframe accepted, one year in hours.
pub const MAX_TIMEFRAME_HOURS: u32 = 24 * 365;

/// "Me avise se BTC cair mais de 5% em 1h"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoDropPercentParams {
    pub symbol: String,
    /// Drop magnitude in percent as written (5 means 5%, not 0.05).
    pub percent: f64,
    pub timeframe_hours: u32,
}

/// "Me avise se NVIDIA aparecer em mais de 3 fontes no mesmo dia"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsMultiSourceParams {
    pub keyword: String,
    pub min_sources: u32,
    #[serde(default)]
    pub window: NewsWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleParams {
    CryptoDropPercent(CryptoDropPercentParams),
    NewsMultiSource(NewsMultiSourceParams),
}

impl RuleParams {
    pub fn kind(&self) -> RuleKind {
        match self {
            RuleParams::CryptoDropPercent(_) => RuleKind::CryptoDropPercent,
            RuleParams::NewsMultiSource(_) => RuleKind::NewsMultiSource,
        }
    }

    pub fn rule_type(&self) -> RuleType {
        self.kind().rule_type()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AlertRule {
    pub id: Uuid,
    /// Original natural-language input, verbatim.
    pub rule_text: String,
    pub rule_type: RuleType,
    pub params: RuleParams,
    pub active: bool,
    pub owner_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for persisting a freshly parsed rule.
#[derive(Debug, Clone)]
pub struct NewAlertRule {
    pub rule_text: String,
    pub params: RuleParams,
    pub owner_id: Option<String>,
}

impl AlertRule {
    /// Build an active rule with a fresh id.
    pub fn create(new_rule: NewAlertRule, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule_text: new_rule.rule_text,
            rule_type: new_rule.params.rule_type(),
            params: new_rule.params,
            active: true,
            owner_id: new_rule.owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A single firing of a rule. Never updated after insert.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub context: Option<String>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}
