use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── RuleType ───────────────────────────────────────────────────────

/// Family of an alert rule, stored in the `rule_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Crypto,
    News,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Crypto => "crypto",
            RuleType::News => "news",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "crypto" => Ok(RuleType::Crypto),
            "news" => Ok(RuleType::News),
            _ => Err(AppError::InvalidInput(format!(
                "Invalid rule type: {}. Supported: crypto, news",
                s
            ))),
        }
    }
}

// ─── RuleKind ───────────────────────────────────────────────────────

/// Concrete check a rule's params describe. Each kind belongs to exactly
/// one [`RuleType`] and is served by one registered checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    CryptoDropPercent,
    NewsMultiSource,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::CryptoDropPercent => "crypto_drop_percent",
            RuleKind::NewsMultiSource => "news_multi_source",
        }
    }

    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::CryptoDropPercent => RuleType::Crypto,
            RuleKind::NewsMultiSource => RuleType::News,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── NewsWindow ─────────────────────────────────────────────────────

/// Time range a news rule counts sources over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewsWindow {
    /// Local midnight until now.
    #[default]
    #[serde(rename = "same_day")]
    SameDay,
    /// Rolling 24 hours. No parser pattern produces this yet.
    #[serde(rename = "24h")]
    Last24Hours,
}

impl NewsWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsWindow::SameDay => "same_day",
            NewsWindow::Last24Hours => "24h",
        }
    }
}

impl fmt::Display for NewsWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
