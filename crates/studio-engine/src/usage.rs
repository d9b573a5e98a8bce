use serde_json::Value;
use studio_contracts::messages::{Locale, MessageKey};

use crate::provider::{error_chain_text, GenerationTransport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageSummary {
    Totals { used: String, limit: String },
    /// Body without `totalUsage`, kept as compact JSON.
    Raw(String),
}

impl UsageSummary {
    pub fn from_body(body: &Value) -> Self {
        match body.get("totalUsage").and_then(Value::as_object) {
            Some(totals) => Self::Totals {
                used: scalar_text(totals.get("used")),
                limit: scalar_text(totals.get("limit")),
            },
            None => Self::Raw(body.to_string()),
        }
    }

    pub fn display_value(&self) -> String {
        match self {
            Self::Totals { used, limit } => format!("{used} / {limit}"),
            Self::Raw(raw) => raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageStatus {
    Available(UsageSummary),
    Unavailable,
}

impl UsageStatus {
    pub fn label(&self, locale: Locale) -> String {
        match self {
            Self::Available(summary) => locale.usage_label(&summary.display_value()),
            Self::Unavailable => locale.text(MessageKey::UsageError).to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Never fails: every problem collapses to `Unavailable` and is only logged.
pub fn fetch_usage<T>(transport: &T, credential: &str) -> UsageStatus
where
    T: GenerationTransport + ?Sized,
{
    let credential = credential.trim();
    if credential.is_empty() {
        return UsageStatus::Unavailable;
    }
    match transport.fetch_usage(credential) {
        Ok(body) => UsageStatus::Available(UsageSummary::from_body(&body)),
        Err(err) => {
            log::warn!("usage lookup failed: {}", error_chain_text(&err, 400));
            UsageStatus::Unavailable
        }
    }
}

fn scalar_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => "-".to_string(),
    }
}
