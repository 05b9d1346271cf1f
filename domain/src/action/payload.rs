//! Structured tool-operation payload carried in `Action::command`.

use super::entities::Tier;
use crate::tool::Params;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{domain, intent, params, tier, description}` as stored on a
/// `tool-operation` Action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOperationPayload {
    pub domain: String,
    pub intent: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default = "default_tier")]
    pub tier: Tier,
    #[serde(default)]
    pub description: String,
}

fn default_tier() -> Tier {
    Tier::Yellow
}

impl ToolOperationPayload {
    pub fn new(domain: impl Into<String>, intent: impl Into<String>) -> Self {
        let domain = domain.into();
        let intent = intent.into();
        Self {
            description: format!("Tool operation: {}/{}", domain, intent),
            domain,
            intent,
            params: Params::new(),
            tier: Tier::Yellow,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tier = tier;
        self
    }

    /// Lenient parse of a fenced block body.
    ///
    /// Returns `None` for invalid JSON and for objects without a non-empty
    /// string `domain` and `intent`. Scalar param values are stringified,
    /// a missing or unrecognized tier falls back to yellow, and a missing
    /// description is derived from domain and intent.
    pub fn parse_lenient(body: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(body).ok()?;
        let obj = value.as_object()?;

        let domain = non_empty_str(obj.get("domain"))?;
        let intent = non_empty_str(obj.get("intent"))?;

        let mut params = Params::new();
        if let Some(Value::Object(map)) = obj.get("params") {
            for (key, value) in map {
                let text = match value {
                    Value::String(s) => s.clone(),
                    Value::Null => continue,
                    other => other.to_string(),
                };
                params.insert(key.clone(), text);
            }
        }

        let tier = obj
            .get("tier")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
            .unwrap_or(Tier::Yellow);

        let description = non_empty_str(obj.get("description"))
            .unwrap_or_else(|| format!("Tool operation: {}/{}", domain, intent));

        Some(Self {
            domain,
            intent,
            params,
            tier,
            description,
        })
    }

    /// Decode a payload previously stored on an Action.
    pub fn from_command(command: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(command)
    }

    pub fn to_command(&self) -> String {
        // Serializing plain strings and a BTreeMap cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
