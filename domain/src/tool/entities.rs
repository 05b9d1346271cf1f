//! Tool domain entities

use crate::action::Tier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use thiserror::Error;

/// String parameters passed to an intent or operation.
///
/// Ordered so that logged and serialized params are stable.
pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown domain: {0}")]
pub struct UnknownDomain(pub String);

/// Functional grouping of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolDomain {
    Packages,
    Drivers,
    Debloat,
    FileOps,
    SystemTools,
}

impl ToolDomain {
    pub const ALL: [ToolDomain; 5] = [
        ToolDomain::Packages,
        ToolDomain::Drivers,
        ToolDomain::Debloat,
        ToolDomain::FileOps,
        ToolDomain::SystemTools,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolDomain::Packages => "packages",
            ToolDomain::Drivers => "drivers",
            ToolDomain::Debloat => "debloat",
            ToolDomain::FileOps => "file-ops",
            ToolDomain::SystemTools => "system-tools",
        }
    }
}

impl std::fmt::Display for ToolDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ToolDomain {
    type Err = UnknownDomain;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDomain(s.to_string()))
    }
}

/// Parameter declaration of a tool operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub description: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl ParamDef {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Static declaration of one operation a tool offers.
///
/// `tier` is the declared default risk of the operation. It is informational
/// for discovery and prompting; an Action's own tier is assigned separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tier: Tier,
    pub params: Vec<ParamDef>,
}

impl OperationSpec {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        tier: Tier,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            tier,
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    /// Fill declared defaults and check required parameters.
    ///
    /// Blank values count as missing. Undeclared keys pass through untouched.
    pub fn resolve_params(&self, params: &Params) -> Result<Params, String> {
        let mut resolved = params.clone();
        for def in &self.params {
            let present = resolved.get(&def.name).is_some_and(|v| !v.trim().is_empty());
            if present {
                continue;
            }
            match (&def.default, def.required) {
                (Some(default), _) => {
                    resolved.insert(def.name.clone(), default.clone());
                }
                (None, true) => return Err(format!("Missing required parameter: {}", def.name)),
                (None, false) => {
                    resolved.remove(&def.name);
                }
            }
        }
        Ok(resolved)
    }
}

/// Result of a tool's installation probe. Never persisted with the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatus {
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ToolStatus {
    pub fn not_installed() -> Self {
        Self::default()
    }

    pub fn installed() -> Self {
        Self {
            installed: true,
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        if !version.trim().is_empty() {
            self.version = Some(version.trim().to_string());
        }
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Descriptor plus last detection outcome, as exposed to discovery surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub domain: ToolDomain,
    pub installed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    /// Display names of the tool's operations
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Flattened view of one operation offered by an installed tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOperationInfo {
    pub id: String,
    pub tool_id: String,
    pub domain: ToolDomain,
    pub name: String,
    pub description: String,
    pub tier: Tier,
    pub params: Vec<ParamDef>,
}
