//! Domain orchestrator: intent to tool operation resolution.
//!
//! Each domain is configured with two tables kept as data:
//!
//! - **intent map**: intent → ordered tool preference list
//! - **operation table**: intent → tool id → operation id
//!
//! # Dispatch
//!
//! ```text
//! execute(intent, params, installed)
//!   │
//!   ├─ intent not in map ─────────────────────────> failure (tool_id "unknown")
//!   │
//!   └─ for tool in preference list:
//!        not installed / no op mapping / op not declared ──> skip
//!        otherwise: normalize params, run op, return its result (final)
//!   │
//!   └─ loop exhausted ────────────────────────────> failure (tool_id "none")
//! ```
//!
//! The first eligible tool's outcome is final, success or failure. A failed
//! operation is never retried against the next tool in the list.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::tool::{OperationResult, Params, ToolDomain, ToolWrapper};

/// Operation id mapped for one `(intent, tool)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRef {
    Fixed(String),
    /// Chosen by the value of a parameter, falling back to `default`.
    ByParam {
        param: String,
        cases: Vec<(String, String)>,
        default: String,
    },
}

impl OperationRef {
    pub fn by_param(param: impl Into<String>, default: impl Into<String>) -> Self {
        OperationRef::ByParam {
            param: param.into(),
            cases: Vec::new(),
            default: default.into(),
        }
    }

    /// Add a `value => operation` case to a [`OperationRef::ByParam`].
    pub fn case(mut self, value: impl Into<String>, operation: impl Into<String>) -> Self {
        if let OperationRef::ByParam { cases, .. } = &mut self {
            cases.push((value.into(), operation.into()));
        }
        self
    }

    pub fn resolve(&self, params: &Params) -> &str {
        match self {
            OperationRef::Fixed(op) => op,
            OperationRef::ByParam {
                param,
                cases,
                default,
            } => params
                .get(param)
                .and_then(|value| cases.iter().find(|(v, _)| v == value))
                .map_or(default.as_str(), |(_, op)| op.as_str()),
        }
    }

    /// Every operation id this reference can resolve to.
    pub fn candidates(&self) -> Vec<&str> {
        match self {
            OperationRef::Fixed(op) => vec![op.as_str()],
            OperationRef::ByParam { cases, default, .. } => cases
                .iter()
                .map(|(_, op)| op.as_str())
                .chain(std::iter::once(default.as_str()))
                .collect(),
        }
    }
}

impl From<&str> for OperationRef {
    fn from(op: &str) -> Self {
        OperationRef::Fixed(op.to_string())
    }
}

impl From<String> for OperationRef {
    fn from(op: String) -> Self {
        OperationRef::Fixed(op)
    }
}

/// Maps domain-generic params onto tool-specific names for one dispatch.
pub type ParamNormalizer = fn(intent: &str, params: &Params, tool_id: &str) -> Params;

/// Inconsistency between the intent map and the rest of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteGap {
    /// Tool is preferred for the intent but has no operation mapping
    MissingOperation { intent: String, tool_id: String },
    /// Tool is preferred for the intent but not registered in this domain
    UnknownTool { intent: String, tool_id: String },
    /// Mapped operation is not declared by the tool
    UndeclaredOperation {
        intent: String,
        tool_id: String,
        operation_id: String,
    },
}

impl std::fmt::Display for RouteGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteGap::MissingOperation { intent, tool_id } => {
                write!(f, "intent '{}' lists '{}' without an operation mapping", intent, tool_id)
            }
            RouteGap::UnknownTool { intent, tool_id } => {
                write!(f, "intent '{}' lists unregistered tool '{}'", intent, tool_id)
            }
            RouteGap::UndeclaredOperation {
                intent,
                tool_id,
                operation_id,
            } => write!(
                f,
                "intent '{}' maps '{}' to undeclared operation '{}'",
                intent, tool_id, operation_id
            ),
        }
    }
}

/// Per-domain intent resolver.
pub struct DomainOrchestrator {
    domain: ToolDomain,
    name: String,
    description: String,
    /// Noun used in the no-tool message, e.g. "package manager"
    tool_noun: String,
    remediation: Option<String>,
    /// Ordered intent map
    intents: Vec<(String, Vec<String>)>,
    /// intent -> tool id -> operation
    operations: HashMap<String, HashMap<String, OperationRef>>,
    tools: Vec<Arc<dyn ToolWrapper>>,
    normalizer: Option<ParamNormalizer>,
}

impl DomainOrchestrator {
    pub fn new(domain: ToolDomain, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            domain,
            name: name.into(),
            description: description.into(),
            tool_noun: format!("{} tool", domain),
            remediation: None,
            intents: Vec::new(),
            operations: HashMap::new(),
            tools: Vec::new(),
            normalizer: None,
        }
    }

    pub fn with_tool_noun(mut self, noun: impl Into<String>) -> Self {
        self.tool_noun = noun.into();
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn with_normalizer(mut self, normalizer: ParamNormalizer) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_tool(mut self, tool: Arc<dyn ToolWrapper>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Declare an intent's tool preference list.
    pub fn intent(mut self, intent: &str, preference: &[&str]) -> Self {
        let tools = preference.iter().map(|t| t.to_string()).collect();
        match self.intents.iter_mut().find(|(i, _)| i == intent) {
            Some((_, existing)) => *existing = tools,
            None => self.intents.push((intent.to_string(), tools)),
        }
        self
    }

    /// Map `(intent, tool)` to an operation.
    pub fn operation(mut self, intent: &str, tool_id: &str, op: impl Into<OperationRef>) -> Self {
        self.operations
            .entry(intent.to_string())
            .or_default()
            .insert(tool_id.to_string(), op.into());
        self
    }

    /// Declare an intent and its operation mappings in one go. The order of
    /// `pairs` is the preference order.
    pub fn route(self, intent: &str, pairs: &[(&str, &str)]) -> Self {
        let preference: Vec<&str> = pairs.iter().map(|(tool, _)| *tool).collect();
        pairs
            .iter()
            .fold(self.intent(intent, &preference), |orch, (tool, op)| {
                orch.operation(intent, tool, *op)
            })
    }

    pub fn domain(&self) -> ToolDomain {
        self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tools(&self) -> &[Arc<dyn ToolWrapper>] {
        &self.tools
    }

    pub fn tool(&self, tool_id: &str) -> Option<&Arc<dyn ToolWrapper>> {
        self.tools.iter().find(|t| t.id() == tool_id)
    }

    /// Ordered `(intent, preference list)` pairs.
    pub fn intent_map(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.intents.iter().map(|(i, tools)| (i.as_str(), tools.as_slice()))
    }

    pub fn preference(&self, intent: &str) -> Option<&[String]> {
        self.intents
            .iter()
            .find(|(i, _)| i == intent)
            .map(|(_, tools)| tools.as_slice())
    }

    /// Check every `(intent, tool)` pair of the intent map against the
    /// operation table and the registered tools.
    ///
    /// Gaps are logged and returned; they are skipped at dispatch time.
    pub fn validate(&self) -> Vec<RouteGap> {
        let mut gaps = Vec::new();

        for (intent, preference) in &self.intents {
            for tool_id in preference {
                let Some(tool) = self.tool(tool_id) else {
                    gaps.push(RouteGap::UnknownTool {
                        intent: intent.clone(),
                        tool_id: tool_id.clone(),
                    });
                    continue;
                };
                let Some(op_ref) = self.operations.get(intent).and_then(|ops| ops.get(tool_id))
                else {
                    gaps.push(RouteGap::MissingOperation {
                        intent: intent.clone(),
                        tool_id: tool_id.clone(),
                    });
                    continue;
                };
                for operation_id in op_ref.candidates() {
                    if tool.operation(operation_id).is_none() {
                        gaps.push(RouteGap::UndeclaredOperation {
                            intent: intent.clone(),
                            tool_id: tool_id.clone(),
                            operation_id: operation_id.to_string(),
                        });
                    }
                }
            }
        }

        for gap in &gaps {
            tracing::warn!(domain = %self.domain, "Route gap: {}", gap);
        }
        gaps
    }

    /// Resolve `intent` against the installed tools and run the first
    /// eligible operation.
    pub async fn execute(
        &self,
        intent: &str,
        params: &Params,
        installed: &HashSet<String>,
    ) -> OperationResult {
        let Some(preference) = self.preference(intent) else {
            return OperationResult::unknown(format!(
                "Unknown intent for {} domain: {}",
                self.domain, intent
            ));
        };

        for tool_id in preference {
            if !installed.contains(tool_id) {
                tracing::trace!(domain = %self.domain, intent, tool = %tool_id, "Tool not installed, skipping");
                continue;
            }
            let Some(tool) = self.tool(tool_id) else {
                continue;
            };
            let Some(op_ref) = self.operations.get(intent).and_then(|ops| ops.get(tool_id)) else {
                tracing::debug!(domain = %self.domain, intent, tool = %tool_id, "No operation mapped, skipping");
                continue;
            };
            let operation_id = op_ref.resolve(params);
            if tool.operation(operation_id).is_none() {
                tracing::debug!(
                    domain = %self.domain,
                    intent,
                    tool = %tool_id,
                    operation = operation_id,
                    "Operation not declared by tool, skipping"
                );
                continue;
            }

            let normalized = match self.normalizer {
                Some(normalize) => normalize(intent, params, tool_id),
                None => params.clone(),
            };

            tracing::info!(
                domain = %self.domain,
                intent,
                tool = %tool_id,
                operation = operation_id,
                "Dispatching intent"
            );
            return tool.execute(operation_id, &normalized).await;
        }

        let mut message = format!(
            "No installed {} available for intent: {}.",
            self.tool_noun, intent
        );
        if let Some(remediation) = &self.remediation {
            message.push(' ');
            message.push_str(remediation);
        }
        OperationResult::no_tool(message)
    }
}

impl std::fmt::Debug for DomainOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainOrchestrator")
            .field("domain", &self.domain)
            .field("intents", &self.intents.len())
            .field("tools", &self.tools.iter().map(|t| t.id()).collect::<Vec<_>>())
            .finish()
    }
}
