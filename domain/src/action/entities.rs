//! Action entity and its lifecycle.
//!
//! An [`Action`] is the audit record for one proposed system change. It is
//! created by the classifier (or an API caller), mutated only by the approval
//! gate, and never deleted.
//!
//! # State Transitions
//!
//! ```text
//!            ┌──> Denied
//! Pending ───┤
//!            └──> Approved ──┬──> Executed
//!                            └──> Failed
//! ```
//!
//! `green` actions skip `Pending` and are created `Approved`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by Action invariants and string parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("Action already {0}")]
    NotPending(ActionStatus),

    #[error("Cannot move action from {from} to {to}")]
    InvalidTransition { from: ActionStatus, to: ActionStatus },

    #[error("Unknown tier: {0}")]
    UnknownTier(String),

    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}

/// Opaque unique identifier of an Action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ActionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ActionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Risk tier of an Action or a declared tool operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Read-only, runs without a prompt
    Green,
    /// Changes state but is considered routine
    Yellow,
    /// Destructive, always needs explicit consent
    Red,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Green => "green",
            Tier::Yellow => "yellow",
            Tier::Red => "red",
        }
    }

    /// Status an Action of this tier starts in.
    pub fn initial_status(&self) -> ActionStatus {
        match self {
            Tier::Green => ActionStatus::Approved,
            Tier::Yellow | Tier::Red => ActionStatus::Pending,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "green" => Ok(Tier::Green),
            "yellow" => Ok(Tier::Yellow),
            "red" => Ok(Tier::Red),
            other => Err(ActionError::UnknownTier(other.to_string())),
        }
    }
}

/// Execution path discriminator.
///
/// Stored as free text, so records written by other callers can carry a
/// module this build does not know. Those land in [`ActionModule::Other`]
/// and are rejected by the executor without spawning anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionModule {
    PowerShell,
    Cmd,
    Shell,
    ToolOperation,
    Other(String),
}

impl ActionModule {
    pub fn as_str(&self) -> &str {
        match self {
            ActionModule::PowerShell => "powershell",
            ActionModule::Cmd => "cmd",
            ActionModule::Shell => "shell",
            ActionModule::ToolOperation => "tool-operation",
            ActionModule::Other(s) => s,
        }
    }

    /// Map a fenced code block language tag to a module.
    pub fn from_fence_tag(tag: &str) -> Option<Self> {
        match tag {
            "powershell" => Some(ActionModule::PowerShell),
            "cmd" => Some(ActionModule::Cmd),
            "bash" => Some(ActionModule::Shell),
            _ => None,
        }
    }
}

impl From<String> for ActionModule {
    fn from(s: String) -> Self {
        match s.as_str() {
            "powershell" => ActionModule::PowerShell,
            "cmd" => ActionModule::Cmd,
            "shell" => ActionModule::Shell,
            "tool-operation" => ActionModule::ToolOperation,
            _ => ActionModule::Other(s),
        }
    }
}

impl From<&str> for ActionModule {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<ActionModule> for String {
    fn from(m: ActionModule) -> Self {
        m.as_str().to_string()
    }
}

impl std::fmt::Display for ActionModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of an Action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Approved,
    Denied,
    Executed,
    Failed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Approved => "approved",
            ActionStatus::Denied => "denied",
            ActionStatus::Executed => "executed",
            ActionStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ActionStatus::Denied | ActionStatus::Executed | ActionStatus::Failed
        )
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionStatus {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ActionStatus::Pending),
            "approved" => Ok(ActionStatus::Approved),
            "denied" => Ok(ActionStatus::Denied),
            "executed" => Ok(ActionStatus::Executed),
            "failed" => Ok(ActionStatus::Failed),
            other => Err(ActionError::UnknownStatus(other.to_string())),
        }
    }
}

/// Terminal outcome written back to storage in a single update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResolution {
    pub status: ActionStatus,
    pub result: Option<String>,
    pub error: Option<String>,
    pub resolved_at: DateTime<Utc>,
}

impl ActionResolution {
    /// Denial: no result, no error.
    pub fn denied(at: DateTime<Utc>) -> Self {
        Self {
            status: ActionStatus::Denied,
            result: None,
            error: None,
            resolved_at: at,
        }
    }

    /// Outcome of an approved execution.
    pub fn from_outcome(
        success: bool,
        output: Option<String>,
        error: Option<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            status: if success {
                ActionStatus::Executed
            } else {
                ActionStatus::Failed
            },
            result: output,
            error,
            resolved_at: at,
        }
    }

    /// Status a row must hold for this resolution to be written.
    pub fn from_status(&self) -> ActionStatus {
        match self.status {
            ActionStatus::Denied | ActionStatus::Pending => ActionStatus::Pending,
            _ => ActionStatus::Approved,
        }
    }
}

/// A single proposed or executed system-changing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: ActionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    pub tier: Tier,
    pub description: String,
    /// Literal command line, or a serialized tool-operation payload
    pub command: String,
    pub module: ActionModule,
    pub status: ActionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Action {
    /// Create a new Action. Status follows the tier's initial-status policy.
    pub fn new(
        tier: Tier,
        module: ActionModule,
        description: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            id: ActionId::generate(),
            conversation_id: None,
            tier,
            description: description.into(),
            command: command.into(),
            module,
            status: tier.initial_status(),
            result: None,
            error: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<ActionId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == ActionStatus::Pending
    }

    /// Guard for client-initiated resolution.
    pub fn ensure_pending(&self) -> Result<(), ActionError> {
        if self.is_pending() {
            Ok(())
        } else {
            Err(ActionError::NotPending(self.status))
        }
    }

    /// Claim a pending action for execution.
    pub fn approve(&mut self) -> Result<(), ActionError> {
        self.ensure_pending()?;
        self.status = ActionStatus::Approved;
        Ok(())
    }

    /// Apply a terminal resolution. A denial needs a pending action, an
    /// execution outcome needs an approved one.
    pub fn apply(&mut self, resolution: ActionResolution) -> Result<(), ActionError> {
        if self.status.is_terminal() {
            return Err(ActionError::NotPending(self.status));
        }
        let from = resolution.from_status();
        if self.status != from {
            return Err(ActionError::InvalidTransition {
                from: self.status,
                to: resolution.status,
            });
        }
        self.status = resolution.status;
        self.result = resolution.result;
        self.error = resolution.error;
        self.resolved_at = Some(resolution.resolved_at);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_follows_tier() {
        let green = Action::new(Tier::Green, ActionModule::Shell, "d", "ls");
        let yellow = Action::new(Tier::Yellow, ActionModule::Shell, "d", "npm i");
        let red = Action::new(Tier::Red, ActionModule::Shell, "d", "rm -rf /");

        assert_eq!(green.status, ActionStatus::Approved);
        assert_eq!(yellow.status, ActionStatus::Pending);
        assert_eq!(red.status, ActionStatus::Pending);
        assert!(red.resolved_at.is_none());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = Action::new(Tier::Red, ActionModule::Shell, "d", "x");
        let b = Action::new(Tier::Red, ActionModule::Shell, "d", "x");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_deny_sets_resolved_at_only() {
        let mut action = Action::new(Tier::Red, ActionModule::Shell, "d", "rm -rf /tmp");
        let now = Utc::now();
        action.apply(ActionResolution::denied(now)).unwrap();

        assert_eq!(action.status, ActionStatus::Denied);
        assert_eq!(action.resolved_at, Some(now));
        assert!(action.result.is_none());
        assert!(action.error.is_none());
    }

    #[test]
    fn test_outcome_maps_to_executed_or_failed() {
        let ok = ActionResolution::from_outcome(true, Some("out".into()), None, Utc::now());
        let bad = ActionResolution::from_outcome(false, None, Some("boom".into()), Utc::now());
        assert_eq!(ok.status, ActionStatus::Executed);
        assert_eq!(bad.status, ActionStatus::Failed);
        assert_eq!(bad.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_outcome_requires_approval_first() {
        let mut action = Action::new(Tier::Red, ActionModule::Shell, "d", "rm -rf /tmp");
        let outcome = ActionResolution::from_outcome(true, Some("ok".into()), None, Utc::now());

        assert_eq!(
            action.apply(outcome.clone()),
            Err(ActionError::InvalidTransition {
                from: ActionStatus::Pending,
                to: ActionStatus::Executed,
            })
        );

        action.approve().unwrap();
        assert_eq!(action.status, ActionStatus::Approved);
        action.apply(outcome).unwrap();
        assert_eq!(action.status, ActionStatus::Executed);
        assert_eq!(action.result.as_deref(), Some("ok"));
    }

    #[test]
    fn test_approved_action_cannot_be_denied_or_claimed_again() {
        let mut action = Action::new(Tier::Yellow, ActionModule::Cmd, "d", "dir");
        action.approve().unwrap();

        assert_eq!(
            action.approve(),
            Err(ActionError::NotPending(ActionStatus::Approved))
        );
        assert!(matches!(
            action.apply(ActionResolution::denied(Utc::now())),
            Err(ActionError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_resolved_action_is_immutable() {
        let mut action = Action::new(Tier::Yellow, ActionModule::Cmd, "d", "dir");
        action.apply(ActionResolution::denied(Utc::now())).unwrap();

        let before = action.clone();
        let err = action
            .apply(ActionResolution::from_outcome(true, None, None, Utc::now()))
            .unwrap_err();

        assert_eq!(err, ActionError::NotPending(ActionStatus::Denied));
        assert_eq!(err.to_string(), "Action already denied");
        assert_eq!(action, before);
    }

    #[test]
    fn test_green_action_is_not_resolvable() {
        let action = Action::new(Tier::Green, ActionModule::PowerShell, "d", "Get-Process");
        assert_eq!(
            action.ensure_pending(),
            Err(ActionError::NotPending(ActionStatus::Approved))
        );
    }

    #[test]
    fn test_module_round_trips_unknown_values() {
        assert_eq!(ActionModule::from("tool-operation"), ActionModule::ToolOperation);
        assert_eq!(ActionModule::from("python"), ActionModule::Other("python".into()));
        assert_eq!(ActionModule::Other("python".into()).as_str(), "python");

        let json = serde_json::to_string(&ActionModule::PowerShell).unwrap();
        assert_eq!(json, "\"powershell\"");
    }

    #[test]
    fn test_fence_tag_mapping() {
        assert_eq!(ActionModule::from_fence_tag("bash"), Some(ActionModule::Shell));
        assert_eq!(ActionModule::from_fence_tag("cmd"), Some(ActionModule::Cmd));
        assert_eq!(ActionModule::from_fence_tag("python"), None);
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("RED".parse::<Tier>().unwrap(), Tier::Red);
        assert!("purple".parse::<Tier>().is_err());
    }

    #[test]
    fn test_action_serializes_camel_case() {
        let action = Action::new(Tier::Red, ActionModule::Shell, "d", "rm x").with_conversation("c1");
        let value = serde_json::to_value(&action).unwrap();
        assert_eq!(value["conversationId"], "c1");
        assert_eq!(value["status"], "pending");
        assert!(value.get("resolvedAt").is_none());
    }
}
