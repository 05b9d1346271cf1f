//! Extraction of Actions from free-form AI output.
//!
//! Two fenced-block syntaxes are recognized:
//!
//! ```text
//! ```powershell | ```cmd | ```bash     -> one shell Action per non-empty block
//! ```actiongate-action                -> one tool-operation Action per valid JSON body
//! ```
//!
//! Structured blocks are collected first, then shell blocks in
//! powershell, cmd, bash order. Extraction is pure; persisting the result is
//! the caller's job.

use super::tier::classify_tier;
use crate::action::{Action, ActionModule, ToolOperationPayload};
use regex::Regex;
use std::sync::LazyLock;

/// Language tag of a structured tool-operation block.
pub const TOOL_ACTION_TAG: &str = "actiongate-action";

static TOOL_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```actiongate-action\r?\n(.*?)```").expect("tool block pattern is valid")
});

static SHELL_BLOCKS: LazyLock<Vec<(ActionModule, Regex)>> = LazyLock::new(|| {
    ["powershell", "cmd", "bash"]
        .into_iter()
        .filter_map(|tag| {
            let module = ActionModule::from_fence_tag(tag)?;
            let regex = Regex::new(&format!(r"(?s)```{}\r?\n(.*?)```", tag)).ok()?;
            Some((module, regex))
        })
        .collect()
});

/// Scan `text` and build one Action per recognized block.
///
/// Empty blocks yield nothing. A structured block with invalid JSON or
/// without `domain`/`intent` is skipped silently.
pub fn extract_actions(text: &str, conversation_id: &str) -> Vec<Action> {
    let mut actions = Vec::new();

    for caps in TOOL_BLOCK.captures_iter(text) {
        let body = caps.get(1).map_or("", |m| m.as_str()).trim();
        if body.is_empty() {
            continue;
        }
        let Some(payload) = ToolOperationPayload::parse_lenient(body) else {
            tracing::debug!("Skipping malformed {} block", TOOL_ACTION_TAG);
            continue;
        };

        actions.push(
            Action::new(
                payload.tier,
                ActionModule::ToolOperation,
                payload.description.clone(),
                payload.to_command(),
            )
            .with_conversation(conversation_id),
        );
    }

    for (module, regex) in SHELL_BLOCKS.iter() {
        for caps in regex.captures_iter(text) {
            let command = caps.get(1).map_or("", |m| m.as_str()).trim();
            if command.is_empty() {
                continue;
            }

            actions.push(
                Action::new(
                    classify_tier(command),
                    module.clone(),
                    format!("Execute {} command", module),
                    command,
                )
                .with_conversation(conversation_id),
            );
        }
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionStatus, Tier};

    #[test]
    fn test_powershell_block() {
        let actions = extract_actions("Here's a command:\n```powershell\nGet-Process\n```", "conv-1");

        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].command, "Get-Process");
        assert_eq!(actions[0].module, ActionModule::PowerShell);
        assert_eq!(actions[0].tier, Tier::Green);
        assert_eq!(actions[0].status, ActionStatus::Approved);
        assert_eq!(actions[0].conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(actions[0].description, "Execute powershell command");
    }

    #[test]
    fn test_cmd_block() {
        let actions = extract_actions("Run this:\n```cmd\ndir C:\\Users\n```", "conv-1");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].module, ActionModule::Cmd);
        assert_eq!(actions[0].tier, Tier::Green);
    }

    #[test]
    fn test_bash_block_is_shell_module() {
        let actions = extract_actions("Try:\n```bash\nnpm install express\n```", "conv-1");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].module, ActionModule::Shell);
        assert_eq!(actions[0].tier, Tier::Yellow);
        assert_eq!(actions[0].status, ActionStatus::Pending);
    }

    #[test]
    fn test_red_bash_block_is_pending() {
        let actions = extract_actions("```bash\nrm -rf /tmp\n```", "c");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].tier, Tier::Red);
        assert_eq!(actions[0].status, ActionStatus::Pending);
    }

    #[test]
    fn test_empty_block_yields_nothing() {
        assert!(extract_actions("```powershell\n\n```", "c").is_empty());
        assert!(extract_actions("```actiongate-action\n   \n```", "c").is_empty());
    }

    #[test]
    fn test_counts_shell_and_structured_blocks() {
        let text = [
            "Step 1:\n```powershell\nGet-Service\n```",
            "Step 2:\n```bash\nnpm install\n```",
            "```actiongate-action\n{\"domain\":\"packages\",\"intent\":\"install\",\"params\":{\"package\":\"git\"}}\n```",
            "```actiongate-action\n{\"domain\":\"packages\"}\n```",
            "```actiongate-action\n{not json}\n```",
            "```python\nprint('ignored')\n```",
        ]
        .join("\n");

        let actions = extract_actions(&text, "c");
        assert_eq!(actions.len(), 3);
        // Structured blocks come first
        assert_eq!(actions[0].module, ActionModule::ToolOperation);
        assert_eq!(actions[1].module, ActionModule::PowerShell);
        assert_eq!(actions[2].module, ActionModule::Shell);
    }

    #[test]
    fn test_structured_block_builds_payload() {
        let text = "```actiongate-action\n{\"domain\":\"drivers\",\"intent\":\"gpu-info\",\"tier\":\"green\"}\n```";
        let actions = extract_actions(text, "c");

        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.tier, Tier::Green);
        assert_eq!(action.status, ActionStatus::Approved);
        assert_eq!(action.description, "Tool operation: drivers/gpu-info");

        let payload = ToolOperationPayload::from_command(&action.command).unwrap();
        assert_eq!(payload.domain, "drivers");
        assert_eq!(payload.intent, "gpu-info");
    }

    #[test]
    fn test_extraction_is_not_idempotent() {
        let text = "```cmd\nipconfig /all\n```";
        let first = extract_actions(text, "c");
        let second = extract_actions(text, "c");
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);
    }

    #[test]
    fn test_crlf_fences() {
        let actions = extract_actions("```powershell\r\nGet-Date\r\n```", "c");
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].command, "Get-Date");
    }
}
