//! Console output formatter for actions and tools

use colored::{ColoredString, Colorize};
use actiongate_application::ExecutionResult;
use actiongate_domain::{
    Action, ActionStatus, OperationResult, Tier, ToolInfo, ToolOperationInfo,
};
use serde::Serialize;

/// Longest command shown in a listing before it is cut
const COMMAND_PREVIEW: usize = 72;

/// Formats actions and tool views for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Pretty JSON, `{}` if serialization fails
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn tier(tier: Tier) -> ColoredString {
        let label = format!("{:<6}", tier.as_str());
        match tier {
            Tier::Green => label.green().bold(),
            Tier::Yellow => label.yellow().bold(),
            Tier::Red => label.red().bold(),
        }
    }

    fn status(status: ActionStatus) -> ColoredString {
        let label = status.as_str();
        match status {
            ActionStatus::Pending => label.yellow(),
            ActionStatus::Approved | ActionStatus::Executed => label.green(),
            ActionStatus::Denied => label.dimmed(),
            ActionStatus::Failed => label.red(),
        }
    }

    fn preview(command: &str) -> String {
        let single_line = command.split_whitespace().collect::<Vec<_>>().join(" ");
        if single_line.chars().count() <= COMMAND_PREVIEW {
            single_line
        } else {
            let cut: String = single_line.chars().take(COMMAND_PREVIEW - 3).collect();
            format!("{}...", cut)
        }
    }

    /// One line per action
    pub fn format_actions(actions: &[Action]) -> String {
        if actions.is_empty() {
            return format!("{}\n", "No actions.".dimmed());
        }

        let mut output = String::new();
        for action in actions {
            output.push_str(&format!(
                "{} {} {:<9} {}\n",
                action.id.to_string().cyan(),
                Self::tier(action.tier),
                Self::status(action.status),
                action.description
            ));
            output.push_str(&format!(
                "    {} {}\n",
                format!("[{}]", action.module).dimmed(),
                Self::preview(&action.command)
            ));
        }
        output
    }

    /// Full view of one action, including its outcome
    pub fn format_action(action: &Action) -> String {
        let mut output = String::new();
        output.push_str(&format!("{} {}\n", "Action:".cyan().bold(), action.id));
        output.push_str(&format!("{} {}\n", "Tier:".cyan().bold(), Self::tier(action.tier)));
        output.push_str(&format!(
            "{} {}\n",
            "Status:".cyan().bold(),
            Self::status(action.status)
        ));
        output.push_str(&format!("{} {}\n", "Module:".cyan().bold(), action.module));
        output.push_str(&format!(
            "{} {}\n",
            "Description:".cyan().bold(),
            action.description
        ));
        output.push_str(&format!("{}\n{}\n", "Command:".cyan().bold(), action.command));

        if let Some(result) = &action.result
            && !result.is_empty()
        {
            output.push_str(&format!("\n{}\n{}\n", "Output:".green().bold(), result));
        }
        if let Some(error) = &action.error {
            output.push_str(&format!("\n{}\n{}\n", "Error:".red().bold(), error));
        }
        output
    }

    /// Known tools grouped by domain, in registry order
    pub fn format_tools(tools: &[ToolInfo]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools.".dimmed());
        }

        let mut output = String::new();
        let mut current_domain = None;
        for tool in tools {
            if current_domain != Some(tool.domain) {
                current_domain = Some(tool.domain);
                output.push_str(&format!("\n{}\n", format!("── {} ──", tool.domain).yellow().bold()));
            }

            let mark = if tool.installed { "v".green() } else { "x".dimmed() };
            let version = tool
                .version
                .as_deref()
                .map(|v| format!(" {}", v.dimmed()))
                .unwrap_or_default();
            output.push_str(&format!("  {} {:<18}{}\n", mark, tool.id, version));

            if !tool.installed
                && let Some(install) = &tool.install_command
            {
                output.push_str(&format!("      {} {}\n", "install:".dimmed(), install));
            }
        }
        output
    }

    pub fn format_operations(operations: &[ToolOperationInfo]) -> String {
        if operations.is_empty() {
            return format!("{}\n", "No installed tools offer operations. Run `actiongate tools scan`.".dimmed());
        }

        let mut output = String::new();
        for op in operations {
            output.push_str(&format!(
                "{} {:<32} {}\n",
                Self::tier(op.tier),
                op.id,
                op.name
            ));
            for param in &op.params {
                let required = if param.required { "" } else { "?" };
                output.push_str(&format!(
                    "         {}{} {}\n",
                    param.name.cyan(),
                    required,
                    param.description.dimmed()
                ));
            }
        }
        output
    }

    pub fn format_operation_result(result: &OperationResult) -> String {
        let header = format!("[{}] {}ms", result.tool_id, result.duration_ms);
        if result.success {
            format!(
                "{} {}\n{}\n",
                "OK".green().bold(),
                header.dimmed(),
                result.output.as_deref().unwrap_or_default()
            )
        } else {
            format!(
                "{} {}\n{}\n",
                "FAILED".red().bold(),
                header.dimmed(),
                result.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }

    pub fn format_execution(result: &ExecutionResult) -> String {
        match (result.success, &result.output, &result.error) {
            (true, output, _) => format!(
                "{}\n{}\n",
                "Executed".green().bold(),
                output.as_deref().unwrap_or_default()
            ),
            (false, _, error) => format!(
                "{}\n{}\n",
                "Failed".red().bold(),
                error.as_deref().unwrap_or("Unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actiongate_domain::ActionModule;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_preview_collapses_and_cuts() {
        assert_eq!(ConsoleFormatter::preview("Get-Process\n  | Sort"), "Get-Process | Sort");

        let long = "x".repeat(100);
        let preview = ConsoleFormatter::preview(&long);
        assert_eq!(preview.chars().count(), COMMAND_PREVIEW);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn test_format_actions_lists_each() {
        plain();
        let action = Action::new(Tier::Red, ActionModule::PowerShell, "Remove temp", "Remove-Item C:\\tmp -Recurse");
        let output = ConsoleFormatter::format_actions(std::slice::from_ref(&action));
        assert!(output.contains(&action.id.to_string()));
        assert!(output.contains("red"));
        assert!(output.contains("pending"));
        assert!(output.contains("[powershell] Remove-Item C:\\tmp -Recurse"));
    }

    #[test]
    fn test_format_empty_lists() {
        plain();
        assert_eq!(ConsoleFormatter::format_actions(&[]), "No actions.\n");
        assert_eq!(ConsoleFormatter::format_tools(&[]), "No tools.\n");
    }

    #[test]
    fn test_operation_result() {
        plain();
        let ok = OperationResult::success("winget", "Found 3").with_duration(12);
        assert_eq!(
            ConsoleFormatter::format_operation_result(&ok),
            "OK [winget] 12ms\nFound 3\n"
        );

        let failed = OperationResult::no_tool("No installed package manager available for intent: install.");
        assert!(ConsoleFormatter::format_operation_result(&failed).starts_with("FAILED [none]"));
    }

    #[test]
    fn test_json_uses_camel_case() {
        let action = Action::new(Tier::Yellow, ActionModule::Cmd, "List", "dir");
        let json = ConsoleFormatter::format_json(&action);
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"status\": \"pending\""));
    }
}
