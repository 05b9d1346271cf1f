//! Capability summary injected into the assistant's system prompt.

use super::orchestrator::DomainOrchestrator;
use crate::classifier::TOOL_ACTION_TAG;
use std::collections::HashSet;

/// Render the "Available Tools" prompt section.
///
/// Empty when nothing is installed. Otherwise lists, per orchestrator that
/// owns at least one installed tool, every intent with an installed tool in
/// its preference list. Orchestrators and intents keep their configured
/// order.
pub fn capabilities_summary<'a>(
    orchestrators: impl IntoIterator<Item = &'a DomainOrchestrator>,
    installed: &HashSet<String>,
) -> String {
    if installed.is_empty() {
        return String::new();
    }

    let mut lines = vec![
        "\n\n## Available Tools".to_string(),
        format!(
            "You can use these tools by emitting a `{}` code block. Format:",
            TOOL_ACTION_TAG
        ),
        format!(
            "```{}\n{{\"domain\":\"<domain>\",\"intent\":\"<intent>\",\"params\":{{}},\"tier\":\"<green|yellow|red>\",\"description\":\"<what this does>\"}}\n```",
            TOOL_ACTION_TAG
        ),
        String::new(),
    ];

    for orchestrator in orchestrators {
        let owns_installed = orchestrator
            .tools()
            .iter()
            .any(|tool| installed.contains(tool.id()));
        if !owns_installed {
            continue;
        }

        lines.push(format!("### {}", orchestrator.name()));
        for (intent, preference) in orchestrator.intent_map() {
            if preference.iter().any(|id| installed.contains(id)) {
                lines.push(format!("- intent: `{}`", intent));
            }
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
