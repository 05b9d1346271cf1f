//! File operations: the built-in organizer plus aifiles, watchexec and TagSpaces.

use crate::tools::catalog_tool::{CatalogOperation, CatalogTool, Probe};
use crate::tools::organizer::OrganizerTool;
use crate::tools::template::Template;
use actiongate_application::ProcessRunner;
use actiongate_domain::{DomainOrchestrator, OperationSpec, ParamDef, Tier, ToolDomain};
use std::sync::Arc;

fn aifiles(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "aifiles", "aifiles", ToolDomain::FileOps)
        .with_description(
            "AI-powered file organizer using local LLMs (Ollama). Understands file content and names to create smart folder structures.",
        )
        .with_install("pip", Some("pip install aifiles"))
        .with_probe(Probe::version("aifiles --version 2>&1"))
        .with_probe(
            Probe::listing("pip show aifiles 2>&1", "Version:").with_version_pattern(r"Version:\s*(\S+)"),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "aifiles-organize",
                    "AI organize files",
                    "Use AI to analyze file names and organize them into smart folder structures",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("path", "Directory to organize"))
                .with_param(ParamDef::optional(
                    "destination",
                    "Destination directory (defaults to same as source)",
                )),
                Template::shell("aifiles organize {path}").with_optional("destination", " --dest {destination}"),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "aifiles-preview",
                    "AI organize preview",
                    "Preview what the AI would do without moving files",
                    Tier::Green,
                )
                .with_param(ParamDef::required("path", "Directory to preview")),
                Template::shell("aifiles organize {path} --dry-run"),
            )
            .timeout_secs(120),
        )
}

fn watchexec(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "watchexec", "watchexec", ToolDomain::FileOps)
        .with_description(
            "File change watcher that runs commands on file modifications. Useful for auto-organizing, auto-building, or triggering actions on file events.",
        )
        .with_install("winget", Some("winget install watchexec.watchexec"))
        .with_probe(Probe::version_matching("watchexec --version", r"watchexec\s+(\S+)"))
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "watchexec-watch",
                    "Watch directory",
                    "Watch a directory and run a command when files change",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("path", "Directory to watch"))
                .with_param(ParamDef::required("command", "Command to run on change"))
                .with_param(ParamDef::optional("filter", "File extension filter (e.g. '*.ts')")),
                Template::shell("start \"watchexec\" watchexec -w {path}{filter} -- {command}")
                    .flag("filter", " -e ")
                    .raw("command"),
            )
            .timeout_secs(10)
            .output(
                Template::text("Watcher started on {path}. Command \"{command}\" will run on file changes.")
                    .with_optional("filter", " Filter: {filter}"),
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "watchexec-watch-organize",
                    "Auto-organize on change",
                    "Watch a directory and auto-organize new files into category folders",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("path", "Directory to watch and organize")),
                Template::shell(
                    "start \"watchexec-organize\" watchexec -w {path} --debounce 5s -- powershell -NoProfile -Command \"Write-Host 'Change detected, organizing...'\"",
                ),
            )
            .timeout_secs(10)
            .output("Auto-organize watcher started on {path}. New files will be sorted into category folders."),
        )
}

const TAG_FILES: &str = "Get-ChildItem -Path {path} -File | ForEach-Object { $sidecar = Join-Path $_.DirectoryName ('.ts' + $_.Name + '.json'); if (-not (Test-Path $sidecar)) { @{tags=@({tag})} | ConvertTo-Json | Set-Content -Path $sidecar -Encoding UTF8; Write-Output ('Tagged: ' + $_.Name) } else { Write-Output ('Already tagged: ' + $_.Name) } }";

fn tagspaces(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "tagspaces", "TagSpaces", ToolDomain::FileOps)
        .with_description(
            "File tagging and organization app. Tag files with metadata, browse by tags, and manage file collections.",
        )
        .with_install("winget", Some("winget install TagSpaces.TagSpaces"))
        .with_probe(Probe::winget("TagSpaces.TagSpaces", "TagSpaces"))
        .with_probe(Probe::paths(&[
            "C:\\Program Files\\TagSpaces\\TagSpaces.exe",
            "%LOCALAPPDATA%\\Programs\\TagSpaces\\TagSpaces.exe",
        ]))
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "tagspaces-launch",
                    "Launch TagSpaces",
                    "Open TagSpaces for visual file tagging and browsing",
                    Tier::Green,
                )
                .with_param(ParamDef::optional("path", "Directory to open in TagSpaces")),
                Template::shell("start \"\" \"TagSpaces.exe\"").with_optional("path", " {path}"),
            )
            .timeout_secs(5)
            .output(Template::text("TagSpaces launched.").with_optional("path", " Opened: {path}")),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "tagspaces-tag-files",
                    "Tag files by extension",
                    "Add sidecar tags to files in a directory based on their extension type",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("path", "Directory containing files to tag"))
                .with_param(ParamDef::required("tag", "Tag to apply")),
                Template::powershell(TAG_FILES),
            )
            .timeout_secs(30),
        )
}

pub fn orchestrator(runner: Arc<dyn ProcessRunner>) -> DomainOrchestrator {
    DomainOrchestrator::new(
        ToolDomain::FileOps,
        "File Operations",
        "Organize, tag, watch, and sort files using built-in and external tools",
    )
    .with_tool_noun("file-ops tool")
    .with_remediation("The built-in organizer should always be available.")
    .with_tool(Arc::new(OrganizerTool::new()))
    .with_tool(Arc::new(aifiles(runner.clone())))
    .with_tool(Arc::new(watchexec(runner.clone())))
    .with_tool(Arc::new(tagspaces(runner)))
    .route("organize", &[("organize-tool", "organize-execute"), ("aifiles", "aifiles-organize")])
    .route("organize-preview", &[("organize-tool", "organize-preview"), ("aifiles", "aifiles-preview")])
    .route("ai-organize", &[("aifiles", "aifiles-organize"), ("organize-tool", "organize-execute")])
    .route("ai-organize-preview", &[("aifiles", "aifiles-preview"), ("organize-tool", "organize-preview")])
    .route("watch", &[("watchexec", "watchexec-watch")])
    .route("auto-organize", &[("watchexec", "watchexec-watch-organize")])
    .route("tag-files", &[("tagspaces", "tagspaces-tag-files")])
    .route("launch-tagger", &[("tagspaces", "tagspaces-launch")])
}
