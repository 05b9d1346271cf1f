//! Data-driven tool descriptor
//!
//! A [`CatalogTool`] is a [`ToolWrapper`] built from values: identity
//! fields, an ordered list of detection [`Probe`]s and a table of
//! [`CatalogOperation`]s whose bodies are command [`Template`]s.
//!
//! ```text
//! detect():   probe 1 ──miss──▶ probe 2 ──miss──▶ ... ──▶ not installed
//!               │hit               │hit
//!               ▼                  ▼
//!            ToolStatus         ToolStatus
//!
//! execute():  resolve params ─▶ inject {tool_path}/{tool_dir} ─▶ render
//!             ─▶ run (fallback on failure) ─▶ shape output ─▶ OperationResult
//! ```
//!
//! Operations that reference `{tool_path}` or `{tool_dir}` get them from the
//! first existing entry of the tool's [`Probe::Paths`] list at call time.

use super::template::{Quoting, Template};
use actiongate_application::{ProcessError, ProcessRunner};
use actiongate_domain::{
    OperationResult, OperationSpec, Params, ToolDomain, ToolStatus, ToolWrapper,
};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const LISTING_PROBE_TIMEOUT: Duration = Duration::from_secs(15);
const POWERSHELL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameter names filled in from the located install path.
pub const TOOL_PATH_PARAM: &str = "tool_path";
pub const TOOL_DIR_PARAM: &str = "tool_dir";

/// How a version string is read from probe output.
#[derive(Debug, Clone)]
pub enum VersionParse {
    Ignore,
    Trimmed,
    FirstLine,
    /// First capture group; whole trimmed output when it does not match
    Capture(Regex),
}

impl VersionParse {
    fn extract(&self, output: &str) -> Option<String> {
        let version = match self {
            Self::Ignore => return None,
            Self::Trimmed => output.trim().to_string(),
            Self::FirstLine => output.lines().next().unwrap_or_default().trim().to_string(),
            Self::Capture(re) => re
                .captures(output)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| output.trim().to_string()),
        };
        (!version.is_empty()).then_some(version)
    }
}

/// One way of finding out whether a tool is installed.
#[derive(Debug, Clone)]
pub enum Probe {
    /// Installed when the command exits 0 (and prints something, if required)
    Command {
        command: String,
        powershell: bool,
        timeout: Duration,
        version: VersionParse,
        path: Option<String>,
        require_output: bool,
    },
    /// Installed when the command's output contains `marker`
    Listing {
        command: String,
        marker: String,
        version: Option<Regex>,
    },
    /// Installed when any of the paths exists; `%VAR%` is expanded
    Paths(Vec<String>),
    /// Built into this program
    Always,
}

impl Probe {
    /// `<tool> --version`, reporting the trimmed output as version.
    pub fn version(command: impl Into<String>) -> Self {
        Self::version_with(command, VersionParse::Trimmed)
    }

    pub fn version_with(command: impl Into<String>, version: VersionParse) -> Self {
        Self::Command {
            command: command.into(),
            powershell: false,
            timeout: VERSION_PROBE_TIMEOUT,
            version,
            path: None,
            require_output: false,
        }
    }

    /// Version read through a regex with one capture group.
    pub fn version_matching(command: impl Into<String>, pattern: &str) -> Self {
        match Regex::new(pattern) {
            Ok(re) => Self::version_with(command, VersionParse::Capture(re)),
            Err(_) => Self::version(command),
        }
    }

    /// Installed when the command succeeds; no version.
    pub fn succeeds(command: impl Into<String>) -> Self {
        Self::version_with(command, VersionParse::Ignore)
    }

    /// An installed PowerShell module, versioned from `Get-Module`.
    pub fn powershell_module(module: &str) -> Self {
        Self::Command {
            command: format!(
                "Get-Module -ListAvailable {} | Select-Object -ExpandProperty Version | Select-Object -First 1",
                module
            ),
            powershell: true,
            timeout: LISTING_PROBE_TIMEOUT,
            version: VersionParse::Trimmed,
            path: None,
            require_output: true,
        }
    }

    /// Any working PowerShell.
    pub fn powershell() -> Self {
        Self::Command {
            command: "$PSVersionTable.PSVersion.Major".to_string(),
            powershell: true,
            timeout: POWERSHELL_PROBE_TIMEOUT,
            version: VersionParse::Ignore,
            path: None,
            require_output: false,
        }
    }

    /// A winget listing for package `id` whose output mentions `marker`.
    pub fn winget(id: &str, marker: impl Into<String>) -> Self {
        Self::listing(
            format!("winget list --id {} --accept-source-agreements 2>&1", id),
            marker,
        )
    }

    pub fn listing(command: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::Listing {
            command: command.into(),
            marker: marker.into(),
            version: None,
        }
    }

    pub fn paths(paths: &[&str]) -> Self {
        Self::Paths(paths.iter().map(|p| p.to_string()).collect())
    }

    /// Report `path` when a command probe succeeds.
    pub fn with_path(mut self, reported: impl Into<String>) -> Self {
        if let Self::Command { path, .. } = &mut self {
            *path = Some(reported.into());
        }
        self
    }

    /// Read the version of a listing probe through a regex.
    pub fn with_version_pattern(mut self, pattern: &str) -> Self {
        if let Self::Listing { version, .. } = &mut self {
            *version = Regex::new(pattern).ok();
        }
        self
    }

    async fn run(&self, runner: &dyn ProcessRunner) -> Option<ToolStatus> {
        match self {
            Self::Always => Some(ToolStatus::installed()),
            Self::Paths(paths) => first_existing(paths)
                .await
                .map(|path| ToolStatus::installed().with_path(path)),
            Self::Command {
                command,
                powershell,
                timeout,
                version,
                path,
                require_output,
            } => {
                let program = if *powershell { "powershell" } else { program_of(command) };
                if !runner.is_available(program) {
                    trace!(program, "Not on PATH");
                    return None;
                }
                let result = if *powershell {
                    runner.run_powershell(command, *timeout).await
                } else {
                    runner.run(command, *timeout).await
                };
                let output = result.ok()?;
                if *require_output && output.trim().is_empty() {
                    return None;
                }

                let mut status = ToolStatus::installed();
                if let Some(v) = version.extract(&output) {
                    status = status.with_version(v);
                }
                if let Some(p) = path {
                    status = status.with_path(p.clone());
                }
                Some(status)
            }
            Self::Listing {
                command,
                marker,
                version,
            } => {
                if !runner.is_available(program_of(command)) {
                    return None;
                }
                let output = runner.run(command, LISTING_PROBE_TIMEOUT).await.ok()?;
                if !output.contains(marker.as_str()) {
                    return None;
                }
                let version = version
                    .as_ref()
                    .and_then(|re| re.captures(&output))
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().to_string());
                Some(match version {
                    Some(v) => ToolStatus::installed().with_version(v),
                    None => ToolStatus::installed(),
                })
            }
        }
    }
}

fn program_of(command: &str) -> &str {
    command.split_whitespace().next().unwrap_or_default()
}

/// Expand `%NAME%` environment references. Unknown names stay as written.
pub fn expand_env(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('%').filter(|&end| end > 0) else {
            break;
        };
        match std::env::var(&after[..end]) {
            Ok(value) => {
                out.push_str(&rest[..start]);
                out.push_str(&value);
            }
            Err(_) => out.push_str(&rest[..start + end + 2]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

async fn first_existing(paths: &[String]) -> Option<String> {
    for path in paths {
        let expanded = expand_env(path);
        if tokio::fs::try_exists(&expanded).await.unwrap_or(false) {
            return Some(expanded);
        }
    }
    None
}

/// Parent directory of a Windows or POSIX path.
fn parent_dir(path: &str) -> &str {
    path.rsplit_once(['\\', '/'])
        .map(|(dir, _)| dir)
        .unwrap_or(path)
}

#[derive(Debug, Clone)]
struct Step {
    command: Template,
    timeout: Duration,
    output: Option<Template>,
    empty_output: Option<Template>,
    fallback: Option<(Template, Duration)>,
    on_error: Option<Template>,
    error_hints: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Body {
    Run(Box<Step>),
    /// Titled steps naming other `Run` operations of the same tool
    Sequence(Vec<(String, String)>),
}

/// One declared operation and how it runs.
#[derive(Debug, Clone)]
pub struct CatalogOperation {
    spec: OperationSpec,
    body: Body,
}

impl CatalogOperation {
    pub fn new(spec: OperationSpec, command: Template) -> Self {
        Self {
            spec,
            body: Body::Run(Box::new(Step {
                command,
                timeout: DEFAULT_OPERATION_TIMEOUT,
                output: None,
                empty_output: None,
                fallback: None,
                on_error: None,
                error_hints: Vec::new(),
            })),
        }
    }

    /// Run other operations in order and combine their output under
    /// `=== title ===` headers. Succeeds only when every step succeeds.
    pub fn sequence(spec: OperationSpec, steps: &[(&str, &str)]) -> Self {
        Self {
            spec,
            body: Body::Sequence(
                steps
                    .iter()
                    .map(|(title, op)| (title.to_string(), op.to_string()))
                    .collect(),
            ),
        }
    }

    pub fn spec(&self) -> &OperationSpec {
        &self.spec
    }

    fn step_mut(&mut self) -> Option<&mut Step> {
        match &mut self.body {
            Body::Run(step) => Some(step.as_mut()),
            Body::Sequence(_) => None,
        }
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        if let Some(step) = self.step_mut() {
            step.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Replace stdout with a fixed message on success.
    pub fn output(mut self, message: impl Into<Template>) -> Self {
        if let Some(step) = self.step_mut() {
            step.output = Some(message.into());
        }
        self
    }

    /// Message used when the command succeeds without printing anything.
    pub fn or_output(mut self, message: impl Into<Template>) -> Self {
        if let Some(step) = self.step_mut() {
            step.empty_output = Some(message.into());
        }
        self
    }

    /// Second command tried when the first one fails.
    pub fn fallback(mut self, command: Template, timeout_secs: u64) -> Self {
        if let Some(step) = self.step_mut() {
            step.fallback = Some((command, Duration::from_secs(timeout_secs)));
        }
        self
    }

    /// Failure message template; `{error}` is the process error.
    pub fn on_error(mut self, message: impl Into<Template>) -> Self {
        if let Some(step) = self.step_mut() {
            step.on_error = Some(message.into());
        }
        self
    }

    /// Replace the failure message when the process error contains `marker`.
    pub fn error_hint(mut self, marker: impl Into<String>, message: impl Into<String>) -> Self {
        if let Some(step) = self.step_mut() {
            step.error_hints.push((marker.into(), message.into()));
        }
        self
    }
}

/// A [`ToolWrapper`] assembled from catalog data.
pub struct CatalogTool {
    id: String,
    name: String,
    description: String,
    domain: ToolDomain,
    install_method: Option<String>,
    install_command: Option<String>,
    probes: Vec<Probe>,
    specs: Vec<OperationSpec>,
    bodies: HashMap<String, Body>,
    runner: Arc<dyn ProcessRunner>,
}

impl CatalogTool {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        id: impl Into<String>,
        name: impl Into<String>,
        domain: ToolDomain,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            domain,
            install_method: None,
            install_command: None,
            probes: Vec::new(),
            specs: Vec::new(),
            bodies: HashMap::new(),
            runner,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_install(mut self, method: impl Into<String>, command: Option<&str>) -> Self {
        self.install_method = Some(method.into());
        self.install_command = command.map(str::to_string);
        self
    }

    /// Add a detection probe. Probes are tried in insertion order.
    pub fn with_probe(mut self, probe: Probe) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn with_operation(mut self, operation: CatalogOperation) -> Self {
        self.bodies.insert(operation.spec.id.clone(), operation.body);
        self.specs.push(operation.spec);
        self
    }

    async fn locate(&self) -> Option<String> {
        for probe in &self.probes {
            if let Probe::Paths(paths) = probe
                && let Some(found) = first_existing(paths).await
            {
                return Some(found);
            }
        }
        None
    }

    async fn run_operation(&self, operation_id: &str, params: &Params) -> Result<String, String> {
        match self.bodies.get(operation_id) {
            Some(Body::Run(step)) => self.run_step(operation_id, step, params).await,
            Some(Body::Sequence(steps)) => self.run_sequence(steps, params).await,
            None => Err(format!("Unknown operation for {}: {}", self.id, operation_id)),
        }
    }

    async fn run_step(&self, operation_id: &str, step: &Step, params: &Params) -> Result<String, String> {
        let mut params = self
            .operation(operation_id)
            .map(|spec| spec.resolve_params(params))
            .unwrap_or_else(|| Ok(params.clone()))?;

        let needs_location = [TOOL_PATH_PARAM, TOOL_DIR_PARAM].iter().any(|p| {
            step.command.mentions(p)
                || step.fallback.as_ref().is_some_and(|(f, _)| f.mentions(p))
        });
        if needs_location {
            let path = self
                .locate()
                .await
                .ok_or_else(|| format!("{} not found in any known location", self.name))?;
            params.insert(TOOL_DIR_PARAM.to_string(), parent_dir(&path).to_string());
            params.insert(TOOL_PATH_PARAM.to_string(), path);
        }

        let primary = self.run_template(&step.command, &params, step.timeout).await;
        let result = match (primary, &step.fallback) {
            (Err(e), Some((fallback, timeout))) => {
                debug!(tool = %self.id, operation = operation_id, error = %e, "Primary command failed, trying fallback");
                self.run_template(fallback, &params, *timeout).await
            }
            (result, _) => result,
        };

        match result {
            Ok(stdout) => Ok(match (&step.output, &step.empty_output) {
                (Some(fixed), _) => fixed.render(&params),
                (None, Some(message)) if stdout.is_empty() => message.render(&params),
                _ => stdout,
            }),
            Err(e) => Err(describe_error(step, &params, &e)),
        }
    }

    async fn run_sequence(&self, steps: &[(String, String)], params: &Params) -> Result<String, String> {
        let mut sections = Vec::with_capacity(steps.len() * 2);
        let mut all_ok = true;

        for (title, operation_id) in steps {
            let outcome = match self.bodies.get(operation_id) {
                Some(Body::Run(step)) => self.run_step(operation_id, step, params).await,
                _ => Err(format!("Unknown operation for {}: {}", self.id, operation_id)),
            };
            sections.push(format!("=== {} ===", title));
            match outcome {
                Ok(output) => sections.push(output),
                Err(error) => {
                    all_ok = false;
                    sections.push(error);
                }
            }
        }

        let combined = sections.join("\n");
        if all_ok { Ok(combined) } else { Err(combined) }
    }

    async fn run_template(
        &self,
        template: &Template,
        params: &Params,
        timeout: Duration,
    ) -> Result<String, ProcessError> {
        let command = template.render(params);
        trace!(tool = %self.id, command = %command, "Running");
        match template.quoting() {
            Quoting::PowerShell => self.runner.run_powershell(&command, timeout).await,
            Quoting::Shell | Quoting::Verbatim => self.runner.run(&command, timeout).await,
        }
    }
}

fn describe_error(step: &Step, params: &Params, error: &ProcessError) -> String {
    let message = error.to_string();
    if let Some((_, hint)) = step
        .error_hints
        .iter()
        .find(|(marker, _)| message.contains(marker.as_str()))
    {
        return hint.clone();
    }
    match &step.on_error {
        Some(template) => {
            let mut params = params.clone();
            params.insert("error".to_string(), message);
            template.render(&params)
        }
        None => message,
    }
}

impl std::fmt::Debug for CatalogTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogTool")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("operations", &self.specs.len())
            .finish()
    }
}

#[async_trait]
impl ToolWrapper for CatalogTool {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn domain(&self) -> ToolDomain {
        self.domain
    }

    fn install_method(&self) -> Option<&str> {
        self.install_method.as_deref()
    }

    fn install_command(&self) -> Option<&str> {
        self.install_command.as_deref()
    }

    async fn detect(&self) -> ToolStatus {
        for probe in &self.probes {
            if let Some(status) = probe.run(self.runner.as_ref()).await {
                debug!(tool = %self.id, version = ?status.version, "Detected");
                return status;
            }
        }
        ToolStatus::not_installed()
    }

    fn operations(&self) -> &[OperationSpec] {
        &self.specs
    }

    async fn execute(&self, operation_id: &str, params: &Params) -> OperationResult {
        let start = Instant::now();
        let outcome = self.run_operation(operation_id, params).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(output) => OperationResult::success(&self.id, output),
            Err(error) => OperationResult::failure(&self.id, error),
        }
        .with_duration(duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::template::quote;
    use actiongate_domain::{ParamDef, Tier};
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    /// Answers with the first scripted response whose key occurs in the
    /// command line. Unscripted commands fail.
    struct ScriptedRunner {
        responses: Vec<(&'static str, Result<String, ProcessError>)>,
        available: bool,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(responses: Vec<(&'static str, Result<String, ProcessError>)>) -> Arc<Self> {
            Arc::new(Self {
                responses,
                available: true,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn nothing_on_path() -> Arc<Self> {
            Arc::new(Self {
                responses: Vec::new(),
                available: false,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessRunner for ScriptedRunner {
        async fn run(&self, command_line: &str, _timeout: Duration) -> Result<String, ProcessError> {
            self.calls.lock().unwrap().push(command_line.to_string());
            self.responses
                .iter()
                .find(|(key, _)| command_line.contains(key))
                .map(|(_, r)| r.clone())
                .unwrap_or_else(|| Err(ProcessError::Failed("not scripted".into())))
        }

        fn is_available(&self, _program: &str) -> bool {
            self.available
        }
    }

    fn ok(s: &str) -> Result<String, ProcessError> {
        Ok(s.to_string())
    }

    fn fail(s: &str) -> Result<String, ProcessError> {
        Err(ProcessError::Failed(s.to_string()))
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn spec(id: &str) -> OperationSpec {
        OperationSpec::new(id, id, "", Tier::Green)
    }

    fn tool(runner: Arc<ScriptedRunner>) -> CatalogTool {
        CatalogTool::new(runner, "demo", "Demo", ToolDomain::Packages)
    }

    // ==================== Detection ====================

    #[tokio::test]
    async fn test_always_probe() {
        let t = tool(ScriptedRunner::new(vec![])).with_probe(Probe::Always);
        assert!(t.detect().await.installed);
    }

    #[tokio::test]
    async fn test_version_probe_with_pattern() {
        let runner = ScriptedRunner::new(vec![("chezmoi --version", ok("chezmoi version v2.52.1, commit abc"))]);
        let t = tool(runner).with_probe(Probe::version_matching(
            "chezmoi --version",
            r"chezmoi version v?(\S+?),?\s",
        ));
        let status = t.detect().await;
        assert!(status.installed);
        assert_eq!(status.version.as_deref(), Some("2.52.1"));
    }

    #[tokio::test]
    async fn test_first_line_version() {
        let runner = ScriptedRunner::new(vec![("scoop --version", ok("v0.5.2\nother noise"))]);
        let t = tool(runner).with_probe(Probe::version_with("scoop --version", VersionParse::FirstLine));
        assert_eq!(t.detect().await.version.as_deref(), Some("v0.5.2"));
    }

    #[tokio::test]
    async fn test_probe_skipped_when_program_missing() {
        let runner = ScriptedRunner::nothing_on_path();
        let t = tool(runner.clone()).with_probe(Probe::version("winget --version"));
        assert!(!t.detect().await.installed);
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_listing_probe_needs_marker_then_falls_through() {
        let runner = ScriptedRunner::new(vec![
            ("winget list", ok("No installed package found matching input criteria.")),
            ("pip show", ok("Name: aifiles\nVersion: 1.4.0")),
        ]);
        let t = tool(runner)
            .with_probe(Probe::winget("Foo.Bar", "Foo.Bar"))
            .with_probe(Probe::listing("pip show aifiles 2>&1", "Version:").with_version_pattern(r"Version:\s*(\S+)"));
        let status = t.detect().await;
        assert!(status.installed);
        assert_eq!(status.version.as_deref(), Some("1.4.0"));
    }

    #[tokio::test]
    async fn test_powershell_module_probe_requires_output() {
        let runner = ScriptedRunner::new(vec![("Get-Module", ok(""))]);
        let t = tool(runner).with_probe(Probe::powershell_module("PSWindowsUpdate"));
        assert!(!t.detect().await.installed);
    }

    #[tokio::test]
    async fn test_command_probe_reports_fixed_path() {
        let runner = ScriptedRunner::new(vec![("pnputil /?", ok("usage"))]);
        let t = tool(runner).with_probe(Probe::succeeds("pnputil /?").with_path("C:\\Windows\\System32\\pnputil.exe"));
        let status = t.detect().await;
        assert_eq!(status.path.as_deref(), Some("C:\\Windows\\System32\\pnputil.exe"));
        assert!(status.version.is_none());
    }

    #[tokio::test]
    async fn test_paths_probe() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("Tool.exe");
        std::fs::write(&exe, b"").unwrap();

        let missing = dir.path().join("missing.exe");
        let t = tool(ScriptedRunner::new(vec![])).with_probe(Probe::paths(&[
            missing.to_str().unwrap(),
            exe.to_str().unwrap(),
        ]));
        let status = t.detect().await;
        assert!(status.installed);
        assert_eq!(status.path.as_deref(), exe.to_str());
    }

    #[test]
    fn test_expand_env_keeps_unknown_names() {
        assert_eq!(
            expand_env("%ACTIONGATE_SURELY_UNSET_VAR%\\x"),
            "%ACTIONGATE_SURELY_UNSET_VAR%\\x"
        );
        assert_eq!(expand_env("C:\\100%"), "C:\\100%");
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("C:\\tools\\Sophia\\Sophia.ps1"), "C:\\tools\\Sophia");
        assert_eq!(parent_dir("/opt/tool/run.sh"), "/opt/tool");
    }

    // ==================== Execution ====================

    #[tokio::test]
    async fn test_execute_renders_and_runs() {
        let runner = ScriptedRunner::new(vec![("scoop search", ok("git 2.45"))]);
        let t = tool(runner.clone()).with_operation(CatalogOperation::new(
            spec("scoop-search").with_param(ParamDef::required("query", "")),
            Template::shell("scoop search {query}"),
        ));

        let result = t.execute("scoop-search", &params(&[("query", "git")])).await;
        assert!(result.success);
        assert_eq!(result.tool_id, "demo");
        assert_eq!(result.output.as_deref(), Some("git 2.45"));
        assert_eq!(runner.calls(), vec!["scoop search git"]);
    }

    #[tokio::test]
    async fn test_missing_required_param_fails_without_running() {
        let runner = ScriptedRunner::new(vec![]);
        let t = tool(runner.clone()).with_operation(CatalogOperation::new(
            spec("scoop-search").with_param(ParamDef::required("query", "")),
            Template::shell("scoop search {query}"),
        ));

        let result = t.execute("scoop-search", &Params::new()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Missing required parameter: query"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let t = tool(ScriptedRunner::new(vec![]));
        let result = t.execute("nope", &Params::new()).await;
        assert_eq!(result.error.as_deref(), Some("Unknown operation for demo: nope"));
    }

    #[tokio::test]
    async fn test_default_param_and_override() {
        let runner = ScriptedRunner::new(vec![("winget upgrade", ok("done"))]);
        let t = tool(runner.clone()).with_operation(CatalogOperation::new(
            spec("winget-upgrade").with_param(ParamDef::optional("id", "").with_default("all")),
            Template::shell("winget upgrade {id}").when("id", "all", "winget upgrade --all"),
        ));

        t.execute("winget-upgrade", &Params::new()).await;
        assert_eq!(runner.calls(), vec!["winget upgrade --all"]);
    }

    #[tokio::test]
    async fn test_powershell_template_uses_powershell() {
        let runner = ScriptedRunner::new(vec![("Get-Service", ok("svc"))]);
        let t = tool(runner.clone()).with_operation(CatalogOperation::new(
            spec("services"),
            Template::powershell("Get-Service | Where-Object { $_.Status -eq 'Running' }"),
        ));

        t.execute("services", &Params::new()).await;
        assert!(runner.calls()[0].starts_with("powershell -NoProfile -Command \"Get-Service"));
    }

    #[tokio::test]
    async fn test_fixed_and_empty_output() {
        let runner = ScriptedRunner::new(vec![("start", ok("")), ("chezmoi status", ok(""))]);
        let t = tool(runner)
            .with_operation(
                CatalogOperation::new(spec("launch"), Template::shell("start \"\" \"App.exe\""))
                    .output("App launched."),
            )
            .with_operation(
                CatalogOperation::new(spec("status"), Template::shell("chezmoi status"))
                    .or_output("All managed files are up to date."),
            );

        let launched = t.execute("launch", &Params::new()).await;
        assert_eq!(launched.output.as_deref(), Some("App launched."));
        let status = t.execute("status", &Params::new()).await;
        assert_eq!(status.output.as_deref(), Some("All managed files are up to date."));
    }

    #[tokio::test]
    async fn test_fallback_command() {
        let runner = ScriptedRunner::new(vec![
            ("winget upgrade", fail("winget broke")),
            ("Win32_VideoController", ok("Name: NVIDIA RTX")),
        ]);
        let t = tool(runner.clone()).with_operation(
            CatalogOperation::new(spec("check"), Template::shell("winget upgrade --id X"))
                .fallback(Template::powershell("Get-WmiObject Win32_VideoController"), 15),
        );

        let result = t.execute("check", &Params::new()).await;
        assert!(result.success);
        assert_eq!(result.output.as_deref(), Some("Name: NVIDIA RTX"));
        assert_eq!(runner.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_template_and_hint() {
        let runner = ScriptedRunner::new(vec![
            ("SDIO.exe", fail("not recognized")),
            ("komorebic state", fail("No connection could be made")),
        ]);
        let t = tool(runner)
            .with_operation(
                CatalogOperation::new(spec("scan"), Template::shell("SDIO.exe -checkupdates"))
                    .on_error("SDIO scan failed: {error}. Launch it manually."),
            )
            .with_operation(
                CatalogOperation::new(spec("state"), Template::shell("komorebic state"))
                    .error_hint("No connection", "komorebi is not running."),
            );

        let scan = t.execute("scan", &Params::new()).await;
        assert_eq!(
            scan.error.as_deref(),
            Some("SDIO scan failed: not recognized. Launch it manually.")
        );
        let state = t.execute("state", &Params::new()).await;
        assert_eq!(state.error.as_deref(), Some("komorebi is not running."));
    }

    #[tokio::test]
    async fn test_tool_path_injection() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("Setup.ps1");
        std::fs::write(&script, b"").unwrap();
        let script_path = script.to_str().unwrap().to_string();

        let runner = ScriptedRunner::new(vec![("Setup.ps1", ok("ok"))]);
        let t = tool(runner.clone())
            .with_probe(Probe::Paths(vec![script_path.clone()]))
            .with_operation(CatalogOperation::new(
                spec("run"),
                Template::powershell("Set-Location {tool_dir}; & {tool_path} -Silent"),
            ));

        let result = t.execute("run", &Params::new()).await;
        assert!(result.success);
        let call = &runner.calls()[0];
        assert!(call.contains(&format!("& {} -Silent", quote(&script_path, Quoting::PowerShell))));
        assert!(call.contains(&format!("Set-Location {}", quote(dir.path().to_str().unwrap(), Quoting::PowerShell))));
    }

    #[tokio::test]
    async fn test_tool_path_missing_fails() {
        let runner = ScriptedRunner::new(vec![]);
        let t = tool(runner.clone())
            .with_probe(Probe::paths(&["/definitely/not/here/Setup.ps1"]))
            .with_operation(CatalogOperation::new(spec("run"), Template::powershell("& {tool_path}")));

        let result = t.execute("run", &Params::new()).await;
        assert_eq!(result.error.as_deref(), Some("Demo not found in any known location"));
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sequence_combines_sections() {
        let runner = ScriptedRunner::new(vec![
            ("step-a", ok("A done")),
            ("step-b", fail("B failed")),
        ]);
        let t = tool(runner)
            .with_operation(CatalogOperation::new(spec("a"), Template::shell("step-a")))
            .with_operation(CatalogOperation::new(spec("b"), Template::shell("step-b")))
            .with_operation(CatalogOperation::sequence(spec("all"), &[("Step A", "a"), ("Step B", "b")]));

        let result = t.execute("all", &Params::new()).await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("=== Step A ===\nA done\n=== Step B ===\nB failed")
        );
    }

    #[test]
    fn test_info_lists_capabilities() {
        let t = tool(ScriptedRunner::new(vec![]))
            .with_install("winget", Some("winget install Demo"))
            .with_operation(CatalogOperation::new(
                OperationSpec::new("demo-a", "Do A", "", Tier::Green),
                Template::shell("a"),
            ));
        let info = t.info(&ToolStatus::installed());
        assert_eq!(info.capabilities, vec!["Do A"]);
        assert_eq!(info.install_command.as_deref(), Some("winget install Demo"));
    }
}
