//! Package managers: winget, Scoop, Chocolatey.

use crate::tools::catalog_tool::{CatalogOperation, CatalogTool, Probe, VersionParse};
use crate::tools::template::Template;
use actiongate_application::ProcessRunner;
use actiongate_domain::{DomainOrchestrator, OperationSpec, ParamDef, Params, Tier, ToolDomain};
use std::sync::Arc;

/// Map the generic `package` parameter onto each manager's own name, and
/// turn `upgrade-all` into that manager's "everything" value.
pub fn normalize_package_params(intent: &str, params: &Params, tool_id: &str) -> Params {
    let mut normalized = params.clone();

    if let Some(package) = params.get("package") {
        let key = if tool_id == "winget" { "id" } else { "name" };
        normalized.insert(key.to_string(), package.clone());
        normalized.insert("query".to_string(), package.clone());
    }

    if intent == "upgrade-all" {
        let everything = match tool_id {
            "winget" => Some(("id", "all")),
            "scoop" => Some(("name", "*")),
            "chocolatey" => Some(("name", "all")),
            _ => None,
        };
        if let Some((key, value)) = everything {
            normalized.insert(key.to_string(), value.to_string());
        }
    }

    normalized
}

fn search_spec(id: &str, description: &str) -> OperationSpec {
    OperationSpec::new(id, "Search packages", description, Tier::Green)
        .with_param(ParamDef::required("query", "Package name or keyword"))
}

fn winget(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "winget", "winget", ToolDomain::Packages)
        .with_description("Windows Package Manager (built-in). Install, update, and manage software.")
        .with_install("built-in", None)
        .with_probe(Probe::version("winget --version"))
        .with_operation(
            CatalogOperation::new(
                search_spec("winget-search", "Search for available packages"),
                Template::shell("winget search {query} --accept-source-agreements"),
            )
            .timeout_secs(30),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("winget-list", "List installed", "List all installed packages", Tier::Green),
                Template::shell("winget list --accept-source-agreements"),
            )
            .timeout_secs(60),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("winget-install", "Install package", "Install a package by ID", Tier::Yellow)
                    .with_param(ParamDef::required("id", "Package ID (e.g. Mozilla.Firefox)")),
                Template::shell(
                    "winget install {id} --accept-package-agreements --accept-source-agreements",
                ),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "winget-upgrade",
                    "Upgrade package",
                    "Upgrade a specific package or all packages",
                    Tier::Yellow,
                )
                .with_param(
                    ParamDef::optional("id", "Package ID, or 'all' for everything").with_default("all"),
                ),
                Template::shell(
                    "winget upgrade {id} --accept-package-agreements --accept-source-agreements",
                )
                .when(
                    "id",
                    "all",
                    "winget upgrade --all --accept-package-agreements --accept-source-agreements",
                ),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("winget-uninstall", "Uninstall package", "Remove an installed package", Tier::Red)
                    .with_param(ParamDef::required("id", "Package ID to remove")),
                Template::shell("winget uninstall {id}"),
            )
            .timeout_secs(120),
        )
}

fn scoop(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "scoop", "Scoop", ToolDomain::Packages)
        .with_description("Developer-friendly package manager. Installs to ~/scoop, no admin needed.")
        .with_install("script", Some("irm get.scoop.sh | iex"))
        .with_probe(Probe::version_with("scoop --version", VersionParse::FirstLine))
        .with_operation(
            CatalogOperation::new(
                search_spec("scoop-search", "Search Scoop buckets for packages"),
                Template::shell("scoop search {query}"),
            )
            .timeout_secs(30),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("scoop-list", "List installed", "List all Scoop-installed packages", Tier::Green),
                Template::shell("scoop list"),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("scoop-install", "Install package", "Install a package via Scoop", Tier::Yellow)
                    .with_param(ParamDef::required("name", "Package name (e.g. git, nodejs)")),
                Template::shell("scoop install {name}"),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "scoop-update",
                    "Update packages",
                    "Update a specific package or all packages",
                    Tier::Yellow,
                )
                .with_param(ParamDef::optional("name", "Package name, or '*' for all").with_default("*")),
                // `*` is quoted on substitution, so the shell does not glob it
                Template::shell("scoop update {name}"),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("scoop-uninstall", "Uninstall package", "Remove a Scoop-installed package", Tier::Red)
                    .with_param(ParamDef::required("name", "Package name to remove")),
                Template::shell("scoop uninstall {name}"),
            )
            .timeout_secs(120),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "scoop-bucket-add",
                    "Add bucket",
                    "Add a Scoop bucket (extras, versions, etc.)",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("bucket", "Bucket name (e.g. extras, versions, java)")),
                Template::shell("scoop bucket add {bucket}"),
            )
            .timeout_secs(60),
        )
}

fn chocolatey(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "chocolatey", "Chocolatey", ToolDomain::Packages)
        .with_description("Enterprise-grade Windows package manager. Requires admin for most operations.")
        .with_install("script", Some("winget install Chocolatey.Chocolatey"))
        .with_probe(Probe::version("choco --version"))
        .with_operation(
            CatalogOperation::new(
                search_spec("choco-search", "Search Chocolatey community repository"),
                Template::shell("choco search {query}"),
            )
            .timeout_secs(30),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("choco-list", "List installed", "List all Chocolatey-installed packages", Tier::Green),
                Template::shell("choco list"),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "choco-install",
                    "Install package",
                    "Install a package via Chocolatey (may require admin)",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("name", "Package name (e.g. firefox, vscode)")),
                Template::shell("choco install {name} -y"),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "choco-upgrade",
                    "Upgrade packages",
                    "Upgrade a specific package or all packages",
                    Tier::Yellow,
                )
                .with_param(ParamDef::optional("name", "Package name, or 'all' for everything").with_default("all")),
                Template::shell("choco upgrade {name} -y"),
            )
            .timeout_secs(300),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("choco-uninstall", "Uninstall package", "Remove a Chocolatey-installed package", Tier::Red)
                    .with_param(ParamDef::required("name", "Package name to remove")),
                Template::shell("choco uninstall {name} -y"),
            )
            .timeout_secs(120),
        )
}

pub fn orchestrator(runner: Arc<dyn ProcessRunner>) -> DomainOrchestrator {
    DomainOrchestrator::new(
        ToolDomain::Packages,
        "Package Management",
        "Install, update, search, and remove software packages",
    )
    .with_tool_noun("package manager")
    .with_remediation("Install winget, scoop, or chocolatey.")
    .with_normalizer(normalize_package_params)
    .with_tool(Arc::new(winget(runner.clone())))
    .with_tool(Arc::new(scoop(runner.clone())))
    .with_tool(Arc::new(chocolatey(runner)))
    .route("search", &[("winget", "winget-search"), ("scoop", "scoop-search"), ("chocolatey", "choco-search")])
    .route("list-installed", &[("winget", "winget-list"), ("scoop", "scoop-list"), ("chocolatey", "choco-list")])
    .route("install", &[("winget", "winget-install"), ("scoop", "scoop-install"), ("chocolatey", "choco-install")])
    .route("upgrade", &[("winget", "winget-upgrade"), ("scoop", "scoop-update"), ("chocolatey", "choco-upgrade")])
    .route("upgrade-all", &[("winget", "winget-upgrade"), ("scoop", "scoop-update"), ("chocolatey", "choco-upgrade")])
    .route("uninstall", &[("winget", "winget-uninstall"), ("scoop", "scoop-uninstall"), ("chocolatey", "choco-uninstall")])
    .route("add-bucket", &[("scoop", "scoop-bucket-add")])
}
