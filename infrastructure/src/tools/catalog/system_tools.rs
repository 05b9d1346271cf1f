//! System tools: PowerToys, System Informer, chezmoi and komorebi.

use crate::tools::catalog_tool::{CatalogOperation, CatalogTool, Probe};
use crate::tools::template::Template;
use actiongate_application::ProcessRunner;
use actiongate_domain::{DomainOrchestrator, OperationSpec, ParamDef, Tier, ToolDomain};
use std::sync::Arc;

fn plain(id: &str, name: &str, description: &str, tier: Tier, command: &str, secs: u64) -> CatalogOperation {
    CatalogOperation::new(OperationSpec::new(id, name, description, tier), Template::shell(command))
        .timeout_secs(secs)
}

fn powertoys(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "powertoys", "PowerToys", ToolDomain::SystemTools)
        .with_description(
            "Microsoft productivity utilities: FancyZones, PowerRename, Color Picker, Always On Top, and more.",
        )
        .with_install("winget", Some("winget install Microsoft.PowerToys"))
        .with_probe(
            Probe::winget("Microsoft.PowerToys", "Microsoft.PowerToys").with_version_pattern(r"PowerToys\s+([\d.]+)"),
        )
        .with_operation(
            plain(
                "powertoys-launch",
                "Launch PowerToys",
                "Open the PowerToys settings window",
                Tier::Green,
                "start \"\" \"PowerToys.exe\"",
                5,
            )
            .fallback(Template::shell("start \"\" \"%LOCALAPPDATA%\\PowerToys\\PowerToys.exe\""), 5)
            .output("PowerToys settings launched."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "powertoys-status",
                    "PowerToys status",
                    "Check if PowerToys is running and list active modules",
                    Tier::Green,
                ),
                Template::powershell(
                    "Get-Process -Name 'PowerToys*' -ErrorAction SilentlyContinue | Select-Object Name, Id, CPU, WorkingSet64 | Format-Table -AutoSize | Out-String",
                ),
            )
            .timeout_secs(10)
            .or_output("No PowerToys processes running."),
        )
        .with_operation(plain(
            "powertoys-install",
            "Install PowerToys",
            "Install Microsoft PowerToys via winget",
            Tier::Yellow,
            "winget install Microsoft.PowerToys --accept-package-agreements --accept-source-agreements",
            300,
        ))
        .with_operation(plain(
            "powertoys-update",
            "Update PowerToys",
            "Update PowerToys to the latest version",
            Tier::Yellow,
            "winget upgrade Microsoft.PowerToys --accept-package-agreements --accept-source-agreements",
            300,
        ))
}

const TOP_PROCESSES: &str = "Get-Process | Sort-Object -Property {sort_property} -Descending | Select-Object -First 20 Name, Id, CPU, @{N='MemMB';E={[math]::Round($_.WorkingSet64/1MB,1)}} | Format-Table -AutoSize | Out-String -Width 120";

fn system_informer(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    let top = |property: &str| TOP_PROCESSES.replace("{sort_property}", property);

    CatalogTool::new(runner, "system-informer", "System Informer", ToolDomain::SystemTools)
        .with_description(
            "Advanced process manager (fork of Process Hacker). View processes, services, network connections, and system resource usage.",
        )
        .with_install("winget", Some("winget install winsiderss.SystemInformer"))
        .with_probe(Probe::winget("winsiderss.SystemInformer", "SystemInformer"))
        .with_probe(Probe::paths(&[
            "C:\\Program Files\\SystemInformer\\SystemInformer.exe",
            "C:\\tools\\SystemInformer\\SystemInformer.exe",
        ]))
        .with_operation(
            plain(
                "si-launch",
                "Launch System Informer",
                "Open System Informer for process and system inspection",
                Tier::Green,
                "start \"\" \"SystemInformer.exe\"",
                5,
            )
            .output("System Informer launched."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "si-top-processes",
                    "Top processes",
                    "List the top processes by CPU or memory usage",
                    Tier::Green,
                )
                .with_param(ParamDef::optional("sort", "Sort by: cpu or memory").with_default("cpu")),
                Template::powershell(top("CPU")).when("sort", "memory", top("WorkingSet64")),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "si-find-process",
                    "Find process",
                    "Search for a running process by name",
                    Tier::Green,
                )
                .with_param(ParamDef::required("name", "Process name to search for")),
                Template::powershell(
                    "Get-Process -Name ('*' + {name} + '*') -ErrorAction SilentlyContinue | Select-Object Name, Id, CPU, @{N='MemMB';E={[math]::Round($_.WorkingSet64/1MB,1)}}, Path | Format-Table -AutoSize | Out-String -Width 200",
                ),
            )
            .timeout_secs(10)
            .or_output("No processes matching \"{name}\" found."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "si-kill-process",
                    "Kill process",
                    "Terminate a process by name or PID",
                    Tier::Red,
                )
                .with_param(ParamDef::required("target", "Process name or PID to kill")),
                Template::powershell(
                    "if ({target} -match '^\\d+$') { Stop-Process -Id {target} -Force -ErrorAction Stop } else { Stop-Process -Name {target} -Force -ErrorAction Stop }; Write-Output ('Process ' + {target} + ' terminated.')",
                ),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new("si-services", "List services", "List running Windows services", Tier::Green),
                Template::powershell(
                    "Get-Service | Where-Object { $_.Status -eq 'Running' } | Sort-Object DisplayName | Select-Object Status, Name, DisplayName | Format-Table -AutoSize | Out-String -Width 200",
                ),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "si-network-connections",
                    "Network connections",
                    "List active network connections and listening ports",
                    Tier::Green,
                ),
                Template::powershell(
                    "Get-NetTCPConnection | Where-Object { $_.State -eq 'Established' -or $_.State -eq 'Listen' } | Select-Object LocalAddress, LocalPort, RemoteAddress, RemotePort, State, @{N='Process';E={(Get-Process -Id $_.OwningProcess -ErrorAction SilentlyContinue).Name}} | Sort-Object State, LocalPort | Format-Table -AutoSize | Out-String -Width 200",
                ),
            )
            .timeout_secs(15),
        )
}

fn chezmoi(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "chezmoi", "chezmoi", ToolDomain::SystemTools)
        .with_description(
            "Dotfile manager. Sync config files across machines with Git, templates, and encryption support.",
        )
        .with_install("winget", Some("winget install twpayne.chezmoi"))
        .with_probe(Probe::version_matching("chezmoi --version", r"chezmoi version v?(\S+)"))
        .with_operation(
            plain(
                "chezmoi-status",
                "Dotfile status",
                "Show which managed dotfiles have changed since last apply",
                Tier::Green,
                "chezmoi status",
                15,
            )
            .or_output("All managed files are up to date."),
        )
        .with_operation(
            plain(
                "chezmoi-managed",
                "List managed files",
                "List all files managed by chezmoi",
                Tier::Green,
                "chezmoi managed",
                15,
            )
            .or_output("No files managed by chezmoi yet."),
        )
        .with_operation(
            plain(
                "chezmoi-diff",
                "Show dotfile diff",
                "Show what would change if you applied the latest dotfiles",
                Tier::Green,
                "chezmoi diff",
                15,
            )
            .or_output("No differences. Dotfiles are in sync."),
        )
        .with_operation(
            plain(
                "chezmoi-apply",
                "Apply dotfiles",
                "Apply managed dotfiles to the home directory",
                Tier::Yellow,
                "chezmoi apply --force",
                30,
            )
            .or_output("Dotfiles applied successfully."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "chezmoi-add",
                    "Add file to dotfiles",
                    "Add a file to chezmoi management",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("path", "File path to add (e.g. ~/.gitconfig)")),
                Template::shell("chezmoi add {path}"),
            )
            .timeout_secs(15)
            .or_output("Added {path} to chezmoi management."),
        )
        .with_operation(
            plain(
                "chezmoi-update",
                "Pull and apply dotfiles",
                "Pull latest dotfiles from remote repo and apply them",
                Tier::Yellow,
                "chezmoi update --force",
                60,
            )
            .or_output("Dotfiles pulled and applied."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "chezmoi-init",
                    "Initialize chezmoi",
                    "Initialize chezmoi with a dotfiles repo",
                    Tier::Yellow,
                )
                .with_param(ParamDef::required("repo", "Git repo URL (e.g. github.com/user/dotfiles)")),
                Template::shell("chezmoi init {repo}"),
            )
            .timeout_secs(60)
            .or_output("chezmoi initialized with {repo}. Run 'chezmoi apply' to apply dotfiles."),
        )
}

fn komorebi(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "komorebi", "komorebi", ToolDomain::SystemTools)
        .with_description(
            "Tiling window manager for Windows. Automatic window arrangement with keyboard-driven workflows, workspaces, and rules.",
        )
        .with_install("winget", Some("winget install LGUG2Z.komorebi"))
        .with_probe(Probe::version("komorebic --version"))
        .with_operation(
            plain(
                "komorebi-start",
                "Start komorebi",
                "Start the komorebi tiling window manager",
                Tier::Yellow,
                "komorebic start --whkd",
                15,
            )
            .or_output("komorebi started with whkd hotkey daemon."),
        )
        .with_operation(
            plain(
                "komorebi-stop",
                "Stop komorebi",
                "Stop the komorebi tiling window manager and restore normal window behavior",
                Tier::Yellow,
                "komorebic stop",
                10,
            )
            .or_output("komorebi stopped. Normal window behavior restored."),
        )
        .with_operation(
            plain(
                "komorebi-status",
                "Komorebi status",
                "Check current komorebi state: workspaces, monitors, and managed windows",
                Tier::Green,
                "komorebic state 2>&1",
                15,
            )
            .error_hint("No connection", "komorebi is not running. Start it with 'komorebic start'."),
        )
        .with_operation(
            plain(
                "komorebi-retile",
                "Retile windows",
                "Force retile all windows in the current workspace",
                Tier::Green,
                "komorebic retile",
                5,
            )
            .or_output("Windows retiled."),
        )
        .with_operation(
            plain(
                "komorebi-toggle-float",
                "Toggle float",
                "Toggle floating mode for the focused window",
                Tier::Green,
                "komorebic toggle-float",
                5,
            )
            .or_output("Float toggled for focused window."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "komorebi-change-layout",
                    "Change layout",
                    "Change the tiling layout for the current workspace",
                    Tier::Green,
                )
                .with_param(ParamDef::required(
                    "layout",
                    "Layout: bsp, columns, rows, vertical-stack, horizontal-stack",
                )),
                Template::shell("komorebic change-layout {layout}"),
            )
            .timeout_secs(5)
            .or_output("Layout changed to {layout}."),
        )
}

pub fn orchestrator(runner: Arc<dyn ProcessRunner>) -> DomainOrchestrator {
    DomainOrchestrator::new(
        ToolDomain::SystemTools,
        "System Tools",
        "Productivity utilities, process management, dotfile sync, and window management",
    )
    .with_tool_noun("system tool")
    .with_tool(Arc::new(powertoys(runner.clone())))
    .with_tool(Arc::new(system_informer(runner.clone())))
    .with_tool(Arc::new(chezmoi(runner.clone())))
    .with_tool(Arc::new(komorebi(runner)))
    .route("launch-powertoys", &[("powertoys", "powertoys-launch")])
    .route("powertoys-status", &[("powertoys", "powertoys-status")])
    .route("install-powertoys", &[("powertoys", "powertoys-install")])
    .route("update-powertoys", &[("powertoys", "powertoys-update")])
    .route("top-processes", &[("system-informer", "si-top-processes")])
    .route("find-process", &[("system-informer", "si-find-process")])
    .route("kill-process", &[("system-informer", "si-kill-process")])
    .route("list-services", &[("system-informer", "si-services")])
    .route("network-connections", &[("system-informer", "si-network-connections")])
    .route("launch-process-manager", &[("system-informer", "si-launch")])
    .route("dotfile-status", &[("chezmoi", "chezmoi-status")])
    .route("dotfile-list", &[("chezmoi", "chezmoi-managed")])
    .route("dotfile-diff", &[("chezmoi", "chezmoi-diff")])
    .route("dotfile-apply", &[("chezmoi", "chezmoi-apply")])
    .route("dotfile-add", &[("chezmoi", "chezmoi-add")])
    .route("dotfile-update", &[("chezmoi", "chezmoi-update")])
    .route("dotfile-init", &[("chezmoi", "chezmoi-init")])
    .route("start-tiling", &[("komorebi", "komorebi-start")])
    .route("stop-tiling", &[("komorebi", "komorebi-stop")])
    .route("tiling-status", &[("komorebi", "komorebi-status")])
    .route("retile", &[("komorebi", "komorebi-retile")])
    .route("toggle-float", &[("komorebi", "komorebi-toggle-float")])
    .route("change-layout", &[("komorebi", "komorebi-change-layout")])
}
