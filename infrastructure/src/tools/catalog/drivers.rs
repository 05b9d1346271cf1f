//! Driver tools: pnputil, PSWindowsUpdate, NVIDIA tools, SDIO, DDU, RAPR.

use crate::tools::catalog_tool::{CatalogOperation, CatalogTool, Probe};
use crate::tools::template::Template;
use actiongate_application::ProcessRunner;
use actiongate_domain::{DomainOrchestrator, OperationRef, OperationSpec, ParamDef, Tier, ToolDomain};
use std::sync::Arc;

fn green(id: &str, name: &str, description: &str) -> OperationSpec {
    OperationSpec::new(id, name, description, Tier::Green)
}

fn inf_param() -> ParamDef {
    ParamDef::required("inf", "Published driver INF name (e.g. oem12.inf)")
}

fn pnputil(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "pnputil", "pnputil", ToolDomain::Drivers)
        .with_description(
            "Built-in Windows driver utility. List, export, and manage driver packages in the driver store.",
        )
        .with_install("built-in", None)
        .with_probe(Probe::succeeds("pnputil /?").with_path("C:\\Windows\\System32\\pnputil.exe"))
        .with_operation(
            CatalogOperation::new(
                green("pnputil-list-drivers", "List installed drivers", "List all third-party driver packages in the driver store"),
                Template::shell("pnputil /enum-drivers"),
            ),
        )
        .with_operation(
            CatalogOperation::new(
                green("pnputil-list-devices", "List devices", "List all connected PnP devices and their status"),
                Template::shell("pnputil /enum-devices /connected"),
            ),
        )
        .with_operation(
            CatalogOperation::new(
                green("pnputil-driver-info", "Get driver info", "Get details about a specific driver package")
                    .with_param(inf_param()),
                Template::shell("pnputil /enum-drivers /inf {inf}"),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "pnputil-export-driver",
                    "Export driver",
                    "Export a driver package to a folder for backup",
                    Tier::Yellow,
                )
                .with_param(inf_param())
                .with_param(ParamDef::required("destination", "Folder to export to")),
                Template::shell("pnputil /export-driver {inf} {destination}"),
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "pnputil-delete-driver",
                    "Delete driver package",
                    "Remove a driver package from the driver store",
                    Tier::Red,
                )
                .with_param(inf_param()),
                Template::shell("pnputil /delete-driver {inf} /force"),
            ),
        )
}

fn pswindowsupdate(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "pswindowsupdate", "PSWindowsUpdate", ToolDomain::Drivers)
        .with_description(
            "PowerShell module for managing Windows Update. Check, download, and install driver updates via Windows Update.",
        )
        .with_install(
            "powershell-module",
            Some("Install-Module PSWindowsUpdate -Force -Scope CurrentUser"),
        )
        .with_probe(Probe::powershell_module("PSWindowsUpdate"))
        .with_operation(
            CatalogOperation::new(
                green("pswu-check-drivers", "Check driver updates", "Check Windows Update for available driver updates"),
                Template::powershell(
                    "Import-Module PSWindowsUpdate; Get-WindowsUpdate -Category Drivers -Verbose 4>&1 | Out-String",
                ),
            )
            .timeout_secs(120),
        )
        .with_operation(
            CatalogOperation::new(
                green("pswu-check-all", "Check all updates", "Check Windows Update for all available updates"),
                Template::powershell("Import-Module PSWindowsUpdate; Get-WindowsUpdate | Out-String"),
            )
            .timeout_secs(120),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "pswu-install-drivers",
                    "Install driver updates",
                    "Download and install all available driver updates from Windows Update",
                    Tier::Yellow,
                ),
                Template::powershell(
                    "Import-Module PSWindowsUpdate; Install-WindowsUpdate -Category Drivers -AcceptAll -AutoReboot:$false | Out-String",
                ),
            )
            .timeout_secs(600),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "pswu-install-all",
                    "Install all updates",
                    "Download and install all available Windows updates",
                    Tier::Yellow,
                ),
                Template::powershell(
                    "Import-Module PSWindowsUpdate; Install-WindowsUpdate -AcceptAll -AutoReboot:$false | Out-String",
                ),
            )
            .timeout_secs(600),
        )
        .with_operation(
            CatalogOperation::new(
                green("pswu-history", "Update history", "Show recent Windows Update history").with_param(
                    ParamDef::optional("count", "Number of entries to show").with_default("20"),
                ),
                Template::powershell(
                    "Import-Module PSWindowsUpdate; Get-WUHistory -MaxDate (Get-Date) -Last {count} | Format-Table -AutoSize | Out-String -Width 200",
                ),
            ),
        )
}

fn nvidia(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "nvidia-downloader", "NVIDIA Driver Tools", ToolDomain::Drivers)
        .with_description(
            "Detect NVIDIA GPU and check for latest driver updates via nvidia-smi and PowerShell.",
        )
        .with_install("bundled-with-driver", None)
        .with_probe(
            Probe::version("nvidia-smi --query-gpu=driver_version --format=csv,noheader")
                .with_path("nvidia-smi"),
        )
        .with_operation(
            CatalogOperation::new(
                green("nvidia-gpu-info", "GPU info", "Get detailed NVIDIA GPU information (model, driver, VRAM, temperature)"),
                Template::shell(
                    "nvidia-smi --query-gpu=name,driver_version,memory.total,memory.used,memory.free,temperature.gpu,utilization.gpu,utilization.memory --format=csv",
                ),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                green("nvidia-driver-version", "Current driver version", "Get the currently installed NVIDIA driver version"),
                Template::shell("nvidia-smi --query-gpu=driver_version,name --format=csv,noheader"),
            )
            .timeout_secs(10),
        )
        .with_operation(
            CatalogOperation::new(
                green("nvidia-check-update", "Check for driver update", "Check if a newer NVIDIA driver is available via winget"),
                Template::shell(
                    "winget upgrade --id Nvidia.GeForceExperience --accept-source-agreements 2>&1 || winget upgrade --query \"NVIDIA\" --accept-source-agreements 2>&1",
                ),
            )
            .timeout_secs(30)
            .fallback(
                Template::powershell(
                    "Get-WmiObject Win32_VideoController | Where-Object { $_.Name -like '*NVIDIA*' } | Select-Object Name, DriverVersion, DriverDate | Format-List | Out-String",
                ),
                15,
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "nvidia-install-update",
                    "Update NVIDIA driver",
                    "Download and install the latest NVIDIA driver via winget",
                    Tier::Yellow,
                ),
                Template::shell(
                    "winget upgrade --id Nvidia.GeForceExperience --accept-package-agreements --accept-source-agreements",
                ),
            )
            .timeout_secs(300),
        )
}

fn sdio(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "sdio", "Snappy Driver Installer Origin", ToolDomain::Drivers)
        .with_description(
            "Offline driver installer. Scans hardware and installs matching drivers from local or downloaded packs.",
        )
        .with_install(
            "portable",
            Some("winget install GlennDelahoy.SnappyDriverInstallerOrigin"),
        )
        .with_probe(Probe::paths(&[
            "C:\\tools\\SDIO\\SDIO_x64_R764.exe",
            "C:\\tools\\sdio\\SDIO.exe",
        ]))
        .with_probe(Probe::winget("GlennDelahoy.SnappyDriverInstallerOrigin", "GlennDelahoy"))
        .with_operation(
            CatalogOperation::new(
                green(
                    "sdio-scan",
                    "Scan for missing drivers",
                    "Use SDIO to scan hardware for missing or outdated drivers (requires SDIO to be installed)",
                ),
                Template::shell("SDIO.exe -checkupdates 2>&1"),
            )
            .timeout_secs(120)
            .on_error(
                "SDIO scan failed: {error}. SDIO may need to be launched manually for full functionality.",
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "sdio-install",
                    "Install drivers via SDIO",
                    "Launch SDIO to install recommended driver updates",
                    Tier::Yellow,
                ),
                Template::shell("start SDIO.exe"),
            )
            .timeout_secs(5)
            .output("Snappy Driver Installer Origin launched. Follow the GUI to install drivers."),
        )
}

const DDU_EXE: &str = "start \"\" \"Display Driver Uninstaller.exe\"";

fn ddu_clean(vendor: &str, brand: &str, drivers: &str) -> CatalogOperation {
    CatalogOperation::new(
        OperationSpec::new(
            format!("ddu-clean-{}", vendor),
            format!("Clean uninstall {}", drivers),
            format!(
                "Completely remove {} GPU drivers. Recommend running in Safe Mode for best results.",
                brand
            ),
            Tier::Red,
        ),
        Template::shell(DDU_EXE),
    )
    .timeout_secs(5)
    .output(format!(
        "DDU launched. Please select \"{}\" in the dropdown and click \"Clean and restart\" for a full driver removal. For best results, run DDU in Safe Mode.",
        vendor.to_uppercase()
    ))
    .on_error(
        "Could not launch DDU: {error}. You may need to navigate to the DDU folder and run it manually.",
    )
}

fn ddu(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "ddu", "Display Driver Uninstaller", ToolDomain::Drivers)
        .with_description(
            "Completely removes GPU drivers (NVIDIA, AMD, Intel) for clean reinstallation. Best used in Safe Mode.",
        )
        .with_install("portable", Some("winget install Wagnardsoft.DisplayDriverUninstaller"))
        .with_probe(Probe::paths(&[
            "C:\\tools\\DDU\\Display Driver Uninstaller.exe",
            "C:\\tools\\ddu\\DDU.exe",
        ]))
        .with_probe(Probe::winget("Wagnardsoft.DisplayDriverUninstaller", "Wagnardsoft"))
        .with_operation(ddu_clean("nvidia", "NVIDIA", "NVIDIA drivers"))
        .with_operation(ddu_clean("amd", "AMD", "AMD drivers"))
        .with_operation(ddu_clean("intel", "Intel", "Intel GPU drivers"))
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "ddu-launch",
                    "Launch DDU",
                    "Open Display Driver Uninstaller GUI for manual driver cleanup",
                    Tier::Yellow,
                ),
                Template::shell(DDU_EXE),
            )
            .timeout_secs(5)
            .output("Display Driver Uninstaller launched."),
        )
}

fn rapr(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    const RAPR_EXE: &str = "start \"\" \"Rapr.exe\"";

    CatalogTool::new(runner, "rapr", "Driver Store Explorer (RAPR)", ToolDomain::Drivers)
        .with_description(
            "GUI and CLI tool for viewing and cleaning the Windows driver store. Safely remove old/duplicate driver packages.",
        )
        .with_install("portable", Some("winget install lostindark.DriverStoreExplorer"))
        .with_probe(Probe::winget("lostindark.DriverStoreExplorer", "lostindark"))
        .with_probe(Probe::paths(&[
            "C:\\tools\\rapr\\Rapr.exe",
            "C:\\tools\\DriverStoreExplorer\\Rapr.exe",
        ]))
        .with_operation(
            // RAPR has no listing CLI; pnputil enumerates the same store
            CatalogOperation::new(
                green(
                    "rapr-list-old",
                    "List old driver packages",
                    "List driver store packages that have newer versions installed (safe to clean)",
                ),
                Template::powershell("pnputil /enum-drivers | Out-String"),
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rapr-launch",
                    "Launch Driver Store Explorer",
                    "Open RAPR GUI for manual driver store management",
                    Tier::Yellow,
                ),
                Template::shell(RAPR_EXE),
            )
            .timeout_secs(5)
            .output("Driver Store Explorer launched. Use the GUI to review and clean old driver packages."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rapr-cleanup",
                    "Clean old driver packages",
                    "Remove old driver packages from the driver store (keeps newest version of each)",
                    Tier::Red,
                ),
                Template::shell(RAPR_EXE),
            )
            .timeout_secs(5)
            .output(
                "Driver Store Explorer launched. Select old driver packages and click 'Delete Package' to clean them. Check 'Force Deletion' only if standard removal fails.",
            ),
        )
}

pub fn orchestrator(runner: Arc<dyn ProcessRunner>) -> DomainOrchestrator {
    DomainOrchestrator::new(
        ToolDomain::Drivers,
        "Driver Management",
        "Detect, update, clean, and manage hardware drivers",
    )
    .with_tool_noun("driver tool")
    .with_remediation("Consider installing PSWindowsUpdate or Snappy Driver Installer Origin.")
    .with_tool(Arc::new(pnputil(runner.clone())))
    .with_tool(Arc::new(pswindowsupdate(runner.clone())))
    .with_tool(Arc::new(nvidia(runner.clone())))
    .with_tool(Arc::new(sdio(runner.clone())))
    .with_tool(Arc::new(ddu(runner.clone())))
    .with_tool(Arc::new(rapr(runner)))
    .route("list-drivers", &[("pnputil", "pnputil-list-drivers"), ("rapr", "rapr-list-old")])
    .route("list-devices", &[("pnputil", "pnputil-list-devices")])
    .route(
        "check-updates",
        &[
            ("pswindowsupdate", "pswu-check-drivers"),
            ("nvidia-downloader", "nvidia-check-update"),
            ("pnputil", "pnputil-list-drivers"),
        ],
    )
    .route(
        "install-updates",
        &[
            ("pswindowsupdate", "pswu-install-drivers"),
            ("nvidia-downloader", "nvidia-install-update"),
        ],
    )
    .route("gpu-info", &[("nvidia-downloader", "nvidia-gpu-info")])
    .route("gpu-update", &[("nvidia-downloader", "nvidia-install-update")])
    .route("scan-missing", &[("sdio", "sdio-scan"), ("pnputil", "pnputil-list-devices")])
    .intent("clean-uninstall-gpu", &["ddu"])
    .operation(
        "clean-uninstall-gpu",
        "ddu",
        OperationRef::by_param("gpu", "ddu-clean-nvidia")
            .case("amd", "ddu-clean-amd")
            .case("intel", "ddu-clean-intel"),
    )
    .route("driver-store-cleanup", &[("rapr", "rapr-cleanup"), ("pnputil", "pnputil-list-drivers")])
    .route("export-driver", &[("pnputil", "pnputil-export-driver")])
    .route("delete-driver", &[("pnputil", "pnputil-delete-driver")])
    .route("update-history", &[("pswindowsupdate", "pswu-history")])
}
