//! Debloat and privacy tools: Win11Debloat, Sophia Script, WinUtil,
//! Bulk Crap Uninstaller and the built-in Windows AI remover.

use crate::tools::catalog_tool::{CatalogOperation, CatalogTool, Probe};
use crate::tools::template::Template;
use actiongate_application::ProcessRunner;
use actiongate_domain::{DomainOrchestrator, OperationSpec, ParamDef, Tier, ToolDomain};
use std::sync::Arc;

fn win11debloat_op(id: &str, name: &str, description: &str, tier: Tier, switches: &str, secs: u64) -> CatalogOperation {
    CatalogOperation::new(
        OperationSpec::new(id, name, description, tier),
        Template::powershell(format!("& {{tool_path}} -Silent {}", switches)),
    )
    .timeout_secs(secs)
}

fn win11debloat(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "win11debloat", "Win11Debloat", ToolDomain::Debloat)
        .with_description(
            "Focused PowerShell debloater for Windows 11. Removes bloatware apps, disables telemetry, and cleans up the Start menu.",
        )
        .with_install(
            "git-clone",
            Some("git clone https://github.com/Raphire/Win11Debloat.git C:\\tools\\Win11Debloat"),
        )
        .with_probe(Probe::paths(&[
            "C:\\tools\\Win11Debloat\\Win11Debloat.ps1",
            "%USERPROFILE%\\Win11Debloat\\Win11Debloat.ps1",
        ]))
        .with_operation(win11debloat_op(
            "win11debloat-default",
            "Run default debloat",
            "Remove default bloatware apps and apply recommended settings",
            Tier::Red,
            "-RemoveApps -DisableTelemetry -DisableBing -DisableSuggestions -DisableLockscreenTips -RevertContextMenu",
            300,
        ))
        .with_operation(win11debloat_op(
            "win11debloat-apps-only",
            "Remove bloatware apps only",
            "Remove pre-installed bloatware apps without changing system settings",
            Tier::Red,
            "-RemoveApps",
            300,
        ))
        .with_operation(win11debloat_op(
            "win11debloat-disable-telemetry",
            "Disable telemetry",
            "Disable Windows telemetry and data collection",
            Tier::Red,
            "-DisableTelemetry",
            120,
        ))
        .with_operation(win11debloat_op(
            "win11debloat-disable-bing",
            "Disable Bing in Start menu",
            "Remove Bing web search results from the Windows Start menu",
            Tier::Yellow,
            "-DisableBing",
            60,
        ))
        .with_operation(win11debloat_op(
            "win11debloat-restore-taskbar",
            "Clean up taskbar",
            "Remove Widgets, Chat, and Task View from the taskbar",
            Tier::Yellow,
            "-HideWidgets -HideChat -HideTaskview",
            60,
        ))
}

const SOPHIA_PRELUDE: &str = "Set-Location {tool_dir}; Import-Module '.\\Sophia.psd1' -Force; ";

fn sophia_op(id: &str, name: &str, description: &str, tier: Tier, functions: &str, done: &str) -> CatalogOperation {
    CatalogOperation::new(
        OperationSpec::new(id, name, description, tier),
        Template::powershell(format!("{}{}", SOPHIA_PRELUDE, functions)),
    )
    .timeout_secs(120)
    .or_output(done)
}

fn sophia(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "sophia", "Sophia Script", ToolDomain::Debloat)
        .with_description(
            "150+ granular Windows tweaks and debloat toggles. Fine-grained control over telemetry, privacy, UI, and scheduled tasks.",
        )
        .with_install(
            "git-clone",
            Some("git clone https://github.com/farag2/Sophia-Script-for-Windows.git C:\\tools\\Sophia"),
        )
        .with_probe(Probe::paths(&[
            "C:\\tools\\Sophia\\Sophia Script for Windows 11\\Sophia.ps1",
            "C:\\tools\\Sophia-Script-for-Windows\\Sophia Script for Windows 11\\Sophia.ps1",
            "C:\\tools\\sophia\\Sophia.ps1",
        ]))
        .with_operation(sophia_op(
            "sophia-disable-telemetry",
            "Disable telemetry",
            "Disable Windows diagnostic data and telemetry collection",
            Tier::Red,
            "DiagnosticDataLevel -Minimal",
            "Telemetry set to minimal",
        ))
        .with_operation(sophia_op(
            "sophia-disable-suggestions",
            "Disable suggestions & tips",
            "Disable Windows suggestions, tips, and app recommendations",
            Tier::Yellow,
            "WindowsSuggestedContent -Disable; AppsSilentInstalling -Disable; TailoredExperiences -Disable",
            "Suggestions and tips disabled",
        ))
        .with_operation(sophia_op(
            "sophia-privacy-tweaks",
            "Apply privacy tweaks",
            "Disable advertising ID, activity history, and feedback notifications",
            Tier::Red,
            "AdvertisingID -Disable; ActivityHistory -Disable; FeedbackFrequency -Never",
            "Privacy tweaks applied",
        ))
        .with_operation(sophia_op(
            "sophia-disable-scheduled-tasks",
            "Disable telemetry tasks",
            "Disable scheduled tasks related to telemetry and data collection",
            Tier::Red,
            "ScheduledTasks -Disable",
            "Telemetry scheduled tasks disabled",
        ))
        .with_operation(sophia_op(
            "sophia-ui-tweaks",
            "Apply UI tweaks",
            "Restore classic context menu, hide widgets, clean taskbar",
            Tier::Yellow,
            "Windows11ContextMenu -Enable; Widgets -Disable; TaskViewButton -Hide",
            "UI tweaks applied",
        ))
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "sophia-custom",
                    "Run custom Sophia function",
                    "Run a specific Sophia Script function by name",
                    Tier::Red,
                )
                .with_param(ParamDef::required(
                    "function",
                    "Sophia function call (e.g. 'OneDrive -Uninstall')",
                )),
                Template::powershell(format!("{}{{function}}", SOPHIA_PRELUDE)).raw("function"),
            )
            .timeout_secs(120)
            .or_output("Executed: {function}"),
        )
}

const WINUTIL_ESSENTIAL_TWEAKS: &[&str] = &[
    "Set-ItemProperty -Path 'HKLM:\\SOFTWARE\\Policies\\Microsoft\\Windows\\DataCollection' -Name 'AllowTelemetry' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "New-Item -Path 'HKCU:\\Software\\Policies\\Microsoft\\Windows\\Explorer' -Force -ErrorAction SilentlyContinue | Out-Null",
    "Set-ItemProperty -Path 'HKCU:\\Software\\Policies\\Microsoft\\Windows\\Explorer' -Name 'DisableSearchBoxSuggestions' -Value 1 -Type DWord -Force",
    "Set-ItemProperty -Path 'HKCU:\\Software\\Microsoft\\Windows\\CurrentVersion\\ContentDeliveryManager' -Name 'SubscribedContent-338389Enabled' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Set-ItemProperty -Path 'HKCU:\\Software\\Microsoft\\Windows\\CurrentVersion\\ContentDeliveryManager' -Name 'SubscribedContent-310093Enabled' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Set-ItemProperty -Path 'HKCU:\\Software\\Microsoft\\Windows\\CurrentVersion\\ContentDeliveryManager' -Name 'SilentInstalledAppsEnabled' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Set-ItemProperty -Path 'HKLM:\\SOFTWARE\\Microsoft\\WcmSvc\\wifinetworkmanager\\config' -Name 'AutoConnectAllowedOEM' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Set-ItemProperty -Path 'HKLM:\\SOFTWARE\\Policies\\Microsoft\\Windows\\System' -Name 'EnableActivityFeed' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Set-ItemProperty -Path 'HKLM:\\SOFTWARE\\Policies\\Microsoft\\Windows\\System' -Name 'PublishUserActivities' -Value 0 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Write-Output 'Essential tweaks applied: telemetry off, Bing search off, tips off, WiFi Sense off, activity history off.'",
];

fn winutil(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "winutil", "Chris Titus WinUtil", ToolDomain::Debloat)
        .with_description(
            "All-in-one Windows utility by Chris Titus Tech. GUI-based debloat, tweaks, app installs, and system fixes.",
        )
        .with_install("remote-script", Some("irm christitus.com/win | iex"))
        // Fetched on demand, so any working PowerShell counts as installed
        .with_probe(Probe::powershell())
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "winutil-launch",
                    "Launch WinUtil",
                    "Launch the Chris Titus WinUtil GUI for interactive debloating and tweaks",
                    Tier::Yellow,
                ),
                Template::powershell(
                    "Start-Process powershell -ArgumentList '-Command irm christitus.com/win | iex' -Verb RunAs",
                ),
            )
            .timeout_secs(15)
            .output("WinUtil launched in a new elevated window. Use the GUI to select tweaks and apps."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "winutil-tweaks-essential",
                    "Apply essential tweaks",
                    "Apply WinUtil essential tweaks (telemetry, Bing search, tips, ads)",
                    Tier::Red,
                ),
                Template::powershell(WINUTIL_ESSENTIAL_TWEAKS.join("; ")),
            )
            .timeout_secs(60),
        )
}

fn bcuninstaller(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "bcuninstaller", "Bulk Crap Uninstaller", ToolDomain::Debloat)
        .with_description(
            "Advanced program removal tool. Detects leftovers, supports silent batch uninstall, and handles stubborn programs.",
        )
        .with_install("winget", Some("winget install Klocman.BulkCrapUninstaller"))
        .with_probe(Probe::winget("Klocman.BulkCrapUninstaller", "Klocman"))
        .with_probe(Probe::paths(&[
            "C:\\Program Files\\BCUninstaller\\BCUninstaller.exe",
            "%LOCALAPPDATA%\\Programs\\BCUninstaller\\BCUninstaller.exe",
        ]))
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "bcu-list",
                    "List all programs",
                    "List all installed programs detected by BCUninstaller",
                    Tier::Green,
                ),
                Template::shell("BCUninstaller.exe /export list.txt && type list.txt"),
            )
            .timeout_secs(60)
            .fallback(
                Template::powershell(
                    "Get-ItemProperty HKLM:\\Software\\Microsoft\\Windows\\CurrentVersion\\Uninstall\\* | Select-Object DisplayName, DisplayVersion, Publisher | Sort-Object DisplayName | Format-Table -AutoSize | Out-String -Width 200",
                ),
                30,
            ),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "bcu-launch",
                    "Launch BCUninstaller",
                    "Open the BCUninstaller GUI for manual batch uninstall",
                    Tier::Yellow,
                ),
                Template::shell("start \"\" \"BCUninstaller.exe\""),
            )
            .timeout_secs(5)
            .output("Bulk Crap Uninstaller launched. Select programs to remove and use batch uninstall."),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "bcu-uninstall",
                    "Uninstall program",
                    "Uninstall a specific program via BCUninstaller CLI",
                    Tier::Red,
                )
                .with_param(ParamDef::required("name", "Program name (or partial match)")),
                Template::shell("BCUninstaller.exe /uninstall {name}"),
            )
            .timeout_secs(120),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "bcu-uninstall-quiet",
                    "Silent batch uninstall",
                    "Silently uninstall one or more programs by name",
                    Tier::Red,
                )
                .with_param(ParamDef::required(
                    "names",
                    "Comma-separated program names to uninstall",
                )),
                Template::shell("BCUninstaller.exe /uninstall {names} /quiet").list("names"),
            )
            .timeout_secs(300),
        )
}

const CHECK_COPILOT: &str = r#"$pkg = Get-AppxPackage -Name '*Copilot*' 2>$null; if ($pkg) { $pkg | Select-Object Name, Version, Status | Format-List | Out-String } else { 'Copilot package not found.' }; $reg = Get-ItemProperty -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsCopilot' -Name 'TurnOffWindowsCopilot' -ErrorAction SilentlyContinue; if ($reg) { "Policy: TurnOffWindowsCopilot = $($reg.TurnOffWindowsCopilot)" } else { 'No Copilot policy set.' }"#;

const DISABLE_COPILOT: &[&str] = &[
    r"New-Item -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsCopilot' -Force | Out-Null",
    r"Set-ItemProperty -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsCopilot' -Name 'TurnOffWindowsCopilot' -Value 1 -Type DWord -Force",
    r"New-Item -Path 'HKLM:\SOFTWARE\Policies\Microsoft\Windows\WindowsCopilot' -Force -ErrorAction SilentlyContinue | Out-Null",
    r"Set-ItemProperty -Path 'HKLM:\SOFTWARE\Policies\Microsoft\Windows\WindowsCopilot' -Name 'TurnOffWindowsCopilot' -Value 1 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Write-Output 'Windows Copilot disabled via policy. Changes take effect after restart or Explorer refresh.'",
];

const REMOVE_COPILOT: &[&str] = &[
    "$pkgs = Get-AppxPackage -AllUsers -Name '*Copilot*' 2>$null",
    r#"if ($pkgs) { $pkgs | ForEach-Object { Remove-AppxPackage -Package $_.PackageFullName -AllUsers -ErrorAction SilentlyContinue; Write-Output "Removed: $($_.Name)" } } else { Write-Output 'No Copilot packages found.' }"#,
    "$provPkgs = Get-AppxProvisionedPackage -Online 2>$null | Where-Object { $_.DisplayName -like '*Copilot*' }",
    r#"if ($provPkgs) { $provPkgs | ForEach-Object { Remove-AppxProvisionedPackage -Online -PackageName $_.PackageName -ErrorAction SilentlyContinue; Write-Output "Deprovisioned: $($_.DisplayName)" } }"#,
];

const DISABLE_RECALL: &[&str] = &[
    r"New-Item -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsAI' -Force | Out-Null",
    r"Set-ItemProperty -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsAI' -Name 'DisableAIDataAnalysis' -Value 1 -Type DWord -Force",
    r"New-Item -Path 'HKLM:\SOFTWARE\Policies\Microsoft\Windows\WindowsAI' -Force -ErrorAction SilentlyContinue | Out-Null",
    r"Set-ItemProperty -Path 'HKLM:\SOFTWARE\Policies\Microsoft\Windows\WindowsAI' -Name 'DisableAIDataAnalysis' -Value 1 -Type DWord -Force -ErrorAction SilentlyContinue",
    "Write-Output 'Windows Recall disabled via policy.'",
];

const CHECK_AI_FEATURES: &[&str] = &[
    "Write-Output '=== AI App Packages ==='",
    "Get-AppxPackage -AllUsers 2>$null | Where-Object { $_.Name -match 'Copilot|CoPilot|AI|Recall|cognitiveservices' } | Select-Object Name, Version | Format-Table -AutoSize | Out-String",
    "Write-Output '=== AI Policy Keys ==='",
    r"Get-ItemProperty -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsCopilot' -ErrorAction SilentlyContinue | Out-String",
    r"Get-ItemProperty -Path 'HKCU:\Software\Policies\Microsoft\Windows\WindowsAI' -ErrorAction SilentlyContinue | Out-String",
];

fn remove_windows_ai(runner: Arc<dyn ProcessRunner>) -> CatalogTool {
    CatalogTool::new(runner, "remove-windows-ai", "Remove Windows AI", ToolDomain::Debloat)
        .with_description(
            "Strip Copilot, Recall, and other Windows AI features via PowerShell. No external tool needed.",
        )
        .with_install("built-in", None)
        .with_probe(Probe::powershell())
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rwai-check-copilot",
                    "Check Copilot status",
                    "Check if Windows Copilot is installed and active",
                    Tier::Green,
                ),
                Template::powershell(CHECK_COPILOT),
            )
            .timeout_secs(15),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rwai-disable-copilot",
                    "Disable Copilot",
                    "Disable Windows Copilot via Group Policy registry keys",
                    Tier::Red,
                ),
                Template::powershell(DISABLE_COPILOT.join("; ")),
            )
            .timeout_secs(30),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rwai-remove-copilot",
                    "Remove Copilot app",
                    "Uninstall the Windows Copilot app package",
                    Tier::Red,
                ),
                Template::powershell(REMOVE_COPILOT.join("; ")),
            )
            .timeout_secs(60),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rwai-disable-recall",
                    "Disable Recall",
                    "Disable Windows Recall (AI screenshot feature) via registry",
                    Tier::Red,
                ),
                Template::powershell(DISABLE_RECALL.join("; ")),
            )
            .timeout_secs(30),
        )
        .with_operation(
            CatalogOperation::new(
                OperationSpec::new(
                    "rwai-check-ai-features",
                    "Check AI features",
                    "List all Windows AI-related packages and their status",
                    Tier::Green,
                ),
                Template::powershell(CHECK_AI_FEATURES.join("; ")),
            )
            .timeout_secs(15),
        )
        .with_operation(CatalogOperation::sequence(
            OperationSpec::new(
                "rwai-remove-all-ai",
                "Remove all Windows AI",
                "Disable Copilot, Recall, and remove all AI-related app packages",
                Tier::Red,
            ),
            &[
                ("Disable Copilot", "rwai-disable-copilot"),
                ("Disable Recall", "rwai-disable-recall"),
                ("Remove Copilot Packages", "rwai-remove-copilot"),
            ],
        ))
}

pub fn orchestrator(runner: Arc<dyn ProcessRunner>) -> DomainOrchestrator {
    DomainOrchestrator::new(
        ToolDomain::Debloat,
        "Debloat & Privacy",
        "Remove bloatware, disable telemetry, strip AI features, and clean up Windows",
    )
    .with_tool_noun("debloat tool")
    .with_remediation(
        "Try installing Win11Debloat (git clone) or launching WinUtil (irm christitus.com/win | iex).",
    )
    .with_tool(Arc::new(win11debloat(runner.clone())))
    .with_tool(Arc::new(sophia(runner.clone())))
    .with_tool(Arc::new(winutil(runner.clone())))
    .with_tool(Arc::new(bcuninstaller(runner.clone())))
    .with_tool(Arc::new(remove_windows_ai(runner)))
    .route("remove-bloatware", &[("win11debloat", "win11debloat-apps-only"), ("winutil", "winutil-launch")])
    .route(
        "disable-telemetry",
        &[
            ("sophia", "sophia-disable-telemetry"),
            ("win11debloat", "win11debloat-disable-telemetry"),
            ("winutil", "winutil-tweaks-essential"),
        ],
    )
    .route("disable-bing-search", &[("win11debloat", "win11debloat-disable-bing"), ("sophia", "sophia-ui-tweaks")])
    .route("disable-suggestions", &[("sophia", "sophia-disable-suggestions"), ("win11debloat", "win11debloat-default")])
    .route("clean-taskbar", &[("win11debloat", "win11debloat-restore-taskbar"), ("sophia", "sophia-ui-tweaks")])
    .route("privacy-tweaks", &[("sophia", "sophia-privacy-tweaks"), ("winutil", "winutil-tweaks-essential")])
    .route("check-copilot", &[("remove-windows-ai", "rwai-check-copilot")])
    .route("disable-copilot", &[("remove-windows-ai", "rwai-disable-copilot")])
    .route("remove-copilot", &[("remove-windows-ai", "rwai-remove-copilot")])
    .route("disable-recall", &[("remove-windows-ai", "rwai-disable-recall")])
    .route("check-ai-features", &[("remove-windows-ai", "rwai-check-ai-features")])
    .route("remove-all-ai", &[("remove-windows-ai", "rwai-remove-all-ai")])
    .route("essential-tweaks", &[("winutil", "winutil-tweaks-essential"), ("win11debloat", "win11debloat-default")])
    .route("launch-debloat-gui", &[("winutil", "winutil-launch"), ("bcuninstaller", "bcu-launch")])
    .route("list-programs", &[("bcuninstaller", "bcu-list")])
    .route("uninstall-program", &[("bcuninstaller", "bcu-uninstall")])
    .route("batch-uninstall", &[("bcuninstaller", "bcu-uninstall-quiet")])
    .route("custom-sophia-tweak", &[("sophia", "sophia-custom")])
}
