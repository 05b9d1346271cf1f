//! CLI entrypoint for actiongate
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use actiongate_application::{
    ActionExecutor, ApprovalGate, ExecutionParams, ExtractActionsUseCase, IntentDispatcher,
    OperationLog,
};
use actiongate_domain::{ActionId, ActionStatus, Params};
use actiongate_infrastructure::{
    ConfigLoader, FileConfig, PushChannel, ResponseSink, SqliteStore, TokioProcessRunner,
    ToolRegistry,
};
use actiongate_presentation::{
    ActionsCommand, Cli, Command, ConsoleFormatter, ResolveArgs, Spinner, ToolsCommand,
};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("Failed to load configuration")?
    };

    // Held until exit so buffered log lines reach the file
    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;

    let Some(command) = cli.command else {
        println!("No command given. Run `actiongate --help` for usage.");
        return Ok(ExitCode::SUCCESS);
    };

    let app = App::build(&config, cli.json, cli.quiet || cli.json)?;
    info!(database = %config.database.resolved_path().display(), "Starting actiongate");

    match command {
        Command::Extract {
            conversation,
            input,
        } => app.extract(&conversation, input).await,
        Command::Actions(cmd) => app.actions(cmd).await,
        Command::Resolve(args) => {
            app.prepare_tools(&config).await;
            app.resolve(args).await
        }
        Command::Tools(cmd) => {
            if !matches!(cmd, ToolsCommand::Scan) {
                app.prepare_tools(&config).await;
            }
            app.tools(cmd).await
        }
        Command::Channel => {
            app.prepare_tools(&config).await;
            app.channel().await
        }
    }
}

/// Install the tracing subscriber.
///
/// The `-v` count picks the level unless `RUST_LOG` is set. Console logs go
/// to stderr so stdout stays parseable.
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let console = fmt::layer().with_target(false).with_writer(std::io::stderr);

    let Some(path) = file else {
        tracing_subscriber::registry().with(filter).with(console).init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .init();
    Ok(Some(guard))
}

/// Wired application services.
struct App {
    store: Arc<SqliteStore>,
    registry: Arc<ToolRegistry>,
    gate: Arc<ApprovalGate>,
    json: bool,
    quiet: bool,
}

impl App {
    fn build(config: &FileConfig, json: bool, quiet: bool) -> Result<Self> {
        let params: ExecutionParams = config.execution.to_execution_params();
        let db_path = config.database.resolved_path();
        let store = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {}", db_path.display()))?,
        );

        // === Dependency Injection ===
        let runner = Arc::new(TokioProcessRunner::new());
        let registry = Arc::new(
            ToolRegistry::from_catalog(runner.clone())
                .with_inventory(store.clone())
                .with_detect_timeout(params.detect_timeout),
        );
        let executor = Arc::new(
            ActionExecutor::new(runner, registry.clone())
                .with_command_timeout(params.command_timeout),
        );
        let gate = Arc::new(ApprovalGate::new(store.clone(), executor, store.clone()));

        Ok(Self {
            store,
            registry,
            gate,
            json,
            quiet,
        })
    }

    /// Load cached detection results, then rescan if configured.
    async fn prepare_tools(&self, config: &FileConfig) {
        let warmed = self.registry.warm_from_store().await;
        info!(tools = warmed, "Loaded cached tool inventory");

        if config.registry.scan_on_startup {
            self.scan().await;
        }
    }

    async fn scan(&self) -> usize {
        let spinner = Spinner::start("Detecting tools...", self.quiet);
        let tools = self.registry.scan().await;
        let installed = tools.iter().filter(|t| t.installed).count();
        spinner.finish(format!("{} of {} tools installed", installed, tools.len()));
        installed
    }

    async fn extract(&self, conversation: &str, input: Option<PathBuf>) -> Result<ExitCode> {
        let text = match input {
            Some(path) if path.as_os_str() != "-" => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?,
            _ => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("Failed to read stdin")?;
                text
            }
        };

        let actions = ExtractActionsUseCase::new(self.store.clone())
            .execute(&text, conversation)
            .await?;

        if self.json {
            println!("{}", ConsoleFormatter::format_json(&actions));
        } else {
            print!("{}", ConsoleFormatter::format_actions(&actions));
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn actions(&self, cmd: ActionsCommand) -> Result<ExitCode> {
        let actions = match cmd {
            ActionsCommand::Pending => self.gate.list_pending().await?,
            ActionsCommand::List { status, limit } => {
                let status = status
                    .map(|s| s.parse::<ActionStatus>())
                    .transpose()
                    .context("Invalid --status")?;
                self.gate.list(status, Some(limit)).await?
            }
        };

        if self.json {
            println!("{}", ConsoleFormatter::format_json(&actions));
        } else {
            print!("{}", ConsoleFormatter::format_actions(&actions));
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn resolve(&self, args: ResolveArgs) -> Result<ExitCode> {
        let id = ActionId::new(args.id.as_str());
        let spinner = Spinner::start(
            if args.approved() { "Executing..." } else { "Denying..." },
            self.quiet || !args.approved(),
        );

        match self.gate.resolve(&id, args.approved()).await {
            Ok(action) => {
                spinner.finish(action.status.as_str());
                if self.json {
                    println!("{}", ConsoleFormatter::format_json(&action));
                } else {
                    print!("{}", ConsoleFormatter::format_action(&action));
                }
                let code = match action.status {
                    ActionStatus::Failed => ExitCode::FAILURE,
                    _ => ExitCode::SUCCESS,
                };
                Ok(code)
            }
            Err(e) if e.is_client_error() => {
                spinner.fail(e.to_string());
                if self.json {
                    println!("{}", ConsoleFormatter::format_json(&json!({ "error": e.to_string() })));
                } else {
                    eprintln!("{}", e);
                }
                Ok(ExitCode::FAILURE)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn tools(&self, cmd: ToolsCommand) -> Result<ExitCode> {
        match cmd {
            ToolsCommand::List => self.print_tools(&self.registry.all_tools()),
            ToolsCommand::Installed => self.print_tools(&self.registry.installed_tools()),
            ToolsCommand::Scan => {
                self.scan().await;
                self.print_tools(&self.registry.all_tools());
            }
            ToolsCommand::Operations => {
                let operations = self.registry.operations();
                if self.json {
                    println!("{}", ConsoleFormatter::format_json(&operations));
                } else {
                    print!("{}", ConsoleFormatter::format_operations(&operations));
                }
            }
            ToolsCommand::Summary => {
                let summary = self.registry.capabilities_summary();
                if self.json {
                    println!("{}", ConsoleFormatter::format_json(&json!({ "summary": summary })));
                } else if summary.is_empty() {
                    println!("No tools installed.");
                } else {
                    println!("{}", summary);
                }
            }
            ToolsCommand::Exec {
                domain,
                intent,
                params,
            } => {
                let params: Params = params.into_iter().collect();
                let log: &dyn OperationLog = self.store.as_ref();
                let result = self
                    .registry
                    .execute_intent(&domain, &intent, &params, log, None)
                    .await;

                if self.json {
                    println!("{}", ConsoleFormatter::format_json(&result));
                } else {
                    print!("{}", ConsoleFormatter::format_operation_result(&result));
                }
                if !result.success {
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Ok(ExitCode::SUCCESS)
    }

    fn print_tools(&self, tools: &[actiongate_domain::ToolInfo]) {
        if self.json {
            println!("{}", ConsoleFormatter::format_json(tools));
        } else {
            print!("{}", ConsoleFormatter::format_tools(tools));
        }
    }

    /// Serve the push channel on stdin until EOF or Ctrl-C.
    async fn channel(&self) -> Result<ExitCode> {
        let sink: Arc<dyn ResponseSink> = self.gate.clone();
        let channel = PushChannel::new(sink);
        let cancel = CancellationToken::new();

        let watcher = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                watcher.cancel();
            }
        });

        info!("Serving push channel on stdin");
        let stats = channel.serve(tokio::io::stdin(), cancel).await?;
        if stats.malformed > 0 {
            warn!(malformed = stats.malformed, "Skipped malformed channel frames");
        }
        info!(
            frames = stats.frames,
            responses = stats.responses,
            ignored = stats.ignored,
            "Push channel closed"
        );
        Ok(ExitCode::SUCCESS)
    }
}
