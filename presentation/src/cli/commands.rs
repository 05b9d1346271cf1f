//! CLI command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for actiongate
#[derive(Parser, Debug)]
#[command(name = "actiongate")]
#[command(author, version, about = "Risk-tiered approval gate for AI-proposed system actions")]
#[command(long_about = r#"
actiongate extracts the commands and tool operations an AI assistant proposes,
classifies each by risk, and runs them only once they are approved.

Tiers:
  green   read-only, stored as approved
  yellow  changes state, needs approval
  red     destructive, needs approval

Configuration files are loaded from (in priority order):
1. ACTIONGATE_SECTION__KEY environment variables
2. --config <path>            Explicit config file
3. ./actiongate.toml          Project-level config
4. ~/.config/actiongate/config.toml   Global config

Example:
  actiongate extract --conversation c1 reply.md
  actiongate actions pending
  actiongate resolve 3f2a... --approve
  actiongate tools exec packages search -p query=git
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify and store the actions in one AI response
    Extract {
        /// Conversation the response belongs to
        #[arg(long, value_name = "ID")]
        conversation: String,

        /// File with the AI response; `-` or omitted reads stdin
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Inspect stored actions
    #[command(subcommand)]
    Actions(ActionsCommand),

    /// Approve or deny a pending action
    Resolve(ResolveArgs),

    /// Inspect and run tools
    #[command(subcommand)]
    Tools(ToolsCommand),

    /// Read push-channel messages from stdin until EOF
    Channel,
}

#[derive(Subcommand, Debug)]
pub enum ActionsCommand {
    /// Actions waiting for a decision
    Pending,

    /// Stored actions, newest first
    List {
        /// Only actions with this status
        #[arg(long, value_name = "STATUS")]
        status: Option<String>,

        /// Maximum number of actions
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
}

#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("decision").required(true).args(["approve", "deny"]))]
pub struct ResolveArgs {
    /// Action id
    pub id: String,

    /// Approve and execute
    #[arg(long)]
    pub approve: bool,

    /// Deny without executing
    #[arg(long)]
    pub deny: bool,
}

impl ResolveArgs {
    pub fn approved(&self) -> bool {
        self.approve && !self.deny
    }
}

#[derive(Subcommand, Debug)]
pub enum ToolsCommand {
    /// Every known tool with its last detection result
    List,
    /// Installed tools only
    Installed,
    /// Re-run detection for every tool
    Scan,
    /// Operations offered by installed tools
    Operations,
    /// The capability block given to the assistant
    Summary,
    /// Run an intent directly, without an action record
    Exec {
        /// Domain (packages, drivers, debloat, file-ops, system-tools)
        domain: String,

        /// Intent within the domain
        intent: String,

        /// Parameter as key=value (repeatable)
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
