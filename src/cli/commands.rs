use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vuln-regex-cache", version, about = "Trust-split caching and reconciliation for ReDoS verdicts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask whether a pattern is vulnerable (local cache, then server)
    Query(QueryArgs),
    /// Submit a locally-computed verdict to the server
    Report(ReportArgs),
    /// Run the lookup/update HTTP server
    Serve(ServeArgs),
    /// Run one reconciliation pass over the quarantine store
    Reconcile(ReconcileArgs),
    /// Demote trusted SAFE records to the quarantine for re-adjudication
    Rescan(RescanArgs),
    /// Wipe both verdict tables (intended for test deployments)
    Erase(EraseArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct QueryArgs {
    /// Regex pattern source string
    #[arg(short, long)]
    pub pattern: String,

    /// Regex engine dialect (javascript, python, java, php, ruby, go, perl, rust)
    #[arg(short, long, default_value = "javascript")]
    pub language: String,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cache server hostname (overrides config)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Cache server port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Local cache backend: persistent, memory, none
    #[arg(long)]
    pub cache_type: Option<String>,

    /// Directory for the persistent cache
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Local cache TTL in seconds
    #[arg(long)]
    pub expiration: Option<i64>,
}

#[derive(Args, Clone)]
pub struct ReportArgs {
    /// Regex pattern source string
    #[arg(short, long)]
    pub pattern: String,

    /// Regex engine dialect
    #[arg(short, long, default_value = "javascript")]
    pub language: String,

    /// Verdict to report: SAFE or VULNERABLE
    #[arg(short, long)]
    pub result: String,

    /// JSON file holding the reproducing evilInput (required for VULNERABLE)
    #[arg(long)]
    pub evil_input: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Cache server hostname (overrides config)
    #[arg(long)]
    pub hostname: Option<String>,

    /// Cache server port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct ReconcileArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Detector driver command (query file path is appended)
    #[arg(long)]
    pub check_cmd: Option<String>,

    /// Evidence-replay driver command
    #[arg(long)]
    pub validate_cmd: Option<String>,
}

#[derive(Args, Clone)]
pub struct RescanArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,
}

#[derive(Args, Clone)]
pub struct EraseArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Confirm erasing every stored verdict
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: PathBuf,
}
