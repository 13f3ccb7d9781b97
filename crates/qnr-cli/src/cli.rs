//! Command-line arguments for `qnr`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "qnr",
    version,
    about = "Questionnaire deliverable toolkit - clean, inspect and verify survey data",
    long_about = "Clean raw questionnaire records according to a Markdown plan and a TOML recipe,\n\
                  inspect the cleaned records, and build or verify the packaged deliverable\n\
                  (schema, manifests, report and registry archives)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Deliverable config (default: <WORKSPACE>/qnr.toml when present).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the fields and business rules parsed from a plan.
    Fields(FieldsArgs),

    /// Run the schema, data quality and business rule checks on a CSV file.
    Inspect(InspectArgs),

    /// Clean raw records into the plan's field layout.
    Clean(CleanArgs),

    /// Verify a deliverable workspace end to end.
    Verify(VerifyArgs),

    /// Regenerate every derived artifact of a deliverable workspace.
    Build(BuildArgs),
}

#[derive(Parser)]
pub struct FieldsArgs {
    /// Cleaning plan (Markdown).
    #[arg(long = "plan", value_name = "PLAN")]
    pub plan: PathBuf,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Cleaning plan (Markdown).
    #[arg(long = "plan", value_name = "PLAN")]
    pub plan: PathBuf,

    /// Cleaned records to inspect.
    #[arg(value_name = "DATA")]
    pub data: PathBuf,

    /// Print the inspection report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct CleanArgs {
    /// Cleaning plan (Markdown).
    #[arg(long = "plan", value_name = "PLAN")]
    pub plan: PathBuf,

    /// Cleaning recipe (TOML).
    #[arg(long = "recipe", value_name = "RECIPE")]
    pub recipe: PathBuf,

    /// Raw questionnaire export.
    #[arg(value_name = "RAW")]
    pub raw: PathBuf,

    /// Where to write the cleaned records.
    #[arg(short = 'o', long = "output", value_name = "OUT")]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct VerifyArgs {
    /// Deliverable workspace (default: $QNR_WORKSPACE_DIR or the bundled fixture).
    #[arg(value_name = "WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Print the verification report as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Deliverable workspace (default: $QNR_WORKSPACE_DIR or the bundled fixture).
    #[arg(value_name = "WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Timestamp recorded in manifests (default: now, UTC).
    #[arg(long = "created-at", value_name = "TS")]
    pub created_at: Option<String>,

    /// Clean and inspect without writing any files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
