use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use qnr_ingest::{read_csv_frame, read_csv_table, write_csv_table};
use qnr_model::{CleaningStats, InspectionReport};
use qnr_standards::{DeliverableConfig, Plan, load_config, load_plan, workspace_root};
use qnr_transform::{clean_table, load_recipe};
use qnr_validate::{DeliverableReport, QuestionnaireInspector, verify_deliverable};
use tracing::{info, info_span};

use qnr_cli::pipeline::{BuildOptions, BuildResult, build_deliverable};

use crate::cli::{BuildArgs, CleanArgs, FieldsArgs, InspectArgs, VerifyArgs};

/// Timestamp format used when `--created-at` is not given.
const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

fn resolve_workspace(workspace: Option<&PathBuf>) -> PathBuf {
    workspace.cloned().unwrap_or_else(workspace_root)
}

fn resolve_config(root: &Path, config: Option<&PathBuf>) -> Result<DeliverableConfig> {
    match config {
        Some(path) => {
            load_config(path).with_context(|| format!("load config {}", path.display()))
        }
        None => DeliverableConfig::for_workspace(root)
            .with_context(|| format!("load config for {}", root.display())),
    }
}

pub fn run_fields(args: &FieldsArgs) -> Result<Plan> {
    load_plan(&args.plan).with_context(|| format!("load plan {}", args.plan.display()))
}

pub fn run_inspect(args: &InspectArgs) -> Result<InspectionReport> {
    let inspector = QuestionnaireInspector::new(&args.plan)
        .with_context(|| format!("load plan {}", args.plan.display()))?;
    let frame = read_csv_frame(&args.data)?;
    let dataset = args
        .data
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.data.display().to_string());
    Ok(inspector.inspect(&dataset, &frame))
}

pub fn run_clean(args: &CleanArgs) -> Result<CleaningStats> {
    let span = info_span!("clean_command", raw = %args.raw.display());
    let _guard = span.enter();
    let plan =
        load_plan(&args.plan).with_context(|| format!("load plan {}", args.plan.display()))?;
    let recipe = load_recipe(&args.recipe)?;
    let raw = read_csv_table(&args.raw)?;
    let outcome = clean_table(&raw, &plan, &recipe)?;
    write_csv_table(&args.output, &outcome.table)?;
    info!(
        output = %args.output.display(),
        rows = outcome.stats.output_rows,
        "wrote cleaned records"
    );
    Ok(outcome.stats)
}

pub fn run_verify(args: &VerifyArgs, config: Option<&PathBuf>) -> Result<DeliverableReport> {
    let root = resolve_workspace(args.workspace.as_ref());
    let config = resolve_config(&root, config)?;
    Ok(verify_deliverable(&root, &config))
}

pub fn run_build(args: &BuildArgs, config: Option<&PathBuf>) -> Result<BuildResult> {
    let root = resolve_workspace(args.workspace.as_ref());
    let config = resolve_config(&root, config)?;
    let options = BuildOptions {
        created_at: args
            .created_at
            .clone()
            .unwrap_or_else(|| chrono::Utc::now().format(CREATED_AT_FORMAT).to_string()),
        dry_run: args.dry_run,
    };
    build_deliverable(&root, &config, &options)
}
