//! Manifest builders.
//!
//! Component paths are relative to the workspace root and every referenced
//! file is hashed, so each builder must run after the files it lists exist.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use qnr_ingest::{CsvTable, profile_columns};
use qnr_model::{
    CleaningManifest, CleaningStats, ColumnStat, ComponentRef, DatasetManifest, DatasetStats,
    FieldType, FileRecord, InspectionReport, QualityAssurance, RecipeManifest, RecordCounts,
};
use qnr_standards::{Layout, PackageSettings, Plan, sha256_file};
use qnr_transform::CLEANING_STEPS;

fn checksum(root: &Path, relative: &str) -> Result<String> {
    let path = root.join(relative);
    sha256_file(&path).with_context(|| format!("hash {}", path.display()))
}

fn component(root: &Path, relative: &str) -> Result<ComponentRef> {
    Ok(ComponentRef {
        path: relative.to_string(),
        sha256: Some(checksum(root, relative)?),
    })
}

fn components(root: &Path, entries: &[(&str, &str)]) -> Result<BTreeMap<String, ComponentRef>> {
    entries
        .iter()
        .map(|(name, relative)| Ok((name.to_string(), component(root, relative)?)))
        .collect()
}

/// Per-column type and missing count of the cleaned records.
pub fn column_stats(plan: &Plan, table: &CsvTable) -> Vec<ColumnStat> {
    profile_columns(table)
        .into_iter()
        .map(|profile| ColumnStat {
            field_type: plan
                .field(&profile.name)
                .map_or(FieldType::String, |field| field.field_type),
            missing: profile.missing,
            name: profile.name,
        })
        .collect()
}

pub fn build_dataset_manifest(
    root: &Path,
    layout: &Layout,
    package: &PackageSettings,
    created_at: &str,
    plan: &Plan,
    table: &CsvTable,
    inspection: &InspectionReport,
) -> Result<DatasetManifest> {
    let components = components(
        root,
        &[
            ("records", layout.cleaned_records.as_str()),
            ("schema", layout.schema.as_str()),
            ("cleaning_manifest", layout.cleaning_manifest.as_str()),
            ("inspection", layout.inspection_report.as_str()),
            ("report", layout.report.as_str()),
        ],
    )?;
    Ok(DatasetManifest {
        name: package.name.clone(),
        version: package.version.clone(),
        created_at: created_at.to_string(),
        description: plan.title.clone(),
        stats: DatasetStats {
            rows: table.row_count(),
            columns: column_stats(plan, table),
        },
        components,
        quality_assurance: QualityAssurance {
            schema_compliance: inspection.schema_compliance.status,
            data_quality: inspection.data_quality.status,
            business_rules: inspection.business_rules.status,
            quality_score: inspection.data_quality.quality_score,
        },
    })
}

pub fn build_cleaning_manifest(
    root: &Path,
    layout: &Layout,
    package: &PackageSettings,
    created_at: &str,
    stats: &CleaningStats,
) -> Result<CleaningManifest> {
    Ok(CleaningManifest {
        name: package.name.clone(),
        version: package.version.clone(),
        created_at: created_at.to_string(),
        input: FileRecord {
            path: layout.raw_records.clone(),
            rows: stats.input_rows,
            sha256: checksum(root, &layout.raw_records)?,
        },
        output: FileRecord {
            path: layout.cleaned_records.clone(),
            rows: stats.output_rows,
            sha256: checksum(root, &layout.cleaned_records)?,
        },
        steps: CLEANING_STEPS.iter().map(|step| step.to_string()).collect(),
        records: RecordCounts {
            input: stats.input_rows,
            output: stats.output_rows,
            duplicates_removed: stats.duplicates_removed,
            missing_recoded: stats.missing_recoded.clone(),
        },
    })
}

pub fn build_recipe_manifest(
    root: &Path,
    layout: &Layout,
    package: &PackageSettings,
    created_at: &str,
) -> Result<RecipeManifest> {
    let components = components(
        root,
        &[
            ("plan", layout.plan.as_str()),
            ("field_spec", layout.field_spec.as_str()),
            ("processor", layout.recipe.as_str()),
            ("inspector", layout.inspection_report.as_str()),
            ("schema", layout.schema.as_str()),
        ],
    )?;
    Ok(RecipeManifest {
        name: package.name.clone(),
        version: package.version.clone(),
        created_at: created_at.to_string(),
        components,
    })
}
