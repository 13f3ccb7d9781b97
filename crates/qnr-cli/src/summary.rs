use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qnr_cli::pipeline::BuildResult;
use qnr_model::{CheckStatus, CleaningStats, InspectionReport, Severity};
use qnr_standards::Plan;
use qnr_validate::{DeliverableReport, VerifyArea};

pub fn print_fields(plan: &Plan) {
    if let Some(title) = &plan.title {
        println!("Plan: {title}");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Type"),
        header_cell("Allowed values"),
        header_cell("Missing code"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for field in &plan.fields {
        let missing = match field.missing_code {
            Some(code) => Cell::new(code),
            None => Cell::new("required").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&field.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(field.field_type),
            Cell::new(field.effective_domain()),
            missing,
            description_cell(field.description.as_deref()),
        ]);
    }
    println!("{table}");

    if !plan.rules.is_empty() {
        let mut rules = Table::new();
        rules.set_header(vec![header_cell("Code"), header_cell("Business rule")]);
        apply_table_style(&mut rules);
        for (index, rule) in plan.rules.iter().enumerate() {
            rules.add_row(vec![dim_cell(format!("BR{:03}", index + 1)), Cell::new(rule)]);
        }
        println!();
        println!("{rules}");
    }
    for rule in &plan.unparsed_rules {
        eprintln!("warning: rule not understood: {rule}");
    }
}

pub fn print_inspection(report: &InspectionReport) {
    println!("Dataset: {}", report.dataset);
    println!("Records: {} rows, {} columns", report.rows, report.columns);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Check"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
        header_cell("Score"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for result in report.results() {
        table.add_row(vec![
            Cell::new(result.check.label()),
            status_cell(result.status),
            count_cell(result.error_count(), Color::Red),
            count_cell(result.warning_count(), Color::Yellow),
            match result.quality_score {
                Some(score) => Cell::new(format!("{score:.2}")),
                None => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
    print_issue_table(report);
}

fn print_issue_table(report: &InspectionReport) {
    let mut issues: Vec<_> = report
        .results()
        .into_iter()
        .flat_map(|result| result.issues.iter())
        .collect();
    if issues.is_empty() {
        return;
    }
    issues.sort_by(|a, b| {
        severity_rank(b.severity)
            .cmp(&severity_rank(a.severity))
            .then_with(|| a.code.cmp(&b.code))
    });
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Severity"),
        header_cell("Field"),
        header_cell("Count"),
        header_cell("Message"),
        header_cell("Examples"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for issue in issues {
        let (message, examples) = split_examples(&issue.message);
        table.add_row(vec![
            Cell::new(&issue.code),
            severity_cell(issue.severity),
            Cell::new(issue.field.as_deref().unwrap_or("-")),
            match issue.count {
                Some(count) => Cell::new(count).fg(severity_color(issue.severity)),
                None => dim_cell("-"),
            },
            Cell::new(message),
            example_cell(examples),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

pub fn print_cleaning(stats: &CleaningStats) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Measure"), header_cell("Value")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Input rows"), Cell::new(stats.input_rows)]);
    table.add_row(vec![
        Cell::new("Duplicates removed"),
        count_cell(stats.duplicates_removed, Color::Yellow),
    ]);
    table.add_row(vec![Cell::new("Output rows"), Cell::new(stats.output_rows)]);
    table.add_row(vec![
        Cell::new("Values recoded as missing"),
        count_cell(stats.total_recoded(), Color::Yellow),
    ]);
    println!("{table}");
}

pub fn print_verification(report: &DeliverableReport) {
    println!("Workspace: {}", report.root.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Area"),
        header_cell("Checks"),
        header_cell("Passed"),
        header_cell("Warnings"),
        header_cell("Failed"),
    ]);
    apply_summary_table_style(&mut table);
    for column in 1..=4 {
        align_column(&mut table, column, CellAlignment::Right);
    }
    for area in VerifyArea::ALL {
        let checks: Vec<_> = report.area(area).collect();
        let count = |status: CheckStatus| checks.iter().filter(|c| c.status == status).count();
        table.add_row(vec![
            Cell::new(area.label())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(checks.len()),
            Cell::new(count(CheckStatus::Passed)),
            count_cell(count(CheckStatus::Warning), Color::Yellow),
            count_cell(count(CheckStatus::Failed), Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(report.checks.len()).add_attribute(Attribute::Bold),
        Cell::new(report.count(CheckStatus::Passed)).add_attribute(Attribute::Bold),
        count_cell(report.count(CheckStatus::Warning), Color::Yellow)
            .add_attribute(Attribute::Bold),
        count_cell(report.count(CheckStatus::Failed), Color::Red).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let flagged: Vec<_> = report
        .checks
        .iter()
        .filter(|check| check.status != CheckStatus::Passed)
        .collect();
    if flagged.is_empty() {
        return;
    }
    let mut details = Table::new();
    details.set_header(vec![
        header_cell("Area"),
        header_cell("Check"),
        header_cell("Status"),
        header_cell("Detail"),
    ]);
    apply_table_style(&mut details);
    align_column(&mut details, 2, CellAlignment::Center);
    for check in flagged {
        details.add_row(vec![
            Cell::new(check.area.label()),
            Cell::new(&check.name),
            status_cell(check.status),
            Cell::new(&check.detail),
        ]);
    }
    println!();
    println!("Problems:");
    println!("{details}");
}

pub fn print_build(result: &BuildResult, dry_run: bool) {
    println!("Workspace: {}", result.root.display());
    print_cleaning(&result.stats);
    print_inspection(&result.inspection);
    println!();
    if dry_run {
        println!("Dry run, nothing written. Would write:");
    } else {
        println!("Wrote:");
    }
    for path in &result.written {
        println!("- {path}");
    }
    for archive in &result.archives {
        println!(
            "Archive {}: {} files, sha256 {}",
            archive.archive,
            archive.files.len(),
            archive.archive_checksum
        );
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn status_cell(status: CheckStatus) -> Cell {
    match status {
        CheckStatus::Passed => Cell::new("PASSED").fg(Color::Green),
        CheckStatus::Warning => Cell::new("WARNING").fg(Color::Yellow),
        CheckStatus::Failed => Cell::new("FAILED")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("ERROR").fg(Color::Red),
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: Severity) -> u8 {
    match severity {
        Severity::Error => 2,
        Severity::Warning => 1,
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn description_cell(description: Option<&str>) -> Cell {
    match description {
        Some(text) => Cell::new(text),
        None => dim_cell("-"),
    }
}

fn split_examples(message: &str) -> (String, String) {
    match message.rsplit_once(" (examples: ") {
        Some((head, tail)) => (head.to_string(), tail.trim_end_matches(')').to_string()),
        None => (message.to_string(), "-".to_string()),
    }
}

fn example_cell(value: String) -> Cell {
    if value == "-" {
        dim_cell(value)
    } else {
        Cell::new(value)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
