//! Markdown cleaning-plan parser.
//!
//! A plan is an ordinary Markdown document. Field definitions are read from
//! any table with a field-name column and a type column, or from bullets of
//! the form ``- `age` (integer, 18-70): age in years``. Business rules are
//! bullets of the section whose heading mentions "business rules".

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use qnr_model::{BusinessRule, CompareOp, FieldDefinition, FieldType, Operand, ValueDomain};
use regex::Regex;
use tracing::debug;

use crate::error::{PlanError, StandardsError};

/// Sentinel assumed when the plan does not declare one.
pub const DEFAULT_MISSING_CODE: i64 = -99;

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*\s*$").expect("valid regex"));

static MISSING_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)missing[- ]value\s+code\s*[:=]?\s*`?(-?\d+)").expect("valid regex")
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.+?)\s*$").expect("valid regex"));

static BULLET_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[-*+]\s+`([A-Za-z_]\w*)`\s*\(\s*([A-Za-z]+)\s*(?:,\s*([^)]*))?\)\s*[:\-]?\s*(.*)$")
        .expect("valid regex")
});

static SEPARATOR_CELL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^:?-+:?$").expect("valid regex"));

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+(?:\.\d+)?)\s*(?:-|–|\.\.|to|~)\s*(-?\d+(?:\.\d+)?)$")
        .expect("valid regex")
});

static BOUND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(>=|≥|<=|≤)\s*(-?\d+(?:\.\d+)?)$").expect("valid regex"));

static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+)\s*(?:[=:].*)?$").expect("valid regex"));

static UNIQUE_RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^`(\w+)`\s+(?:is|must be|are)\s+unique\b").expect("valid regex")
});

static CONDITIONAL_RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^`(\w+)`\s+(?:is|must be)\s+(?:required|present|filled)\s+(only\s+)?(?:when|if)\s+`(\w+)`\s*(?:==|=|is)\s*(-?\d+)",
    )
    .expect("valid regex")
});

static COMPARISON_RULE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^`(\w+)`\s*(<=|>=|!=|==|<|>|=)\s*(?:`(\w+)`(?:\s*([+-])\s*(\d+(?:\.\d+)?))?|(-?\d+(?:\.\d+)?))",
    )
    .expect("valid regex")
});

/// One ATX heading and the lines below it up to the next heading.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanSection {
    pub level: usize,
    pub heading: String,
    /// 1-based line of the heading.
    pub line: usize,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub title: Option<String>,
    pub sections: Vec<PlanSection>,
    pub fields: Vec<FieldDefinition>,
    pub rules: Vec<BusinessRule>,
    /// Business-rule bullets no rule form matched.
    pub unparsed_rules: Vec<String>,
    pub default_missing_code: i64,
}

impl Plan {
    /// Returns true if a heading matches `heading`, with or without its `#` prefix.
    pub fn has_heading(&self, heading: &str) -> bool {
        let wanted = heading.trim_start_matches('#').trim();
        self.sections
            .iter()
            .any(|section| section.heading.eq_ignore_ascii_case(wanted))
    }

    pub fn section(&self, heading: &str) -> Option<&PlanSection> {
        let wanted = heading.trim_start_matches('#').trim();
        self.sections
            .iter()
            .find(|section| section.heading.eq_ignore_ascii_case(wanted))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|field| field.name.as_str()).collect()
    }
}

pub fn load_plan(path: &Path) -> Result<Plan, StandardsError> {
    let text = std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?;
    let plan = parse_plan(&text).map_err(|source| StandardsError::Plan {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        fields = plan.fields.len(),
        rules = plan.rules.len(),
        "loaded plan"
    );
    Ok(plan)
}

struct PlanLine<'a> {
    number: usize,
    text: &'a str,
    section: Option<usize>,
}

pub fn parse_plan(text: &str) -> Result<Plan, PlanError> {
    let mut sections: Vec<PlanSection> = Vec::new();
    let mut lines: Vec<PlanLine<'_>> = Vec::new();
    let mut in_fence = false;

    for (index, raw) in text.lines().enumerate() {
        let number = index + 1;
        if raw.trim_start().starts_with("```") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = HEADING_RE.captures(raw) {
            sections.push(PlanSection {
                level: caps[1].len(),
                heading: caps[2].trim().to_string(),
                line: number,
                body: Vec::new(),
            });
            continue;
        }
        let section = sections.len().checked_sub(1);
        if let Some(current) = sections.last_mut() {
            current.body.push(raw.to_string());
        }
        lines.push(PlanLine {
            number,
            text: raw,
            section,
        });
    }

    let title = sections
        .iter()
        .find(|section| section.level == 1)
        .map(|section| section.heading.clone());

    let default_missing_code = lines
        .iter()
        .find_map(|line| MISSING_CODE_RE.captures(line.text))
        .and_then(|caps| caps[1].parse::<i64>().ok())
        .unwrap_or(DEFAULT_MISSING_CODE);

    let rule_sections: Vec<usize> = sections
        .iter()
        .enumerate()
        .filter(|(_, section)| section.heading.to_lowercase().contains("business rule"))
        .map(|(index, _)| index)
        .collect();

    let mut collector = FieldCollector::default();
    parse_tables(&lines, default_missing_code, &mut collector)?;

    let mut rules = Vec::new();
    let mut unparsed_rules = Vec::new();
    for line in &lines {
        let in_rules = line
            .section
            .is_some_and(|section| rule_sections.contains(&section));
        if in_rules {
            if let Some(caps) = BULLET_RE.captures(line.text) {
                let body = caps[1].trim();
                match parse_rule(body) {
                    Some(rule) => rules.push(rule),
                    None => unparsed_rules.push(body.to_string()),
                }
            }
            continue;
        }
        if let Some(field) = parse_bullet_field(line.text, line.number, default_missing_code)? {
            collector.push(field, line.number)?;
        }
    }

    if collector.fields.is_empty() {
        return Err(PlanError::NoFields);
    }

    Ok(Plan {
        title,
        sections,
        fields: collector.fields,
        rules,
        unparsed_rules,
        default_missing_code,
    })
}

#[derive(Default)]
struct FieldCollector {
    fields: Vec<FieldDefinition>,
    seen: HashMap<String, usize>,
}

impl FieldCollector {
    fn push(&mut self, field: FieldDefinition, line: usize) -> Result<(), PlanError> {
        let key = field.name.to_lowercase();
        if self.seen.contains_key(&key) {
            return Err(PlanError::DuplicateField {
                name: field.name,
                line,
            });
        }
        self.seen.insert(key, line);
        self.fields.push(field);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TableColumns {
    field: Option<usize>,
    field_type: Option<usize>,
    domain: Option<usize>,
    missing: Option<usize>,
    description: Option<usize>,
}

impl TableColumns {
    fn from_header(cells: &[String]) -> Self {
        let mut columns = TableColumns::default();
        for (index, cell) in cells.iter().enumerate() {
            let name = cell.trim_matches('`').trim().to_lowercase();
            let slot = match name.as_str() {
                "field" | "field name" | "name" | "variable" | "column" => &mut columns.field,
                "type" | "data type" => &mut columns.field_type,
                "range" | "values" | "allowed" | "allowed values" | "valid range"
                | "valid values" | "domain" | "codes" => &mut columns.domain,
                "missing" | "missing code" | "missing value" => &mut columns.missing,
                "description" | "label" | "meaning" | "notes" => &mut columns.description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(index);
            }
        }
        columns
    }
}

fn split_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|cell| cell.trim().to_string()).collect()
}

fn cell_at(cells: &[String], col: Option<usize>) -> &str {
    col.and_then(|col| cells.get(col))
        .map(String::as_str)
        .unwrap_or("")
}

fn is_separator(cells: &[String]) -> bool {
    !cells.is_empty() && cells.iter().all(|cell| SEPARATOR_CELL_RE.is_match(cell))
}

fn parse_tables(
    lines: &[PlanLine<'_>],
    default_missing_code: i64,
    collector: &mut FieldCollector,
) -> Result<(), PlanError> {
    let mut index = 0;
    while index < lines.len() {
        if !lines[index].text.trim_start().starts_with('|') {
            index += 1;
            continue;
        }
        let start = index;
        while index < lines.len() && lines[index].text.trim_start().starts_with('|') {
            index += 1;
        }
        let block = &lines[start..index];
        if block.len() < 2 || !is_separator(&split_row(block[1].text)) {
            continue;
        }
        let columns = TableColumns::from_header(&split_row(block[0].text));
        let (Some(field_col), Some(type_col)) = (columns.field, columns.field_type) else {
            continue;
        };
        for row in &block[2..] {
            let cells = split_row(row.text);
            let cell = |col: Option<usize>| cell_at(&cells, col);
            let name = cell(Some(field_col)).trim_matches('`').trim();
            if name.is_empty() {
                continue;
            }
            let type_text = cell(Some(type_col)).trim_matches('`').trim();
            let field_type: FieldType =
                type_text.parse().map_err(|_| PlanError::InvalidField {
                    line: row.number,
                    message: format!("unknown type `{type_text}` for field `{name}`"),
                })?;
            let domain =
                parse_domain(cell(columns.domain)).map_err(|message| PlanError::InvalidField {
                    line: row.number,
                    message: format!("field `{name}`: {message}"),
                })?;
            let missing_code = parse_missing_cell(cell(columns.missing), default_missing_code)
                .map_err(|message| PlanError::InvalidField {
                    line: row.number,
                    message: format!("field `{name}`: {message}"),
                })?;
            let mut field = FieldDefinition::new(name, field_type)
                .with_domain(domain)
                .with_missing_code(missing_code);
            let description = cell(columns.description);
            if !description.is_empty() {
                field = field.with_description(description);
            }
            collector.push(field, row.number)?;
        }
    }
    Ok(())
}

fn parse_missing_cell(cell: &str, default: i64) -> Result<Option<i64>, String> {
    let text = cell.trim().trim_matches('`').trim();
    match text.to_lowercase().as_str() {
        "" | "-" | "default" => Ok(Some(default)),
        "none" | "required" => Ok(None),
        _ => text
            .parse::<i64>()
            .map(Some)
            .map_err(|_| format!("invalid missing code `{text}`")),
    }
}

/// A bullet that matches the field form but carries a bad type or domain is an
/// error, the same as a bad table row.
fn parse_bullet_field(
    line: &str,
    number: usize,
    default_missing_code: i64,
) -> Result<Option<FieldDefinition>, PlanError> {
    let Some(caps) = BULLET_FIELD_RE.captures(line) else {
        return Ok(None);
    };
    let name = &caps[1];
    let type_text = &caps[2];
    let field_type: FieldType = type_text.parse().map_err(|_| PlanError::InvalidField {
        line: number,
        message: format!("unknown type `{type_text}` for field `{name}`"),
    })?;
    let domain = match caps.get(3) {
        Some(domain) => {
            parse_domain(domain.as_str()).map_err(|message| PlanError::InvalidField {
                line: number,
                message: format!("field `{name}`: {message}"),
            })?
        }
        None => ValueDomain::Any,
    };
    let mut field = FieldDefinition::new(name, field_type)
        .with_domain(domain)
        .with_missing_code(Some(default_missing_code));
    if let Some(description) = caps.get(4).map(|m| m.as_str().trim())
        && !description.is_empty()
    {
        field = field.with_description(description);
    }
    Ok(Some(field))
}

/// Parse a value-domain cell: `18-70`, `0..50`, `1 to 5`, `>= 0`, `<= 100`,
/// or a code list such as `1,2,3` or `1=Male; 2=Female`. Blank, `-` and `any`
/// mean no restriction.
pub fn parse_domain(text: &str) -> Result<ValueDomain, String> {
    let text = text.trim().trim_matches('`').trim();
    if text.is_empty() || text == "-" || text.eq_ignore_ascii_case("any") {
        return Ok(ValueDomain::Any);
    }
    if let Some(caps) = RANGE_RE.captures(text) {
        let min = parse_bound(&caps[1])?;
        let max = parse_bound(&caps[2])?;
        if min > max {
            return Err(format!("empty range `{text}`"));
        }
        return Ok(ValueDomain::range(min, max));
    }
    if let Some(caps) = BOUND_RE.captures(text) {
        let bound = parse_bound(&caps[2])?;
        return Ok(match &caps[1] {
            ">=" | "≥" => ValueDomain::Range {
                min: Some(bound),
                max: None,
            },
            _ => ValueDomain::Range {
                min: None,
                max: Some(bound),
            },
        });
    }
    let mut codes = Vec::new();
    for part in text.split([',', '/', ';', '|']) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let caps = CODE_RE
            .captures(part)
            .ok_or_else(|| format!("unrecognized value domain `{text}`"))?;
        let code = caps[1]
            .parse::<i64>()
            .map_err(|_| format!("invalid code `{part}`"))?;
        codes.push(code);
    }
    if codes.is_empty() {
        return Err(format!("unrecognized value domain `{text}`"));
    }
    Ok(ValueDomain::codes(codes))
}

fn parse_bound(text: &str) -> Result<f64, String> {
    text.parse::<f64>()
        .map_err(|_| format!("invalid bound `{text}`"))
}

fn parse_rule(text: &str) -> Option<BusinessRule> {
    if let Some(caps) = UNIQUE_RULE_RE.captures(text) {
        return Some(BusinessRule::Unique {
            field: caps[1].to_string(),
        });
    }
    if let Some(caps) = CONDITIONAL_RULE_RE.captures(text) {
        return Some(BusinessRule::ConditionalPresence {
            field: caps[1].to_string(),
            when_field: caps[3].to_string(),
            when_value: caps[4].parse().ok()?,
            exclusive: caps.get(2).is_some(),
        });
    }
    let caps = COMPARISON_RULE_RE.captures(text)?;
    let op: CompareOp = caps[2].parse().ok()?;
    let right = match (caps.get(3), caps.get(6)) {
        (Some(name), _) => {
            let magnitude = match caps.get(5) {
                Some(offset) => offset.as_str().parse::<f64>().ok()?,
                None => 0.0,
            };
            let offset = match caps.get(4).map(|sign| sign.as_str()) {
                Some("-") => -magnitude,
                _ => magnitude,
            };
            Operand::Field {
                name: name.as_str().to_string(),
                offset,
            }
        }
        (None, Some(constant)) => Operand::Constant(constant.as_str().parse().ok()?),
        (None, None) => return None,
    };
    Some(BusinessRule::Comparison {
        field: caps[1].to_string(),
        op,
        right,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_domains() {
        assert_eq!(parse_domain("18-70").unwrap(), ValueDomain::range(18.0, 70.0));
        assert_eq!(parse_domain("0..50").unwrap(), ValueDomain::range(0.0, 50.0));
        assert_eq!(parse_domain("1 to 5").unwrap(), ValueDomain::range(1.0, 5.0));
        assert_eq!(
            parse_domain(">= 0").unwrap(),
            ValueDomain::Range {
                min: Some(0.0),
                max: None
            }
        );
        assert_eq!(
            parse_domain("1=Male; 2=Female").unwrap(),
            ValueDomain::codes([1, 2])
        );
        assert_eq!(parse_domain("0/1").unwrap(), ValueDomain::codes([0, 1]));
        assert_eq!(parse_domain("-").unwrap(), ValueDomain::Any);
        assert!(parse_domain("lots").is_err());
        assert!(parse_domain("9-1").is_err());
    }

    #[test]
    fn parses_rule_forms() {
        assert_eq!(
            parse_rule("`respondent_id` is unique"),
            Some(BusinessRule::Unique {
                field: "respondent_id".to_string()
            })
        );
        assert_eq!(
            parse_rule("`other_dept_specify` is required only when `department` = 5"),
            Some(BusinessRule::ConditionalPresence {
                field: "other_dept_specify".to_string(),
                when_field: "department".to_string(),
                when_value: 5,
                exclusive: true,
            })
        );
        assert_eq!(
            parse_rule("`tenure_years` <= `age` - 16"),
            Some(BusinessRule::Comparison {
                field: "tenure_years".to_string(),
                op: CompareOp::Le,
                right: Operand::Field {
                    name: "age".to_string(),
                    offset: -16.0
                },
            })
        );
        assert_eq!(
            parse_rule("`tenure_years` >= 0"),
            Some(BusinessRule::Comparison {
                field: "tenure_years".to_string(),
                op: CompareOp::Ge,
                right: Operand::Constant(0.0),
            })
        );
        assert_eq!(parse_rule("answers should be honest"), None);
    }

    #[test]
    fn missing_cells() {
        assert_eq!(parse_missing_cell("", -99), Ok(Some(-99)));
        assert_eq!(parse_missing_cell("-88", -99), Ok(Some(-88)));
        assert_eq!(parse_missing_cell("none", -99), Ok(None));
        assert!(parse_missing_cell("n/a?", -99).is_err());
    }
}
