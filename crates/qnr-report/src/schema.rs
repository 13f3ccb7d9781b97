//! Schema document and field spec exported from a parsed plan.

use qnr_model::schema::FieldConstraints;
use qnr_model::{
    BusinessRule, FieldDefinition, FieldType, QualityRule, SchemaBody, SchemaDocument,
    SchemaField, ValueDomain,
};
use qnr_standards::{PackageSettings, Plan};
use qnr_transform::CleaningRecipe;
use serde::{Deserialize, Serialize};

/// Machine-readable copy of the plan's fields and rules (`blueprint/spec`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub title: Option<String>,
    pub default_missing_code: i64,
    pub fields: Vec<FieldDefinition>,
    pub rules: Vec<BusinessRule>,
}

pub fn build_field_spec(plan: &Plan) -> FieldSpec {
    FieldSpec {
        title: plan.title.clone(),
        default_missing_code: plan.default_missing_code,
        fields: plan.fields.clone(),
        rules: plan.rules.clone(),
    }
}

pub fn build_schema(plan: &Plan, recipe: &CleaningRecipe, package: &PackageSettings) -> SchemaDocument {
    let fields = plan.fields.iter().map(schema_field).collect();
    SchemaDocument {
        name: package.name.clone(),
        version: package.version.clone(),
        description: plan.title.clone(),
        schema: SchemaBody {
            fields,
            primary_key: recipe.recipe.id_column.clone(),
        },
        quality_rules: quality_rules(plan),
        transformations: recipe.transformations(),
    }
}

fn schema_field(field: &FieldDefinition) -> SchemaField {
    let constraints = match field.effective_domain() {
        ValueDomain::Any => None,
        ValueDomain::Range { min, max } => Some(FieldConstraints {
            minimum: min,
            maximum: max,
            allowed: None,
        }),
        ValueDomain::Codes { codes } => Some(FieldConstraints {
            allowed: Some(codes),
            ..FieldConstraints::default()
        }),
    };
    SchemaField {
        name: field.name.clone(),
        field_type: field.field_type,
        description: field.description.clone(),
        constraints,
        missing_value: field.missing_code,
    }
}

fn quality_rules(plan: &Plan) -> Vec<QualityRule> {
    let mut rules = vec![QualityRule {
        name: "missing_code".to_string(),
        field: None,
        rule: format!("missing answers are coded {}", plan.default_missing_code),
        severity: Some("error".to_string()),
    }];
    for field in &plan.fields {
        if field.is_required() {
            rules.push(QualityRule {
                name: "required".to_string(),
                field: Some(field.name.clone()),
                rule: format!("{} is never missing", field.name),
                severity: Some("error".to_string()),
            });
        }
        let domain = field.effective_domain();
        if domain != ValueDomain::Any && field.field_type != FieldType::Datetime {
            rules.push(QualityRule {
                name: "domain".to_string(),
                field: Some(field.name.clone()),
                rule: format!("{} in {domain}", field.name),
                severity: Some("error".to_string()),
            });
        }
    }
    for rule in &plan.rules {
        rules.push(QualityRule {
            name: "business_rule".to_string(),
            field: rule.fields().first().map(|field| field.to_string()),
            rule: rule.to_string(),
            severity: Some("error".to_string()),
        });
    }
    rules
}
