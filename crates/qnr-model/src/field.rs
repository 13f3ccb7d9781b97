use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QnrError;

/// Storage type of a questionnaire field.
///
/// The set mirrors the types a schema document may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Float,
    /// 0/1 indicator, typically a dummy column split from a multi-select answer.
    Binary,
    /// Timestamp in the deliverable's datetime format.
    Datetime,
    /// Integer-coded single choice answer.
    Categorical,
    /// Free text.
    Text,
}

impl FieldType {
    pub const ALL: [FieldType; 7] = [
        FieldType::String,
        FieldType::Integer,
        FieldType::Float,
        FieldType::Binary,
        FieldType::Datetime,
        FieldType::Categorical,
        FieldType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Binary => "binary",
            FieldType::Datetime => "datetime",
            FieldType::Categorical => "categorical",
            FieldType::Text => "text",
        }
    }

    /// Returns true if values of this type are stored as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldType::Integer | FieldType::Float | FieldType::Binary | FieldType::Categorical
        )
    }

    /// Returns true for free-form string types, where blanks are acceptable.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::String | FieldType::Text)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = QnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "string" | "str" => Ok(FieldType::String),
            "integer" | "int" => Ok(FieldType::Integer),
            "float" | "number" | "double" => Ok(FieldType::Float),
            "binary" | "bool" | "boolean" => Ok(FieldType::Binary),
            "datetime" | "timestamp" => Ok(FieldType::Datetime),
            "categorical" | "category" => Ok(FieldType::Categorical),
            "text" => Ok(FieldType::Text),
            _ => Err(QnrError::UnknownFieldType(s.trim().to_string())),
        }
    }
}

/// Allowed values for a field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueDomain {
    #[default]
    Any,
    /// Inclusive numeric bounds; either side may be open.
    Range { min: Option<f64>, max: Option<f64> },
    /// Enumerated integer codes.
    Codes { codes: Vec<i64> },
}

impl ValueDomain {
    pub fn range(min: f64, max: f64) -> Self {
        ValueDomain::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn codes(codes: impl IntoIterator<Item = i64>) -> Self {
        ValueDomain::Codes {
            codes: codes.into_iter().collect(),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        match self {
            ValueDomain::Any => true,
            ValueDomain::Range { min, max } => {
                min.is_none_or(|min| value >= min) && max.is_none_or(|max| value <= max)
            }
            ValueDomain::Codes { codes } => {
                value.fract() == 0.0 && codes.iter().any(|code| *code as f64 == value)
            }
        }
    }
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDomain::Any => f.write_str("-"),
            ValueDomain::Range {
                min: Some(min),
                max: Some(max),
            } => write!(f, "{min}-{max}"),
            ValueDomain::Range {
                min: Some(min),
                max: None,
            } => write!(f, ">= {min}"),
            ValueDomain::Range {
                min: None,
                max: Some(max),
            } => write!(f, "<= {max}"),
            ValueDomain::Range {
                min: None,
                max: None,
            } => f.write_str("-"),
            ValueDomain::Codes { codes } => {
                let joined: Vec<String> = codes.iter().map(i64::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

/// A field parsed from the cleaning plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub domain: ValueDomain,
    /// Sentinel written when the value is absent. `None` marks a required field.
    pub missing_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            domain: ValueDomain::Any,
            missing_code: None,
            description: None,
        }
    }

    pub fn with_domain(mut self, domain: ValueDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_missing_code(mut self, code: Option<i64>) -> Self {
        self.missing_code = code;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.missing_code.is_none()
    }

    /// Effective value domain; binary fields are always restricted to 0/1.
    pub fn effective_domain(&self) -> ValueDomain {
        match (self.field_type, &self.domain) {
            (FieldType::Binary, ValueDomain::Any) => ValueDomain::codes([0, 1]),
            _ => self.domain.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_aliases() {
        assert_eq!("Integer".parse::<FieldType>().unwrap(), FieldType::Integer);
        assert_eq!(" bool ".parse::<FieldType>().unwrap(), FieldType::Binary);
        assert!("matrix".parse::<FieldType>().is_err());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let domain = ValueDomain::range(18.0, 70.0);
        assert!(domain.contains(18.0));
        assert!(domain.contains(70.0));
        assert!(!domain.contains(17.0));
        assert!(!domain.contains(70.5));
    }

    #[test]
    fn codes_reject_fractions() {
        let domain = ValueDomain::codes([1, 2, 3]);
        assert!(domain.contains(2.0));
        assert!(!domain.contains(2.5));
        assert!(!domain.contains(4.0));
    }

    #[test]
    fn binary_defaults_to_zero_one() {
        let field = FieldDefinition::new("benefit_medical", FieldType::Binary);
        assert_eq!(field.effective_domain(), ValueDomain::codes([0, 1]));
    }

    #[test]
    fn domain_display() {
        assert_eq!(ValueDomain::range(1.0, 5.0).to_string(), "1-5");
        assert_eq!(
            ValueDomain::Range {
                min: Some(0.0),
                max: None
            }
            .to_string(),
            ">= 0"
        );
        assert_eq!(ValueDomain::codes([1, 2]).to_string(), "1,2");
    }
}
