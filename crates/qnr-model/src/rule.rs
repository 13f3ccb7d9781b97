use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QnrError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
        }
    }

    pub fn holds(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Eq => (left - right).abs() < f64::EPSILON,
            CompareOp::Ne => (left - right).abs() >= f64::EPSILON,
        }
    }
}

impl FromStr for CompareOp {
    type Err = QnrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "=" | "==" => Ok(CompareOp::Eq),
            "!=" | "<>" => Ok(CompareOp::Ne),
            other => Err(QnrError::UnknownOperator(other.to_string())),
        }
    }
}

/// Right-hand side of a comparison rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Field { name: String, offset: f64 },
    Constant(f64),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field { name, offset } if *offset > 0.0 => write!(f, "{name} + {offset}"),
            Operand::Field { name, offset } if *offset < 0.0 => {
                write!(f, "{name} - {}", offset.abs())
            }
            Operand::Field { name, .. } => f.write_str(name),
            Operand::Constant(value) => write!(f, "{value}"),
        }
    }
}

/// Cross-field rule declared in the plan's business rules section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BusinessRule {
    /// No two present values of `field` may be equal.
    Unique { field: String },
    /// `field` must be present when `when_field` equals `when_value`.
    /// With `exclusive`, it must also be missing whenever `when_field` holds another value.
    ConditionalPresence {
        field: String,
        when_field: String,
        when_value: i64,
        exclusive: bool,
    },
    Comparison {
        field: String,
        op: CompareOp,
        right: Operand,
    },
}

impl BusinessRule {
    /// Fields the rule reads.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            BusinessRule::Unique { field } => vec![field.as_str()],
            BusinessRule::ConditionalPresence {
                field, when_field, ..
            } => vec![field.as_str(), when_field.as_str()],
            BusinessRule::Comparison { field, right, .. } => match right {
                Operand::Field { name, .. } => vec![field.as_str(), name.as_str()],
                Operand::Constant(_) => vec![field.as_str()],
            },
        }
    }
}

impl fmt::Display for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessRule::Unique { field } => write!(f, "{field} is unique"),
            BusinessRule::ConditionalPresence {
                field,
                when_field,
                when_value,
                exclusive,
            } => {
                let only = if *exclusive { "only " } else { "" };
                write!(f, "{field} is required {only}when {when_field} = {when_value}")
            }
            BusinessRule::Comparison { field, op, right } => {
                write!(f, "{field} {} {right}", op.as_str())
            }
        }
    }
}
