//! Widget visibility conditions.
//!
//! Conditions are evaluated by the firmware at runtime, never by the
//! compiler. They only describe *what* to test; the code generator decides
//! how the test is spelled for each output target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator for a state test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Whether the operator only makes sense numerically.
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A boolean expression over data-source state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// `entity <op> value`. The value is compared numerically when it parses
    /// as a number, otherwise as text.
    State {
        entity: String,
        op: CompareOp,
        value: String,
    },
    /// `min <= entity <= max`; either bound may be omitted.
    Range {
        entity: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    All {
        conditions: Vec<Condition>,
    },
    Any {
        conditions: Vec<Condition>,
    },
    Not {
        condition: Box<Condition>,
    },
}

impl Condition {
    pub fn state(entity: impl Into<String>, op: CompareOp, value: impl Into<String>) -> Self {
        Condition::State {
            entity: entity.into(),
            op,
            value: value.into(),
        }
    }

    pub fn range(entity: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Condition::Range {
            entity: entity.into(),
            min,
            max,
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not {
            condition: Box::new(self),
        }
    }

    /// Every entity referenced, in first-mention order, without duplicates.
    pub fn entities(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_entities(&mut out);
        out
    }

    fn collect_entities<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Condition::State { entity, .. } | Condition::Range { entity, .. } => {
                if !out.contains(&entity.as_str()) {
                    out.push(entity);
                }
            }
            Condition::All { conditions } | Condition::Any { conditions } => {
                for c in conditions {
                    c.collect_entities(out);
                }
            }
            Condition::Not { condition } => condition.collect_entities(out),
        }
    }
}
