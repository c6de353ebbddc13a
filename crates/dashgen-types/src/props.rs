//! Widget property bags and per-kind property specs.
//!
//! A property bag is keyed by a [`BTreeMap`] so that two bags with the same
//! entries compare and serialize identically regardless of the textual order
//! the editor stored them in.
//!
//! Values are loosely typed on the way in. Each widget kind publishes a list
//! of [`PropSpec`]s and [`Props::resolve`] coerces the bag against them:
//! absent, malformed or out-of-range values fall back to the spec default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, Serializer};

/// A single property value as stored by the editor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Bool(bool),
    Number(f64),
    Text(String),
    /// Anything else (null, arrays, objects). Kept for round-tripping but
    /// always treated as malformed.
    Other(serde_json::Value),
}

impl Serialize for PropValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PropValue::Bool(b) => serializer.serialize_bool(*b),
            PropValue::Number(n) => match as_integral(*n) {
                Some(i) => serializer.serialize_i64(i),
                None => serializer.serialize_f64(*n),
            },
            PropValue::Text(s) => serializer.serialize_str(s),
            PropValue::Other(v) => v.serialize(serializer),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n as f64)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

fn as_integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Some(n as i64)
    } else {
        None
    }
}

/// Render a number without a trailing `.0` when it is integral.
pub fn format_number(n: f64) -> String {
    match as_integral(n) {
        Some(i) => i.to_string(),
        None => n.to_string(),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Specs
// ══════════════════════════════════════════════════════════════════════════════

/// The typed default (and constraint) of one property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PropDefault {
    Flag {
        default: bool,
    },
    Number {
        default: f64,
        min: f64,
        max: f64,
    },
    Text {
        default: &'static str,
    },
    Choice {
        default: &'static str,
        options: &'static [&'static str],
    },
}

/// One documented property of a widget kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PropSpec {
    pub name: &'static str,
    #[serde(flatten)]
    pub default: PropDefault,
}

impl PropSpec {
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            default: PropDefault::Flag { default },
        }
    }

    pub const fn number(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            default: PropDefault::Number { default, min, max },
        }
    }

    pub const fn text(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            default: PropDefault::Text { default },
        }
    }

    pub const fn choice(
        name: &'static str,
        default: &'static str,
        options: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            default: PropDefault::Choice { default, options },
        }
    }

    fn default_value(&self) -> PropValue {
        match self.default {
            PropDefault::Flag { default } => PropValue::Bool(default),
            PropDefault::Number { default, .. } => PropValue::Number(default),
            PropDefault::Text { default } => PropValue::Text(default.to_string()),
            PropDefault::Choice { default, .. } => PropValue::Text(default.to_string()),
        }
    }

    /// Coerce a raw value against this spec. `None` means malformed.
    fn coerce(&self, raw: &PropValue) -> Option<PropValue> {
        match self.default {
            PropDefault::Flag { .. } => coerce_bool(raw).map(PropValue::Bool),
            PropDefault::Number { min, max, .. } => coerce_number(raw)
                .filter(|n| *n >= min && *n <= max)
                .map(PropValue::Number),
            PropDefault::Text { .. } => coerce_text(raw).map(PropValue::Text),
            PropDefault::Choice { options, .. } => {
                let text = coerce_text(raw)?;
                let wanted = text.trim();
                options
                    .iter()
                    .find(|o| o.eq_ignore_ascii_case(wanted))
                    .map(|o| PropValue::Text(o.to_string()))
            }
        }
    }
}

fn coerce_bool(raw: &PropValue) -> Option<bool> {
    match raw {
        PropValue::Bool(b) => Some(*b),
        PropValue::Number(n) => Some(*n != 0.0),
        PropValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" | "" => Some(false),
            _ => None,
        },
        PropValue::Other(_) => None,
    }
}

fn coerce_number(raw: &PropValue) -> Option<f64> {
    match raw {
        PropValue::Number(n) if n.is_finite() => Some(*n),
        PropValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn coerce_text(raw: &PropValue) -> Option<String> {
    match raw {
        PropValue::Text(s) => Some(s.clone()),
        PropValue::Number(n) => Some(format_number(*n)),
        PropValue::Bool(b) => Some(b.to_string()),
        PropValue::Other(_) => None,
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Props
// ══════════════════════════════════════════════════════════════════════════════

/// A widget's property bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Props(BTreeMap<String, PropValue>);

/// Outcome of resolving a bag against a spec list.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub props: Props,
    /// Names of present-but-unusable values that were replaced by defaults.
    pub malformed: Vec<&'static str>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<PropValue>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropValue)> {
        self.0.iter()
    }

    /// Produce a bag containing exactly the spec'd keys, each holding a
    /// well-typed value. Keys the specs do not mention are dropped.
    pub fn resolve(&self, specs: &[PropSpec]) -> Resolved {
        let mut props = Props::new();
        let mut malformed = Vec::new();
        for spec in specs {
            let value = match self.0.get(spec.name) {
                Some(raw) => match spec.coerce(raw) {
                    Some(v) => v,
                    None => {
                        malformed.push(spec.name);
                        spec.default_value()
                    }
                },
                None => spec.default_value(),
            };
            props.0.insert(spec.name.to_string(), value);
        }
        Resolved { props, malformed }
    }

    // ── Accessors for resolved bags ──────────────────────────────────────

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(coerce_bool).unwrap_or(false)
    }

    pub fn number(&self, key: &str) -> f64 {
        self.0.get(key).and_then(coerce_number).unwrap_or(0.0)
    }

    pub fn int(&self, key: &str) -> i64 {
        self.number(key).round() as i64
    }

    pub fn text(&self, key: &str) -> &str {
        match self.0.get(key) {
            Some(PropValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Compact JSON rendering with sorted keys.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
