//! Widget trace markers and the rendered-line trace map.
//!
//! Every widget's output is preceded by a one-line marker recording its id,
//! kind, geometry, binding, resolved properties and condition. The marker
//! makes generated files diff-able and lets a snippet be imported back into
//! a layout.
//!
//! The [`TraceMap`] maps each widget to the rendered lines it produced, so a
//! firmware build error on line N can be resolved back to a widget.

use dashgen_types::{Condition, Geometry, Props, Widget};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker prefix for widgets.
pub const WIDGET_MARKER: &str = "widget:";
/// Marker prefix for pages.
pub const PAGE_MARKER: &str = "page:";

/// Everything needed to reconstruct a widget from generated output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub widget_id: String,
    pub kind: String,
    pub geometry: Geometry,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub props: Props,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Error, PartialEq)]
#[error("malformed trace marker: {0}")]
pub struct MarkerError(pub String);

impl TraceRecord {
    /// Record a widget with its resolved property values.
    pub fn new(widget: &Widget, resolved: Props) -> Self {
        Self {
            widget_id: widget.id.clone(),
            kind: widget.kind.clone(),
            geometry: widget.geometry,
            entity_id: widget.entity().map(str::to_string),
            props: resolved,
            condition: widget.condition.clone(),
        }
    }

    /// Single-line marker text (without the comment leader).
    ///
    /// Free-text fields are JSON strings, so no id can end the comment or
    /// split a field.
    pub fn marker(&self) -> String {
        let g = self.geometry;
        let mut s = format!(
            "{WIDGET_MARKER}{} id:{} at:{},{},{},{}",
            json_str(&self.kind),
            json_str(&self.widget_id),
            g.x,
            g.y,
            g.width,
            g.height
        );
        if let Some(entity) = &self.entity_id {
            s.push_str(" entity:");
            s.push_str(&json_str(entity));
        }
        s.push_str(" props:");
        s.push_str(&self.props.to_json());
        if let Some(cond) = &self.condition {
            if let Ok(json) = serde_json::to_string(cond) {
                s.push_str(" when:");
                s.push_str(&json);
            }
        }
        s
    }

    /// Parse a marker produced by [`TraceRecord::marker`].
    pub fn parse_marker(text: &str) -> Result<Self, MarkerError> {
        let rest = text
            .trim()
            .strip_prefix(WIDGET_MARKER)
            .ok_or_else(|| MarkerError("missing widget prefix".into()))?;
        let (kind, rest) = read_json::<String>(rest)?;
        let rest = expect_key(rest, "id:")?;
        let (widget_id, rest) = read_json::<String>(rest)?;
        let rest = expect_key(rest, "at:")?;
        let (at, mut rest) = split_token(rest);
        let geometry = parse_geometry(at)?;

        let mut entity_id = None;
        if let Some(after) = rest.strip_prefix("entity:") {
            let (entity, after) = read_json::<String>(after)?;
            entity_id = Some(entity);
            rest = after;
        }

        let rest = expect_key(rest, "props:")?;
        let (props, rest) = read_json::<Props>(rest)?;

        let condition = match rest.trim_start().strip_prefix("when:") {
            Some(after) => Some(read_json::<Condition>(after)?.0),
            None => None,
        };

        if kind.is_empty() || widget_id.is_empty() {
            return Err(MarkerError("empty kind or id".into()));
        }

        Ok(Self {
            widget_id,
            kind,
            geometry,
            entity_id,
            props,
            condition,
        })
    }

    /// Rebuild the widget this record was taken from.
    pub fn to_widget(&self) -> Widget {
        Widget {
            id: self.widget_id.clone(),
            kind: self.kind.clone(),
            entity_id: self.entity_id.clone(),
            geometry: self.geometry,
            props: self.props.clone(),
            condition: self.condition.clone(),
        }
    }
}

/// Marker introducing a page's output.
pub fn page_marker(page_id: &str, name: &str) -> String {
    format!("{PAGE_MARKER}{} name:{}", json_str(page_id), json_str(name))
}

/// Parse a page marker into `(id, name)`.
pub fn parse_page_marker(text: &str) -> Result<(String, String), MarkerError> {
    let rest = text
        .trim()
        .strip_prefix(PAGE_MARKER)
        .ok_or_else(|| MarkerError("missing page prefix".into()))?;
    let (id, rest) = read_json::<String>(rest)?;
    if id.is_empty() {
        return Err(MarkerError("empty page id".into()));
    }
    let name = match rest.trim_start().strip_prefix("name:") {
        Some(after) => read_json::<String>(after)?.0,
        None => String::new(),
    };
    Ok((id, name))
}

fn json_str(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| "\"\"".to_string())
}

fn split_token(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(' ') {
        Some(i) => (&s[..i], s[i + 1..].trim_start()),
        None => (s, ""),
    }
}

fn expect_key<'a>(s: &'a str, key: &str) -> Result<&'a str, MarkerError> {
    s.trim_start()
        .strip_prefix(key)
        .ok_or_else(|| MarkerError(format!("expected '{key}'")))
}

fn parse_geometry(s: &str) -> Result<Geometry, MarkerError> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 4 {
        return Err(MarkerError(format!("bad geometry '{s}'")));
    }
    let bad = || MarkerError(format!("bad geometry '{s}'"));
    Ok(Geometry::new(
        parts[0].parse().map_err(|_| bad())?,
        parts[1].parse().map_err(|_| bad())?,
        parts[2].parse().map_err(|_| bad())?,
        parts[3].parse().map_err(|_| bad())?,
    ))
}

/// Read one JSON value from the front of `s`, returning the remainder.
fn read_json<'a, T: serde::de::DeserializeOwned>(s: &'a str) -> Result<(T, &'a str), MarkerError> {
    let mut stream = serde_json::Deserializer::from_str(s).into_iter::<T>();
    match stream.next() {
        Some(Ok(value)) => {
            let used = stream.byte_offset();
            Ok((value, &s[used..]))
        }
        Some(Err(e)) => Err(MarkerError(e.to_string())),
        None => Err(MarkerError("missing JSON value".into())),
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Trace map
// ══════════════════════════════════════════════════════════════════════════════

/// Rendered line ranges per widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceMap {
    pub entries: Vec<TraceEntry>,
}

/// One widget → its 1-based, inclusive line range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub widget_id: String,
    pub kind: String,
    pub first_line: usize,
    pub last_line: usize,
}

impl TraceMap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        widget_id: impl Into<String>,
        kind: impl Into<String>,
        first_line: usize,
        last_line: usize,
    ) {
        self.entries.push(TraceEntry {
            widget_id: widget_id.into(),
            kind: kind.into(),
            first_line,
            last_line,
        });
    }

    /// The widget whose output contains `line`.
    pub fn find_by_line(&self, line: usize) -> Option<&TraceEntry> {
        self.entries
            .iter()
            .find(|e| e.first_line <= line && line <= e.last_line)
    }

    pub fn find_by_widget(&self, widget_id: &str) -> Option<&TraceEntry> {
        self.entries.iter().find(|e| e.widget_id == widget_id)
    }

    /// Shift every range by `lines` (when the block is embedded in a file).
    pub fn offset(&self, lines: usize) -> TraceMap {
        TraceMap {
            entries: self
                .entries
                .iter()
                .map(|e| TraceEntry {
                    first_line: e.first_line + lines,
                    last_line: e.last_line + lines,
                    ..e.clone()
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    pub fn from_json(data: &[u8]) -> Option<Self> {
        serde_json::from_slice(data).ok()
    }
}
