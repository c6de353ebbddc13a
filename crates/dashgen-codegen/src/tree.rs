//! Declarative widget tree.
//!
//! Each node is a retained-mode widget (`obj`, `label`, `bar`, ...) with a
//! sorted attribute map and ordered children. The tree serializes both to
//! the toolkit's YAML dialect and to JSON for the editor.

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::trace::TraceRecord;
use crate::yaml::{quote, single_quote};

/// A style or layout attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Int(i64),
    Bool(bool),
    Str(String),
    /// Bare identifier or enum constant (`CENTER`, `font_roboto_400_20`).
    Ident(String),
    Color(u32),
    /// C++ lambda body evaluated at runtime.
    Lambda(String),
    Map(BTreeMap<String, Attr>),
    List(Vec<Attr>),
}

impl From<i64> for Attr {
    fn from(v: i64) -> Self {
        Attr::Int(v)
    }
}

impl From<i32> for Attr {
    fn from(v: i32) -> Self {
        Attr::Int(v as i64)
    }
}

impl From<u32> for Attr {
    fn from(v: u32) -> Self {
        Attr::Int(v as i64)
    }
}

impl From<bool> for Attr {
    fn from(v: bool) -> Self {
        Attr::Bool(v)
    }
}

impl From<&str> for Attr {
    fn from(v: &str) -> Self {
        Attr::Str(v.to_string())
    }
}

impl From<String> for Attr {
    fn from(v: String) -> Self {
        Attr::Str(v)
    }
}

impl Attr {
    /// Lines for `key: value`, the first starting at column 0.
    fn render(&self, key: &str) -> Vec<String> {
        match self {
            Attr::Int(n) => vec![format!("{key}: {n}")],
            Attr::Bool(b) => vec![format!("{key}: {b}")],
            Attr::Str(s) => vec![format!("{key}: {}", quote(s))],
            Attr::Ident(s) => vec![format!("{key}: {s}")],
            Attr::Color(c) => vec![format!("{key}: 0x{c:06X}")],
            Attr::Lambda(code) if !code.contains('\n') => {
                vec![format!("{key}: !lambda {}", single_quote(code))]
            }
            Attr::Lambda(code) => {
                let mut lines = vec![format!("{key}: !lambda |-")];
                lines.extend(code.lines().map(|l| format!("  {l}")));
                lines
            }
            Attr::Map(map) => {
                let mut lines = vec![format!("{key}:")];
                for (k, v) in map {
                    lines.extend(v.render(k).into_iter().map(|l| format!("  {l}")));
                }
                lines
            }
            Attr::List(items) => {
                let mut lines = vec![format!("{key}:")];
                for item in items {
                    lines.extend(item.render_item().into_iter().map(|l| format!("  {l}")));
                }
                lines
            }
        }
    }

    /// Lines for a list item, the first starting with `- `.
    fn render_item(&self) -> Vec<String> {
        let body: Vec<String> = match self {
            Attr::Map(map) => map.iter().flat_map(|(k, v)| v.render(k)).collect(),
            other => {
                let mut lines = other.render("_");
                if let Some(first) = lines.first_mut() {
                    *first = first.trim_start_matches("_:").trim_start().to_string();
                }
                lines
            }
        };
        body.into_iter()
            .enumerate()
            .map(|(i, l)| if i == 0 { format!("- {l}") } else { format!("  {l}") })
            .collect()
    }
}

impl Serialize for Attr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Int(n) => serializer.serialize_i64(*n),
            Attr::Bool(b) => serializer.serialize_bool(*b),
            Attr::Str(s) | Attr::Ident(s) => serializer.serialize_str(s),
            Attr::Color(c) => serializer.serialize_str(&format!("#{c:06X}")),
            Attr::Lambda(code) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("lambda", code)?;
                map.end()
            }
            Attr::Map(m) => m.serialize(serializer),
            Attr::List(items) => items.serialize(serializer),
        }
    }
}

/// One node of the declarative tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub widget: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Attr>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceRecord>,
}

impl Node {
    pub fn new(widget: &str) -> Self {
        Self {
            widget: widget.to_string(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
            trace: None,
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Attr>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn ident(self, key: &str, value: impl Into<String>) -> Self {
        self.with(key, Attr::Ident(value.into()))
    }

    pub fn color(self, key: &str, rgb: u32) -> Self {
        self.with(key, Attr::Color(rgb))
    }

    pub fn lambda(self, key: &str, code: impl Into<String>) -> Self {
        self.with(key, Attr::Lambda(code.into()))
    }

    pub fn set(&mut self, key: &str, value: impl Into<Attr>) {
        self.attrs.insert(key.to_string(), value.into());
    }

    pub fn child(mut self, node: Node) -> Self {
        self.children.push(node);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Attr> {
        self.attrs.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        match self.attrs.get("id") {
            Some(Attr::Ident(s)) | Some(Attr::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// Total nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// Render as a YAML list item (`- obj:` …), starting at column 0.
    pub fn render_yaml(&self, trace_comments: bool) -> Vec<String> {
        let mut lines = Vec::new();
        if trace_comments {
            if let Some(trace) = &self.trace {
                lines.push(format!("# {}", trace.marker()));
            }
        }
        lines.push(format!("- {}:", self.widget));
        if let Some(id) = self.attrs.get("id") {
            lines.extend(id.render("id").into_iter().map(|l| format!("    {l}")));
        }
        for (key, value) in self.attrs.iter().filter(|(k, _)| k.as_str() != "id") {
            lines.extend(value.render(key).into_iter().map(|l| format!("    {l}")));
        }
        if !self.children.is_empty() {
            lines.push("    widgets:".to_string());
            lines.extend(self.render_children(trace_comments, 6));
        }
        lines
    }

    /// Children rendered as list items at `indent` spaces.
    pub fn render_children(&self, trace_comments: bool, indent: usize) -> Vec<String> {
        let pad = " ".repeat(indent);
        self.children
            .iter()
            .flat_map(|c| c.render_yaml(trace_comments))
            .map(|l| format!("{pad}{l}"))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn yaml_puts_id_first_and_widgets_last() {
        let node = Node::new("obj")
            .ident("id", "w1")
            .with("x", 10)
            .with("width", 100u32)
            .color("bg_color", 0xFFFFFF)
            .child(Node::new("label").ident("id", "w1_text").with("text", "Hi"));
        let lines = node.render_yaml(false);
        assert_eq!(
            lines,
            vec![
                "- obj:",
                "    id: w1",
                "    bg_color: 0xFFFFFF",
                "    width: 100",
                "    x: 10",
                "    widgets:",
                "      - label:",
                "          id: w1_text",
                "          text: \"Hi\"",
            ]
        );
    }

    #[test]
    fn lambdas_single_and_multi_line() {
        let node = Node::new("label")
            .lambda("hidden", "return !(x == 'a');")
            .lambda("text", "if (a) {\n  return \"x\";\n}\nreturn \"y\";");
        let lines = node.render_yaml(false);
        assert_eq!(lines[1], "    hidden: !lambda 'return !(x == ''a'');'");
        assert_eq!(lines[2], "    text: !lambda |-");
        assert_eq!(lines[3], "      if (a) {");
        assert_eq!(lines[4], "        return \"x\";");
    }

    #[test]
    fn json_shape() {
        let node = Node::new("bar")
            .ident("id", "b")
            .with("value", 3)
            .color("indicator_color", 0xFF0000)
            .lambda("text", "return 1;");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r##"{"type":"bar","attrs":{"id":"b","indicator_color":"#FF0000","text":{"lambda":"return 1;"},"value":3}}"##
        );
    }

    #[test]
    fn lists_of_scalars_and_maps() {
        let mut tab = BTreeMap::new();
        tab.insert("id".to_string(), Attr::Ident("t0".into()));
        tab.insert("name".to_string(), Attr::from("Home"));
        let node = Node::new("tabview").with(
            "tabs",
            Attr::List(vec![Attr::Map(tab)]),
        );
        assert_eq!(
            node.render_yaml(false),
            vec!["- tabview:", "    tabs:", "      - id: t0", "        name: \"Home\""]
        );

        let line = Node::new("line").with("points", Attr::List(vec!["0,0".into(), "10,5".into()]));
        assert_eq!(
            line.render_yaml(false),
            vec!["- line:", "    points:", "      - \"0,0\"", "      - \"10,5\""]
        );
    }

    #[test]
    fn count_and_id() {
        let node = Node::new("obj")
            .ident("id", "root")
            .child(Node::new("label"))
            .child(Node::new("obj").child(Node::new("label")));
        assert_eq!(node.count(), 4);
        assert_eq!(node.id(), Some("root"));
        assert_eq!(node.children[0].id(), None);
    }
}
