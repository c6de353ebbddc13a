//! The immutable output of one page compilation.

use dashgen_types::{Diagnostics, OutputTarget};
use serde::Serialize;

use crate::error::CodegenResult;
use crate::instr::Program;
use crate::resources::{render_sections, Declaration};
use crate::trace::{page_marker, TraceMap};
use crate::tree::Node;
use crate::yaml::indent;

/// Target-specific body of a bundle.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutput {
    /// Display lambda instructions in page order.
    Procedural(Program),
    /// Page root whose children are the widgets in page order.
    Declarative(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub page_id: String,
    pub page_name: String,
    pub output: TargetOutput,
    /// Fonts, icon fonts, images and platform blocks, deduplicated.
    pub declarations: Vec<Declaration>,
    pub diagnostics: Diagnostics,
    pub display_id: String,
    pub trace_comments: bool,
    /// Declarative node ids allocated for this page.
    pub node_ids: Vec<String>,
}

/// JSON view of a declarative page for the editor.
#[derive(Serialize)]
struct TreeJson<'a> {
    page_id: &'a str,
    page_name: &'a str,
    root: &'a Node,
}

impl Bundle {
    pub fn target(&self) -> OutputTarget {
        match self.output {
            TargetOutput::Procedural(_) => OutputTarget::Procedural,
            TargetOutput::Declarative(_) => OutputTarget::Declarative,
        }
    }

    pub fn program(&self) -> Option<&Program> {
        match &self.output {
            TargetOutput::Procedural(p) => Some(p),
            TargetOutput::Declarative(_) => None,
        }
    }

    pub fn tree(&self) -> Option<&Node> {
        match &self.output {
            TargetOutput::Declarative(n) => Some(n),
            TargetOutput::Procedural(_) => None,
        }
    }

    pub fn declarations_yaml(&self) -> Vec<String> {
        render_sections(&self.declarations)
    }

    /// The page body and its widget line map (1-based within the body).
    ///
    /// Procedural: lambda lines. Declarative: one `pages:` list item.
    pub fn body(&self) -> (Vec<String>, TraceMap) {
        let comment = match self.output {
            TargetOutput::Procedural(_) => "//",
            TargetOutput::Declarative(_) => "#",
        };
        let mut lines = Vec::new();
        if self.trace_comments {
            lines.push(format!(
                "{comment} {}",
                page_marker(&self.page_id, &self.page_name)
            ));
        }

        match &self.output {
            TargetOutput::Procedural(program) => {
                let (body, map) = program.render(self.trace_comments);
                let map = map.offset(lines.len());
                lines.extend(body);
                (lines, map)
            }
            TargetOutput::Declarative(root) => {
                let mut map = TraceMap::new();
                lines.push(format!("- id: {}", root.id().unwrap_or(self.page_id.as_str())));
                if root.children.is_empty() {
                    lines.push("  widgets: []".to_string());
                    return (lines, map);
                }
                lines.push("  widgets:".to_string());
                for child in &root.children {
                    let first = lines.len() + 1;
                    lines.extend(indent(&child.render_yaml(self.trace_comments), 4));
                    if let Some(trace) = &child.trace {
                        map.push(&trace.widget_id, &trace.kind, first, lines.len());
                    }
                }
                (lines, map)
            }
        }
    }

    /// Standalone snippet for this page alone.
    pub fn render(&self) -> String {
        let mut out = self.declarations_yaml();
        if !out.is_empty() {
            out.push(String::new());
        }
        let (body, _) = self.body();
        match self.output {
            TargetOutput::Procedural(_) => {
                out.push("display:".to_string());
                out.push(format!("  - id: !extend {}", self.display_id));
                out.push("    lambda: |-".to_string());
                out.extend(indent(&body, 6));
            }
            TargetOutput::Declarative(_) => {
                out.push("lvgl:".to_string());
                out.push("  pages:".to_string());
                out.extend(indent(&body, 4));
            }
        }
        let mut text = out.join("\n");
        text.push('\n');
        text
    }

    /// Widget line map relative to the rendered body.
    pub fn trace_map(&self) -> TraceMap {
        self.body().1
    }

    /// JSON of the declarative tree (`null` for procedural bundles).
    pub fn tree_json(&self) -> CodegenResult<String> {
        match self.tree() {
            Some(root) => Ok(serde_json::to_string(&TreeJson {
                page_id: &self.page_id,
                page_name: &self.page_name,
                root,
            })?),
            None => Ok("null".to_string()),
        }
    }
}
