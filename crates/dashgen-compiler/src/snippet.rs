//! Device snippet assembly.
//!
//! Merges the bundles of every page into one additive YAML document:
//! shared declarations first, then either a page-switching display lambda
//! (procedural) or an `lvgl:` block with one page entry per page
//! (declarative). Nothing outside the widgets' own needs is generated: no
//! wifi, api, ota or logger blocks.

use dashgen_codegen::resources::{render_sections, Declaration, Section};
use dashgen_codegen::yaml::{indent, single_quote};
use dashgen_codegen::{Bundle, CompileOptions, TraceMap};
use dashgen_types::{
    DeviceProfile, Diagnostic, DiagnosticCode, Diagnostics, OutputTarget,
};

/// The assembled device snippet.
#[derive(Debug, Clone, PartialEq)]
pub struct Snippet {
    pub text: String,
    /// Declarations after cross-page merging, in rendering input order.
    pub declarations: Vec<Declaration>,
    /// Merge conflicts only; page diagnostics stay on their bundles.
    pub diagnostics: Diagnostics,
    /// Widget → 1-based line range within `text`.
    pub trace: TraceMap,
}

/// Assemble the snippet for `bundles`, which must share one profile.
pub fn assemble(bundles: &[Bundle], profile: &DeviceProfile, options: &CompileOptions) -> Snippet {
    let (declarations, diagnostics) = merge_declarations(bundles);

    let mut lines = render_sections(&declarations);
    let mut trace = TraceMap::new();

    if !bundles.is_empty() {
        match profile.target {
            OutputTarget::Procedural => {
                push_block_gap(&mut lines);
                lines.extend(globals_block(&options.page_global));
                lines.push(String::new());
                lines.push("display:".to_string());
                lines.push(format!("  - id: !extend {}", profile.display_id));
                lines.push("    lambda: |-".to_string());
                for (index, bundle) in bundles.iter().enumerate() {
                    lines.push(format!(
                        "      if (id({}) == {index}) {{",
                        options.page_global
                    ));
                    let (body, map) = bundle.body();
                    trace.entries.extend(map.offset(lines.len()).entries);
                    lines.extend(indent(&body, 8));
                    lines.push("      }".to_string());
                }
            }
            OutputTarget::Declarative => {
                push_block_gap(&mut lines);
                lines.push("lvgl:".to_string());
                lines.push("  pages:".to_string());
                for bundle in bundles {
                    let (body, map) = bundle.body();
                    trace.entries.extend(map.offset(lines.len()).entries);
                    lines.extend(indent(&body, 4));
                }
            }
        }
    }

    let mut text = lines.join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    log::debug!(
        "assembled snippet: {} pages, {} declarations, {} lines",
        bundles.len(),
        declarations.len(),
        lines.len()
    );
    Snippet {
        text,
        declarations,
        diagnostics,
        trace,
    }
}

fn push_block_gap(lines: &mut Vec<String>) {
    if !lines.is_empty() {
        lines.push(String::new());
    }
}

/// Runtime global holding the active page index.
fn globals_block(name: &str) -> Vec<String> {
    vec![
        "globals:".to_string(),
        format!("  - id: {name}"),
        "    type: int".to_string(),
        "    restore_value: false".to_string(),
        format!("    initial_value: {}", single_quote("0")),
    ]
}

// ══════════════════════════════════════════════════════════════════════════════
// Cross-page merging
// ══════════════════════════════════════════════════════════════════════════════

/// Merge per-page declarations by the ids they provide.
///
/// Identical blocks collapse. Icon fonts with the same id and size take the
/// union of their glyphs. Any other block reusing a provided id keeps the
/// first one and records `D302`.
pub fn merge_declarations(bundles: &[Bundle]) -> (Vec<Declaration>, Diagnostics) {
    let mut merged: Vec<Declaration> = Vec::new();
    let mut diagnostics = Diagnostics::empty();

    for bundle in bundles {
        for decl in &bundle.declarations {
            let existing = merged
                .iter()
                .position(|m| m.provides.iter().any(|id| decl.provides.contains(id)));
            let Some(index) = existing else {
                merged.push(decl.clone());
                continue;
            };
            if merged[index] == *decl {
                continue;
            }
            if let Some(lines) = union_glyphs(&merged[index], decl) {
                merged[index].lines = lines;
                continue;
            }
            let ids = decl.provides.join(", ");
            log::warn!("page '{}': declaration for {ids} conflicts; first kept", bundle.page_id);
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DECLARATION_CONFLICT,
                    format!(
                        "page '{}' declares {ids} differently from an earlier page; the first declaration is kept",
                        bundle.page_id
                    ),
                )
                .with_suggestion("give the conflicting resource a distinct identifier"),
            );
        }
    }
    (merged, diagnostics)
}

const GLYPHS_KEY: &str = "  glyphs:";

/// Union of two icon-font blocks that differ only in their glyph lists.
fn union_glyphs(first: &Declaration, other: &Declaration) -> Option<Vec<String>> {
    if first.section != Section::Font || first.provides != other.provides {
        return None;
    }
    let split_a = first.lines.iter().position(|l| l == GLYPHS_KEY)?;
    let split_b = other.lines.iter().position(|l| l == GLYPHS_KEY)?;
    if first.lines[..=split_a] != other.lines[..=split_b] {
        return None;
    }
    let mut glyphs: Vec<String> = first.lines[split_a + 1..].to_vec();
    for line in &other.lines[split_b + 1..] {
        if !glyphs.contains(line) {
            glyphs.push(line.clone());
        }
    }
    // Fixed-width escapes, so text order is codepoint order.
    glyphs.sort();
    let mut lines = first.lines[..=split_a].to_vec();
    lines.extend(glyphs);
    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgen_codegen::{compile, PluginRegistry};
    use dashgen_types::{Geometry, Page, Props, Widget};
    use pretty_assertions::assert_eq;

    fn bundles(profile: &DeviceProfile, pages: &[Page]) -> Vec<Bundle> {
        let registry = PluginRegistry::new();
        let options = CompileOptions::default();
        pages
            .iter()
            .map(|p| compile(p, profile, &registry, &options).unwrap())
            .collect()
    }

    fn icon_page(id: &str, icon: &str) -> Page {
        Page::new(id, id).with_widget(
            Widget::new(format!("{id}_icon"), "icon", Geometry::new(0, 0, 48, 48))
                .with_props(Props::new().with("icon", icon)),
        )
    }

    #[test]
    fn icon_glyphs_union_across_pages() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let bundles = bundles(
            &profile,
            &[icon_page("a", "thermometer"), icon_page("b", "home")],
        );
        let (decls, diags) = merge_declarations(&bundles);
        assert!(diags.is_empty());
        assert_eq!(decls.len(), 1);
        assert_eq!(
            decls[0].lines[3..].to_vec(),
            vec![
                "  glyphs:".to_string(),
                "    - \"\\U000F02DC\"".to_string(),
                "    - \"\\U000F050F\"".to_string(),
            ]
        );
    }

    #[test]
    fn conflicting_declaration_keeps_first() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let mut bundles = bundles(
            &profile,
            &[icon_page("a", "home"), icon_page("b", "home")],
        );
        bundles[1].declarations[0].lines[0] = "- file: \"other.ttf\"".to_string();
        let (decls, diags) = merge_declarations(&bundles);
        assert_eq!(decls.len(), 1);
        assert!(decls[0].lines[0].contains("materialdesignicons"));
        assert_eq!(diags.with_code(DiagnosticCode::DECLARATION_CONFLICT).count(), 1);
    }

    #[test]
    fn procedural_pages_switch_on_global() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let bundles = bundles(&profile, &[Page::new("a", "A"), Page::new("b", "B")]);
        let snippet = assemble(&bundles, &profile, &CompileOptions::default());
        assert_eq!(
            snippet.text,
            "globals:\n  - id: display_page\n    type: int\n    restore_value: false\n    initial_value: '0'\n\ndisplay:\n  - id: !extend main_display\n    lambda: |-\n      if (id(display_page) == 0) {\n        // page:\"a\" name:\"A\"\n      }\n      if (id(display_page) == 1) {\n        // page:\"b\" name:\"B\"\n      }\n"
        );
    }

    #[test]
    fn trace_lines_point_into_snippet() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let bundles = bundles(&profile, &[icon_page("a", "home"), icon_page("b", "home")]);
        let snippet = assemble(&bundles, &profile, &CompileOptions::default());
        let lines: Vec<&str> = snippet.text.lines().collect();
        for widget in ["a_icon", "b_icon"] {
            let entry = snippet.trace.find_by_widget(widget).unwrap();
            let first = lines[entry.first_line - 1].trim_start();
            assert!(first.starts_with(r#"// widget:"icon" id:"#), "{first}");
            assert!(first.contains(widget));
        }
    }

    #[test]
    fn no_pages_no_display() {
        let profile = DeviceProfile::builtin("esp32_s3_lvgl_480").unwrap();
        let snippet = assemble(&[], &profile, &CompileOptions::default());
        assert_eq!(snippet.text, "");
        assert!(snippet.trace.entries.is_empty());
    }
}
