//! Machine-generated widget catalog.
//!
//! Produces two artifacts from [`PluginRegistry`]:
//! 1. **Widget catalog** (JSON) for editor tooling: every kind with its
//!    title, description, property specs and capabilities
//! 2. **Compact reference** (text) listing each kind and its properties
//!
//! Both follow the registry, so registering a kind updates them.

use dashgen_codegen::{PluginInfo, PluginRegistry};
use dashgen_types::{PropDefault, PropSpec, BUILTIN_PROFILES};
use serde::Serialize;

/// Catalog document.
#[derive(Debug, Serialize)]
pub struct Catalog {
    pub version: &'static str,
    pub widgets: Vec<PluginInfo>,
    pub profiles: &'static [&'static str],
}

/// Catalog of every kind in `registry`, in kind order.
pub fn catalog(registry: &PluginRegistry) -> Catalog {
    Catalog {
        version: env!("CARGO_PKG_VERSION"),
        widgets: registry.iter().map(|p| p.info()).collect(),
        profiles: BUILTIN_PROFILES,
    }
}

/// JSON catalog of the built-in widget kinds.
pub fn generate_catalog() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&catalog(&PluginRegistry::new()))
}

// ══════════════════════════════════════════════════════════════════════════════
// Compact reference
// ══════════════════════════════════════════════════════════════════════════════

/// Plain-text reference of the built-in widget kinds.
pub fn generate_summary() -> String {
    summary(&PluginRegistry::new())
}

pub fn summary(registry: &PluginRegistry) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "dashgen widgets v{} ({} kinds)\n",
        env!("CARGO_PKG_VERSION"),
        registry.len()
    ));
    for plugin in registry.iter() {
        let info = plugin.info();
        out.push_str(&format!("\n═══ {} ═══\n", info.kind));
        out.push_str(&format!("{}: {}\n", info.title, info.description));
        let mut caps = vec!["procedural"];
        if info.declarative {
            caps.push("declarative");
        }
        if info.shared {
            caps.push("shared");
        }
        out.push_str(&format!("targets: {}\n", caps.join(", ")));
        for spec in info.props {
            out.push_str(&format!("  {}\n", describe(spec)));
        }
    }
    out
}

/// One-line property description: `name: type = default`.
fn describe(spec: &PropSpec) -> String {
    match spec.default {
        PropDefault::Flag { default } => format!("{}: bool = {default}", spec.name),
        PropDefault::Number { default, min, max } => {
            format!("{}: number = {default} ({min}..{max})", spec.name)
        }
        PropDefault::Text { default } => format!("{}: text = {default:?}", spec.name),
        PropDefault::Choice { default, options } => {
            format!("{}: {} = {default}", spec.name, options.join("|"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_builtin() {
        let json = generate_catalog().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let widgets = parsed["widgets"].as_array().unwrap();
        assert_eq!(widgets.len(), PluginRegistry::new().len());
        let kinds: Vec<&str> = widgets.iter().filter_map(|w| w["kind"].as_str()).collect();
        for kind in ["label", "sensor_bar", "datetime", "weather", "tabs"] {
            assert!(kinds.contains(&kind), "missing {kind}");
        }
    }

    #[test]
    fn catalog_props_carry_defaults() {
        let json = generate_catalog().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let datetime = parsed["widgets"]
            .as_array()
            .unwrap()
            .iter()
            .find(|w| w["kind"] == "datetime")
            .unwrap();
        assert_eq!(datetime["shared"], true);
        let format = datetime["props"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["name"] == "time_format")
            .unwrap();
        assert_eq!(format["type"], "text");
        assert_eq!(format["default"], "%H:%M");
    }

    #[test]
    fn summary_has_one_section_per_kind() {
        let text = generate_summary();
        assert_eq!(
            text.matches("═══ ").count(),
            PluginRegistry::new().len()
        );
        assert!(text.contains("═══ progress_bar ═══"));
        assert!(text.contains("  show_label: bool = true"));
    }
}
