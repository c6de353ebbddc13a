//! dashgen compiler: orchestrates device-level compilation.
//!
//! ```text
//! DeviceLayout + DeviceProfile → per-page pipeline → snippet assembly → CompileResult
//! ```
//!
//! Each page is compiled by its own [`dashgen_codegen::compile`] run. The
//! resulting bundles are merged by [`snippet::assemble`] into one additive
//! YAML snippet, which is digested and returned together with every
//! diagnostic the pages produced.

pub mod catalog;
pub mod import;
pub mod snippet;

use dashgen_codegen::{Bundle, CodegenError, CompileOptions, PluginRegistry, TraceMap};
use dashgen_types::{
    DeviceLayout, DeviceProfile, Diagnostic, DiagnosticCode, Diagnostics, Page, BUILTIN_PROFILES,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

pub use catalog::{generate_catalog, generate_summary};
pub use import::{import_snippet, ImportError, ImportResult};
pub use snippet::{assemble, Snippet};

// ══════════════════════════════════════════════════════════════════════════════
// Errors
// ══════════════════════════════════════════════════════════════════════════════

/// Failures at the orchestration boundary.
#[derive(Debug, Error)]
pub enum CompileError {
    /// An input document was not valid JSON of the expected shape.
    #[error("invalid {what} JSON: {message}")]
    InvalidJson { what: &'static str, message: String },

    /// A profile name matched none of the built-in profiles.
    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    /// A plugin broke an emission invariant.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

impl CompileError {
    fn json(what: &'static str, e: serde_json::Error) -> Self {
        CompileError::InvalidJson {
            what,
            message: e.to_string(),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Compilation result
// ══════════════════════════════════════════════════════════════════════════════

/// Serializable outcome of [`compile_to_result`], handed to the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileResult {
    pub success: bool,
    /// The assembled YAML snippet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Declarative page trees, one JSON document per page. Empty for
    /// procedural profiles.
    #[serde(default)]
    pub trees: Vec<serde_json::Value>,
    /// Widget → snippet line ranges.
    #[serde(default)]
    pub trace: TraceMap,
    /// SHA-256 of the snippet text, lowercase hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub diagnostics: Diagnostics,
    /// Set when compilation could not run at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CompileResult {
    fn failure(diagnostics: Diagnostics, error: Option<String>) -> Self {
        Self {
            success: false,
            snippet: None,
            trees: Vec::new(),
            trace: TraceMap::new(),
            digest: None,
            diagnostics,
            error,
        }
    }
}

/// A compiled device: the per-page bundles and the assembled snippet.
#[derive(Debug, Clone)]
pub struct DeviceOutput {
    pub bundles: Vec<Bundle>,
    pub snippet: Snippet,
}

impl DeviceOutput {
    /// Every diagnostic: page diagnostics in page order, then merge conflicts.
    pub fn diagnostics(&self) -> Diagnostics {
        let mut all = Diagnostics::empty();
        for bundle in &self.bundles {
            all.extend(bundle.diagnostics.clone());
        }
        all.extend(self.snippet.diagnostics.clone());
        all
    }

    pub fn digest(&self) -> String {
        digest(&self.snippet.text)
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile a single page with every built-in widget kind.
pub fn compile_page(
    page: &Page,
    profile: &DeviceProfile,
    options: &CompileOptions,
) -> Result<Bundle, CompileError> {
    let registry = PluginRegistry::new();
    let bundle = dashgen_codegen::compile(page, profile, &registry, options)?;
    log::info!(
        "compiled page '{}' for {} ({} diagnostics)",
        page.id,
        profile.name,
        bundle.diagnostics.len()
    );
    Ok(bundle)
}

/// Compile every page of a layout and assemble the device snippet.
pub fn compile_device(
    layout: &DeviceLayout,
    profile: &DeviceProfile,
    options: &CompileOptions,
) -> Result<DeviceOutput, CompileError> {
    let registry = PluginRegistry::new();
    let mut bundles: Vec<Bundle> = Vec::with_capacity(layout.pages.len());
    // Node ids share one namespace across all pages of a device.
    let mut taken: Vec<String> = Vec::new();
    for page in &layout.pages {
        let bundle =
            dashgen_codegen::compile_reserving(page, profile, &registry, options, &taken)?;
        taken.extend(bundle.node_ids.iter().cloned());
        log::info!(
            "compiled page '{}' for {} ({} diagnostics)",
            page.id,
            profile.name,
            bundle.diagnostics.len()
        );
        bundles.push(bundle);
    }
    let snippet = assemble(&bundles, profile, options);
    Ok(DeviceOutput { bundles, snippet })
}

/// Compile from JSON inputs, returning a structured result.
///
/// `layout_json` is either a device layout (`{"pages": [...]}`) or a single
/// page. `profile` is a built-in profile name or a profile JSON document.
/// `options_json` may be empty for defaults.
pub fn compile_to_result(layout_json: &str, profile: &str, options_json: &str) -> CompileResult {
    let profile = match resolve_profile(profile) {
        Ok(p) => p,
        Err(CompileError::UnknownProfile(name)) => {
            let mut diagnostics = Diagnostics::empty();
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::UNKNOWN_PROFILE,
                    format!("unknown profile '{name}'"),
                )
                .with_suggestion(format!("use one of: {}", BUILTIN_PROFILES.join(", "))),
            );
            return CompileResult::failure(diagnostics, None);
        }
        Err(e) => return CompileResult::failure(Diagnostics::empty(), Some(e.to_string())),
    };

    let inputs = parse_layout(layout_json).and_then(|l| Ok((l, parse_options(options_json)?)));
    let (layout, options) = match inputs {
        Ok(v) => v,
        Err(e) => return CompileResult::failure(Diagnostics::empty(), Some(e.to_string())),
    };

    let output = match compile_device(&layout, &profile, &options) {
        Ok(o) => o,
        Err(e) => return CompileResult::failure(Diagnostics::empty(), Some(e.to_string())),
    };

    let mut trees = Vec::new();
    for bundle in &output.bundles {
        if bundle.tree().is_none() {
            continue;
        }
        let tree = bundle
            .tree_json()
            .map_err(CompileError::from)
            .and_then(|json| serde_json::from_str(&json).map_err(|e| CompileError::json("tree", e)));
        match tree {
            Ok(value) => trees.push(value),
            Err(e) => return CompileResult::failure(output.diagnostics(), Some(e.to_string())),
        }
    }

    CompileResult {
        success: true,
        digest: Some(output.digest()),
        diagnostics: output.diagnostics(),
        trace: output.snippet.trace.clone(),
        snippet: Some(output.snippet.text),
        trees,
        error: None,
    }
}

/// Resolve a built-in profile name or parse a profile JSON document.
pub fn resolve_profile(profile: &str) -> Result<DeviceProfile, CompileError> {
    let trimmed = profile.trim();
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).map_err(|e| CompileError::json("profile", e));
    }
    DeviceProfile::builtin(trimmed).ok_or_else(|| CompileError::UnknownProfile(trimmed.to_string()))
}

/// Accepted layout documents.
#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutInput {
    // Tried first: a page has a required `id`, a layout does not.
    Page(Page),
    Device(DeviceLayout),
}

/// Parse a device layout, or a single page wrapped as a one-page layout.
pub fn parse_layout(json: &str) -> Result<DeviceLayout, CompileError> {
    let input: LayoutInput =
        serde_json::from_str(json).map_err(|e| CompileError::json("layout", e))?;
    Ok(match input {
        LayoutInput::Page(page) => DeviceLayout {
            device_id: String::new(),
            pages: vec![page],
        },
        LayoutInput::Device(layout) => layout,
    })
}

/// Parse compile options; blank input means defaults.
pub fn parse_options(json: &str) -> Result<CompileOptions, CompileError> {
    if json.trim().is_empty() {
        return Ok(CompileOptions::default());
    }
    serde_json::from_str(json).map_err(|e| CompileError::json("options", e))
}

/// Lowercase hex SHA-256 of `text`.
pub fn digest(text: &str) -> String {
    let hash = Sha256::digest(text.as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            digest(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn layout_accepts_single_page() {
        let layout = parse_layout(r#"{"id":"main","name":"Main","widgets":[]}"#).unwrap();
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].id, "main");

        let layout = parse_layout(r#"{"device_id":"hall","pages":[{"id":"a"},{"id":"b"}]}"#)
            .unwrap();
        assert_eq!(layout.device_id, "hall");
        assert_eq!(layout.pages.len(), 2);
    }

    #[test]
    fn profile_by_name_or_document() {
        assert_eq!(resolve_profile("reterminal_e1001").unwrap().width, 800);
        let custom = resolve_profile(
            r#"{"name":"tiny","width":296,"height":128,"color":{"mode":"monochrome"},"target":"procedural"}"#,
        )
        .unwrap();
        assert_eq!(custom.name, "tiny");
        assert!(matches!(
            resolve_profile("toaster"),
            Err(CompileError::UnknownProfile(_))
        ));
        assert!(matches!(
            resolve_profile("{nope"),
            Err(CompileError::InvalidJson { what: "profile", .. })
        ));
    }

    #[test]
    fn blank_options_are_defaults() {
        assert_eq!(parse_options("  ").unwrap(), CompileOptions::default());
        assert!(parse_options("[1]").is_err());
    }
}
