//! dashgen compiler as a WASM module for the browser editor.
//!
//! This crate exposes device compilation, snippet import and the widget
//! catalog via `wasm-bindgen`. Every function takes and returns JSON text.
//!
//! # Usage (JavaScript)
//!
//! ```js
//! import init, { compile, import_snippet } from 'dashgen-wasm';
//!
//! await init();
//!
//! const result = JSON.parse(compile(layoutJson, "reterminal_e1001", "{}"));
//! // { success: true, snippet: "font:\n  - file: ...", digest: "9f2c...", diagnostics: { ... } }
//! ```

use dashgen_types::BUILTIN_PROFILES;
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Compile a device layout (or a single page) for a profile.
///
/// `profile` is a built-in profile name or a profile JSON document;
/// `options` may be empty. Returns a JSON `CompileResult`:
/// ```json
/// {
///   "success": true,
///   "snippet": "font:\n  ...",
///   "trees": [],
///   "trace": { "entries": [...] },
///   "digest": "…",
///   "diagnostics": { "entries": [], "total": 0 }
/// }
/// ```
#[wasm_bindgen]
pub fn compile(layout: &str, profile: &str, options: &str) -> String {
    let result = dashgen_compiler::compile_to_result(layout, profile, options);
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"trees":[],"diagnostics":{{"entries":[],"total":0}},"error":"Serialization error: {}"}}"#,
            escape(&e.to_string())
        )
    })
}

#[derive(Serialize)]
struct ImportResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<dashgen_types::DeviceLayout>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Rebuild a device layout from a previously generated snippet.
///
/// Returns `{"success":true,"layout":{...}}`, or on failure
/// `{"success":false,"code":"no_pages_found","message":"..."}`.
#[wasm_bindgen]
pub fn import_snippet(snippet: &str) -> String {
    let response = match dashgen_compiler::import_snippet(snippet) {
        Ok(layout) => ImportResponse {
            success: true,
            layout: Some(layout),
            code: None,
            message: None,
        },
        Err(e) => ImportResponse {
            success: false,
            layout: None,
            code: Some(e.code()),
            message: Some(e.to_string()),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        format!(
            r#"{{"success":false,"code":"invalid_snippet","message":"Serialization error: {}"}}"#,
            escape(&e.to_string())
        )
    })
}

/// Return the JSON catalog of every widget kind with its property specs.
///
/// The catalog is generated from the plugin registry, so it always matches
/// what [`compile`] accepts.
#[wasm_bindgen]
pub fn widget_catalog() -> String {
    dashgen_compiler::generate_catalog().unwrap_or_else(|_| r#"{"widgets":[]}"#.to_string())
}

/// Return the plain-text widget reference.
#[wasm_bindgen]
pub fn widget_summary() -> String {
    dashgen_compiler::generate_summary()
}

/// Return the names of the built-in device profiles as a JSON array.
#[wasm_bindgen]
pub fn builtin_profiles() -> String {
    serde_json::to_string(BUILTIN_PROFILES).unwrap_or_else(|_| "[]".to_string())
}

/// Return the compiler version string.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"{"id":"main","name":"Main","widgets":[
        {"id":"t","type":"label","x":0,"y":0,"width":200,"height":30,"props":{"text":"Hello"}}
    ]}"#;

    #[test]
    fn compile_returns_result_json() {
        let json = compile(PAGE, "reterminal_e1001", "");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["success"], true);
        assert!(parsed["snippet"].as_str().unwrap().contains("\"Hello\""));
        assert_eq!(parsed["digest"].as_str().unwrap().len(), 64);
    }

    #[test]
    fn import_reports_failure_code() {
        let parsed: serde_json::Value = serde_json::from_str(&import_snippet("")).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["code"], "invalid_snippet");
    }

    #[test]
    fn compile_then_import() {
        let compiled: serde_json::Value =
            serde_json::from_str(&compile(PAGE, "esp32_s3_lvgl_480", "")).unwrap();
        let snippet = compiled["snippet"].as_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&import_snippet(snippet)).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["layout"]["pages"][0]["widgets"][0]["id"], "t");
    }

    #[test]
    fn catalog_and_profiles_are_json() {
        let catalog: serde_json::Value = serde_json::from_str(&widget_catalog()).unwrap();
        assert!(catalog["widgets"].as_array().unwrap().len() >= 14);
        let profiles: Vec<String> = serde_json::from_str(&builtin_profiles()).unwrap();
        assert!(profiles.contains(&"reterminal_e1001".to_string()));
        assert_eq!(version(), env!("CARGO_PKG_VERSION"));
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn unknown_profile_in_browser() {
        let parsed: serde_json::Value =
            serde_json::from_str(&compile(r#"{"id":"p"}"#, "toaster", "")).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["diagnostics"]["entries"][0]["code"], 401);
    }
}
