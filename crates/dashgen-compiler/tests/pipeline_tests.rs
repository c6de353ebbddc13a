//! End-to-end device compilation tests.
//!
//! Tests verify the full pipeline: layout JSON → per-page compile → snippet
//! assembly → structured result, for procedural and declarative profiles
//! and the failure paths of the JSON boundary.

use dashgen_compiler::{compile_device, compile_to_result, parse_layout, CompileResult};
use dashgen_codegen::CompileOptions;
use dashgen_types::DeviceProfile;
use pretty_assertions::assert_eq;

// ══════════════════════════════════════════════════════════════════════════════
// Canonical layouts
// ══════════════════════════════════════════════════════════════════════════════

const HALLWAY: &str = r#"
{
  "device_id": "hallway",
  "pages": [
    {
      "id": "home",
      "name": "Home",
      "widgets": [
        { "id": "clock", "type": "datetime", "x": 0, "y": 0, "width": 800, "height": 120 },
        { "id": "inside", "type": "temperature", "x": 0, "y": 140, "width": 200, "height": 60 },
        { "id": "outside", "type": "sensor_text", "entity_id": "sensor.outdoor_temperature",
          "x": 220, "y": 140, "width": 300, "height": 60,
          "props": { "label": "Outside", "unit": "°C" } }
      ]
    },
    {
      "id": "status",
      "name": "Status",
      "widgets": [
        { "id": "title", "type": "label", "x": 0, "y": 0, "width": 800, "height": 40,
          "props": { "text": "Status" } },
        { "id": "door", "type": "icon", "x": 0, "y": 60, "width": 48, "height": 48,
          "props": { "icon": "home" },
          "condition": { "type": "state", "entity": "binary_sensor.front_door", "op": "eq", "value": "on" } }
      ]
    }
  ]
}
"#;

const KITCHEN: &str = r#"
{
  "id": "kitchen",
  "name": "Kitchen",
  "widgets": [
    { "id": "title", "type": "label", "x": 10, "y": 10, "width": 300, "height": 30,
      "props": { "text": "Kitchen" } },
    { "id": "dishwasher", "type": "progress_bar", "entity_id": "sensor.dishwasher_progress",
      "x": 10, "y": 60, "width": 300, "height": 24 }
  ]
}
"#;

fn ok(result: &CompileResult) -> &str {
    assert!(result.success, "compile failed: {:?}", result.error);
    result.snippet.as_deref().unwrap_or_default()
}

// ══════════════════════════════════════════════════════════════════════════════
// 1. Successful compilation
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn hallway_compiles_end_to_end() {
    let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
    let snippet = ok(&result);
    assert!(snippet.contains("globals:\n  - id: display_page\n"));
    assert!(snippet.contains("display:\n  - id: !extend main_display\n    lambda: |-\n"));
    assert!(snippet.contains("      if (id(display_page) == 0) {\n"));
    assert!(snippet.contains("      if (id(display_page) == 1) {\n"));
    assert!(snippet.contains("time:\n  - platform: homeassistant\n    id: ha_time\n"));
    assert!(snippet.contains("  - platform: sht4x\n"));
    assert!(result.trees.is_empty());
    assert_eq!(result.digest.as_deref().map(str::len), Some(64));
}

#[test]
fn kitchen_page_compiles_declaratively() {
    let result = compile_to_result(KITCHEN, "esp32_s3_lvgl_480", "");
    let snippet = ok(&result);
    assert!(snippet.contains("lvgl:\n  pages:\n    # page:\"kitchen\" name:\"Kitchen\"\n    - id: kitchen\n"));
    assert!(!snippet.contains("display:"));
    assert!(!snippet.contains("globals:"));
    assert_eq!(result.trees.len(), 1);
    assert_eq!(result.trees[0]["page_id"], "kitchen");
    assert!(result.diagnostics.is_empty());
}

#[test]
fn snippet_is_additive_only() {
    let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
    let snippet = ok(&result);
    for block in ["wifi:", "api:", "ota:", "logger:", "esphome:"] {
        assert!(
            !snippet.lines().any(|l| l == block),
            "snippet must not define {block}"
        );
    }
}

#[test]
fn shared_declarations_appear_once_across_pages() {
    let layout = r#"{"pages":[
        {"id":"a","widgets":[{"id":"t1","type":"label","x":0,"y":0,"width":100,"height":20}]},
        {"id":"b","widgets":[{"id":"t2","type":"label","x":0,"y":0,"width":100,"height":20}]}
    ]}"#;
    let result = compile_to_result(layout, "reterminal_e1001", "");
    let snippet = ok(&result);
    assert_eq!(snippet.matches("    id: font_roboto_400_20\n").count(), 1);
    assert!(snippet.contains("id(font_roboto_400_20)"));
}

#[test]
fn options_disable_trace_comments() {
    let result = compile_to_result(KITCHEN, "reterminal_e1001", r#"{"trace_comments":false}"#);
    let snippet = ok(&result);
    assert!(!snippet.contains("widget:"));
    assert!(!snippet.contains("page:"));
    assert_eq!(result.trace.entries.len(), 2);
}

#[test]
fn trace_map_resolves_snippet_lines() {
    let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
    let snippet = ok(&result);
    let lines: Vec<&str> = snippet.lines().collect();
    let entry = result.trace.find_by_widget("door").expect("door traced");
    assert!(lines[entry.first_line - 1].contains(r#"widget:"icon" id:"door""#));
    assert_eq!(lines[entry.last_line - 1].trim(), "}");
    let hit = result.trace.find_by_line(entry.first_line + 1).unwrap();
    assert_eq!(hit.widget_id, "door");
}

#[test]
fn declarative_ids_are_unique_across_pages() {
    let layout = r#"{"pages":[
        {"id":"a","widgets":[
            {"id":"title","type":"label","x":0,"y":0,"width":100,"height":20},
            {"id":"b_c","type":"label","x":0,"y":30,"width":100,"height":20}]},
        {"id":"a_b","widgets":[
            {"id":"title","type":"label","x":0,"y":0,"width":100,"height":20},
            {"id":"c","type":"label","x":0,"y":30,"width":100,"height":20}]}
    ]}"#;
    let result = compile_to_result(layout, "esp32_s3_lvgl_480", "");
    let snippet = ok(&result);
    let ids: Vec<&str> = snippet
        .lines()
        .skip_while(|l| *l != "lvgl:")
        .filter_map(|l| {
            let t = l.trim_start();
            t.strip_prefix("- id: ").or_else(|| t.strip_prefix("id: "))
        })
        .collect();
    assert_eq!(
        ids,
        vec!["a", "a_title", "a_b_c", "a_b", "a_b_title", "a_b_c_1"]
    );
}

// ══════════════════════════════════════════════════════════════════════════════
// 2. Structured failure output
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn unknown_profile_is_a_diagnostic() {
    let result = compile_to_result(KITCHEN, "toaster", "");
    assert!(!result.success);
    assert!(result.snippet.is_none());
    assert!(result.error.is_none());

    let json = serde_json::to_string(&result).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["success"], false);
    assert_eq!(parsed["diagnostics"]["entries"][0]["code"], 401);
    assert_eq!(parsed["diagnostics"]["entries"][0]["category"], "profile");
}

#[test]
fn malformed_layout_reports_error() {
    let result = compile_to_result("{ not json", "reterminal_e1001", "");
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or_default().contains("layout"));
}

#[test]
fn malformed_options_report_error() {
    let result = compile_to_result(KITCHEN, "reterminal_e1001", r#"{"trace_comments":"yes"}"#);
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap_or_default().contains("options"));
}

#[test]
fn data_problems_do_not_fail_compilation() {
    let layout = r#"{"id":"main","widgets":[
        {"id":"x","type":"hologram","x":0,"y":0,"width":10,"height":10},
        {"id":"y","type":"label","x":0,"y":20,"width":100,"height":20,"props":{"text":"ok"}}
    ]}"#;
    let result = compile_to_result(layout, "reterminal_e1001", "");
    let snippet = ok(&result);
    assert!(snippet.contains("\"ok\""));
    let codes: Vec<u16> = result.diagnostics.iter().map(|d| d.code.0).collect();
    assert_eq!(codes, vec![100]);
}

#[test]
fn result_round_trips_through_json() {
    let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
    let json = serde_json::to_string(&result).unwrap();
    let back: CompileResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.snippet, result.snippet);
    assert_eq!(back.digest, result.digest);
    assert_eq!(back.trace, result.trace);
}

// ══════════════════════════════════════════════════════════════════════════════
// 3. Determinism
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn determinism_100_iterations() {
    let reference = compile_to_result(HALLWAY, "reterminal_e1001", "");
    for i in 0..100 {
        let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
        assert_eq!(result.snippet, reference.snippet, "Determinism failure at iteration {i}");
        assert_eq!(result.digest, reference.digest, "Digest mismatch at iteration {i}");
    }
}

#[test]
fn library_api_matches_json_api() {
    let layout = parse_layout(HALLWAY).unwrap();
    let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
    let output = compile_device(&layout, &profile, &CompileOptions::default()).unwrap();
    let result = compile_to_result(HALLWAY, "reterminal_e1001", "");
    assert_eq!(Some(output.snippet.text.clone()), result.snippet);
    assert_eq!(Some(output.digest()), result.digest);
    assert_eq!(output.bundles.len(), 2);
}
