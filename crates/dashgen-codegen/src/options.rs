//! Compile options shared by every page of a compilation.

use serde::{Deserialize, Serialize};

/// Knobs that change the generated text but not the page model.
///
/// Every field has a default so a partial JSON options file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Shown in place of a value whose source has no state yet.
    pub placeholder: String,
    /// Family used for all text fonts unless a widget overrides it.
    pub text_font_family: String,
    /// Path of the icon font file the icon glyphs are rasterized from.
    pub icon_font_file: String,
    /// Emit a leading trace comment per widget.
    pub trace_comments: bool,
    /// Runtime global holding the active page index.
    pub page_global: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            placeholder: "--".to_string(),
            text_font_family: "Roboto".to_string(),
            icon_font_file: "fonts/materialdesignicons-webfont.ttf".to_string(),
            trace_comments: true,
            page_global: "display_page".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let opts: CompileOptions = serde_json::from_str(r#"{"placeholder":"n/a"}"#).unwrap();
        assert_eq!(opts.placeholder, "n/a");
        assert_eq!(opts.text_font_family, "Roboto");
        assert!(opts.trace_comments);
    }
}
