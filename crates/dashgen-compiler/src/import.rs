//! Snippet import: rebuild a device layout from generated output.
//!
//! Only the trace markers are read. Each `page:` marker opens a page and
//! each `widget:` marker adds the widget it records, so any snippet
//! compiled with trace comments imports back into an equivalent layout.

use dashgen_codegen::trace::{parse_page_marker, MarkerError, TraceRecord, PAGE_MARKER, WIDGET_MARKER};
use dashgen_types::{DeviceLayout, Page};
use thiserror::Error;

/// Why a snippet could not be imported.
#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("invalid snippet: {0}")]
    InvalidSnippet(String),

    #[error("invalid marker on line {line}: {source}")]
    Marker {
        line: usize,
        #[source]
        source: MarkerError,
    },

    /// Neither a display lambda nor an `lvgl:` block is present.
    #[error("no display lambda or lvgl block found")]
    UnrecognizedDisplayStructure,

    #[error("no pages found in snippet")]
    NoPagesFound,
}

impl ImportError {
    /// Stable failure code reported to the editor.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSnippet(_) | Self::Marker { .. } => "invalid_snippet",
            Self::UnrecognizedDisplayStructure => "unrecognized_display_structure",
            Self::NoPagesFound => "no_pages_found",
        }
    }
}

/// Import result type alias.
pub type ImportResult<T> = Result<T, ImportError>;

/// Id given to a page whose widgets precede any page marker.
const IMPLICIT_PAGE: &str = "main";

/// Rebuild the layout a snippet was compiled from.
pub fn import_snippet(snippet: &str) -> ImportResult<DeviceLayout> {
    if snippet.trim().is_empty() {
        return Err(ImportError::InvalidSnippet("snippet is empty".into()));
    }
    if snippet.contains('\0') {
        return Err(ImportError::InvalidSnippet("snippet is not text".into()));
    }
    if !has_display_structure(snippet) {
        return Err(ImportError::UnrecognizedDisplayStructure);
    }

    let mut pages: Vec<Page> = Vec::new();
    for (index, raw) in snippet.lines().enumerate() {
        let Some(marker) = marker_text(raw) else {
            continue;
        };
        let line = index + 1;
        if marker.starts_with(PAGE_MARKER) {
            let (id, name) =
                parse_page_marker(marker).map_err(|source| ImportError::Marker { line, source })?;
            pages.push(Page::new(id, name));
        } else if marker.starts_with(WIDGET_MARKER) {
            let record = TraceRecord::parse_marker(marker)
                .map_err(|source| ImportError::Marker { line, source })?;
            if pages.is_empty() {
                pages.push(Page::new(IMPLICIT_PAGE, ""));
            }
            if let Some(page) = pages.last_mut() {
                page.widgets.push(record.to_widget());
            }
        }
    }

    if pages.is_empty() {
        return Err(ImportError::NoPagesFound);
    }
    log::info!(
        "imported {} pages, {} widgets",
        pages.len(),
        pages.iter().map(|p| p.widgets.len()).sum::<usize>()
    );
    Ok(DeviceLayout {
        device_id: String::new(),
        pages,
    })
}

/// A display component with a lambda, or an `lvgl:` block.
fn has_display_structure(snippet: &str) -> bool {
    let mut in_display = false;
    for line in snippet.lines() {
        if line.starts_with("lvgl:") {
            return true;
        }
        if !line.starts_with(' ') && !line.is_empty() {
            in_display = line.starts_with("display:");
            continue;
        }
        if in_display && line.trim_start().starts_with("lambda:") {
            return true;
        }
    }
    false
}

/// Marker body of a `//` or `#` comment line.
fn marker_text(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let body = trimmed
        .strip_prefix("//")
        .or_else(|| trimmed.strip_prefix('#'))?
        .trim_start();
    (body.starts_with(PAGE_MARKER) || body.starts_with(WIDGET_MARKER)).then_some(body)
}
