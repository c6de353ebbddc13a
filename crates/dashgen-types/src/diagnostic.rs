use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored before further ones are only counted.
pub const MAX_DIAGNOSTICS: usize = 50;

/// Diagnostic severity.
///
/// Compilation never fails on a diagnostic; severity only tells the editor
/// how loudly to surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Diagnostic category, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Widget,
    Property,
    Resource,
    Profile,
}

/// Numeric diagnostic code (D100–D499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagnosticCode(pub u16);

impl DiagnosticCode {
    // ── Widget (D100–D199) ──
    pub const UNKNOWN_WIDGET_KIND: Self = Self(100);
    pub const UNSUPPORTED_TARGET: Self = Self(101);

    // ── Property (D200–D299) ──
    pub const MALFORMED_PROPERTY: Self = Self(200);

    // ── Resource (D300–D399) ──
    pub const PARTIAL_PLATFORM_CONFLICT: Self = Self(300);
    pub const UNKNOWN_ICON: Self = Self(301);
    pub const DECLARATION_CONFLICT: Self = Self(302);

    // ── Profile (D400–D499) ──
    pub const ONBOARD_SENSOR_MISSING: Self = Self(400);
    pub const UNKNOWN_PROFILE: Self = Self(401);

    /// Get the category for this code.
    pub fn category(self) -> DiagnosticCategory {
        match self.0 {
            100..=199 => DiagnosticCategory::Widget,
            200..=299 => DiagnosticCategory::Property,
            300..=399 => DiagnosticCategory::Resource,
            400..=499 => DiagnosticCategory::Profile,
            _ => DiagnosticCategory::Widget,
        }
    }

    /// Default severity for this code.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::MALFORMED_PROPERTY => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Widget => write!(f, "widget"),
            Self::Property => write!(f, "property"),
            Self::Resource => write!(f, "resource"),
            Self::Profile => write!(f, "profile"),
        }
    }
}

/// A structured compiler diagnostic.
///
/// The editor renders these directly; it must not parse free-form strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub category: DiagnosticCategory,
    pub message: String,
    /// The widget this diagnostic concerns, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: code.default_severity(),
            category: code.category(),
            message: message.into(),
            widget_id: None,
            suggestion: None,
        }
    }

    pub fn for_widget(mut self, widget_id: impl Into<String>) -> Self {
        self.widget_id = Some(widget_id.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.widget_id {
            Some(id) => write!(f, "{} [{}] {}: {}", self.code, self.category, id, self.message),
            None => write!(f, "{} [{}] {}", self.code, self.category, self.message),
        }
    }
}

/// All diagnostics recorded while compiling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
    pub total: usize,
}

impl Diagnostics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn len(&self) -> usize {
        self.total
    }

    /// Add a diagnostic, respecting the MAX_DIAGNOSTICS limit.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.entries.len() < MAX_DIAGNOSTICS {
            self.entries.push(diagnostic);
        }
        self.total += 1;
    }

    /// Merge another collection in, keeping order.
    pub fn extend(&mut self, other: Diagnostics) {
        let hidden = other.total - other.entries.len();
        for d in other.entries {
            self.push(d);
        }
        self.total += hidden;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.code == code)
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|d| d.severity >= Severity::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_category() {
        assert_eq!(
            DiagnosticCode::UNKNOWN_WIDGET_KIND.category(),
            DiagnosticCategory::Widget
        );
        assert_eq!(
            DiagnosticCode::MALFORMED_PROPERTY.category(),
            DiagnosticCategory::Property
        );
        assert_eq!(
            DiagnosticCode::PARTIAL_PLATFORM_CONFLICT.category(),
            DiagnosticCategory::Resource
        );
        assert_eq!(
            DiagnosticCode::ONBOARD_SENSOR_MISSING.category(),
            DiagnosticCategory::Profile
        );
    }

    #[test]
    fn test_code_display() {
        assert_eq!(format!("{}", DiagnosticCode::UNKNOWN_WIDGET_KIND), "D100");
        assert_eq!(format!("{}", DiagnosticCode::DECLARATION_CONFLICT), "D302");
    }

    #[test]
    fn test_malformed_property_is_info() {
        let d = Diagnostic::new(DiagnosticCode::MALFORMED_PROPERTY, "bad precision");
        assert_eq!(d.severity, Severity::Info);
        let d = Diagnostic::new(DiagnosticCode::UNKNOWN_WIDGET_KIND, "no plugin");
        assert_eq!(d.severity, Severity::Warning);
    }

    #[test]
    fn test_display_includes_widget() {
        let d = Diagnostic::new(DiagnosticCode::UNKNOWN_WIDGET_KIND, "unknown kind 'clock3d'")
            .for_widget("w7");
        assert_eq!(d.to_string(), "D100 [widget] w7: unknown kind 'clock3d'");
    }

    #[test]
    fn test_diagnostics_max_limit() {
        let mut diags = Diagnostics::empty();
        for i in 0..60 {
            diags.push(Diagnostic::new(
                DiagnosticCode::UNKNOWN_ICON,
                format!("icon {i}"),
            ));
        }
        assert_eq!(diags.entries.len(), MAX_DIAGNOSTICS);
        assert_eq!(diags.total, 60);
    }

    #[test]
    fn test_extend_keeps_hidden_count() {
        let mut a = Diagnostics::empty();
        let mut b = Diagnostics::empty();
        for _ in 0..(MAX_DIAGNOSTICS + 5) {
            b.push(Diagnostic::new(DiagnosticCode::UNKNOWN_ICON, "x"));
        }
        a.push(Diagnostic::new(DiagnosticCode::UNKNOWN_PROFILE, "y"));
        a.extend(b);
        assert_eq!(a.total, MAX_DIAGNOSTICS + 6);
        assert_eq!(a.entries.len(), MAX_DIAGNOSTICS);
    }

    #[test]
    fn test_json_serialization() {
        let d = Diagnostic::new(DiagnosticCode::UNKNOWN_WIDGET_KIND, "unknown kind")
            .for_widget("w1")
            .with_suggestion("register a plugin for this kind");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"code\":100"));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"category\":\"widget\""));
        assert!(json.contains("\"widget_id\":\"w1\""));

        let plain = Diagnostic::new(DiagnosticCode::UNKNOWN_ICON, "x");
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("widget_id"));
        assert!(!json.contains("suggestion"));
    }
}
