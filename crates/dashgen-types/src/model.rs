//! Page model consumed by the compiler.
//!
//! The editor and storage layer build and mutate these values; the compiler
//! only reads them. Vec order is meaningful everywhere: it is both z-order
//! and emission order.

use serde::{Deserialize, Serialize};

use crate::{Condition, Geometry, Props};

/// A single placed element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    /// Unique within its page. Uniqueness is the caller's responsibility.
    pub id: String,
    /// Kind tag used to look up the widget plugin.
    #[serde(rename = "type")]
    pub kind: String,
    /// Bound data source, or `None` for onboard-only widgets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(default)]
    pub props: Props,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Widget {
    pub fn new(id: impl Into<String>, kind: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            entity_id: None,
            geometry,
            props: Props::new(),
            condition: None,
        }
    }

    pub fn bound_to(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn visible_when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// A binding of `""` is treated the same as no binding.
    pub fn entity(&self) -> Option<&str> {
        self.entity_id.as_deref().filter(|e| !e.trim().is_empty())
    }
}

/// An ordered collection of widgets compiled together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

impl Page {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            widgets: Vec::new(),
        }
    }

    pub fn with_widget(mut self, widget: Widget) -> Self {
        self.widgets.push(widget);
        self
    }
}

/// Everything the editor stores for one device: its pages in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceLayout {
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub pages: Vec<Page>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompareOp;

    #[test]
    fn test_widget_json_shape() {
        let w: Widget = serde_json::from_str(
            r#"{"id":"w1","type":"temperature","x":0,"y":0,"width":100,"height":60,
                "props":{"unit":"F"}}"#,
        )
        .unwrap();
        assert_eq!(w.kind, "temperature");
        assert_eq!(w.geometry, Geometry::new(0, 0, 100, 60));
        assert!(w.entity().is_none());
        assert_eq!(w.props.text("unit"), "F");
    }

    #[test]
    fn test_empty_binding_is_local() {
        let w = Widget::new("w1", "temperature", Geometry::new(0, 0, 1, 1)).bound_to("  ");
        assert!(w.entity().is_none());
        let w = w.bound_to("sensor.outdoor");
        assert_eq!(w.entity(), Some("sensor.outdoor"));
    }

    #[test]
    fn test_page_round_trip_keeps_order() {
        let page = Page::new("main", "Main")
            .with_widget(Widget::new("b", "label", Geometry::new(0, 0, 10, 10)))
            .with_widget(
                Widget::new("a", "icon", Geometry::new(0, 0, 10, 10)).visible_when(
                    Condition::state("binary_sensor.door", CompareOp::Eq, "on"),
                ),
            );
        let json = serde_json::to_string(&page).unwrap();
        let back: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(back, page);
        assert_eq!(back.widgets[0].id, "b");
    }
}
