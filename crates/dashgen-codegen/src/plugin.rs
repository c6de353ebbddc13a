//! Widget plugin contract and the kind → plugin registry.
//!
//! Adding a widget kind means implementing [`WidgetPlugin`] and registering
//! it; the pipeline never changes.

use std::collections::BTreeMap;

use dashgen_types::{PropSpec, Props, Widget};
use serde::Serialize;

use crate::context::EmitContext;
use crate::tree::Node;
use crate::widgets;

/// Catalog description of a widget kind.
#[derive(Debug, Clone, Serialize)]
pub struct PluginInfo {
    pub kind: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub props: &'static [PropSpec],
    /// Implements the shared-declaration capability.
    pub shared: bool,
    /// Implements the declarative capability.
    pub declarative: bool,
}

/// One widget kind.
///
/// Every capability other than `info` has a no-op default. The pipeline
/// calls them in a fixed order: `collect_requirements` for the whole page,
/// then `emit_shared` once per kind, then one emission per widget.
pub trait WidgetPlugin: Send + Sync {
    fn info(&self) -> PluginInfo;

    fn kind(&self) -> &'static str {
        self.info().kind
    }

    fn props(&self) -> &'static [PropSpec] {
        self.info().props
    }

    /// Property bag with every spec'd key present and well-typed.
    fn resolve(&self, widget: &Widget) -> Props {
        widget.props.resolve(self.props()).props
    }

    /// Request every font, icon, image and entity this widget will use.
    fn collect_requirements(&self, _widget: &Widget, _ctx: &mut EmitContext) {}

    /// Declare resources shared by all widgets of this kind.
    fn emit_shared(&self, _ctx: &mut EmitContext, _widgets: &[&Widget]) {}

    /// Append drawing instructions in absolute device coordinates. The
    /// trace marker and visibility guard are placed around them by the
    /// procedural engine.
    fn emit_procedural(&self, _widget: &Widget, _ctx: &mut EmitContext) {}

    /// Build this widget's subtree, or `None` if the kind has no
    /// declarative form.
    fn emit_declarative(&self, _widget: &Widget, _ctx: &mut EmitContext) -> Option<Node> {
        None
    }
}

/// Registry mapping kind tag → plugin.
pub struct PluginRegistry {
    plugins: BTreeMap<&'static str, Box<dyn WidgetPlugin>>,
}

impl PluginRegistry {
    /// A registry with every built-in widget kind.
    pub fn new() -> Self {
        let mut reg = Self::empty();
        reg.register_text();
        reg.register_readings();
        reg.register_status();
        reg.register_shapes();
        reg.register_media();
        reg.register_layout();
        reg
    }

    pub fn empty() -> Self {
        Self {
            plugins: BTreeMap::new(),
        }
    }

    /// Register (or replace) the plugin for its kind.
    pub fn register(&mut self, plugin: Box<dyn WidgetPlugin>) {
        self.plugins.insert(plugin.kind(), plugin);
    }

    pub fn lookup(&self, kind: &str) -> Option<&dyn WidgetPlugin> {
        self.plugins.get(kind).map(|p| p.as_ref())
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.plugins.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn WidgetPlugin> {
        self.plugins.values().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    // ──────────────────────────────────────────────────────────────────────
    // Built-in kinds
    // ──────────────────────────────────────────────────────────────────────

    fn register_text(&mut self) {
        self.register(Box::new(widgets::label::Label));
        self.register(Box::new(widgets::sensor_text::SensorText));
        self.register(Box::new(widgets::datetime::DateTime));
    }

    fn register_readings(&mut self) {
        self.register(Box::new(widgets::reading::Reading::TEMPERATURE));
        self.register(Box::new(widgets::reading::Reading::HUMIDITY));
        self.register(Box::new(widgets::weather::Weather));
    }

    fn register_status(&mut self) {
        self.register(Box::new(widgets::sensor_bar::SensorBar));
        self.register(Box::new(widgets::battery::Battery));
        self.register(Box::new(widgets::progress_bar::ProgressBar));
    }

    fn register_shapes(&mut self) {
        self.register(Box::new(widgets::shapes::Rectangle));
        self.register(Box::new(widgets::shapes::Line));
    }

    fn register_media(&mut self) {
        self.register(Box::new(widgets::icon::Icon));
        self.register(Box::new(widgets::image::Image));
    }

    fn register_layout(&mut self) {
        self.register(Box::new(widgets::tabs::Tabs));
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}
