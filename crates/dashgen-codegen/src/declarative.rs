//! Declarative emission engine and node helpers.

use dashgen_types::{Geometry, Widget};

use crate::context::EmitContext;
use crate::plugin::WidgetPlugin;
use crate::trace::TraceRecord;
use crate::tree::{Attr, Node};
use crate::yaml::slug;

/// Identifier-safe base for a node id. Uniqueness is the allocator's job;
/// see [`EmitContext::node_id`].
pub fn node_base(id: &str) -> String {
    let s = slug(id);
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        format!("w_{s}")
    } else {
        s
    }
}

/// An absolutely positioned node of the given toolkit type.
pub fn positioned(widget_type: &str, area: Geometry) -> Node {
    Node::new(widget_type)
        .with("x", area.x)
        .with("y", area.y)
        .with("width", area.width)
        .with("height", area.height)
}

/// A transparent, borderless container used to group sub-elements.
pub fn container(widget: &Widget, ctx: &mut EmitContext) -> Node {
    positioned("obj", widget.geometry)
        .ident("id", ctx.node_id(widget))
        .ident("bg_opa", "TRANSP")
        .with("border_width", 0)
        .with("pad_all", 0)
}

/// Build one widget's subtree with id, trace record and `hidden` lambda.
/// `None` when the plugin has no declarative form.
pub fn emit_widget(
    plugin: &dyn WidgetPlugin,
    widget: &Widget,
    record: TraceRecord,
    ctx: &mut EmitContext,
) -> Option<Node> {
    let mut node = plugin.emit_declarative(widget, ctx)?;
    if node.id().is_none() {
        node.set("id", Attr::Ident(ctx.node_id(widget)));
    }
    if let Some(code) = ctx.hidden_lambda(widget) {
        node.set("hidden", Attr::Lambda(code));
    }
    node.trace = Some(record);
    Some(node)
}
