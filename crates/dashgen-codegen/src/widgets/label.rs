//! Static text.

use dashgen_types::{PropSpec, Widget};

use crate::context::EmitContext;
use crate::declarative::positioned;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::tree::Node;

use super::common::{anchor, lvgl_align, TextSlot, ALIGN_OPTIONS};

const PROPS: &[PropSpec] = &[
    PropSpec::text("text", "Label"),
    PropSpec::number("font_size", 20.0, 6.0, 200.0),
    PropSpec::flag("bold", false),
    PropSpec::text("color", "black"),
    PropSpec::choice("align", "left", ALIGN_OPTIONS),
];

pub struct Label;

impl WidgetPlugin for Label {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "label",
            title: "Label",
            description: "Static text in a single font.",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        ctx.font(props.int("font_size") as u32, props.flag("bold"));
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let (x, y, align) = anchor(widget.geometry, props.text("align"));
        let slot = TextSlot {
            x,
            y,
            font: ctx.font(props.int("font_size") as u32, props.flag("bold")),
            color: ctx.color(props.text("color")).cpp(),
            align,
        };
        ctx.draw(slot.print(props.text("text")));
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let font = ctx.font(props.int("font_size") as u32, props.flag("bold"));
        Some(
            positioned("label", widget.geometry)
                .with("text", props.text("text"))
                .ident("text_font", font)
                .color("text_color", ctx.color(props.text("color")).hex())
                .ident("text_align", lvgl_align(props.text("align"))),
        )
    }
}
