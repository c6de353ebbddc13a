//! A single Material Design icon.

use dashgen_types::{PropSpec, Widget};

use crate::context::EmitContext;
use crate::declarative::positioned;
use crate::instr::TextAlign;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::tree::Node;

use super::common::TextSlot;

const PROPS: &[PropSpec] = &[
    PropSpec::text("icon", "home"),
    PropSpec::number("size", 48.0, 8.0, 256.0),
    PropSpec::text("color", "black"),
];

pub struct Icon;

impl WidgetPlugin for Icon {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "icon",
            title: "Icon",
            description: "A Material Design icon by name (e.g. 'home' or 'mdi:home').",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        ctx.icon(widget, props.text("icon"), props.int("size") as u32);
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let glyph = ctx.known_icon(props.text("icon"), props.int("size") as u32);
        let area = widget.geometry;
        let slot = TextSlot {
            x: area.center_x().into(),
            y: area.center_y().into(),
            font: glyph.font_id.clone(),
            color: ctx.color(props.text("color")).cpp(),
            align: TextAlign::Center,
        };
        ctx.draw(slot.print(glyph.text()));
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let glyph = ctx.known_icon(props.text("icon"), props.int("size") as u32);
        Some(
            positioned("label", widget.geometry)
                .with("text", glyph.text())
                .ident("text_font", glyph.font_id)
                .color("text_color", ctx.color(props.text("color")).hex())
                .ident("text_align", "CENTER"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use dashgen_types::{DeviceProfile, DiagnosticCode, Geometry, Props};

    #[test]
    fn unknown_icon_reported_once() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let widget = Widget::new("i", "icon", Geometry::new(0, 0, 48, 48))
            .with_props(Props::new().with("icon", "no-such-icon"));
        Icon.collect_requirements(&widget, &mut ctx);
        Icon.emit_procedural(&widget, &mut ctx);
        assert_eq!(ctx.diagnostics.with_code(DiagnosticCode::UNKNOWN_ICON).count(), 1);
        let (lines, _) = ctx.program.render(false);
        assert_eq!(
            lines,
            vec!["it.print(24, 24, id(font_mdi_48), COLOR_ON, TextAlign::CENTER, \"\\U000F02D7\");"]
        );
    }
}
