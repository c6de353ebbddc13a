//! Weather condition glyph for a `weather.*` entity.

use dashgen_types::{Geometry, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::icons::WEATHER_STATES;
use crate::instr::{cpp_string, Instr, TextAlign};
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::SourceRef;
use crate::tree::Node;

use super::common::{LiveValue, TextSlot, GAP};

const PROPS: &[PropSpec] = &[
    PropSpec::number("icon_size", 64.0, 8.0, 256.0),
    PropSpec::flag("show_label", true),
    PropSpec::number("font_size", 18.0, 6.0, 200.0),
    PropSpec::text("color", "black"),
];

const UNKNOWN_ICON: &str = "help-circle";

pub struct Weather;

impl Weather {
    fn source(&self, widget: &Widget, ctx: &EmitContext) -> Option<SourceRef> {
        widget.entity().and_then(|e| ctx.entity_source(e))
    }

    /// Glyph for every known state, in table order.
    fn glyphs(&self, ctx: &mut EmitContext, size: u32) -> Vec<(&'static str, String)> {
        WEATHER_STATES
            .iter()
            .map(|(state, icon)| (*state, ctx.known_icon(icon, size).text()))
            .collect()
    }

    /// Icon above, state label below.
    fn rows(&self, area: Geometry, props: &Props) -> (Geometry, Option<Geometry>) {
        if !props.flag("show_label") {
            return (area, None);
        }
        let label_h = (props.int("font_size") as u32 + GAP as u32).min(area.height / 2);
        let icon_h = area.height - label_h;
        (
            Geometry::new(area.x, area.y, area.width, icon_h),
            Some(Geometry::new(area.x, area.y + icon_h as i32, area.width, label_h)),
        )
    }

    fn icon_lambda(&self, source: &SourceRef, glyphs: &[(&str, String)], unknown: &str) -> String {
        let state = source.value();
        let mut code = format!(
            "if (!id({}).has_state()) return std::string({});",
            source.id,
            cpp_string(unknown)
        );
        for (name, glyph) in glyphs {
            code.push_str(&format!(
                "\nif ({state} == {}) return std::string({});",
                cpp_string(name),
                cpp_string(glyph)
            ));
        }
        code.push_str(&format!("\nreturn std::string({});", cpp_string(unknown)));
        code
    }
}

impl WidgetPlugin for Weather {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "weather",
            title: "Weather",
            description: "Icon for the current condition of a weather entity, with its state.",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        if let Some(entity) = widget.entity() {
            ctx.entity(entity);
        }
        self.glyphs(ctx, size);
        ctx.known_icon(UNKNOWN_ICON, size);
        if props.flag("show_label") {
            ctx.font(props.int("font_size") as u32, false);
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        let color = ctx.color(props.text("color")).cpp();
        let (icon_area, label_area) = self.rows(widget.geometry, &props);
        let source = self.source(widget, ctx);
        let unknown = ctx.known_icon(UNKNOWN_ICON, size);

        let slot = TextSlot {
            x: icon_area.center_x().into(),
            y: icon_area.center_y().into(),
            font: unknown.font_id.clone(),
            color: color.clone(),
            align: TextAlign::Center,
        };
        match &source {
            Some(source) => {
                let glyphs = self.glyphs(ctx, size);
                let state = source.value();
                ctx.emit(Instr::If(source.available()));
                for (i, (name, glyph)) in glyphs.iter().enumerate() {
                    let test = format!("{state} == {}", cpp_string(name));
                    ctx.emit(if i == 0 { Instr::If(test) } else { Instr::ElseIf(test) });
                    ctx.draw(slot.print(glyph.clone()));
                }
                ctx.emit(Instr::Else);
                ctx.draw(slot.print(unknown.text()));
                ctx.emit(Instr::EndIf);
                ctx.emit(Instr::Else);
                ctx.draw(slot.print(unknown.text()));
                ctx.emit(Instr::EndIf);
            }
            None => ctx.draw(slot.print(unknown.text())),
        }

        if let Some(area) = label_area {
            let slot = TextSlot {
                x: area.center_x().into(),
                y: area.center_y().into(),
                font: ctx.font(props.int("font_size") as u32, false),
                color,
                align: TextAlign::Center,
            };
            let value = LiveValue {
                source: source.as_ref(),
                expr: source.as_ref().map(SourceRef::c_str).unwrap_or_default(),
                format: "%s".to_string(),
                suffix: String::new(),
            };
            value.print(ctx, &slot);
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        let color = ctx.color(props.text("color")).hex();
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);
        let (icon_area, label_area) = self.rows(local, &props);
        let source = self.source(widget, ctx);
        let unknown = ctx.known_icon(UNKNOWN_ICON, size);

        let icon = positioned("label", icon_area)
            .ident("id", ctx.child_id(widget, "icon"))
            .ident("text_font", unknown.font_id.clone())
            .color("text_color", color)
            .ident("text_align", "CENTER");
        let icon = match &source {
            Some(source) => {
                let glyphs = self.glyphs(ctx, size);
                icon.lambda("text", self.icon_lambda(source, &glyphs, &unknown.text()))
            }
            None => icon.with("text", unknown.text()),
        };
        let mut node = container(widget, ctx).child(icon);

        if let Some(area) = label_area {
            let value = LiveValue {
                source: source.as_ref(),
                expr: source.as_ref().map(SourceRef::c_str).unwrap_or_default(),
                format: "%s".to_string(),
                suffix: String::new(),
            };
            let font = ctx.font(props.int("font_size") as u32, false);
            node = node.child(
                positioned("label", area)
                    .ident("id", ctx.child_id(widget, "state"))
                    .with("text", value.text_attr(&ctx.options().placeholder))
                    .ident("text_font", font)
                    .color("text_color", color)
                    .ident("text_align", "CENTER"),
            );
        }
        Some(node)
    }
}
