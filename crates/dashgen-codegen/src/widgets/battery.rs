//! Battery level with a level-dependent glyph.

use dashgen_types::{Geometry, PropSpec, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::format::number_format;
use crate::icons::BATTERY_LEVELS;
use crate::instr::TextAlign;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::SourceRef;
use crate::tree::Node;

use super::common::{Ladder, LiveValue, TextSlot, GAP};

const PROPS: &[PropSpec] = &[
    PropSpec::flag("show_percentage", true),
    PropSpec::number("precision", 1.0, 0.0, 4.0),
    PropSpec::number("icon_size", 32.0, 8.0, 256.0),
    PropSpec::number("font_size", 16.0, 6.0, 200.0),
    PropSpec::text("color", "black"),
];

/// Glyph ladder over a 0..100 level: full at 95%, then one step per 10%.
pub fn battery_ladder(ctx: &mut EmitContext, size: u32) -> Ladder {
    let mut steps = Vec::new();
    for i in (1..BATTERY_LEVELS.len()).rev() {
        let glyph = ctx.known_icon(BATTERY_LEVELS[i], size);
        steps.push((i as f64 * 10.0 + 5.0, glyph.text()));
    }
    Ladder {
        steps,
        otherwise: ctx.known_icon(BATTERY_LEVELS[0], size).text(),
        unavailable: ctx.known_icon("battery-unknown", size).text(),
    }
}

pub struct Battery;

impl Battery {
    fn source(&self, widget: &Widget, ctx: &EmitContext) -> Option<SourceRef> {
        widget.entity().and_then(|e| ctx.entity_source(e))
    }

    fn split(&self, area: Geometry, icon_size: u32) -> (Geometry, Geometry) {
        let icon_w = icon_size.min(area.width);
        let icon = Geometry::new(area.x, area.y, icon_w, area.height);
        let offset = icon_w as i32 + GAP;
        let text = Geometry::new(
            area.x + offset,
            area.y,
            area.width.saturating_sub(offset as u32),
            area.height,
        );
        (icon, text)
    }
}

impl WidgetPlugin for Battery {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "battery",
            title: "Battery",
            description: "Battery level of a bound entity with a matching glyph.",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        if let Some(entity) = widget.entity() {
            ctx.entity(entity);
        }
        battery_ladder(ctx, props.int("icon_size") as u32);
        if props.flag("show_percentage") {
            ctx.font(props.int("font_size") as u32, false);
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        let color = ctx.color(props.text("color")).cpp();
        let source = self.source(widget, ctx);
        let (icon_area, text_area) = self.split(widget.geometry, size);

        let ladder = battery_ladder(ctx, size);
        let slot = TextSlot {
            x: icon_area.x.into(),
            y: icon_area.center_y().into(),
            font: ctx.known_icon("battery", size).font_id,
            color: color.clone(),
            align: TextAlign::CenterLeft,
        };
        ladder.print(ctx, &slot, source.as_ref());

        if props.flag("show_percentage") {
            let slot = TextSlot {
                x: text_area.x.into(),
                y: text_area.center_y().into(),
                font: ctx.font(props.int("font_size") as u32, false),
                color,
                align: TextAlign::CenterLeft,
            };
            let format = number_format(props.int("precision"));
            LiveValue::numeric(source.as_ref(), format, "%").print(ctx, &slot);
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        let color = ctx.color(props.text("color")).hex();
        let source = self.source(widget, ctx);
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);
        let (icon_area, text_area) = self.split(local, size);

        let ladder = battery_ladder(ctx, size);
        let font = ctx.known_icon("battery", size).font_id;
        let mut node = container(widget, ctx).child(
            positioned("label", icon_area)
                .ident("id", ctx.child_id(widget, "icon"))
                .with("text", ladder.text_attr(source.as_ref()))
                .ident("text_font", font)
                .color("text_color", color),
        );
        if props.flag("show_percentage") {
            let format = number_format(props.int("precision"));
            let value = LiveValue::numeric(source.as_ref(), format, "%");
            let font = ctx.font(props.int("font_size") as u32, false);
            node = node.child(
                positioned("label", text_area)
                    .ident("id", ctx.child_id(widget, "value"))
                    .with("text", value.text_attr(&ctx.options().placeholder))
                    .ident("text_font", font)
                    .color("text_color", color),
            );
        }
        Some(node)
    }
}
