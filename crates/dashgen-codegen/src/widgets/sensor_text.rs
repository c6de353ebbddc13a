//! Generic entity readout with an optional caption.

use dashgen_types::{Geometry, PropSpec, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::format::number_format;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::{EntityDomain, SourceRef};
use crate::tree::{Attr, Node};

use super::common::{anchor, lvgl_align, LiveValue, TextSlot, ALIGN_OPTIONS};

const PROPS: &[PropSpec] = &[
    PropSpec::text("label", ""),
    PropSpec::number("precision", 1.0, 0.0, 4.0),
    PropSpec::text("unit", ""),
    PropSpec::number("font_size", 20.0, 6.0, 200.0),
    PropSpec::number("label_font_size", 14.0, 6.0, 200.0),
    PropSpec::flag("bold", false),
    PropSpec::text("color", "black"),
    PropSpec::choice("align", "left", ALIGN_OPTIONS),
];

pub struct SensorText;

/// Caption on top, value below; the value takes the whole area without a
/// caption.
fn split(area: Geometry, has_label: bool, label_size: u32) -> (Option<Geometry>, Geometry) {
    if !has_label {
        return (None, area);
    }
    let caption_h = (label_size + 4).min(area.height / 2);
    let caption = Geometry::new(area.x, area.y, area.width, caption_h);
    let value = Geometry::new(
        area.x,
        area.y + caption_h as i32,
        area.width,
        area.height - caption_h,
    );
    (Some(caption), value)
}

impl SensorText {
    fn source(&self, widget: &Widget, ctx: &EmitContext) -> Option<SourceRef> {
        widget.entity().and_then(|e| ctx.entity_source(e))
    }

    fn live<'s>(&self, source: Option<&'s SourceRef>, precision: i64, unit: &str) -> LiveValue<'s> {
        let suffix = if unit.is_empty() {
            String::new()
        } else {
            format!(" {unit}")
        };
        match source.map(|s| s.domain) {
            Some(EntityDomain::Numeric) | None => {
                LiveValue::numeric(source, number_format(precision), &suffix)
            }
            Some(_) => LiveValue {
                source,
                expr: source.map(SourceRef::c_str).unwrap_or_default(),
                format: "%s".to_string(),
                suffix,
            },
        }
    }
}

impl WidgetPlugin for SensorText {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "sensor_text",
            title: "Sensor Text",
            description: "Current state of any entity, formatted with a caption and unit.",
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
        ctx.font(props.int("font_size") as u32, props.flag("bold"));
        if !props.text("label").is_empty() {
            ctx.font(props.int("label_font_size") as u32, false);
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let label = props.text("label");
        let align = props.text("align");
        let color = ctx.color(props.text("color")).cpp();
        let (caption, value_area) =
            split(widget.geometry, !label.is_empty(), props.int("label_font_size") as u32);

        if let Some(area) = caption {
            let (x, y, a) = anchor(area, align);
            let slot = TextSlot {
                x,
                y,
                font: ctx.font(props.int("label_font_size") as u32, false),
                color: color.clone(),
                align: a,
            };
            ctx.draw(slot.print(label));
        }

        let (x, y, a) = anchor(value_area, align);
        let slot = TextSlot {
            x,
            y,
            font: ctx.font(props.int("font_size") as u32, props.flag("bold")),
            color,
            align: a,
        };
        let source = self.source(widget, ctx);
        let value = self.live(source.as_ref(), props.int("precision"), props.text("unit"));
        value.print(ctx, &slot);
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let label = props.text("label");
        let text_color = ctx.color(props.text("color")).hex();
        let align = lvgl_align(props.text("align"));
        let local = |g: Geometry| {
            Geometry::new(
                g.x - widget.geometry.x,
                g.y - widget.geometry.y,
                g.width,
                g.height,
            )
        };
        let (caption, value_area) =
            split(widget.geometry, !label.is_empty(), props.int("label_font_size") as u32);

        let mut node = container(widget, ctx);
        if let Some(area) = caption {
            let font = ctx.font(props.int("label_font_size") as u32, false);
            node = node.child(
                positioned("label", local(area))
                    .ident("id", ctx.child_id(widget, "label"))
                    .with("text", label)
                    .ident("text_font", font)
                    .color("text_color", text_color)
                    .ident("text_align", align),
            );
        }
        let source = self.source(widget, ctx);
        let value = self.live(source.as_ref(), props.int("precision"), props.text("unit"));
        let font = ctx.font(props.int("font_size") as u32, props.flag("bold"));
        let text: Attr = value.text_attr(&ctx.options().placeholder);
        node = node.child(
            positioned("label", local(value_area))
                .ident("id", ctx.child_id(widget, "value"))
                .with("text", text)
                .ident("text_font", font)
                .color("text_color", text_color)
                .ident("text_align", align),
        );
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_split() {
        let (caption, value) = split(Geometry::new(0, 0, 100, 60), true, 14);
        assert_eq!(caption, Some(Geometry::new(0, 0, 100, 18)));
        assert_eq!(value, Geometry::new(0, 18, 100, 42));
        assert_eq!(split(Geometry::new(0, 0, 100, 60), false, 14).0, None);
    }
}
