//! Clock with an optional date line, read from the time component.

use dashgen_types::{Geometry, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::instr::{cpp_string, DrawCall, Instr};
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::{time_declaration, TIME_ID};
use crate::tree::Node;

use super::common::{anchor, lvgl_align, TextSlot, ALIGN_OPTIONS, GAP};

const PROPS: &[PropSpec] = &[
    PropSpec::text("time_format", "%H:%M"),
    PropSpec::text("date_format", "%a %d %b"),
    PropSpec::flag("show_date", true),
    PropSpec::number("font_size", 48.0, 6.0, 200.0),
    PropSpec::number("date_font_size", 18.0, 6.0, 200.0),
    PropSpec::flag("bold", true),
    PropSpec::text("color", "black"),
    PropSpec::choice("align", "center", ALIGN_OPTIONS),
];

/// Shown until the clock has synchronised.
const TIME_PLACEHOLDER: &str = "--:--";

pub struct DateTime;

impl DateTime {
    /// Time line and, when shown, date line.
    fn rows(&self, area: Geometry, props: &Props) -> (Geometry, Option<Geometry>) {
        if !props.flag("show_date") {
            return (area, None);
        }
        let date_h = (props.int("date_font_size") as u32 + GAP as u32).min(area.height / 2);
        let time_h = area.height - date_h;
        (
            Geometry::new(area.x, area.y, area.width, time_h),
            Some(Geometry::new(area.x, area.y + time_h as i32, area.width, date_h)),
        )
    }

    fn strftime_lambda(format: &str, fallback: &str) -> String {
        format!(
            "auto now = id({TIME_ID}).now();\nif (!now.is_valid()) return std::string({});\nreturn now.strftime({});",
            cpp_string(fallback),
            cpp_string(format)
        )
    }
}

impl WidgetPlugin for DateTime {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "datetime",
            title: "Date & Time",
            description: "Current time and date formatted with strftime patterns.",
            props: PROPS,
            shared: true,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        ctx.font(props.int("font_size") as u32, props.flag("bold"));
        if props.flag("show_date") {
            ctx.font(props.int("date_font_size") as u32, false);
        }
    }

    fn emit_shared(&self, ctx: &mut EmitContext, widgets: &[&Widget]) {
        if let Some(first) = widgets.first() {
            ctx.declare_platform(first, time_declaration());
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).cpp();
        let (time_area, date_area) = self.rows(widget.geometry, &props);

        let mut lines = vec![(
            time_area,
            ctx.font(props.int("font_size") as u32, props.flag("bold")),
            props.text("time_format"),
            TIME_PLACEHOLDER,
        )];
        if let Some(area) = date_area {
            lines.push((
                area,
                ctx.font(props.int("date_font_size") as u32, false),
                props.text("date_format"),
                "",
            ));
        }

        let slots: Vec<(TextSlot, &str, &str)> = lines
            .into_iter()
            .map(|(area, font, format, fallback)| {
                let (x, y, align) = anchor(area, props.text("align"));
                let slot = TextSlot {
                    x,
                    y,
                    font,
                    color: color.clone(),
                    align,
                };
                (slot, format, fallback)
            })
            .collect();

        ctx.emit(Instr::If(format!("id({TIME_ID}).now().is_valid()")));
        for (slot, format, _) in &slots {
            ctx.draw(DrawCall::Strftime {
                x: slot.x.clone(),
                y: slot.y.clone(),
                font: slot.font.clone(),
                color: slot.color.clone(),
                align: slot.align,
                format: format.to_string(),
                time_id: TIME_ID.to_string(),
            });
        }
        ctx.emit(Instr::Else);
        for (slot, _, fallback) in &slots {
            if !fallback.is_empty() {
                ctx.draw(slot.print(*fallback));
            }
        }
        ctx.emit(Instr::EndIf);
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).hex();
        let align = lvgl_align(props.text("align"));
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);
        let (time_area, date_area) = self.rows(local, &props);

        let font = ctx.font(props.int("font_size") as u32, props.flag("bold"));
        let mut node = container(widget, ctx).child(
            positioned("label", time_area)
                .ident("id", ctx.child_id(widget, "time"))
                .lambda(
                    "text",
                    Self::strftime_lambda(props.text("time_format"), TIME_PLACEHOLDER),
                )
                .ident("text_font", font)
                .color("text_color", color)
                .ident("text_align", align),
        );
        if let Some(area) = date_area {
            let font = ctx.font(props.int("date_font_size") as u32, false);
            node = node.child(
                positioned("label", area)
                    .ident("id", ctx.child_id(widget, "date"))
                    .lambda("text", Self::strftime_lambda(props.text("date_format"), ""))
                    .ident("text_font", font)
                    .color("text_color", color)
                    .ident("text_align", align),
            );
        }
        Some(node)
    }
}
