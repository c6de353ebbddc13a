//! Horizontal bar filled in proportion to an entity's value.

use std::collections::BTreeMap;

use dashgen_types::{Geometry, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::instr::{DrawCall, Expr, Instr, TextAlign};
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::SourceRef;
use crate::tree::{Attr, Node};
use crate::visibility::float_literal;

use super::common::{outline, LiveValue, TextSlot, GAP};

const PROPS: &[PropSpec] = &[
    PropSpec::number("min", 0.0, -1.0e6, 1.0e6),
    PropSpec::number("max", 100.0, -1.0e6, 1.0e6),
    PropSpec::number("border", 1.0, 0.0, 16.0),
    PropSpec::text("bar_color", "black"),
    PropSpec::text("color", "black"),
    PropSpec::flag("show_label", true),
    PropSpec::number("font_size", 14.0, 6.0, 200.0),
];

pub struct ProgressBar;

/// Lower and upper bound, swapped if entered backwards.
fn bounds(props: &Props) -> (f64, f64) {
    let (lo, hi) = (props.number("min"), props.number("max"));
    if lo <= hi {
        (lo, hi)
    } else {
        (hi, lo)
    }
}

/// C++ expression for the filled fraction clamped to `0..=1`.
fn fraction_expr(value: &str, lo: f64, hi: f64) -> String {
    let span = (hi - lo).max(f64::EPSILON);
    format!(
        "std::max(0.0f, std::min(1.0f, ({value} - {}) / {}))",
        float_literal(lo),
        float_literal(span)
    )
}

impl ProgressBar {
    fn source(&self, widget: &Widget, ctx: &EmitContext) -> Option<SourceRef> {
        widget.entity().and_then(|e| ctx.entity_source(e))
    }

    /// Bar on the left, percentage on the right.
    fn split(&self, area: Geometry, props: &Props) -> (Geometry, Option<Geometry>) {
        if !props.flag("show_label") {
            return (area, None);
        }
        let label_w = (props.int("font_size") as u32 * 3).min(area.width / 3);
        let bar_w = area.width.saturating_sub(label_w + GAP as u32);
        (
            Geometry::new(area.x, area.y, bar_w, area.height),
            Some(Geometry::new(
                area.x + (bar_w + GAP as u32) as i32,
                area.y,
                label_w,
                area.height,
            )),
        )
    }

    fn percent<'s>(&self, source: Option<&'s SourceRef>, lo: f64, hi: f64) -> LiveValue<'s> {
        let expr = source
            .map(|s| format!("{} * 100.0f", fraction_expr(&s.value(), lo, hi)))
            .unwrap_or_default();
        LiveValue {
            source,
            expr,
            format: "%.0f".to_string(),
            suffix: "%".to_string(),
        }
    }
}

impl WidgetPlugin for ProgressBar {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "progress_bar",
            title: "Progress Bar",
            description: "Bar showing where an entity's value lies between min and max.",
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
        if props.flag("show_label") {
            ctx.font(props.int("font_size") as u32, false);
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let (lo, hi) = bounds(&props);
        let border = props.int("border") as u32;
        let (bar, label) = self.split(widget.geometry, &props);
        let source = self.source(widget, ctx);

        outline(ctx, bar, border, props.text("color"));
        if let Some(source) = &source {
            let inner = bar.inset(border);
            let fill = ctx.color(props.text("bar_color")).cpp();
            ctx.emit(Instr::If(source.available()));
            ctx.emit(Instr::Stmt(format!(
                "float pct = {};",
                fraction_expr(&source.value(), lo, hi)
            )));
            ctx.draw(DrawCall::FilledRectangle {
                x: inner.x.into(),
                y: inner.y.into(),
                w: Expr(format!("(int) ({} * pct)", inner.width)),
                h: inner.height.into(),
                color: fill,
            });
            ctx.emit(Instr::EndIf);
        }

        if let Some(area) = label {
            let slot = TextSlot {
                x: area.right().into(),
                y: area.center_y().into(),
                font: ctx.font(props.int("font_size") as u32, false),
                color: ctx.color(props.text("color")).cpp(),
                align: TextAlign::CenterRight,
            };
            self.percent(source.as_ref(), lo, hi).print(ctx, &slot);
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let (lo, hi) = bounds(&props);
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);
        let (bar_area, label) = self.split(local, &props);
        let source = self.source(widget, ctx);
        let color = ctx.color(props.text("color")).hex();

        let mut bar = positioned("bar", bar_area)
            .ident("id", ctx.child_id(widget, "bar"))
            .with("min_value", lo.round() as i64)
            .with("max_value", hi.round() as i64)
            .with("border_width", props.int("border"))
            .color("border_color", color)
            .color("bg_color", ctx.color("white").hex())
            .with(
                "indicator",
                Attr::Map(BTreeMap::from([(
                    "bg_color".to_string(),
                    Attr::Color(ctx.color(props.text("bar_color")).hex()),
                )])),
            );
        bar = match &source {
            Some(source) => bar.lambda(
                "value",
                format!(
                    "if (!({})) return {};\nreturn (int) {};",
                    source.available(),
                    lo.round() as i64,
                    source.value()
                ),
            ),
            None => bar.with("value", lo.round() as i64),
        };

        let mut node = container(widget, ctx).child(bar);
        if let Some(area) = label {
            let font = ctx.font(props.int("font_size") as u32, false);
            node = node.child(
                positioned("label", area)
                    .ident("id", ctx.child_id(widget, "label"))
                    .with(
                        "text",
                        self.percent(source.as_ref(), lo, hi)
                            .text_attr(&ctx.options().placeholder),
                    )
                    .ident("text_font", font)
                    .color("text_color", color)
                    .ident("text_align", "RIGHT"),
            );
        }
        Some(node)
    }
}
