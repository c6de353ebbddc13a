//! Primitive shapes: rectangles and straight lines.

use dashgen_types::{Geometry, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::positioned;
use crate::instr::DrawCall;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::tree::{Attr, Node};

use super::common::outline;

const RECTANGLE_PROPS: &[PropSpec] = &[
    PropSpec::flag("filled", false),
    PropSpec::text("color", "black"),
    PropSpec::number("border_width", 1.0, 0.0, 32.0),
    PropSpec::number("radius", 0.0, 0.0, 256.0),
];

const LINE_PROPS: &[PropSpec] = &[
    PropSpec::choice("orientation", "horizontal", &["horizontal", "vertical"]),
    PropSpec::number("thickness", 1.0, 1.0, 32.0),
    PropSpec::text("color", "black"),
];

pub struct Rectangle;

impl WidgetPlugin for Rectangle {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "rectangle",
            title: "Rectangle",
            description: "Outlined or filled box; shades a panel cannot show are dithered.",
            props: RECTANGLE_PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        if props.flag("filled") {
            ctx.fill(widget.geometry, props.text("color"));
        } else {
            outline(
                ctx,
                widget.geometry,
                props.int("border_width") as u32,
                props.text("color"),
            );
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).hex();
        let node = positioned("obj", widget.geometry)
            .with("radius", props.int("radius"))
            .with("pad_all", 0);
        let node = if props.flag("filled") {
            node.color("bg_color", color)
                .ident("bg_opa", "COVER")
                .with("border_width", 0)
        } else {
            node.ident("bg_opa", "TRANSP")
                .color("border_color", color)
                .with("border_width", props.int("border_width"))
        };
        Some(node)
    }
}

pub struct Line;

impl Line {
    /// Stroke bands, one per pixel of thickness, centred in the box.
    fn strokes(&self, area: Geometry, props: &Props) -> Vec<(i32, i32, i32, i32)> {
        let vertical = props.text("orientation") == "vertical";
        let thickness = props.int("thickness").max(1) as i32;
        let start = if vertical {
            area.center_x() - thickness / 2
        } else {
            area.center_y() - thickness / 2
        };
        (0..thickness)
            .map(|i| {
                let at = start + i;
                if vertical {
                    (at, area.y, at, area.bottom())
                } else {
                    (area.x, at, area.right(), at)
                }
            })
            .collect()
    }
}

impl WidgetPlugin for Line {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "line",
            title: "Line",
            description: "Horizontal or vertical divider across the widget box.",
            props: LINE_PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).cpp();
        for (x1, y1, x2, y2) in self.strokes(widget.geometry, &props) {
            ctx.draw(DrawCall::Line {
                x1: x1.into(),
                y1: y1.into(),
                x2: x2.into(),
                y2: y2.into(),
                color: color.clone(),
            });
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let g = widget.geometry;
        let end = if props.text("orientation") == "vertical" {
            format!("{},{}", g.width / 2, g.height)
        } else {
            format!("{},{}", g.width, g.height / 2)
        };
        let start = if props.text("orientation") == "vertical" {
            format!("{},0", g.width / 2)
        } else {
            format!("0,{}", g.height / 2)
        };
        Some(
            positioned("line", g)
                .with("points", Attr::List(vec![Attr::Str(start), Attr::Str(end)]))
                .with("line_width", props.int("thickness"))
                .color("line_color", ctx.color(props.text("color")).hex()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use dashgen_types::DeviceProfile;

    #[test]
    fn thick_line_is_centred() {
        let props = Props::new().with("thickness", 3).resolve(LINE_PROPS).props;
        let strokes = Line.strokes(Geometry::new(0, 0, 100, 10), &props);
        assert_eq!(strokes, vec![(0, 4, 100, 4), (0, 5, 100, 5), (0, 6, 100, 6)]);
    }

    #[test]
    fn vertical_line() {
        let props = Props::new()
            .with("orientation", "vertical")
            .resolve(LINE_PROPS)
            .props;
        let strokes = Line.strokes(Geometry::new(10, 0, 20, 50), &props);
        assert_eq!(strokes, vec![(20, 0, 20, 50)]);
    }

    #[test]
    fn gray_fill_dithers_on_monochrome() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let widget = Widget::new("r", "rectangle", Geometry::new(0, 0, 8, 8))
            .with_props(Props::new().with("filled", true).with("color", "gray"));
        Rectangle.emit_procedural(&widget, &mut ctx);
        let (lines, _) = ctx.program.render(false);
        assert_eq!(lines[0], "for (int dy = 0; dy < 8; dy++) {");
        assert!(lines[2].contains("it.draw_pixel_at(0 + dx, 0 + dy, COLOR_ON)"));
    }

    #[test]
    fn declarative_outline() {
        let profile = DeviceProfile::builtin("esp32_s3_lvgl_480").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let widget = Widget::new("r", "rectangle", Geometry::new(0, 0, 8, 8))
            .with_props(Props::new().with("border_width", 2));
        let node = Rectangle.emit_declarative(&widget, &mut ctx).unwrap();
        assert_eq!(node.get("border_width"), Some(&Attr::Int(2)));
        assert_eq!(node.get("bg_opa"), Some(&Attr::Ident("TRANSP".into())));
    }
}
