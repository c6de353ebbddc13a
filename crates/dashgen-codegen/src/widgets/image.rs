//! Static bitmap, converted at firmware build time.

use dashgen_types::{PropSpec, Widget};

use crate::context::EmitContext;
use crate::declarative::positioned;
use crate::instr::{DrawCall, TextAlign};
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::tree::Node;

use super::common::{outline, TextSlot};

const PROPS: &[PropSpec] = &[PropSpec::text("path", "")];

pub struct Image;

impl Image {
    fn path<'w>(&self, props: &'w dashgen_types::Props) -> Option<&'w str> {
        Some(props.text("path").trim()).filter(|p| !p.is_empty())
    }
}

impl WidgetPlugin for Image {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "image",
            title: "Image",
            description: "A bitmap file resized to the widget's box.",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        match self.path(&props) {
            Some(path) => {
                ctx.image(path, widget.geometry.width, widget.geometry.height);
            }
            None => {
                ctx.font(14, false);
            }
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let area = widget.geometry;
        match self.path(&props) {
            Some(path) => {
                let image = ctx.image(path, area.width, area.height);
                ctx.draw(DrawCall::Image {
                    x: area.x.into(),
                    y: area.y.into(),
                    image,
                });
            }
            None => {
                outline(ctx, area, 1, "black");
                let slot = TextSlot {
                    x: area.center_x().into(),
                    y: area.center_y().into(),
                    font: ctx.font(14, false),
                    color: ctx.color("black").cpp(),
                    align: TextAlign::Center,
                };
                ctx.draw(slot.print("image"));
            }
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let area = widget.geometry;
        let node = match self.path(&props) {
            Some(path) => {
                let image = ctx.image(path, area.width, area.height);
                positioned("image", area).ident("src", image)
            }
            None => positioned("obj", area)
                .with("border_width", 1)
                .ident("bg_opa", "TRANSP"),
        };
        Some(node)
    }
}
