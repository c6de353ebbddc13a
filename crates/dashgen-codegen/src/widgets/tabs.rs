//! Tab header strip. The active tab is drawn inverted.

use std::collections::BTreeMap;

use dashgen_types::{PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::positioned;
use crate::instr::TextAlign;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::tree::{Attr, Node};
use crate::yaml::slug;

use super::common::{contrast, outline, TextSlot};

const PROPS: &[PropSpec] = &[
    PropSpec::text("tabs", "Home,Climate,Energy"),
    PropSpec::number("active", 0.0, 0.0, 32.0),
    PropSpec::number("font_size", 16.0, 6.0, 200.0),
    PropSpec::text("color", "black"),
];

/// Tab titles from the comma separated list, blanks dropped.
fn titles(props: &Props) -> Vec<String> {
    props
        .text("tabs")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub struct Tabs;

impl WidgetPlugin for Tabs {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "tabs",
            title: "Tabs",
            description: "Row of tab headers with one highlighted as active.",
            props: PROPS,
            shared: false,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        ctx.font(props.int("font_size") as u32, false);
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let titles = titles(&props);
        let active = props.int("active") as usize;
        let color = props.text("color");
        let font = ctx.font(props.int("font_size") as u32, false);
        let ink = ctx.color(color);
        let inverted = ctx.color(contrast(ink)).cpp();

        for (i, (title, cell)) in titles
            .iter()
            .zip(widget.geometry.columns(titles.len() as u32))
            .enumerate()
        {
            let text_color = if i == active {
                ctx.fill(cell, color);
                inverted.clone()
            } else {
                outline(ctx, cell, 1, color);
                ink.cpp()
            };
            let slot = TextSlot {
                x: cell.center_x().into(),
                y: cell.center_y().into(),
                font: font.clone(),
                color: text_color,
                align: TextAlign::Center,
            };
            ctx.draw(slot.print(title.as_str()));
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let font = ctx.font(props.int("font_size") as u32, false);
        let id = ctx.node_id(widget);
        let tabs = titles(&props)
            .into_iter()
            .map(|title| {
                Attr::Map(BTreeMap::from([
                    (
                        "id".to_string(),
                        Attr::Ident(ctx.child_id(widget, &slug(&title))),
                    ),
                    ("name".to_string(), Attr::Str(title)),
                ]))
            })
            .collect();
        Some(
            positioned("tabview", widget.geometry)
                .ident("id", id)
                .ident("position", "TOP")
                .with("active_tab", props.int("active"))
                .ident("text_font", font)
                .color("text_color", ctx.color(props.text("color")).hex())
                .with("tabs", Attr::List(tabs)),
        )
    }
}
