//! Single-measurement readouts (temperature, humidity).
//!
//! Unbound widgets read the device's onboard sensor; bound widgets read
//! their entity. Sources are taken to report Celsius.

use dashgen_types::{Geometry, Measurement, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::format::{number_format, TempUnit};
use crate::instr::TextAlign;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::SourceRef;
use crate::tree::Node;

use super::common::{LiveValue, TextSlot, GAP};

const TEMPERATURE_PROPS: &[PropSpec] = &[
    PropSpec::choice("unit", "C", &["C", "F"]),
    PropSpec::number("precision", 1.0, 0.0, 4.0),
    PropSpec::flag("show_icon", true),
    PropSpec::number("font_size", 28.0, 6.0, 200.0),
    PropSpec::number("icon_size", 32.0, 8.0, 256.0),
    PropSpec::flag("bold", false),
    PropSpec::text("color", "black"),
];

const HUMIDITY_PROPS: &[PropSpec] = &[
    PropSpec::number("precision", 1.0, 0.0, 4.0),
    PropSpec::flag("show_icon", true),
    PropSpec::number("font_size", 28.0, 6.0, 200.0),
    PropSpec::number("icon_size", 32.0, 8.0, 256.0),
    PropSpec::flag("bold", false),
    PropSpec::text("color", "black"),
];

pub struct Reading {
    kind: &'static str,
    title: &'static str,
    description: &'static str,
    measurement: Measurement,
    icon: &'static str,
    props: &'static [PropSpec],
}

impl Reading {
    pub const TEMPERATURE: Reading = Reading {
        kind: "temperature",
        title: "Temperature",
        description: "Temperature from the onboard sensor or a bound entity, in °C or °F.",
        measurement: Measurement::Temperature,
        icon: "thermometer",
        props: TEMPERATURE_PROPS,
    };

    pub const HUMIDITY: Reading = Reading {
        kind: "humidity",
        title: "Humidity",
        description: "Relative humidity from the onboard sensor or a bound entity.",
        measurement: Measurement::Humidity,
        icon: "water-percent",
        props: HUMIDITY_PROPS,
    };

    fn source(&self, widget: &Widget, ctx: &EmitContext) -> Option<SourceRef> {
        match widget.entity() {
            Some(entity) => ctx.entity_source(entity),
            None => ctx.onboard_source(self.measurement),
        }
    }

    fn value_expr_and_suffix(&self, source: Option<&SourceRef>, props: &Props) -> (String, String) {
        let raw = source.map(SourceRef::value).unwrap_or_default();
        match self.measurement {
            Measurement::Temperature => {
                let unit = TempUnit::parse(props.text("unit"));
                (unit.convert(&raw), unit.symbol().to_string())
            }
            _ => (raw, "%".to_string()),
        }
    }

    /// Icon area (if shown) and value area.
    fn layout(&self, area: Geometry, props: &Props) -> (Option<Geometry>, Geometry) {
        if !props.flag("show_icon") {
            return (None, area);
        }
        let icon_w = (props.int("icon_size") as u32).min(area.width);
        let icon = Geometry::new(area.x, area.y, icon_w, area.height);
        let offset = icon_w as i32 + GAP;
        let value = Geometry::new(
            area.x + offset,
            area.y,
            area.width.saturating_sub(offset as u32),
            area.height,
        );
        (Some(icon), value)
    }
}

impl WidgetPlugin for Reading {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: self.kind,
            title: self.title,
            description: self.description,
            props: self.props,
            shared: true,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        if let Some(entity) = widget.entity() {
            ctx.entity(entity);
        }
        ctx.font(props.int("font_size") as u32, props.flag("bold"));
        if props.flag("show_icon") {
            ctx.known_icon(self.icon, props.int("icon_size") as u32);
        }
    }

    fn emit_shared(&self, ctx: &mut EmitContext, widgets: &[&Widget]) {
        if let Some(first) = widgets.iter().find(|w| w.entity().is_none()) {
            ctx.declare_onboard(first, self.measurement);
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).cpp();
        let (icon_area, value_area) = self.layout(widget.geometry, &props);

        if let Some(area) = icon_area {
            let glyph = ctx.known_icon(self.icon, props.int("icon_size") as u32);
            let slot = TextSlot {
                x: area.x.into(),
                y: area.center_y().into(),
                font: glyph.font_id.clone(),
                color: color.clone(),
                align: TextAlign::CenterLeft,
            };
            ctx.draw(slot.print(glyph.text()));
        }

        let source = self.source(widget, ctx);
        let (expr, suffix) = self.value_expr_and_suffix(source.as_ref(), &props);
        let value = LiveValue {
            source: source.as_ref(),
            expr,
            format: number_format(props.int("precision")),
            suffix,
        };
        let slot = TextSlot {
            x: value_area.x.into(),
            y: value_area.center_y().into(),
            font: ctx.font(props.int("font_size") as u32, props.flag("bold")),
            color,
            align: TextAlign::CenterLeft,
        };
        value.print(ctx, &slot);
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let color = ctx.color(props.text("color")).hex();
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);
        let (icon_area, value_area) = self.layout(local, &props);

        let mut node = container(widget, ctx);
        if let Some(area) = icon_area {
            let glyph = ctx.known_icon(self.icon, props.int("icon_size") as u32);
            node = node.child(
                positioned("label", area)
                    .ident("id", ctx.child_id(widget, "icon"))
                    .with("text", glyph.text())
                    .ident("text_font", glyph.font_id)
                    .color("text_color", color),
            );
        }

        let source = self.source(widget, ctx);
        let (expr, suffix) = self.value_expr_and_suffix(source.as_ref(), &props);
        let value = LiveValue {
            source: source.as_ref(),
            expr,
            format: number_format(props.int("precision")),
            suffix,
        };
        let font = ctx.font(props.int("font_size") as u32, props.flag("bold"));
        node = node.child(
            positioned("label", value_area)
                .ident("id", ctx.child_id(widget, "value"))
                .with("text", value.text_attr(&ctx.options().placeholder))
                .ident("text_font", font)
                .color("text_color", color),
        );
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_reserves_icon_column() {
        let props = Props::new().resolve(TEMPERATURE_PROPS).props;
        let (icon, value) = Reading::TEMPERATURE.layout(Geometry::new(0, 0, 100, 60), &props);
        assert_eq!(icon, Some(Geometry::new(0, 0, 32, 60)));
        assert_eq!(value, Geometry::new(36, 0, 64, 60));
    }

    #[test]
    fn humidity_defaults_to_one_decimal() {
        let profile = dashgen_types::DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = crate::options::CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let widget = Widget::new("rh", "humidity", Geometry::new(0, 0, 120, 40))
            .bound_to("sensor.rh");
        Reading::HUMIDITY.collect_requirements(&widget, &mut ctx);
        Reading::HUMIDITY.emit_procedural(&widget, &mut ctx);
        let (lines, _) = ctx.program.render(false);
        let printf = lines
            .iter()
            .find(|l| l.contains("it.printf("))
            .expect("value printed");
        assert!(printf.contains(r#""%.1f%%", id(ha_sensor_rh).state);"#), "{printf}");
    }

    #[test]
    fn fahrenheit_suffix() {
        let props = Props::new()
            .with("unit", "F")
            .resolve(TEMPERATURE_PROPS)
            .props;
        let source = SourceRef::numeric("onboard_temperature");
        let (expr, suffix) = Reading::TEMPERATURE.value_expr_and_suffix(Some(&source), &props);
        assert_eq!(expr, "(id(onboard_temperature).state * 9.0f / 5.0f + 32.0f)");
        assert_eq!(suffix, "°F");
    }
}
