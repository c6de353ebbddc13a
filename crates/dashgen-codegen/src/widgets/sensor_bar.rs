//! Status strip: wifi strength, temperature, humidity and battery in
//! equal-width cells.

use dashgen_types::{Geometry, Measurement, PropSpec, Props, Widget};

use crate::context::EmitContext;
use crate::declarative::{container, positioned};
use crate::format::{number_format, TempUnit};
use crate::icons::WIFI_LEVELS;
use crate::instr::TextAlign;
use crate::plugin::{PluginInfo, WidgetPlugin};
use crate::resources::{wifi_declaration, SourceRef, WIFI_ID};
use crate::tree::Node;

use super::battery::battery_ladder;
use super::common::{background, contrast, Ladder, LiveValue, TextSlot, GAP};

const PROPS: &[PropSpec] = &[
    PropSpec::flag("show_wifi", true),
    PropSpec::flag("show_temperature", true),
    PropSpec::flag("show_humidity", true),
    PropSpec::flag("show_battery", false),
    PropSpec::text("temperature_entity", ""),
    PropSpec::text("humidity_entity", ""),
    PropSpec::text("battery_entity", ""),
    PropSpec::choice("unit", "C", &["C", "F"]),
    PropSpec::number("precision", 1.0, 0.0, 4.0),
    PropSpec::flag("background", false),
    PropSpec::text("background_color", "black"),
    PropSpec::text("color", ""),
    PropSpec::number("font_size", 16.0, 6.0, 200.0),
    PropSpec::number("icon_size", 20.0, 8.0, 256.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Wifi,
    Temperature,
    Humidity,
    Battery,
}

impl Cell {
    fn entity_prop(self) -> Option<&'static str> {
        match self {
            Cell::Wifi => None,
            Cell::Temperature => Some("temperature_entity"),
            Cell::Humidity => Some("humidity_entity"),
            Cell::Battery => Some("battery_entity"),
        }
    }

    fn measurement(self) -> Option<Measurement> {
        match self {
            Cell::Wifi => None,
            Cell::Temperature => Some(Measurement::Temperature),
            Cell::Humidity => Some(Measurement::Humidity),
            Cell::Battery => Some(Measurement::Battery),
        }
    }
}

fn cells(props: &Props) -> Vec<Cell> {
    [
        ("show_wifi", Cell::Wifi),
        ("show_temperature", Cell::Temperature),
        ("show_humidity", Cell::Humidity),
        ("show_battery", Cell::Battery),
    ]
    .into_iter()
    .filter(|(flag, _)| props.flag(flag))
    .map(|(_, cell)| cell)
    .collect()
}

/// Entity configured for a cell, if any.
fn cell_entity(props: &Props, cell: Cell) -> Option<&str> {
    cell.entity_prop()
        .map(|key| props.text(key).trim())
        .filter(|e| !e.is_empty())
}

fn wifi_ladder(ctx: &mut EmitContext, size: u32) -> Ladder {
    let (last, rest) = match WIFI_LEVELS.split_last() {
        Some(split) => split,
        None => return fixed_glyph(ctx, "wifi", size),
    };
    let steps = rest
        .iter()
        .map(|(name, dbm)| (*dbm as f64, ctx.known_icon(name, size).text()))
        .collect();
    Ladder {
        steps,
        otherwise: ctx.known_icon(last.0, size).text(),
        unavailable: ctx.known_icon("wifi-off", size).text(),
    }
}

/// Same glyph whatever the value.
fn fixed_glyph(ctx: &mut EmitContext, name: &str, size: u32) -> Ladder {
    let glyph = ctx.known_icon(name, size).text();
    Ladder {
        steps: Vec::new(),
        otherwise: glyph.clone(),
        unavailable: glyph,
    }
}

pub struct SensorBar;

impl SensorBar {
    fn source(&self, props: &Props, cell: Cell, ctx: &EmitContext) -> Option<SourceRef> {
        if let Some(entity) = cell_entity(props, cell) {
            return ctx.entity_source(entity);
        }
        match cell.measurement() {
            Some(m) => ctx.onboard_source(m),
            None => ctx
                .resources
                .is_provided(WIFI_ID)
                .then(|| SourceRef::numeric(WIFI_ID)),
        }
    }

    /// Value expression, printf conversion and suffix of a cell. Measured
    /// cells use the `precision` prop; signal strength is whole dBm.
    fn value(&self, props: &Props, cell: Cell, source: Option<&SourceRef>) -> (String, String, String) {
        let raw = source.map(SourceRef::value).unwrap_or_default();
        let format = number_format(props.int("precision"));
        match cell {
            Cell::Wifi => (raw, number_format(0), " dBm".into()),
            Cell::Temperature => {
                let unit = TempUnit::parse(props.text("unit"));
                (unit.convert(&raw), format, unit.symbol().into())
            }
            Cell::Humidity | Cell::Battery => (raw, format, "%".into()),
        }
    }

    fn ladder(&self, ctx: &mut EmitContext, cell: Cell, size: u32) -> Ladder {
        match cell {
            Cell::Wifi => wifi_ladder(ctx, size),
            Cell::Temperature => fixed_glyph(ctx, "thermometer", size),
            Cell::Humidity => fixed_glyph(ctx, "water-percent", size),
            Cell::Battery => battery_ladder(ctx, size),
        }
    }

    fn text_color(&self, ctx: &EmitContext, props: &Props) -> String {
        let explicit = props.text("color").trim();
        if !explicit.is_empty() {
            explicit.to_string()
        } else if props.flag("background") {
            contrast(ctx.color(props.text("background_color"))).to_string()
        } else {
            "black".to_string()
        }
    }

    /// Icon slot and value slot inside one cell.
    fn cell_areas(cell: Geometry, icon_size: u32) -> (Geometry, Geometry) {
        let icon = Geometry::new(cell.x + GAP, cell.y, icon_size, cell.height);
        let offset = GAP + icon_size as i32 + GAP;
        let value = Geometry::new(
            cell.x + offset,
            cell.y,
            cell.width.saturating_sub(offset as u32),
            cell.height,
        );
        (icon, value)
    }
}

impl WidgetPlugin for SensorBar {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            kind: "sensor_bar",
            title: "Sensor Bar",
            description: "Compact strip of wifi, temperature, humidity and battery readings.",
            props: PROPS,
            shared: true,
            declarative: true,
        }
    }

    fn collect_requirements(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let size = props.int("icon_size") as u32;
        ctx.font(props.int("font_size") as u32, false);
        for cell in cells(&props) {
            if let Some(entity) = cell_entity(&props, cell) {
                ctx.entity(entity);
            }
            self.ladder(ctx, cell, size);
        }
    }

    fn emit_shared(&self, ctx: &mut EmitContext, widgets: &[&Widget]) {
        let resolved: Vec<(&Widget, Props)> =
            widgets.iter().map(|w| (*w, self.resolve(w))).collect();

        if let Some((first, _)) = resolved.iter().find(|(_, p)| p.flag("show_wifi")) {
            ctx.declare_platform(first, wifi_declaration());
        }
        for cell in [Cell::Temperature, Cell::Humidity, Cell::Battery] {
            let Some(measurement) = cell.measurement() else {
                continue;
            };
            let needs_onboard = resolved
                .iter()
                .find(|(_, p)| cells(p).contains(&cell) && cell_entity(p, cell).is_none());
            if let Some((first, _)) = needs_onboard {
                ctx.declare_onboard(first, measurement);
            }
        }
    }

    fn emit_procedural(&self, widget: &Widget, ctx: &mut EmitContext) {
        let props = self.resolve(widget);
        let shown = cells(&props);
        let icon_size = props.int("icon_size") as u32;
        background(
            ctx,
            widget.geometry,
            props.flag("background"),
            props.text("background_color"),
        );
        let color = ctx.color(&self.text_color(ctx, &props)).cpp();
        let font = ctx.font(props.int("font_size") as u32, false);

        for (cell, area) in shown.iter().zip(widget.geometry.columns(shown.len() as u32)) {
            let (icon_area, value_area) = Self::cell_areas(area, icon_size);
            let source = self.source(&props, *cell, ctx);

            let ladder = self.ladder(ctx, *cell, icon_size);
            let icon_slot = TextSlot {
                x: icon_area.x.into(),
                y: icon_area.center_y().into(),
                font: ctx.known_icon("wifi", icon_size).font_id,
                color: color.clone(),
                align: TextAlign::CenterLeft,
            };
            ladder.print(ctx, &icon_slot, source.as_ref());

            let (expr, format, suffix) = self.value(&props, *cell, source.as_ref());
            let value = LiveValue {
                source: source.as_ref(),
                expr,
                format,
                suffix,
            };
            let slot = TextSlot {
                x: value_area.x.into(),
                y: value_area.center_y().into(),
                font: font.clone(),
                color: color.clone(),
                align: TextAlign::CenterLeft,
            };
            value.print(ctx, &slot);
        }
    }

    fn emit_declarative(&self, widget: &Widget, ctx: &mut EmitContext) -> Option<Node> {
        let props = self.resolve(widget);
        let shown = cells(&props);
        let icon_size = props.int("icon_size") as u32;
        let color = ctx.color(&self.text_color(ctx, &props)).hex();
        let font = ctx.font(props.int("font_size") as u32, false);
        let icon_font = ctx.known_icon("wifi", icon_size).font_id;
        let local = Geometry::new(0, 0, widget.geometry.width, widget.geometry.height);

        let mut node = container(widget, ctx);
        if props.flag("background") {
            node = node
                .color("bg_color", ctx.color(props.text("background_color")).hex())
                .ident("bg_opa", "COVER");
        }
        for (i, (cell, area)) in shown.iter().zip(local.columns(shown.len() as u32)).enumerate() {
            let (icon_area, value_area) = Self::cell_areas(area, icon_size);
            let source = self.source(&props, *cell, ctx);
            let ladder = self.ladder(ctx, *cell, icon_size);
            let (expr, format, suffix) = self.value(&props, *cell, source.as_ref());
            let value = LiveValue {
                source: source.as_ref(),
                expr,
                format,
                suffix,
            };
            node = node
                .child(
                    positioned("label", icon_area)
                        .ident("id", ctx.child_id(widget, &format!("icon_{i}")))
                        .with("text", ladder.text_attr(source.as_ref()))
                        .ident("text_font", icon_font.clone())
                        .color("text_color", color),
                )
                .child(
                    positioned("label", value_area)
                        .ident("id", ctx.child_id(widget, &format!("value_{i}")))
                        .with("text", value.text_attr(&ctx.options().placeholder))
                        .ident("text_font", font.clone())
                        .color("text_color", color),
                );
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cells() {
        let props = Props::new().resolve(PROPS).props;
        assert_eq!(
            cells(&props),
            vec![Cell::Wifi, Cell::Temperature, Cell::Humidity]
        );
    }

    #[test]
    fn entity_overrides_onboard() {
        let props = Props::new()
            .with("temperature_entity", " sensor.outdoor ")
            .resolve(PROPS)
            .props;
        assert_eq!(cell_entity(&props, Cell::Temperature), Some("sensor.outdoor"));
        assert_eq!(cell_entity(&props, Cell::Humidity), None);
        assert_eq!(cell_entity(&props, Cell::Wifi), None);
    }

    #[test]
    fn precision_applies_to_measured_cells() {
        let source = SourceRef::numeric("onboard_humidity");
        let defaults = Props::new().resolve(PROPS).props;
        let (_, format, _) = SensorBar.value(&defaults, Cell::Humidity, Some(&source));
        assert_eq!(format, "%.1f");

        let props = Props::new().with("precision", 2).resolve(PROPS).props;
        for cell in [Cell::Temperature, Cell::Humidity, Cell::Battery] {
            let (_, format, _) = SensorBar.value(&props, cell, Some(&source));
            assert_eq!(format, "%.2f", "{cell:?}");
        }
        let (_, format, suffix) = SensorBar.value(&props, Cell::Wifi, Some(&source));
        assert_eq!((format.as_str(), suffix.as_str()), ("%.0f", " dBm"));
    }

    #[test]
    fn auto_text_color() {
        let profile = dashgen_types::DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = crate::options::CompileOptions::default();
        let ctx = EmitContext::new(&profile, &options);
        let plain = Props::new().resolve(PROPS).props;
        assert_eq!(SensorBar.text_color(&ctx, &plain), "black");
        let filled = Props::new().with("background", true).resolve(PROPS).props;
        assert_eq!(SensorBar.text_color(&ctx, &filled), "white");
    }
}
