//! The page-scoped emission context.
//!
//! One [`EmitContext`] is created per page compilation and threaded through
//! every plugin call. It owns the instruction buffer, the resource
//! registries and the diagnostics; it borrows the profile and options.

use std::collections::BTreeMap;

use dashgen_types::{
    ColorMode, DeviceProfile, Diagnostic, DiagnosticCode, Diagnostics, Geometry, Measurement,
    Widget,
};

use crate::color::{self, ResolvedColor};
use crate::declarative::node_base;
use crate::icons;
use crate::instr::{DrawCall, Instr, Program};
use crate::options::CompileOptions;
use crate::resources::{
    onboard_declaration, Declaration, DeclareOutcome, ImageKey, Resources, SourceRef, TrackedGlyph,
};
use crate::visibility;
use crate::yaml::slug;

pub struct EmitContext<'a> {
    profile: &'a DeviceProfile,
    options: &'a CompileOptions,
    pub resources: Resources,
    pub program: Program,
    pub diagnostics: Diagnostics,
    /// Node id prefix of the page being emitted.
    node_prefix: Option<String>,
    /// Widget id → node id.
    nodes: BTreeMap<String, String>,
    /// Every node id handed out, in allocation order.
    node_ids: Vec<String>,
}

impl<'a> EmitContext<'a> {
    pub fn new(profile: &'a DeviceProfile, options: &'a CompileOptions) -> Self {
        Self {
            profile,
            options,
            resources: Resources::new(),
            program: Program::new(),
            diagnostics: Diagnostics::empty(),
            node_prefix: None,
            nodes: BTreeMap::new(),
            node_ids: Vec::new(),
        }
    }

    pub fn profile(&self) -> &'a DeviceProfile {
        self.profile
    }

    pub fn options(&self) -> &'a CompileOptions {
        self.options
    }

    pub fn diagnose(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    // ── Resources ────────────────────────────────────────────────────────

    /// Font in the default text family.
    pub fn font(&mut self, size: u32, bold: bool) -> String {
        let weight = if bold { 700 } else { 400 };
        let family = self.options.text_font_family.clone();
        self.resources.request_font(&family, weight, size)
    }

    /// Icon glyph by name. Unknown names fall back to a help glyph.
    pub fn icon(&mut self, widget: &Widget, name: &str, size: u32) -> TrackedGlyph {
        let codepoint = match icons::lookup(name) {
            Some(cp) => cp,
            None => {
                self.diagnose(
                    Diagnostic::new(
                        DiagnosticCode::UNKNOWN_ICON,
                        format!("unknown icon '{name}'"),
                    )
                    .for_widget(&widget.id)
                    .with_suggestion("use a Material Design Icons name such as 'home'"),
                );
                icons::FALLBACK
            }
        };
        self.resources.request_icon(codepoint, size)
    }

    /// Glyph of a name already known to the table.
    pub fn known_icon(&mut self, name: &str, size: u32) -> TrackedGlyph {
        self.resources.request_icon(icons::glyph(name), size)
    }

    pub fn entity(&mut self, entity: &str) -> SourceRef {
        self.resources.request_entity(entity)
    }

    /// Source of an entity requested during collection.
    pub fn entity_source(&self, entity: &str) -> Option<SourceRef> {
        self.resources.entity_source(entity).cloned()
    }

    pub fn image(&mut self, path: &str, width: u32, height: u32) -> String {
        let format = match self.profile.color {
            ColorMode::Monochrome => "BINARY",
            ColorMode::Grayscale { .. } => "GRAYSCALE",
            ColorMode::Palette { .. } | ColorMode::Rgb => "RGB565",
        };
        self.resources.request_image(ImageKey {
            path: path.to_string(),
            width,
            height,
            format: format.to_string(),
        })
    }

    /// Declare the onboard chip providing `measurement`. Returns whether the
    /// measurement's source id is now available.
    pub fn declare_onboard(&mut self, widget: &Widget, measurement: Measurement) -> bool {
        let id = measurement.source_id();
        if self.resources.is_provided(&id) {
            return true;
        }
        let profile = self.profile;
        let Some(sensor) = profile.onboard_sensor_for(measurement) else {
            self.diagnose(
                Diagnostic::new(
                    DiagnosticCode::ONBOARD_SENSOR_MISSING,
                    format!(
                        "profile '{}' has no onboard {} sensor",
                        profile.name,
                        measurement.key()
                    ),
                )
                .for_widget(&widget.id)
                .with_suggestion("bind the widget to an entity instead"),
            );
            return false;
        };
        let decl = onboard_declaration(sensor);
        self.declare_platform(widget, decl);
        self.resources.is_provided(&id)
    }

    /// Offer a platform block; a partial overlap is recorded, never patched.
    pub fn declare_platform(&mut self, widget: &Widget, decl: Declaration) -> DeclareOutcome {
        let first_line = decl.lines.first().cloned().unwrap_or_default();
        let outcome = self.resources.declare_platform(decl);
        if let DeclareOutcome::PartialConflict { missing } = &outcome {
            self.diagnose(
                Diagnostic::new(
                    DiagnosticCode::PARTIAL_PLATFORM_CONFLICT,
                    format!(
                        "'{}' overlaps an existing declaration; {} left undeclared",
                        first_line.trim_start_matches("- "),
                        missing.join(", ")
                    ),
                )
                .for_widget(&widget.id),
            );
        }
        outcome
    }

    /// Onboard source, if its declaration exists.
    pub fn onboard_source(&self, measurement: Measurement) -> Option<SourceRef> {
        let id = measurement.source_id();
        self.resources
            .is_provided(&id)
            .then(|| SourceRef::numeric(id))
    }

    // ── Node identifiers ─────────────────────────────────────────────────

    /// Start the declarative page `page_id`: widget node ids are prefixed
    /// with it, and `reserved` ids (other pages' nodes) are never reused.
    /// Returns the page's own node id.
    pub fn begin_page<'i>(
        &mut self,
        page_id: &str,
        reserved: impl IntoIterator<Item = &'i str>,
    ) -> String {
        self.resources.reserve_ids(reserved);
        let id = self.allocate_node(&node_base(page_id));
        self.node_prefix = Some(id.clone());
        id
    }

    /// The node id of `widget`, allocated on first use.
    pub fn node_id(&mut self, widget: &Widget) -> String {
        if let Some(id) = self.nodes.get(&widget.id) {
            return id.clone();
        }
        let base = match &self.node_prefix {
            Some(prefix) => format!("{prefix}_{}", slug(&widget.id)),
            None => node_base(&widget.id),
        };
        let id = self.allocate_node(&base);
        self.nodes.insert(widget.id.clone(), id.clone());
        id
    }

    /// A fresh id for a sub-element of `widget`, e.g. its `value` label.
    pub fn child_id(&mut self, widget: &Widget, part: &str) -> String {
        let base = format!("{}_{}", self.node_id(widget), slug(part));
        self.allocate_node(&base)
    }

    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    fn allocate_node(&mut self, base: &str) -> String {
        let id = self.resources.allocate_id(base);
        self.node_ids.push(id.clone());
        id
    }

    // ── Colour and fills ─────────────────────────────────────────────────

    pub fn color(&self, name: &str) -> ResolvedColor {
        color::resolve(&self.profile.color, name)
    }

    /// Fill a region, dithering shades the panel cannot show.
    pub fn fill(&mut self, area: Geometry, name: &str) {
        let resolved = self.color(name);
        let call = match resolved.dither() {
            Some(pattern) => DrawCall::DitherFill {
                x: area.x.into(),
                y: area.y.into(),
                w: area.width.into(),
                h: area.height.into(),
                pattern,
            },
            None => DrawCall::FilledRectangle {
                x: area.x.into(),
                y: area.y.into(),
                w: area.width.into(),
                h: area.height.into(),
                color: resolved.cpp(),
            },
        };
        self.program.draw(call);
    }

    // ── Visibility ───────────────────────────────────────────────────────

    /// Guard expression for a conditional widget.
    pub fn guard(&self, widget: &Widget) -> Option<String> {
        widget
            .condition
            .as_ref()
            .map(|c| visibility::guard_expr(c, &self.resources))
    }

    /// `hidden` lambda body for a conditional widget.
    pub fn hidden_lambda(&self, widget: &Widget) -> Option<String> {
        widget
            .condition
            .as_ref()
            .map(|c| visibility::hidden_lambda(c, &self.resources))
    }

    // ── Instructions ─────────────────────────────────────────────────────

    pub fn emit(&mut self, instr: Instr) {
        self.program.push(instr);
    }

    pub fn draw(&mut self, call: DrawCall) {
        self.program.draw(call);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgen_types::{CompareOp, Condition, OnboardSensor};
    use std::collections::BTreeMap;

    fn widget() -> Widget {
        Widget::new("w1", "temperature", Geometry::new(0, 0, 10, 10))
    }

    #[test]
    fn fill_dithers_on_monochrome() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        ctx.fill(Geometry::new(0, 0, 4, 4), "gray");
        ctx.fill(Geometry::new(0, 0, 4, 4), "black");
        assert!(matches!(
            ctx.program.instrs()[0],
            Instr::Draw(DrawCall::DitherFill { .. })
        ));
        assert!(matches!(
            &ctx.program.instrs()[1],
            Instr::Draw(DrawCall::FilledRectangle { color, .. }) if color == "COLOR_ON"
        ));
    }

    #[test]
    fn onboard_missing_is_diagnosed() {
        let profile = DeviceProfile::builtin("waveshare_7in5_gray4").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        assert!(!ctx.declare_onboard(&widget(), Measurement::Temperature));
        assert_eq!(
            ctx.diagnostics
                .with_code(DiagnosticCode::ONBOARD_SENSOR_MISSING)
                .count(),
            1
        );
        assert!(ctx.onboard_source(Measurement::Temperature).is_none());
    }

    #[test]
    fn onboard_declared_once() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        assert!(ctx.declare_onboard(&widget(), Measurement::Temperature));
        assert!(ctx.declare_onboard(&widget(), Measurement::Humidity));
        assert_eq!(ctx.resources.declarations("x").len(), 1);
        assert!(ctx.diagnostics.is_empty());
    }

    #[test]
    fn overlapping_chip_records_conflict() {
        let mut profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        profile.onboard_sensors.push(OnboardSensor {
            platform: "bme280_i2c".into(),
            measurements: vec![Measurement::Temperature, Measurement::Pressure],
            extra: BTreeMap::new(),
        });
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        assert!(ctx.declare_onboard(&widget(), Measurement::Temperature));
        assert!(!ctx.declare_onboard(&widget(), Measurement::Pressure));
        assert_eq!(
            ctx.diagnostics
                .with_code(DiagnosticCode::PARTIAL_PLATFORM_CONFLICT)
                .count(),
            1
        );
        assert_eq!(ctx.resources.declarations("x").len(), 1);
    }

    #[test]
    fn unknown_icon_falls_back() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let g = ctx.icon(&widget(), "definitely-not", 24);
        assert_eq!(g.codepoint, icons::FALLBACK);
        assert_eq!(ctx.diagnostics.len(), 1);
    }

    #[test]
    fn node_ids_never_collide() {
        let profile = DeviceProfile::builtin("esp32_s3_lvgl_480").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        assert_eq!(ctx.begin_page("home", ["home_title"]), "home");

        let dashed = Widget::new("Temp-1", "label", Geometry::new(0, 0, 10, 10));
        let snake = Widget::new("temp_1", "label", Geometry::new(0, 0, 10, 10));
        let title = Widget::new("title", "label", Geometry::new(0, 0, 10, 10));
        assert_eq!(ctx.node_id(&dashed), "home_temp_1");
        assert_eq!(ctx.node_id(&snake), "home_temp_1_1");
        assert_eq!(ctx.node_id(&dashed), "home_temp_1");
        assert_eq!(ctx.node_id(&title), "home_title_2");

        assert_eq!(ctx.child_id(&dashed, "value"), "home_temp_1_value");
        assert_eq!(ctx.child_id(&dashed, "value"), "home_temp_1_value_3");
        assert_eq!(ctx.node_ids().len(), 6);
    }

    #[test]
    fn node_ids_avoid_resource_ids() {
        let profile = DeviceProfile::builtin("esp32_s3_lvgl_480").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let font = ctx.font(20, false);
        let w = Widget::new(font.clone(), "label", Geometry::new(0, 0, 10, 10));
        assert_ne!(ctx.node_id(&w), font);
    }

    #[test]
    fn out_of_range_codepoint_is_an_unknown_icon() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let g = ctx.icon(&widget(), "ffffff", 48);
        assert_eq!(g.codepoint, icons::FALLBACK);
        assert_eq!(g.escape(), "\\U000F02D7");
        assert_eq!(
            ctx.diagnostics.with_code(DiagnosticCode::UNKNOWN_ICON).count(),
            1
        );
    }

    #[test]
    fn guard_uses_declared_entities() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        ctx.entity("binary_sensor.door");
        let w = widget().visible_when(Condition::state("binary_sensor.door", CompareOp::Eq, "on"));
        assert_eq!(
            ctx.guard(&w).unwrap(),
            "(id(ha_binary_sensor_door).has_state() && id(ha_binary_sensor_door).state == true)"
        );
        assert!(ctx.guard(&widget()).is_none());
    }
}
