//! Resource registries and shared declarations.
//!
//! Fonts, icon glyphs and images are interned: the first request for a key
//! allocates an identifier, later requests get the same one back. Sensor and
//! platform blocks are deduplicated by the identifiers they provide.
//!
//! All three interners share one [`IdAllocator`] so that no identifier is
//! ever handed to two different keys within a compilation.

use std::collections::{BTreeMap, BTreeSet};

use dashgen_types::{Measurement, OnboardSensor};

use crate::yaml::{quote, slug};

/// Id of the shared home-assistant time source.
pub const TIME_ID: &str = "ha_time";
/// Id of the wifi signal strength source.
pub const WIFI_ID: &str = "wifi_signal_db";

// ══════════════════════════════════════════════════════════════════════════════
// Identifier allocation
// ══════════════════════════════════════════════════════════════════════════════

/// Hands out unique identifiers derived from a readable base.
///
/// On a collision the base gets a `_N` suffix from a monotonic counter, so the
/// result depends only on request order.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    taken: BTreeSet<String>,
    counter: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    /// A fresh allocator with the fixed well-known ids already reserved.
    pub fn new() -> Self {
        let mut taken = BTreeSet::new();
        taken.insert(TIME_ID.to_string());
        taken.insert(WIFI_ID.to_string());
        for m in [
            Measurement::Temperature,
            Measurement::Humidity,
            Measurement::Pressure,
            Measurement::Co2,
            Measurement::Illuminance,
            Measurement::Battery,
        ] {
            taken.insert(m.source_id());
        }
        Self { taken, counter: 0 }
    }

    pub fn allocate(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            log::debug!("allocated id {base}");
            return base.to_string();
        }
        loop {
            self.counter += 1;
            let candidate = format!("{base}_{}", self.counter);
            if self.taken.insert(candidate.clone()) {
                log::debug!("allocated id {candidate} (base {base} taken)");
                return candidate;
            }
        }
    }

    pub fn is_taken(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    /// Mark ids used elsewhere so they are never handed out here.
    pub fn reserve<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) {
        for id in ids {
            self.taken.insert(id.to_string());
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// Top-level block a declaration belongs to, in rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Font,
    Image,
    Sensor,
    BinarySensor,
    TextSensor,
    Time,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Font,
        Section::Image,
        Section::Sensor,
        Section::BinarySensor,
        Section::TextSensor,
        Section::Time,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Font => "font",
            Self::Image => "image",
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::TextSensor => "text_sensor",
            Self::Time => "time",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// One list item of a top-level block. `lines` start at column 0 with `- `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub section: Section,
    /// Identifiers this block makes available to generated code.
    pub provides: Vec<String>,
    pub lines: Vec<String>,
}

/// Result of offering a declaration to a [`DeclarationSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclareOutcome {
    Emitted,
    /// Every id was already provided; nothing emitted.
    AlreadyProvided,
    /// Some ids exist, others do not. Existing blocks are never patched, so
    /// the missing ids stay undeclared.
    PartialConflict { missing: Vec<String> },
}

/// Ordered, id-deduplicated declaration list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeclarationSet {
    entries: Vec<Declaration>,
    provided: BTreeSet<String>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare(&mut self, decl: Declaration) -> DeclareOutcome {
        let missing: Vec<String> = decl
            .provides
            .iter()
            .filter(|id| !self.provided.contains(*id))
            .cloned()
            .collect();
        if missing.is_empty() && !decl.provides.is_empty() {
            return DeclareOutcome::AlreadyProvided;
        }
        if missing.len() < decl.provides.len() {
            return DeclareOutcome::PartialConflict { missing };
        }
        self.provided.extend(decl.provides.iter().cloned());
        self.entries.push(decl);
        DeclareOutcome::Emitted
    }

    pub fn provides(&self, id: &str) -> bool {
        self.provided.contains(id)
    }

    pub fn entries(&self) -> &[Declaration] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render declarations grouped into top-level blocks. Within a block, entries
/// keep their insertion order.
pub fn render_sections<'a>(decls: impl IntoIterator<Item = &'a Declaration> + Clone) -> Vec<String> {
    let mut out = Vec::new();
    for section in Section::ALL {
        let mut header = false;
        for decl in decls.clone().into_iter().filter(|d| d.section == section) {
            if !header {
                if !out.is_empty() {
                    out.push(String::new());
                }
                out.push(format!("{}:", section.key()));
                header = true;
            }
            out.extend(decl.lines.iter().map(|l| format!("  {l}")));
        }
    }
    out
}

// ══════════════════════════════════════════════════════════════════════════════
// Data sources
// ══════════════════════════════════════════════════════════════════════════════

/// How a bound entity's state is represented at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityDomain {
    Numeric,
    Binary,
    Text,
}

impl EntityDomain {
    /// Infer from the entity's domain prefix.
    pub fn infer(entity: &str) -> Self {
        match entity.split('.').next().unwrap_or("") {
            "sensor" | "input_number" | "number" | "counter" => Self::Numeric,
            "binary_sensor" | "input_boolean" | "switch" | "light" => Self::Binary,
            _ => Self::Text,
        }
    }

    pub fn section(self) -> Section {
        match self {
            Self::Numeric => Section::Sensor,
            Self::Binary => Section::BinarySensor,
            Self::Text => Section::TextSensor,
        }
    }
}

/// A runtime value source the generated code can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRef {
    pub id: String,
    pub domain: EntityDomain,
}

impl SourceRef {
    pub fn numeric(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain: EntityDomain::Numeric,
        }
    }

    /// Raw state (`float`, `bool` or `std::string`).
    pub fn value(&self) -> String {
        format!("id({}).state", self.id)
    }

    /// State usable as a printf `%s` argument.
    pub fn c_str(&self) -> String {
        match self.domain {
            EntityDomain::Text => format!("id({}).state.c_str()", self.id),
            EntityDomain::Binary => format!("(id({}).state ? \"on\" : \"off\")", self.id),
            EntityDomain::Numeric => format!("std::to_string(id({}).state).c_str()", self.id),
        }
    }

    /// Test that the source currently holds a usable value.
    pub fn available(&self) -> String {
        match self.domain {
            EntityDomain::Numeric => {
                format!("id({0}).has_state() && !isnan(id({0}).state)", self.id)
            }
            _ => format!("id({}).has_state()", self.id),
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Registries
// ══════════════════════════════════════════════════════════════════════════════

/// Structural font key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FontKey {
    pub family: String,
    pub weight: u16,
    pub size: u32,
}

/// An icon glyph that has been added to its size's icon font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedGlyph {
    pub font_id: String,
    pub codepoint: u32,
}

impl TrackedGlyph {
    /// `\U000F050F`, valid in both C++ and YAML double-quoted strings.
    pub fn escape(&self) -> String {
        format!("\\U{:08X}", self.codepoint)
    }

    /// The glyph as a one-character string.
    pub fn text(&self) -> String {
        char::from_u32(self.codepoint)
            .map(String::from)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
struct IconFont {
    id: String,
    size: u32,
    glyphs: Vec<u32>,
}

/// Structural image key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey {
    pub path: String,
    pub width: u32,
    pub height: u32,
    /// Pixel format, e.g. `BINARY` or `RGB565`.
    pub format: String,
}

/// Page-scoped registries. Entries are never removed.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    ids: IdAllocator,
    fonts: Vec<(FontKey, String)>,
    font_index: BTreeMap<FontKey, usize>,
    icon_fonts: Vec<IconFont>,
    images: Vec<(ImageKey, String)>,
    image_index: BTreeMap<ImageKey, usize>,
    entities: BTreeMap<String, SourceRef>,
    platforms: DeclarationSet,
}

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unique identifier for something that is not interned (widget nodes).
    pub fn allocate_id(&mut self, base: &str) -> String {
        self.ids.allocate(base)
    }

    pub fn reserve_ids<'i>(&mut self, ids: impl IntoIterator<Item = &'i str>) {
        self.ids.reserve(ids);
    }

    /// Intern a text font.
    pub fn request_font(&mut self, family: &str, weight: u16, size: u32) -> String {
        let key = FontKey {
            family: family.to_string(),
            weight,
            size,
        };
        if let Some(&i) = self.font_index.get(&key) {
            return self.fonts[i].1.clone();
        }
        let id = self
            .ids
            .allocate(&format!("font_{}_{weight}_{size}", slug(family)));
        self.font_index.insert(key.clone(), self.fonts.len());
        self.fonts.push((key, id.clone()));
        id
    }

    /// Intern an icon glyph. Glyphs of one size share one font.
    pub fn request_icon(&mut self, codepoint: u32, size: u32) -> TrackedGlyph {
        let index = match self.icon_fonts.iter().position(|f| f.size == size) {
            Some(i) => i,
            None => {
                let id = self.ids.allocate(&format!("font_mdi_{size}"));
                self.icon_fonts.push(IconFont {
                    id,
                    size,
                    glyphs: Vec::new(),
                });
                self.icon_fonts.len() - 1
            }
        };
        let font = &mut self.icon_fonts[index];
        if !font.glyphs.contains(&codepoint) {
            font.glyphs.push(codepoint);
        }
        TrackedGlyph {
            font_id: font.id.clone(),
            codepoint,
        }
    }

    /// Intern an image file at a given size and pixel format.
    pub fn request_image(&mut self, key: ImageKey) -> String {
        if let Some(&i) = self.image_index.get(&key) {
            return self.images[i].1.clone();
        }
        let stem = key
            .path
            .rsplit('/')
            .next()
            .unwrap_or(&key.path)
            .split('.')
            .next()
            .unwrap_or("");
        let id = self.ids.allocate(&format!("img_{}", slug(stem)));
        self.image_index.insert(key.clone(), self.images.len());
        self.images.push((key, id.clone()));
        id
    }

    /// Declare a home-assistant entity and return its runtime source.
    pub fn request_entity(&mut self, entity: &str) -> SourceRef {
        if let Some(source) = self.entities.get(entity) {
            return source.clone();
        }
        let domain = EntityDomain::infer(entity);
        let id = self.ids.allocate(&format!("ha_{}", slug(entity)));
        let decl = Declaration {
            section: domain.section(),
            provides: vec![id.clone()],
            lines: vec![
                "- platform: homeassistant".to_string(),
                format!("  id: {id}"),
                format!("  entity_id: {entity}"),
                "  internal: true".to_string(),
            ],
        };
        self.platforms.declare(decl);
        let source = SourceRef { id, domain };
        self.entities.insert(entity.to_string(), source.clone());
        source
    }

    /// The source for an entity requested earlier.
    pub fn entity_source(&self, entity: &str) -> Option<&SourceRef> {
        self.entities.get(entity)
    }

    /// Offer a platform block (onboard chip, wifi, time).
    pub fn declare_platform(&mut self, decl: Declaration) -> DeclareOutcome {
        let outcome = self.platforms.declare(decl);
        log::debug!("platform declaration: {outcome:?}");
        outcome
    }

    pub fn is_provided(&self, id: &str) -> bool {
        self.platforms.provides(id)
    }

    pub fn fonts(&self) -> impl Iterator<Item = (&FontKey, &str)> {
        self.fonts.iter().map(|(k, id)| (k, id.as_str()))
    }

    /// Every declaration: fonts, icon fonts, images, then platforms in
    /// declaration order.
    pub fn declarations(&self, icon_font_file: &str) -> Vec<Declaration> {
        let mut out = Vec::new();
        for (key, id) in &self.fonts {
            out.push(Declaration {
                section: Section::Font,
                provides: vec![id.clone()],
                lines: vec![
                    "- file:".to_string(),
                    "    type: gfonts".to_string(),
                    format!("    family: {}", key.family),
                    format!("    weight: {}", key.weight),
                    format!("  id: {id}"),
                    format!("  size: {}", key.size),
                ],
            });
        }
        for font in &self.icon_fonts {
            let mut lines = vec![
                format!("- file: {}", quote(icon_font_file)),
                format!("  id: {}", font.id),
                format!("  size: {}", font.size),
                "  glyphs:".to_string(),
            ];
            for cp in &font.glyphs {
                lines.push(format!("    - \"\\U{cp:08X}\""));
            }
            out.push(Declaration {
                section: Section::Font,
                provides: vec![font.id.clone()],
                lines,
            });
        }
        for (key, id) in &self.images {
            out.push(Declaration {
                section: Section::Image,
                provides: vec![id.clone()],
                lines: vec![
                    format!("- file: {}", quote(&key.path)),
                    format!("  id: {id}"),
                    format!("  type: {}", key.format),
                    format!("  resize: {}x{}", key.width, key.height),
                ],
            });
        }
        out.extend(self.platforms.entries().iter().cloned());
        out
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Platform blocks
// ══════════════════════════════════════════════════════════════════════════════

/// Block for an onboard chip declaring every measurement it lists.
pub fn onboard_declaration(sensor: &OnboardSensor) -> Declaration {
    let mut lines = vec![format!("- platform: {}", sensor.platform)];
    let mut provides = Vec::new();
    for m in &sensor.measurements {
        let id = m.source_id();
        lines.push(format!("  {}:", m.key()));
        lines.push(format!("    id: {id}"));
        lines.push("    internal: true".to_string());
        provides.push(id);
    }
    for (key, value) in &sensor.extra {
        lines.push(format!("  {key}: {value}"));
    }
    Declaration {
        section: Section::Sensor,
        provides,
        lines,
    }
}

pub fn wifi_declaration() -> Declaration {
    Declaration {
        section: Section::Sensor,
        provides: vec![WIFI_ID.to_string()],
        lines: vec![
            "- platform: wifi_signal".to_string(),
            format!("  id: {WIFI_ID}"),
            "  update_interval: 60s".to_string(),
            "  internal: true".to_string(),
        ],
    }
}

pub fn time_declaration() -> Declaration {
    Declaration {
        section: Section::Time,
        provides: vec![TIME_ID.to_string()],
        lines: vec![
            "- platform: homeassistant".to_string(),
            format!("  id: {TIME_ID}"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sht4x() -> OnboardSensor {
        OnboardSensor {
            platform: "sht4x".into(),
            measurements: vec![Measurement::Temperature, Measurement::Humidity],
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn font_interning() {
        let mut r = Resources::new();
        let a = r.request_font("Roboto", 400, 20);
        let b = r.request_font("Roboto", 700, 20);
        let c = r.request_font("Roboto", 400, 20);
        assert_eq!(a, "font_roboto_400_20");
        assert_eq!(b, "font_roboto_700_20");
        assert_eq!(a, c);
        assert_eq!(r.fonts().count(), 2);
    }

    #[test]
    fn slug_collisions_get_suffixes() {
        let mut r = Resources::new();
        let a = r.request_font("Open Sans", 400, 12);
        let b = r.request_font("open-sans", 400, 12);
        assert_eq!(a, "font_open_sans_400_12");
        assert_eq!(b, "font_open_sans_400_12_1");
    }

    #[test]
    fn icon_glyphs_grouped_by_size() {
        let mut r = Resources::new();
        let a = r.request_icon(0xF050F, 24);
        let b = r.request_icon(0xF058E, 24);
        let c = r.request_icon(0xF050F, 24);
        let d = r.request_icon(0xF050F, 48);
        assert_eq!(a.font_id, "font_mdi_24");
        assert_eq!(a.font_id, b.font_id);
        assert_eq!(a, c);
        assert_eq!(d.font_id, "font_mdi_48");
        assert_eq!(a.escape(), "\\U000F050F");

        let decls = r.declarations("mdi.ttf");
        assert_eq!(decls.len(), 2);
        let glyph_lines: Vec<_> = decls[0].lines.iter().filter(|l| l.contains("\\U")).collect();
        assert_eq!(glyph_lines.len(), 2);
    }

    #[test]
    fn entity_domains() {
        assert_eq!(EntityDomain::infer("sensor.outdoor"), EntityDomain::Numeric);
        assert_eq!(EntityDomain::infer("input_boolean.away"), EntityDomain::Binary);
        assert_eq!(EntityDomain::infer("weather.home"), EntityDomain::Text);
        assert_eq!(EntityDomain::infer("garbage"), EntityDomain::Text);
    }

    #[test]
    fn entity_requests_are_deduplicated() {
        let mut r = Resources::new();
        let a = r.request_entity("sensor.living_room");
        let b = r.request_entity("sensor.living_room");
        assert_eq!(a, b);
        assert_eq!(a.id, "ha_sensor_living_room");
        assert_eq!(r.declarations("x").len(), 1);
        assert_eq!(
            a.available(),
            "id(ha_sensor_living_room).has_state() && !isnan(id(ha_sensor_living_room).state)"
        );
    }

    #[test]
    fn well_known_ids_are_reserved() {
        let mut r = Resources::new();
        let s = r.request_entity("time");
        assert_eq!(s.id, "ha_time_1");
    }

    #[test]
    fn platform_dedup_and_partial_conflict() {
        let mut set = DeclarationSet::new();
        assert_eq!(set.declare(onboard_declaration(&sht4x())), DeclareOutcome::Emitted);
        assert_eq!(
            set.declare(onboard_declaration(&sht4x())),
            DeclareOutcome::AlreadyProvided
        );

        let bme = OnboardSensor {
            platform: "bme280_i2c".into(),
            measurements: vec![Measurement::Temperature, Measurement::Pressure],
            extra: BTreeMap::new(),
        };
        assert_eq!(
            set.declare(onboard_declaration(&bme)),
            DeclareOutcome::PartialConflict {
                missing: vec!["onboard_pressure".to_string()]
            }
        );
        assert_eq!(set.len(), 1);
        assert!(!set.provides("onboard_pressure"));
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let decls = vec![
            time_declaration(),
            wifi_declaration(),
            Declaration {
                section: Section::Font,
                provides: vec!["f".into()],
                lines: vec!["- id: f".into()],
            },
        ];
        let lines = render_sections(&decls);
        assert_eq!(lines[0], "font:");
        assert_eq!(lines[1], "  - id: f");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "sensor:");
        assert_eq!(lines.last().unwrap(), "    id: ha_time");
    }
}
