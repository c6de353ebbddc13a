//! Helpers shared by the built-in plugins.

use dashgen_types::Geometry;

use crate::color::{DitherPattern, ResolvedColor};
use crate::context::EmitContext;
use crate::format::placeholder;
use crate::instr::{cpp_string, printf_literal, DrawCall, Expr, Instr, TextAlign};
use crate::resources::SourceRef;
use crate::tree::Attr;
use crate::visibility::float_literal;

/// Spacing between an icon and its value.
pub const GAP: i32 = 4;

/// Horizontal alignment options shared by text widgets.
pub const ALIGN_OPTIONS: &[&str] = &["left", "center", "right"];

/// Anchor point and text alignment for text inside `area`.
pub fn anchor(area: Geometry, align: &str) -> (Expr, Expr, TextAlign) {
    let y = Expr::from(area.center_y());
    match align {
        "center" => (area.center_x().into(), y, TextAlign::Center),
        "right" => (area.right().into(), y, TextAlign::CenterRight),
        _ => (area.x.into(), y, TextAlign::CenterLeft),
    }
}

/// Toolkit constant for a horizontal alignment.
pub fn lvgl_align(align: &str) -> &'static str {
    match align {
        "center" => "CENTER",
        "right" => "RIGHT",
        _ => "LEFT",
    }
}

/// Readable text colour on top of `background`.
pub fn contrast(background: ResolvedColor) -> &'static str {
    let dark = match background {
        ResolvedColor::On => true,
        ResolvedColor::Off => false,
        ResolvedColor::Dithered(p) => p != DitherPattern::Sparse,
        ResolvedColor::Rgb(r, g, b) => {
            (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) < 128.0
        }
    };
    if dark {
        "white"
    } else {
        "black"
    }
}

/// Text drawn with one font and colour at one anchor.
pub struct TextSlot {
    pub x: Expr,
    pub y: Expr,
    pub font: String,
    pub color: String,
    pub align: TextAlign,
}

impl TextSlot {
    pub fn print(&self, text: impl Into<String>) -> DrawCall {
        DrawCall::Print {
            x: self.x.clone(),
            y: self.y.clone(),
            font: self.font.clone(),
            color: self.color.clone(),
            align: self.align,
            text: text.into(),
        }
    }

    pub fn printf(&self, format: impl Into<String>, args: Vec<String>) -> DrawCall {
        DrawCall::Printf {
            x: self.x.clone(),
            y: self.y.clone(),
            font: self.font.clone(),
            color: self.color.clone(),
            align: self.align,
            format: format.into(),
            args,
        }
    }
}

/// A live value: where it comes from, how to read it and how to format it.
pub struct LiveValue<'s> {
    pub source: Option<&'s SourceRef>,
    /// C++ expression of the displayed value (after any conversion).
    pub expr: String,
    /// printf conversion for `expr`, e.g. `%.1f`.
    pub format: String,
    /// Literal text after the value, e.g. `°C`.
    pub suffix: String,
}

impl<'s> LiveValue<'s> {
    /// Numeric source read as-is.
    pub fn numeric(source: Option<&'s SourceRef>, format: String, suffix: &str) -> Self {
        Self {
            source,
            expr: source.map(SourceRef::value).unwrap_or_default(),
            format,
            suffix: suffix.to_string(),
        }
    }

    /// Draw the value, or the placeholder while it is unavailable.
    pub fn print(&self, ctx: &mut EmitContext, slot: &TextSlot) {
        let fallback = placeholder(&ctx.options().placeholder, &self.suffix);
        match self.source {
            Some(source) => {
                ctx.emit(Instr::If(source.available()));
                ctx.draw(slot.printf(
                    format!("{}{}", self.format, printf_literal(&self.suffix)),
                    vec![self.expr.clone()],
                ));
                ctx.emit(Instr::Else);
                ctx.draw(slot.print(fallback));
                ctx.emit(Instr::EndIf);
            }
            None => ctx.draw(slot.print(fallback)),
        }
    }

    /// Text attribute evaluating to the value or the placeholder.
    pub fn text_attr(&self, missing: &str) -> Attr {
        let fallback = placeholder(missing, &self.suffix);
        match self.source {
            Some(source) => Attr::Lambda(format!(
                "if ({}) {{\n  char buf[32];\n  snprintf(buf, sizeof(buf), {}, {});\n  return std::string(buf);\n}}\nreturn std::string({});",
                source.available(),
                cpp_string(&format!("{}{}", self.format, printf_literal(&self.suffix))),
                self.expr,
                cpp_string(&fallback)
            )),
            None => Attr::Str(fallback),
        }
    }
}

/// Glyph chosen at runtime by comparing a value against descending
/// thresholds.
pub struct Ladder {
    /// `(threshold, glyph)`: the first step with `value >= threshold` wins.
    pub steps: Vec<(f64, String)>,
    /// Glyph below every threshold.
    pub otherwise: String,
    /// Glyph while the source has no state.
    pub unavailable: String,
}

impl Ladder {
    pub fn print(&self, ctx: &mut EmitContext, slot: &TextSlot, source: Option<&SourceRef>) {
        let Some(source) = source else {
            ctx.draw(slot.print(self.unavailable.clone()));
            return;
        };
        let value = source.value();
        ctx.emit(Instr::If(source.available()));
        for (i, (threshold, glyph)) in self.steps.iter().enumerate() {
            let test = format!("{value} >= {}", float_literal(*threshold));
            ctx.emit(if i == 0 { Instr::If(test) } else { Instr::ElseIf(test) });
            ctx.draw(slot.print(glyph.clone()));
        }
        if self.steps.is_empty() {
            ctx.draw(slot.print(self.otherwise.clone()));
        } else {
            ctx.emit(Instr::Else);
            ctx.draw(slot.print(self.otherwise.clone()));
            ctx.emit(Instr::EndIf);
        }
        ctx.emit(Instr::Else);
        ctx.draw(slot.print(self.unavailable.clone()));
        ctx.emit(Instr::EndIf);
    }

    pub fn text_attr(&self, source: Option<&SourceRef>) -> Attr {
        let Some(source) = source else {
            return Attr::Str(self.unavailable.clone());
        };
        let value = source.value();
        let mut code = format!(
            "if (!({})) return std::string({});",
            source.available(),
            cpp_string(&self.unavailable)
        );
        for (threshold, glyph) in &self.steps {
            code.push_str(&format!(
                "\nif ({value} >= {}) return std::string({});",
                float_literal(*threshold),
                cpp_string(glyph)
            ));
        }
        code.push_str(&format!("\nreturn std::string({});", cpp_string(&self.otherwise)));
        Attr::Lambda(code)
    }
}

/// Draw a filled background for `area` when `enabled`.
pub fn background(ctx: &mut EmitContext, area: Geometry, enabled: bool, color: &str) {
    if enabled {
        ctx.fill(area, color);
    }
}

/// Outline `area` with a border `width` pixels thick.
pub fn outline(ctx: &mut EmitContext, area: Geometry, width: u32, color: &str) {
    let color = ctx.color(color).cpp();
    for i in 0..width.min(area.width / 2).min(area.height / 2) {
        let r = area.inset(i);
        ctx.draw(DrawCall::Rectangle {
            x: r.x.into(),
            y: r.y.into(),
            w: r.width.into(),
            h: r.height.into(),
            color: color.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use dashgen_types::DeviceProfile;

    #[test]
    fn live_value_falls_back_to_placeholder() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let source = SourceRef::numeric("onboard_temperature");
        let value = LiveValue::numeric(Some(&source), "%.1f".into(), "°C");
        let slot = TextSlot {
            x: 0.into(),
            y: 0.into(),
            font: "f".into(),
            color: "COLOR_ON".into(),
            align: TextAlign::TopLeft,
        };
        value.print(&mut ctx, &slot);
        let (lines, _) = ctx.program.render(false);
        assert_eq!(
            lines,
            vec![
                "if (id(onboard_temperature).has_state() && !isnan(id(onboard_temperature).state)) {",
                "  it.printf(0, 0, id(f), COLOR_ON, TextAlign::TOP_LEFT, \"%.1f°C\", id(onboard_temperature).state);",
                "} else {",
                "  it.print(0, 0, id(f), COLOR_ON, TextAlign::TOP_LEFT, \"--°C\");",
                "}",
            ]
        );
    }

    #[test]
    fn percent_suffix_is_escaped() {
        let source = SourceRef::numeric("onboard_humidity");
        let value = LiveValue::numeric(Some(&source), "%.0f".into(), "%");
        let Attr::Lambda(code) = value.text_attr("--") else {
            panic!("expected lambda");
        };
        assert!(code.contains(r#""%.0f%%""#));
        assert!(code.ends_with(r#"return std::string("--%");"#));
    }

    #[test]
    fn ladder_branches_balance() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let source = SourceRef::numeric("wifi_signal_db");
        let ladder = Ladder {
            steps: vec![(-50.0, "a".into()), (-60.0, "b".into())],
            otherwise: "c".into(),
            unavailable: "x".into(),
        };
        let slot = TextSlot {
            x: 0.into(),
            y: 0.into(),
            font: "f".into(),
            color: "COLOR_ON".into(),
            align: TextAlign::Center,
        };
        ladder.print(&mut ctx, &slot, Some(&source));
        assert!(crate::instr::check_balance(ctx.program.instrs()).is_ok());
        let (lines, _) = ctx.program.render(false);
        assert_eq!(lines[1], "  if (id(wifi_signal_db).state >= -50.0f) {");
        assert_eq!(lines[3], "  } else if (id(wifi_signal_db).state >= -60.0f) {");

        let Attr::Lambda(code) = ladder.text_attr(Some(&source)) else {
            panic!("expected lambda");
        };
        assert_eq!(code.lines().count(), 4);
        assert_eq!(code.lines().last(), Some(r#"return std::string("c");"#));
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(contrast(ResolvedColor::On), "white");
        assert_eq!(contrast(ResolvedColor::Off), "black");
        assert_eq!(contrast(ResolvedColor::Rgb(250, 250, 0)), "black");
        assert_eq!(contrast(ResolvedColor::Dithered(DitherPattern::Sparse)), "black");
    }
}
