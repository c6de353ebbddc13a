//! Procedural instruction records.
//!
//! Plugins never append raw text to the lambda body. They push [`Instr`]
//! records onto a [`Program`]; the records are serialized to C++ only when
//! the bundle is rendered. Block structure (visibility guards and runtime
//! branches) is explicit, so balance can be checked per widget.

use std::fmt;

use crate::color::DitherPattern;
use crate::trace::{TraceMap, TraceRecord};

/// A C++ expression used as a coordinate or size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr(pub String);

impl From<i32> for Expr {
    fn from(v: i32) -> Self {
        Expr(v.to_string())
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr(v.to_string())
    }
}

impl From<u32> for Expr {
    fn from(v: u32) -> Self {
        Expr(v.to_string())
    }
}

impl From<String> for Expr {
    fn from(v: String) -> Self {
        Expr(v)
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Expr(v.to_string())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text anchor relative to the print position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl TextAlign {
    pub fn as_cpp(self) -> &'static str {
        match self {
            Self::TopLeft => "TextAlign::TOP_LEFT",
            Self::TopCenter => "TextAlign::TOP_CENTER",
            Self::TopRight => "TextAlign::TOP_RIGHT",
            Self::CenterLeft => "TextAlign::CENTER_LEFT",
            Self::Center => "TextAlign::CENTER",
            Self::CenterRight => "TextAlign::CENTER_RIGHT",
            Self::BottomLeft => "TextAlign::BOTTOM_LEFT",
            Self::BottomCenter => "TextAlign::BOTTOM_CENTER",
            Self::BottomRight => "TextAlign::BOTTOM_RIGHT",
        }
    }

    /// Parse the `align` property (`left`, `center`, `right`).
    pub fn horizontal(name: &str) -> Self {
        match name {
            "center" => Self::Center,
            "right" => Self::CenterRight,
            _ => Self::CenterLeft,
        }
    }
}

/// One display API call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Print {
        x: Expr,
        y: Expr,
        font: String,
        color: String,
        align: TextAlign,
        text: String,
    },
    /// `format` is emitted verbatim; callers escape literal `%` themselves.
    Printf {
        x: Expr,
        y: Expr,
        font: String,
        color: String,
        align: TextAlign,
        format: String,
        args: Vec<String>,
    },
    Strftime {
        x: Expr,
        y: Expr,
        font: String,
        color: String,
        align: TextAlign,
        format: String,
        time_id: String,
    },
    Rectangle {
        x: Expr,
        y: Expr,
        w: Expr,
        h: Expr,
        color: String,
    },
    FilledRectangle {
        x: Expr,
        y: Expr,
        w: Expr,
        h: Expr,
        color: String,
    },
    Line {
        x1: Expr,
        y1: Expr,
        x2: Expr,
        y2: Expr,
        color: String,
    },
    Circle {
        x: Expr,
        y: Expr,
        r: Expr,
        color: String,
    },
    FilledCircle {
        x: Expr,
        y: Expr,
        r: Expr,
        color: String,
    },
    Image {
        x: Expr,
        y: Expr,
        image: String,
    },
    /// Approximate a shade on a two-colour panel with an ordered pixel mask.
    DitherFill {
        x: Expr,
        y: Expr,
        w: Expr,
        h: Expr,
        pattern: DitherPattern,
    },
}

/// Escape text for a C++ string literal.
pub fn cpp_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push_str("\\t"),
            c if (c as u32) > 0xFFFF => out.push_str(&format!("\\U{:08X}", c as u32)),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Literal text that will sit inside a printf format.
pub fn printf_literal(s: &str) -> String {
    s.replace('%', "%%")
}

impl DrawCall {
    /// Render to one or more lines (relative indentation only).
    pub fn render(&self) -> Vec<String> {
        match self {
            DrawCall::Print {
                x,
                y,
                font,
                color,
                align,
                text,
            } => vec![format!(
                "it.print({x}, {y}, id({font}), {color}, {}, {});",
                align.as_cpp(),
                cpp_string(text)
            )],
            DrawCall::Printf {
                x,
                y,
                font,
                color,
                align,
                format,
                args,
            } => {
                let mut line = format!(
                    "it.printf({x}, {y}, id({font}), {color}, {}, {}",
                    align.as_cpp(),
                    cpp_string(format)
                );
                for arg in args {
                    line.push_str(", ");
                    line.push_str(arg);
                }
                line.push_str(");");
                vec![line]
            }
            DrawCall::Strftime {
                x,
                y,
                font,
                color,
                align,
                format,
                time_id,
            } => vec![format!(
                "it.strftime({x}, {y}, id({font}), {color}, {}, {}, id({time_id}).now());",
                align.as_cpp(),
                cpp_string(format)
            )],
            DrawCall::Rectangle { x, y, w, h, color } => {
                vec![format!("it.rectangle({x}, {y}, {w}, {h}, {color});")]
            }
            DrawCall::FilledRectangle { x, y, w, h, color } => {
                vec![format!("it.filled_rectangle({x}, {y}, {w}, {h}, {color});")]
            }
            DrawCall::Line {
                x1,
                y1,
                x2,
                y2,
                color,
            } => vec![format!("it.line({x1}, {y1}, {x2}, {y2}, {color});")],
            DrawCall::Circle { x, y, r, color } => {
                vec![format!("it.circle({x}, {y}, {r}, {color});")]
            }
            DrawCall::FilledCircle { x, y, r, color } => {
                vec![format!("it.filled_circle({x}, {y}, {r}, {color});")]
            }
            DrawCall::Image { x, y, image } => vec![format!("it.image({x}, {y}, id({image}));")],
            DrawCall::DitherFill {
                x,
                y,
                w,
                h,
                pattern,
            } => vec![
                format!("for (int dy = 0; dy < {h}; dy++) {{"),
                format!("  for (int dx = 0; dx < {w}; dx++) {{"),
                format!(
                    "    if ({}) it.draw_pixel_at({x} + dx, {y} + dy, COLOR_ON);",
                    pattern.pixel_test("dx", "dy")
                ),
                "  }".to_string(),
                "}".to_string(),
            ],
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Instructions
// ══════════════════════════════════════════════════════════════════════════════

/// A single procedural instruction record.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// Leading marker of a widget's instructions.
    Trace(TraceRecord),
    /// Opens a visibility guard around one widget.
    VisibleIf(String),
    EndVisible,
    /// Runtime branch inside a widget (value available, threshold, ...).
    If(String),
    ElseIf(String),
    Else,
    EndIf,
    /// Local statement (variable declaration etc.).
    Stmt(String),
    Draw(DrawCall),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    Visible,
    Branch { saw_else: bool },
}

/// Verify that guards and branches open and close in matching pairs.
pub fn check_balance(instrs: &[Instr]) -> Result<(), String> {
    let mut stack: Vec<Block> = Vec::new();
    for (i, instr) in instrs.iter().enumerate() {
        match instr {
            Instr::VisibleIf(_) => stack.push(Block::Visible),
            Instr::If(_) => stack.push(Block::Branch { saw_else: false }),
            Instr::ElseIf(_) => match stack.last() {
                Some(Block::Branch { saw_else: false }) => {}
                _ => return Err(format!("instruction {i}: else-if outside an open branch")),
            },
            Instr::Else => match stack.last_mut() {
                Some(Block::Branch { saw_else }) if !*saw_else => *saw_else = true,
                _ => return Err(format!("instruction {i}: else outside an open branch")),
            },
            Instr::EndIf => match stack.pop() {
                Some(Block::Branch { .. }) => {}
                _ => return Err(format!("instruction {i}: end-if without matching if")),
            },
            Instr::EndVisible => match stack.pop() {
                Some(Block::Visible) => {}
                _ => return Err(format!("instruction {i}: guard closed without opening")),
            },
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err(format!("{} block(s) left open", stack.len()))
    }
}

/// An ordered list of instruction records for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instrs: Vec<Instr>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    pub fn draw(&mut self, call: DrawCall) {
        self.instrs.push(Instr::Draw(call));
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Records from `start` onwards.
    pub fn since(&self, start: usize) -> &[Instr] {
        &self.instrs[start.min(self.instrs.len())..]
    }

    /// Drop records from `start` onwards.
    pub fn truncate(&mut self, start: usize) {
        self.instrs.truncate(start);
    }

    /// Serialize to C++ lines, 2-space indented by block depth, and build the
    /// widget → line range map (1-based, relative to the first line).
    pub fn render(&self, trace_comments: bool) -> (Vec<String>, TraceMap) {
        let mut lines: Vec<String> = Vec::new();
        let mut map = TraceMap::new();
        let mut depth = 0usize;
        let mut open: Option<(String, String, usize)> = None;

        let pad = |depth: usize| "  ".repeat(depth);

        for instr in &self.instrs {
            match instr {
                Instr::Trace(record) => {
                    if let Some((id, kind, first)) = open.take() {
                        if lines.len() >= first {
                            map.push(id, kind, first, lines.len());
                        }
                    }
                    open = Some((
                        record.widget_id.clone(),
                        record.kind.clone(),
                        lines.len() + 1,
                    ));
                    if trace_comments {
                        lines.push(format!("{}// {}", pad(depth), record.marker()));
                    }
                }
                Instr::VisibleIf(expr) | Instr::If(expr) => {
                    lines.push(format!("{}if ({expr}) {{", pad(depth)));
                    depth += 1;
                }
                Instr::ElseIf(expr) => {
                    let d = depth.saturating_sub(1);
                    lines.push(format!("{}}} else if ({expr}) {{", pad(d)));
                }
                Instr::Else => {
                    let d = depth.saturating_sub(1);
                    lines.push(format!("{}}} else {{", pad(d)));
                }
                Instr::EndIf | Instr::EndVisible => {
                    depth = depth.saturating_sub(1);
                    lines.push(format!("{}}}", pad(depth)));
                }
                Instr::Stmt(text) => lines.push(format!("{}{text}", pad(depth))),
                Instr::Draw(call) => {
                    for line in call.render() {
                        lines.push(format!("{}{line}", pad(depth)));
                    }
                }
            }
        }
        if let Some((id, kind, first)) = open {
            if lines.len() >= first {
                map.push(id, kind, first, lines.len());
            }
        }
        (lines, map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashgen_types::{Geometry, Props, Widget};

    fn trace(id: &str) -> Instr {
        let w = Widget::new(id, "label", Geometry::new(0, 0, 10, 10));
        Instr::Trace(TraceRecord::new(&w, Props::new()))
    }

    fn print(text: &str) -> Instr {
        Instr::Draw(DrawCall::Print {
            x: 1.into(),
            y: 2.into(),
            font: "font_roboto_400_20".into(),
            color: "COLOR_ON".into(),
            align: TextAlign::TopLeft,
            text: text.into(),
        })
    }

    #[test]
    fn print_escapes_text() {
        let Instr::Draw(call) = print("say \"hi\" 100%") else {
            unreachable!()
        };
        assert_eq!(
            call.render(),
            vec![r#"it.print(1, 2, id(font_roboto_400_20), COLOR_ON, TextAlign::TOP_LEFT, "say \"hi\" 100%");"#]
        );
    }

    #[test]
    fn printf_with_args() {
        let call = DrawCall::Printf {
            x: 5.into(),
            y: Expr::from("10"),
            font: "f".into(),
            color: "COLOR_ON".into(),
            align: TextAlign::Center,
            format: "%.1f°C".into(),
            args: vec!["id(onboard_temperature).state".into()],
        };
        assert_eq!(
            call.render(),
            vec![r#"it.printf(5, 10, id(f), COLOR_ON, TextAlign::CENTER, "%.1f°C", id(onboard_temperature).state);"#]
        );
        assert_eq!(printf_literal("50%"), "50%%");
    }

    #[test]
    fn balance_detects_unclosed_guard() {
        let ok = vec![
            Instr::VisibleIf("a".into()),
            Instr::If("b".into()),
            Instr::ElseIf("c".into()),
            Instr::Else,
            Instr::EndIf,
            Instr::EndVisible,
        ];
        assert!(check_balance(&ok).is_ok());

        assert!(check_balance(&[Instr::VisibleIf("a".into())]).is_err());
        assert!(check_balance(&[Instr::EndIf]).is_err());
        assert!(check_balance(&[Instr::If("a".into()), Instr::EndVisible]).is_err());
        assert!(check_balance(&[Instr::If("a".into()), Instr::Else, Instr::Else, Instr::EndIf]).is_err());
    }

    #[test]
    fn render_indents_blocks_and_maps_lines() {
        let mut p = Program::new();
        p.push(trace("a"));
        p.push(print("x"));
        p.push(trace("b"));
        p.push(Instr::VisibleIf("cond".into()));
        p.push(Instr::If("v".into()));
        p.push(print("y"));
        p.push(Instr::Else);
        p.push(print("z"));
        p.push(Instr::EndIf);
        p.push(Instr::EndVisible);

        let (lines, map) = p.render(true);
        assert!(lines[0].starts_with(r#"// widget:"label" id:"a""#));
        assert_eq!(lines[3], "if (cond) {");
        assert_eq!(lines[4], "  if (v) {");
        assert!(lines[5].starts_with("    it.print("));
        assert_eq!(lines[6], "  } else {");
        assert_eq!(lines[8], "  }");
        assert_eq!(lines[9], "}");

        assert_eq!(map.find_by_widget("a").unwrap().first_line, 1);
        assert_eq!(map.find_by_widget("a").unwrap().last_line, 2);
        assert_eq!(map.find_by_widget("b").unwrap().first_line, 3);
        assert_eq!(map.find_by_widget("b").unwrap().last_line, 10);
    }

    #[test]
    fn render_without_trace_comments() {
        let mut p = Program::new();
        p.push(trace("a"));
        p.push(print("x"));
        let (lines, map) = p.render(false);
        assert_eq!(lines.len(), 1);
        assert_eq!(map.find_by_line(1).unwrap().widget_id, "a");
    }

    #[test]
    fn dither_fill_expands_to_loop() {
        let call = DrawCall::DitherFill {
            x: 10.into(),
            y: 20.into(),
            w: 30.into(),
            h: 40.into(),
            pattern: DitherPattern::Checker,
        };
        let lines = call.render();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "for (int dy = 0; dy < 40; dy++) {");
        assert_eq!(
            lines[2],
            "    if ((dx + dy) % 2 == 0) it.draw_pixel_at(10 + dx, 20 + dy, COLOR_ON);"
        );
    }
}
