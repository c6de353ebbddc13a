//! Minimal YAML text helpers.
//!
//! The generated snippet is assembled by hand so that key order, quoting and
//! indentation are fully under our control and byte-stable.

/// Double-quoted scalar. JSON string escaping is a subset of YAML's
/// double-quoted style; astral-plane glyphs are written as `\U` escapes.
pub fn quote(s: &str) -> String {
    let json = serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s.replace('"', "\\\"")));
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if (c as u32) > 0xFFFF {
            out.push_str(&format!("\\U{:08X}", c as u32));
        } else {
            out.push(c);
        }
    }
    out
}

/// Single-quoted scalar; the only escape is a doubled quote.
pub fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Prefix every non-empty line with `n` spaces.
pub fn indent(lines: &[String], n: usize) -> Vec<String> {
    let pad = " ".repeat(n);
    lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                String::new()
            } else {
                format!("{pad}{l}")
            }
        })
        .collect()
}

/// Lowercase identifier slug: `Living Room.Temp` → `living_room_temp`.
pub fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_underscore = true;
    for c in s.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_underscore = false;
        } else if !last_underscore {
            out.push('_');
            last_underscore = true;
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        out.push('x');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting() {
        assert_eq!(quote("a \"b\""), r#""a \"b\"""#);
        assert_eq!(single_quote("it's"), "'it''s'");
        assert_eq!(quote("\u{F050F} 21°"), r#""\U000F050F 21°""#);
    }

    #[test]
    fn slugs() {
        assert_eq!(slug("sensor.Living Room-Temp"), "sensor_living_room_temp");
        assert_eq!(slug("__Roboto  Mono__"), "roboto_mono");
        assert_eq!(slug("°°"), "x");
    }

    #[test]
    fn indent_skips_blank_lines() {
        let lines = vec!["a:".to_string(), String::new(), "  b: 1".to_string()];
        assert_eq!(indent(&lines, 2), vec!["  a:", "", "    b: 1"]);
    }
}
