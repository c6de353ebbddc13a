//! Semantic colour names mapped onto what a panel can show.

use dashgen_types::ColorMode;

/// Ordered pixel masks used to fake a shade on a two-colour panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DitherPattern {
    /// One pixel in four inked.
    Sparse,
    /// Every other pixel inked.
    Checker,
    /// Three pixels in four inked.
    Dense,
}

impl DitherPattern {
    /// C++ test deciding whether the pixel at (`dx`, `dy`) is inked.
    pub fn pixel_test(self, dx: &str, dy: &str) -> String {
        match self {
            Self::Sparse => format!("{dx} % 2 == 0 && {dy} % 2 == 0"),
            Self::Checker => format!("({dx} + {dy}) % 2 == 0"),
            Self::Dense => format!("{dx} % 2 == 0 || {dy} % 2 == 0"),
        }
    }

    fn for_luminance(lum: f64) -> Self {
        if lum < 0.35 {
            Self::Dense
        } else if lum < 0.65 {
            Self::Checker
        } else {
            Self::Sparse
        }
    }

    fn approx_gray(self) -> u8 {
        match self {
            Self::Sparse => 0xC0,
            Self::Checker => 0x80,
            Self::Dense => 0x40,
        }
    }
}

/// A colour after mapping onto the active profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedColor {
    /// Full ink (black on e-paper).
    On,
    /// No ink (paper white).
    Off,
    /// Not representable directly; fill regions with a mask.
    Dithered(DitherPattern),
    Rgb(u8, u8, u8),
}

impl ResolvedColor {
    /// C++ constant for text and strokes. Dithered shades draw as full ink.
    pub fn cpp(self) -> String {
        match self {
            Self::On | Self::Dithered(_) => "COLOR_ON".to_string(),
            Self::Off => "COLOR_OFF".to_string(),
            Self::Rgb(r, g, b) => format!("Color({r}, {g}, {b})"),
        }
    }

    /// Packed `0xRRGGBB` for declarative style attributes.
    pub fn hex(self) -> u32 {
        let (r, g, b) = match self {
            Self::On => (0, 0, 0),
            Self::Off => (255, 255, 255),
            Self::Dithered(p) => {
                let v = p.approx_gray();
                (v, v, v)
            }
            Self::Rgb(r, g, b) => (r, g, b),
        };
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    pub fn dither(self) -> Option<DitherPattern> {
        match self {
            Self::Dithered(p) => Some(p),
            _ => None,
        }
    }
}

const NAMED: &[(&str, (u8, u8, u8))] = &[
    ("black", (0, 0, 0)),
    ("white", (255, 255, 255)),
    ("gray", (128, 128, 128)),
    ("grey", (128, 128, 128)),
    ("light_gray", (192, 192, 192)),
    ("dark_gray", (64, 64, 64)),
    ("red", (255, 0, 0)),
    ("green", (0, 255, 0)),
    ("blue", (0, 0, 255)),
    ("yellow", (255, 255, 0)),
    ("orange", (255, 128, 0)),
    ("purple", (128, 0, 128)),
    ("cyan", (0, 255, 255)),
    ("magenta", (255, 0, 255)),
    ("brown", (139, 69, 19)),
    ("pink", (255, 192, 203)),
];

/// RGB for a colour name or `#rrggbb` literal.
pub fn rgb_of(name: &str) -> Option<(u8, u8, u8)> {
    let name = name.trim();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() == 6 {
            let v = u32::from_str_radix(hex, 16).ok()?;
            return Some(((v >> 16) as u8, (v >> 8) as u8, v as u8));
        }
        return None;
    }
    let lower = name.to_ascii_lowercase().replace([' ', '-'], "_");
    NAMED
        .iter()
        .find(|(n, _)| *n == lower)
        .map(|(_, rgb)| *rgb)
}

fn luminance((r, g, b): (u8, u8, u8)) -> f64 {
    (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> i32 {
    let dr = a.0 as i32 - b.0 as i32;
    let dg = a.1 as i32 - b.1 as i32;
    let db = a.2 as i32 - b.2 as i32;
    dr * dr + dg * dg + db * db
}

/// Map a colour name onto the profile's colour set. Unknown names are black.
pub fn resolve(mode: &ColorMode, name: &str) -> ResolvedColor {
    let rgb = rgb_of(name).unwrap_or((0, 0, 0));
    match mode {
        ColorMode::Monochrome => match rgb {
            (0, 0, 0) => ResolvedColor::On,
            (255, 255, 255) => ResolvedColor::Off,
            other => ResolvedColor::Dithered(DitherPattern::for_luminance(luminance(other))),
        },
        ColorMode::Grayscale { levels } => {
            let steps = (*levels).max(2) as f64 - 1.0;
            let level = (luminance(rgb) * steps).round();
            let v = (level * 255.0 / steps).round() as u8;
            ResolvedColor::Rgb(v, v, v)
        }
        ColorMode::Palette { colors, .. } => {
            let nearest = colors
                .iter()
                .filter_map(|c| rgb_of(c))
                .min_by_key(|c| distance(*c, rgb))
                .unwrap_or(rgb);
            ResolvedColor::Rgb(nearest.0, nearest.1, nearest.2)
        }
        ColorMode::Rgb => ResolvedColor::Rgb(rgb.0, rgb.1, rgb.2),
    }
}
