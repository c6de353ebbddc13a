//! Material Design Icons glyph table.

use std::ops::RangeInclusive;

/// Known icon names and their codepoints.
pub const ICONS: &[(&str, u32)] = &[
    ("battery", 0xF0079),
    ("battery-10", 0xF007A),
    ("battery-20", 0xF007B),
    ("battery-30", 0xF007C),
    ("battery-40", 0xF007D),
    ("battery-50", 0xF007E),
    ("battery-60", 0xF007F),
    ("battery-70", 0xF0080),
    ("battery-80", 0xF0081),
    ("battery-90", 0xF0082),
    ("battery-unknown", 0xF0091),
    ("calendar", 0xF00ED),
    ("clock-outline", 0xF0150),
    ("help-circle", 0xF02D7),
    ("home", 0xF02DC),
    ("thermometer", 0xF050F),
    ("water-percent", 0xF058E),
    ("weather-cloudy", 0xF0590),
    ("weather-fog", 0xF0591),
    ("weather-hail", 0xF0592),
    ("weather-lightning", 0xF0593),
    ("weather-night", 0xF0594),
    ("weather-partly-cloudy", 0xF0595),
    ("weather-pouring", 0xF0596),
    ("weather-rainy", 0xF0597),
    ("weather-snowy", 0xF0598),
    ("weather-sunny", 0xF0599),
    ("weather-windy", 0xF059D),
    ("wifi", 0xF05A9),
    ("wifi-off", 0xF05AA),
    ("wifi-strength-1", 0xF091F),
    ("wifi-strength-2", 0xF0922),
    ("wifi-strength-3", 0xF0925),
    ("wifi-strength-4", 0xF0928),
];

pub const FALLBACK: u32 = 0xF02D7;

/// Supplementary private-use plane A, where the icon font maps its glyphs.
pub const PRIVATE_USE: RangeInclusive<u32> = 0xF0000..=0xFFFFD;

/// Look up `thermometer`, `mdi:thermometer` or a raw hex codepoint
/// (`F050F`, `0xF050F`). Raw codepoints outside [`PRIVATE_USE`] are not
/// icons.
pub fn lookup(name: &str) -> Option<u32> {
    let name = name.trim();
    let bare = name.strip_prefix("mdi:").unwrap_or(name).to_ascii_lowercase();
    if let Some(&(_, cp)) = ICONS.iter().find(|(n, _)| *n == bare) {
        return Some(cp);
    }
    let hex = bare.strip_prefix("0x").unwrap_or(&bare);
    if hex.is_empty() || hex.len() > 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16)
        .ok()
        .filter(|cp| PRIVATE_USE.contains(cp) && char::from_u32(*cp).is_some())
}

pub fn glyph(name: &str) -> u32 {
    lookup(name).unwrap_or(FALLBACK)
}

/// Battery glyphs by level, lowest first (10% .. 90%, then full).
pub const BATTERY_LEVELS: &[&str] = &[
    "battery-10",
    "battery-20",
    "battery-30",
    "battery-40",
    "battery-50",
    "battery-60",
    "battery-70",
    "battery-80",
    "battery-90",
    "battery",
];

/// Wifi glyphs with the dBm threshold at which each applies, strongest first.
pub const WIFI_LEVELS: &[(&str, i32)] = &[
    ("wifi-strength-4", -50),
    ("wifi-strength-3", -60),
    ("wifi-strength-2", -70),
    ("wifi-strength-1", -100),
];

/// Weather states reported by home assistant and their icons.
pub const WEATHER_STATES: &[(&str, &str)] = &[
    ("clear-night", "weather-night"),
    ("cloudy", "weather-cloudy"),
    ("fog", "weather-fog"),
    ("hail", "weather-hail"),
    ("lightning", "weather-lightning"),
    ("lightning-rainy", "weather-lightning"),
    ("partlycloudy", "weather-partly-cloudy"),
    ("pouring", "weather-pouring"),
    ("rainy", "weather-rainy"),
    ("snowy", "weather-snowy"),
    ("snowy-rainy", "weather-snowy"),
    ("sunny", "weather-sunny"),
    ("windy", "weather-windy"),
    ("windy-variant", "weather-windy"),
];
