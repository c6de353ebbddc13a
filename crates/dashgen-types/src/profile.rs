//! Device profiles: the compilation target description.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which of the two output shapes a profile compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTarget {
    /// Flat list of absolute-position drawing calls (display lambda).
    Procedural,
    /// Nested retained-mode widget tree (LVGL).
    Declarative,
}

/// The colour set a panel can physically show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ColorMode {
    /// Ink on / ink off. Intermediate shades must be dithered.
    Monochrome,
    /// `levels` evenly spaced gray levels, including black and white.
    Grayscale { levels: u8 },
    /// A fixed set of named colours (e.g. seven-colour e-paper).
    Palette { name: String, colors: Vec<String> },
    /// Unrestricted RGB.
    Rgb,
}

/// A physical measurement an onboard sensor can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    Temperature,
    Humidity,
    Pressure,
    Co2,
    Illuminance,
    Battery,
}

impl Measurement {
    /// Sub-key used by the sensor platform block.
    pub fn key(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Co2 => "co2",
            Self::Illuminance => "illuminance",
            Self::Battery => "battery_level",
        }
    }

    /// Identifier the generated code uses to read this onboard value.
    pub fn source_id(self) -> String {
        format!("onboard_{}", self.key())
    }
}

/// One physical sensor chip present on the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnboardSensor {
    /// Sensor platform name, e.g. `sht4x`.
    pub platform: String,
    pub measurements: Vec<Measurement>,
    /// Extra platform keys copied verbatim into the declaration.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

fn default_display_id() -> String {
    "main_display".to_string()
}

/// Target hardware and output-format descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub color: ColorMode,
    #[serde(default)]
    pub onboard_sensors: Vec<OnboardSensor>,
    pub target: OutputTarget,
    /// Id of the display component the generated lambda extends.
    #[serde(default = "default_display_id")]
    pub display_id: String,
}

/// Names accepted by [`DeviceProfile::builtin`].
pub const BUILTIN_PROFILES: &[&str] = &[
    "reterminal_e1001",
    "reterminal_e1002",
    "waveshare_7in5_gray4",
    "esp32_s3_lvgl_480",
];

impl DeviceProfile {
    /// The onboard sensor able to provide `measurement`, if any.
    pub fn onboard_sensor_for(&self, measurement: Measurement) -> Option<&OnboardSensor> {
        self.onboard_sensors
            .iter()
            .find(|s| s.measurements.contains(&measurement))
    }

    pub fn is_monochrome(&self) -> bool {
        matches!(self.color, ColorMode::Monochrome)
    }

    /// Look up one of the built-in profiles by name.
    pub fn builtin(name: &str) -> Option<DeviceProfile> {
        let sht4x = || OnboardSensor {
            platform: "sht4x".to_string(),
            measurements: vec![Measurement::Temperature, Measurement::Humidity],
            extra: BTreeMap::new(),
        };
        let profile = match name {
            "reterminal_e1001" => DeviceProfile {
                name: name.to_string(),
                width: 800,
                height: 480,
                color: ColorMode::Monochrome,
                onboard_sensors: vec![sht4x()],
                target: OutputTarget::Procedural,
                display_id: default_display_id(),
            },
            "reterminal_e1002" => DeviceProfile {
                name: name.to_string(),
                width: 800,
                height: 480,
                color: ColorMode::Palette {
                    name: "acep7".to_string(),
                    colors: ["black", "white", "red", "green", "blue", "yellow", "orange"]
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                },
                onboard_sensors: vec![sht4x()],
                target: OutputTarget::Procedural,
                display_id: default_display_id(),
            },
            "waveshare_7in5_gray4" => DeviceProfile {
                name: name.to_string(),
                width: 800,
                height: 480,
                color: ColorMode::Grayscale { levels: 4 },
                onboard_sensors: Vec::new(),
                target: OutputTarget::Procedural,
                display_id: default_display_id(),
            },
            "esp32_s3_lvgl_480" => DeviceProfile {
                name: name.to_string(),
                width: 480,
                height: 480,
                color: ColorMode::Rgb,
                onboard_sensors: Vec::new(),
                target: OutputTarget::Declarative,
                display_id: default_display_id(),
            },
            _ => return None,
        };
        Some(profile)
    }
}
