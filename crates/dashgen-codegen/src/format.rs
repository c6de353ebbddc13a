//! Numeric display formatting.
//!
//! Conversions are emitted as runtime formulas since the measured value only
//! exists on the device.

/// Temperature display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempUnit {
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    /// Parse the `unit` property; anything but `F` is Celsius.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("f") {
            Self::Fahrenheit
        } else {
            Self::Celsius
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius-valued C++ expression into this unit.
    pub fn convert(self, celsius: &str) -> String {
        match self {
            Self::Celsius => celsius.to_string(),
            Self::Fahrenheit => format!("({celsius} * 9.0f / 5.0f + 32.0f)"),
        }
    }
}

/// `%.1f` etc. Precision is clamped to 0..=4.
pub fn number_format(precision: i64) -> String {
    format!("%.{}f", precision.clamp(0, 4))
}

/// Placeholder shown while a value is unavailable, with its unit.
pub fn placeholder(placeholder: &str, suffix: &str) -> String {
    format!("{placeholder}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_is_a_runtime_formula() {
        let e = TempUnit::parse("f").convert("id(onboard_temperature).state");
        assert_eq!(e, "(id(onboard_temperature).state * 9.0f / 5.0f + 32.0f)");
        assert_eq!(TempUnit::parse("C").convert("x"), "x");
        assert_eq!(TempUnit::parse("kelvin"), TempUnit::Celsius);
    }

    #[test]
    fn formats() {
        assert_eq!(number_format(1), "%.1f");
        assert_eq!(number_format(9), "%.4f");
        assert_eq!(number_format(-1), "%.0f");
        assert_eq!(placeholder("--", "°C"), "--°C");
    }
}
