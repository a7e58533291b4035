// 📏 Units - Length measurements convertible to a common unit
//
// Host entities carry heights as measurement objects, not plain numbers.
// A Measurement remembers the unit it was written in and converts on demand.

use crate::error::{ExportError, ExportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// UNIT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Nanometer,
    Micrometer,
    Millimeter,
    Centimeter,
    Meter,
    Kilometer,
    Inch,
    Foot,
    Yard,
    Mile,
    AstronomicalUnit,
    LightYear,
}

impl Unit {
    pub const ALL: [Unit; 12] = [
        Unit::Nanometer,
        Unit::Micrometer,
        Unit::Millimeter,
        Unit::Centimeter,
        Unit::Meter,
        Unit::Kilometer,
        Unit::Inch,
        Unit::Foot,
        Unit::Yard,
        Unit::Mile,
        Unit::AstronomicalUnit,
        Unit::LightYear,
    ];

    /// Length of one of this unit, in meters
    pub fn factor(&self) -> f64 {
        match self {
            Unit::Nanometer => 1e-9,
            Unit::Micrometer => 1e-6,
            Unit::Millimeter => 1e-3,
            Unit::Centimeter => 1e-2,
            Unit::Meter => 1.0,
            Unit::Kilometer => 1e3,
            Unit::Inch => 0.0254,
            Unit::Foot => 0.3048,
            Unit::Yard => 0.9144,
            Unit::Mile => 1609.344,
            Unit::AstronomicalUnit => 149_597_870_700.0,
            Unit::LightYear => 9_460_730_472_580_800.0,
        }
    }

    /// Plural name, as the host spells it ("meters", "feet")
    pub fn name(&self) -> &'static str {
        match self {
            Unit::Nanometer => "nanometers",
            Unit::Micrometer => "micrometers",
            Unit::Millimeter => "millimeters",
            Unit::Centimeter => "centimeters",
            Unit::Meter => "meters",
            Unit::Kilometer => "kilometers",
            Unit::Inch => "inches",
            Unit::Foot => "feet",
            Unit::Yard => "yards",
            Unit::Mile => "miles",
            Unit::AstronomicalUnit => "astronomical units",
            Unit::LightYear => "light-years",
        }
    }

    /// Case-sensitive symbols
    fn symbols(&self) -> &'static [&'static str] {
        match self {
            Unit::Nanometer => &["nm"],
            Unit::Micrometer => &["µm", "um"],
            Unit::Millimeter => &["mm"],
            Unit::Centimeter => &["cm"],
            Unit::Meter => &["m"],
            Unit::Kilometer => &["km"],
            Unit::Inch => &["in", "\""],
            Unit::Foot => &["ft", "'"],
            Unit::Yard => &["yd"],
            Unit::Mile => &["mi"],
            Unit::AstronomicalUnit => &["au", "AU"],
            Unit::LightYear => &["ly"],
        }
    }

    /// Case-insensitive names, singular and plural
    fn names(&self) -> &'static [&'static str] {
        match self {
            Unit::Nanometer => &["nanometer", "nanometers", "nanometre", "nanometres"],
            Unit::Micrometer => &["micrometer", "micrometers", "micrometre", "micrometres", "micron", "microns"],
            Unit::Millimeter => &["millimeter", "millimeters", "millimetre", "millimetres"],
            Unit::Centimeter => &["centimeter", "centimeters", "centimetre", "centimetres"],
            Unit::Meter => &["meter", "meters", "metre", "metres"],
            Unit::Kilometer => &["kilometer", "kilometers", "kilometre", "kilometres"],
            Unit::Inch => &["inch", "inches"],
            Unit::Foot => &["foot", "feet"],
            Unit::Yard => &["yard", "yards"],
            Unit::Mile => &["mile", "miles"],
            Unit::AstronomicalUnit => &["astronomical unit", "astronomical units"],
            Unit::LightYear => &["light-year", "light-years", "lightyear", "lightyears", "light year", "light years"],
        }
    }

    /// Look up a unit by symbol (exact) or name (any case)
    pub fn from_name(name: &str) -> Option<Unit> {
        let name = name.trim();

        if let Some(unit) = Self::ALL.iter().find(|u| u.symbols().contains(&name)) {
            return Some(*unit);
        }

        let lower = name.to_lowercase();
        Self::ALL
            .iter()
            .find(|u| u.names().contains(&lower.as_str()))
            .copied()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Unit {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::from_name(s).ok_or_else(|| ExportError::UnknownUnit(s.to_string()))
    }
}

impl TryFrom<String> for Unit {
    type Error = ExportError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.name().to_string()
    }
}

// ============================================================================
// MEASUREMENT
// ============================================================================

/// A length value together with the unit it was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MeasurementRepr")]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

impl Measurement {
    pub fn new(value: f64, unit: Unit) -> Self {
        Measurement { value, unit }
    }

    pub fn meters(value: f64) -> Self {
        Measurement::new(value, Unit::Meter)
    }

    /// Convert to a plain number in the given unit
    pub fn to_unit(&self, unit: Unit) -> ExportResult<f64> {
        let converted = self.value * self.unit.factor() / unit.factor();
        if !converted.is_finite() {
            return Err(ExportError::conversion(self, unit.name()));
        }
        Ok(converted)
    }

    /// Convert to a plain number in the unit named `unit` ("meters", "ft", ...)
    pub fn to_number(&self, unit: &str) -> ExportResult<f64> {
        let unit: Unit = unit.parse()?;
        self.to_unit(unit)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Measurement {
    type Err = ExportError;

    /// Accepts "2", "2 meters", "180cm", "6ft" and feet-and-inches ("5'11\"", "5ft11in")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some(inches) = parse_feet_and_inches(s) {
            return Ok(Measurement::new(inches, Unit::Inch));
        }

        let (number, rest) = split_number(s);
        let value: f64 = number
            .parse()
            .map_err(|_| ExportError::conversion(s, "a length"))?;

        let rest = rest.trim();
        if rest.is_empty() {
            return Ok(Measurement::meters(value));
        }

        Ok(Measurement::new(value, rest.parse()?))
    }
}

/// Wire shapes accepted for a measurement
#[derive(Deserialize)]
#[serde(untagged)]
enum MeasurementRepr {
    Number(f64),
    Text(String),
    Object { value: f64, unit: String },
}

impl TryFrom<MeasurementRepr> for Measurement {
    type Error = ExportError;

    fn try_from(repr: MeasurementRepr) -> Result<Self, Self::Error> {
        match repr {
            MeasurementRepr::Number(value) => Ok(Measurement::meters(value)),
            MeasurementRepr::Text(text) => text.parse(),
            MeasurementRepr::Object { value, unit } => Ok(Measurement::new(value, unit.parse()?)),
        }
    }
}

/// Split a leading decimal number (with optional exponent) from the rest
fn split_number(s: &str) -> (&str, &str) {
    let bytes = s.as_bytes();
    let mut end = 0;

    while end < bytes.len() && (bytes[end].is_ascii_digit() || matches!(bytes[end], b'.' | b'-' | b'+')) {
        end += 1;
    }

    // Exponent only when digits follow
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'-' | b'+') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    s.split_at(end)
}

/// "5'11\"", "5ft11in", "5 feet 11" -> total inches
fn parse_feet_and_inches(s: &str) -> Option<f64> {
    let (feet, rest) = split_number(s);
    let feet: f64 = feet.parse().ok()?;

    let rest = rest.trim_start();
    let rest = ["feet", "foot", "ft", "'"]
        .iter()
        .find_map(|marker| rest.strip_prefix(marker))?;

    let (inches, tail) = split_number(rest.trim_start());
    let inches: f64 = inches.parse().ok()?;

    let tail = tail.trim();
    if !(tail.is_empty() || ["in", "inch", "inches", "\""].contains(&tail)) {
        return None;
    }

    Some(feet * 12.0 + inches)
}

// ============================================================================
// TESTS
// ============================================================================
