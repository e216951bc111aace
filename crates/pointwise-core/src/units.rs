//! Physical quantities, substances, and the engineering-unit lookup table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Measured physical quantity, named by its Haystack tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Temp,
    Humidity,
    Pressure,
    Flow,
    Co2,
    Power,
    Energy,
    Speed,
    Current,
    Volt,
    Freq,
}

impl Quantity {
    pub const ALL: [Quantity; 11] = [
        Self::Temp,
        Self::Humidity,
        Self::Pressure,
        Self::Flow,
        Self::Co2,
        Self::Power,
        Self::Energy,
        Self::Speed,
        Self::Current,
        Self::Volt,
        Self::Freq,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Temp => "temp",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Flow => "flow",
            Self::Co2 => "co2",
            Self::Power => "power",
            Self::Energy => "energy",
            Self::Speed => "speed",
            Self::Current => "current",
            Self::Volt => "volt",
            Self::Freq => "freq",
        }
    }

    /// Quantities the consistency validator expects to carry a substance tag.
    pub fn needs_substance(&self) -> bool {
        matches!(self, Self::Temp | Self::Flow)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Medium a quantity is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Substance {
    Air,
    Water,
    Steam,
    Elec,
}

impl Substance {
    pub const TAGS: [&'static str; 4] = ["air", "water", "steam", "elec"];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Water => "water",
            Self::Steam => "steam",
            Self::Elec => "elec",
        }
    }
}

/// What a unit string implies about the point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitInfo {
    /// Canonical spelling, used for unit agreement checks.
    pub canonical: &'static str,
    pub quantity: Quantity,
    pub substance: Option<Substance>,
}

// ── Unit table ──
//
// Keys are compared after lower-casing and stripping spaces. A bare "%" is
// deliberately absent: it is position as often as humidity.

const UNITS: &[(&[&str], UnitInfo)] = &[
    (
        &["°f", "degf", "deg f", "f", "fahrenheit", "°fahrenheit"],
        UnitInfo { canonical: "°F", quantity: Quantity::Temp, substance: None },
    ),
    (
        &["°c", "degc", "deg c", "c", "celsius", "°celsius"],
        UnitInfo { canonical: "°C", quantity: Quantity::Temp, substance: None },
    ),
    (
        &["k", "kelvin"],
        UnitInfo { canonical: "K", quantity: Quantity::Temp, substance: None },
    ),
    (
        &["%rh", "rh", "%relativehumidity"],
        UnitInfo { canonical: "%RH", quantity: Quantity::Humidity, substance: Some(Substance::Air) },
    ),
    (
        &["inh2o", "in/wc", "inwc", "\"wc", "iwc", "inwg"],
        UnitInfo { canonical: "inH₂O", quantity: Quantity::Pressure, substance: Some(Substance::Air) },
    ),
    (
        &["pa", "pascal"],
        UnitInfo { canonical: "Pa", quantity: Quantity::Pressure, substance: None },
    ),
    (
        &["kpa"],
        UnitInfo { canonical: "kPa", quantity: Quantity::Pressure, substance: None },
    ),
    (
        &["psi", "psig", "psid"],
        UnitInfo { canonical: "psi", quantity: Quantity::Pressure, substance: None },
    ),
    (
        &["bar"],
        UnitInfo { canonical: "bar", quantity: Quantity::Pressure, substance: None },
    ),
    (
        &["cfm", "ft³/min", "ft3/min"],
        UnitInfo { canonical: "cfm", quantity: Quantity::Flow, substance: Some(Substance::Air) },
    ),
    (
        &["l/s", "lps"],
        UnitInfo { canonical: "L/s", quantity: Quantity::Flow, substance: None },
    ),
    (
        &["m³/h", "m3/h", "cmh"],
        UnitInfo { canonical: "m³/h", quantity: Quantity::Flow, substance: Some(Substance::Air) },
    ),
    (
        &["gpm", "gal/min"],
        UnitInfo { canonical: "gpm", quantity: Quantity::Flow, substance: Some(Substance::Water) },
    ),
    (
        &["lb/h", "lb/hr", "pph"],
        UnitInfo { canonical: "lb/h", quantity: Quantity::Flow, substance: Some(Substance::Steam) },
    ),
    (
        &["ppm"],
        UnitInfo { canonical: "ppm", quantity: Quantity::Co2, substance: Some(Substance::Air) },
    ),
    (
        &["kw", "w", "watt", "watts", "kilowatt", "kilowatts"],
        UnitInfo { canonical: "kW", quantity: Quantity::Power, substance: Some(Substance::Elec) },
    ),
    (
        &["kwh", "wh", "kilowatt-hours", "mwh"],
        UnitInfo { canonical: "kWh", quantity: Quantity::Energy, substance: Some(Substance::Elec) },
    ),
    (
        &["btu", "kbtu", "mmbtu", "btu/h", "btuh", "tons", "ton"],
        UnitInfo { canonical: "BTU", quantity: Quantity::Energy, substance: None },
    ),
    (
        &["rpm"],
        UnitInfo { canonical: "rpm", quantity: Quantity::Speed, substance: None },
    ),
    (
        &["a", "amp", "amps", "ampere", "amperes"],
        UnitInfo { canonical: "A", quantity: Quantity::Current, substance: Some(Substance::Elec) },
    ),
    (
        &["v", "volt", "volts", "vac", "vdc"],
        UnitInfo { canonical: "V", quantity: Quantity::Volt, substance: Some(Substance::Elec) },
    ),
    (
        &["hz", "hertz"],
        UnitInfo { canonical: "Hz", quantity: Quantity::Freq, substance: None },
    ),
];

fn unit_key(units: &str) -> String {
    units
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Look up what a unit string implies. Unknown or ambiguous units yield `None`.
pub fn lookup_unit(units: &str) -> Option<UnitInfo> {
    let key = unit_key(units);
    if key.is_empty() {
        return None;
    }
    UNITS
        .iter()
        .find(|(aliases, _)| aliases.iter().any(|a| unit_key(a) == key))
        .map(|(_, info)| *info)
}

/// Whether two unit strings denote the same unit ("°F" and "degF" do).
pub fn units_agree(a: &str, b: &str) -> bool {
    match (lookup_unit(a), lookup_unit(b)) {
        (Some(x), Some(y)) => x.canonical == y.canonical,
        _ => unit_key(a) == unit_key(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_spellings() {
        for u in ["°F", "degF", "deg F", "F"] {
            let info = lookup_unit(u).unwrap_or_else(|| panic!("{u} should resolve"));
            assert_eq!(info.quantity, Quantity::Temp);
            assert_eq!(info.canonical, "°F");
        }
        assert_eq!(lookup_unit("°C").unwrap().canonical, "°C");
    }

    #[test]
    fn flow_units_imply_substance() {
        assert_eq!(lookup_unit("CFM").unwrap().substance, Some(Substance::Air));
        assert_eq!(lookup_unit("gpm").unwrap().substance, Some(Substance::Water));
        assert_eq!(lookup_unit("L/s").unwrap().substance, None);
    }

    #[test]
    fn percent_is_ambiguous() {
        assert!(lookup_unit("%").is_none());
        assert_eq!(lookup_unit("%RH").unwrap().quantity, Quantity::Humidity);
    }

    #[test]
    fn empty_and_unknown() {
        assert!(lookup_unit("").is_none());
        assert!(lookup_unit("furlongs").is_none());
    }

    #[test]
    fn agreement() {
        assert!(units_agree("°F", "degF"));
        assert!(!units_agree("°F", "°C"));
        assert!(units_agree("widgets", " WIDGETS "));
        assert!(!units_agree("widgets", "gadgets"));
    }

    #[test]
    fn temp_and_flow_need_substance() {
        assert!(Quantity::Temp.needs_substance());
        assert!(Quantity::Flow.needs_substance());
        assert!(!Quantity::Pressure.needs_substance());
    }
}
