//! Raw and normalized control points, object types, and functional roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentType;
use crate::error::NormalizeError;
use crate::units::Quantity;

/// The four words that describe a point's role. They may end a description
/// but never appear in a display name.
pub const FUNCTION_WORDS: [&str; 4] = ["Sensor", "Command", "Setpoint", "Status"];

/// BACnet-style object type of a control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    MultiStateInput,
    MultiStateOutput,
    MultiStateValue,
}

/// Vendor object-type codes, compared upper-case with `-`, `_` and spaces removed.
const VENDOR_CODES: &[(&[&str], ObjectType)] = &[
    (&["AI", "ANALOGINPUT", "ANALOGIN", "0"], ObjectType::AnalogInput),
    (&["AO", "ANALOGOUTPUT", "ANALOGOUT", "1"], ObjectType::AnalogOutput),
    (&["AV", "ANALOGVALUE", "ANALOGVAL", "2"], ObjectType::AnalogValue),
    (&["BI", "BINARYINPUT", "BINARYIN", "DI", "3"], ObjectType::BinaryInput),
    (&["BO", "BINARYOUTPUT", "BINARYOUT", "DO", "4"], ObjectType::BinaryOutput),
    (&["BV", "BINARYVALUE", "BINARYVAL", "5"], ObjectType::BinaryValue),
    (&["MI", "MSI", "MULTISTATEINPUT", "13"], ObjectType::MultiStateInput),
    (&["MO", "MSO", "MULTISTATEOUTPUT", "14"], ObjectType::MultiStateOutput),
    (&["MV", "MSV", "MULTISTATEVALUE", "19"], ObjectType::MultiStateValue),
];

impl ObjectType {
    pub const ALL: [ObjectType; 9] = [
        Self::AnalogInput,
        Self::AnalogOutput,
        Self::AnalogValue,
        Self::BinaryInput,
        Self::BinaryOutput,
        Self::BinaryValue,
        Self::MultiStateInput,
        Self::MultiStateOutput,
        Self::MultiStateValue,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::AnalogInput => "AI",
            Self::AnalogOutput => "AO",
            Self::AnalogValue => "AV",
            Self::BinaryInput => "BI",
            Self::BinaryOutput => "BO",
            Self::BinaryValue => "BV",
            Self::MultiStateInput => "MSI",
            Self::MultiStateOutput => "MSO",
            Self::MultiStateValue => "MSV",
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::AnalogInput | Self::AnalogOutput | Self::AnalogValue => DataType::Analog,
            Self::BinaryInput | Self::BinaryOutput | Self::BinaryValue => DataType::Binary,
            Self::MultiStateInput | Self::MultiStateOutput | Self::MultiStateValue => {
                DataType::Multistate
            }
        }
    }

    pub fn is_input(&self) -> bool {
        matches!(self, Self::AnalogInput | Self::BinaryInput | Self::MultiStateInput)
    }

    pub fn is_output(&self) -> bool {
        matches!(self, Self::AnalogOutput | Self::BinaryOutput | Self::MultiStateOutput)
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Self::AnalogValue | Self::BinaryValue | Self::MultiStateValue)
    }
}

impl FromStr for ObjectType {
    type Err = NormalizeError;

    /// Parse a vendor object-type code ("AI", "analog-input", "BINARY_OUT", "3").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_ascii_uppercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();

        VENDOR_CODES
            .iter()
            .find(|(codes, _)| codes.contains(&key.as_str()))
            .map(|(_, ot)| *ot)
            .ok_or_else(|| NormalizeError::UnknownObjectType(s.to_string()))
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Analog,
    Binary,
    Multistate,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::Binary => "binary",
            Self::Multistate => "multistate",
        }
    }

    /// Haystack `kind` value.
    pub fn haystack_kind(&self) -> &'static str {
        match self {
            Self::Analog => "Number",
            Self::Binary => "Bool",
            Self::Multistate => "Str",
        }
    }
}

/// Functional role of a point, decided from object type and writability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointFunction {
    Sensor,
    Command,
    Setpoint,
    Status,
    Parameter,
}

impl PointFunction {
    /// Word appended to the expanded description, if any.
    pub fn suffix(&self) -> Option<&'static str> {
        match self {
            Self::Sensor => Some("Sensor"),
            Self::Command => Some("Command"),
            Self::Setpoint => Some("Setpoint"),
            Self::Status => Some("Status"),
            Self::Parameter => None,
        }
    }

    /// Haystack role marker.
    pub fn role_tag(&self) -> Option<&'static str> {
        match self {
            Self::Sensor | Self::Status => Some("sensor"),
            Self::Command => Some("cmd"),
            Self::Setpoint => Some("sp"),
            Self::Parameter => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::Command => "command",
            Self::Setpoint => "setpoint",
            Self::Status => "status",
            Self::Parameter => "parameter",
        }
    }
}

impl fmt::Display for PointFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse grouping used by dashboards and the persistence layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCategory {
    Temperature,
    Humidity,
    Pressure,
    Flow,
    AirQuality,
    Electrical,
    Speed,
    Position,
    State,
    Other,
}

impl PointCategory {
    pub fn from_quantity(q: Quantity) -> Self {
        match q {
            Quantity::Temp => Self::Temperature,
            Quantity::Humidity => Self::Humidity,
            Quantity::Pressure => Self::Pressure,
            Quantity::Flow => Self::Flow,
            Quantity::Co2 => Self::AirQuality,
            Quantity::Power
            | Quantity::Energy
            | Quantity::Current
            | Quantity::Volt
            | Quantity::Freq => Self::Electrical,
            Quantity::Speed => Self::Speed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Pressure => "pressure",
            Self::Flow => "flow",
            Self::AirQuality => "air_quality",
            Self::Electrical => "electrical",
            Self::Speed => "speed",
            Self::Position => "position",
            Self::State => "state",
            Self::Other => "other",
        }
    }
}

/// A control point as exported by a controller. Supplied once per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    pub object_type: ObjectType,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub units: Option<String>,
}

impl RawPoint {
    pub fn new(identifier: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            identifier: identifier.into(),
            description: None,
            object_type,
            writable: false,
            units: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }
}

/// A point after tokenization, expansion and function classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub original_name: String,
    /// Display name. Never carries a function word.
    pub normalized_name: String,
    /// Ends with at most one function suffix.
    pub expanded_description: String,
    pub point_function: PointFunction,
    pub category: PointCategory,
    pub data_type: DataType,
    pub object_type: ObjectType,
    pub writable: bool,
    pub units: Option<String>,
    pub equipment_type: Option<EquipmentType>,
    pub confidence: f32,
    pub applied_rules: Vec<String>,
}

/// Whether `text` contains `word` as a whole word, ignoring ASCII case.
pub fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|w| w.eq_ignore_ascii_case(word))
}

/// Remove every function word from `text`, collapsing the whitespace left behind.
pub fn strip_function_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| {
            let bare = w.trim_matches(|c: char| !c.is_alphanumeric());
            !FUNCTION_WORDS.iter().any(|f| bare.eq_ignore_ascii_case(f))
        })
        .collect::<Vec<_>>()
        .join(" ")
}
