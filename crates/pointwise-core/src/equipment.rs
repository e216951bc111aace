//! Equipment types and resolution of free-form equipment labels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Equipment families that carry their own acronym dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Ahu,
    Vav,
    Rtu,
    Fcu,
    Chiller,
    Boiler,
    Pump,
    CoolingTower,
    HeatExchanger,
    Meter,
}

/// Exact labels (upper-cased) accepted for each equipment type.
const LABELS: &[(EquipmentType, &[&str])] = &[
    (EquipmentType::Ahu, &["AHU", "AIR HANDLER", "AIR HANDLING UNIT"]),
    (EquipmentType::Vav, &["VAV", "VAV BOX", "VARIABLE AIR VOLUME"]),
    (EquipmentType::Rtu, &["RTU", "ROOFTOP", "ROOFTOP UNIT"]),
    (EquipmentType::Fcu, &["FCU", "FAN COIL", "FAN COIL UNIT"]),
    (EquipmentType::Chiller, &["CHILLER", "CH"]),
    (EquipmentType::Boiler, &["BOILER", "BLR"]),
    (EquipmentType::Pump, &["PUMP", "PMP"]),
    (EquipmentType::CoolingTower, &["COOLING TOWER", "COOLING_TOWER", "CT"]),
    (EquipmentType::HeatExchanger, &["HEAT EXCHANGER", "HEAT_EXCHANGER", "HX"]),
    (EquipmentType::Meter, &["METER", "MTR", "ELEC METER"]),
];

/// Substring heuristics, checked in order after exact labels fail.
///
/// VAV and FCU come before AHU/RTU so labels like "AHU1-VAV-3" resolve to
/// the terminal unit they name.
const SUBSTRINGS: &[(&str, EquipmentType)] = &[
    ("VAV", EquipmentType::Vav),
    ("FCU", EquipmentType::Fcu),
    ("FAN COIL", EquipmentType::Fcu),
    ("RTU", EquipmentType::Rtu),
    ("ROOFTOP", EquipmentType::Rtu),
    ("AHU", EquipmentType::Ahu),
    ("AIR HANDL", EquipmentType::Ahu),
    ("CHILL", EquipmentType::Chiller),
    ("BOIL", EquipmentType::Boiler),
    ("TOWER", EquipmentType::CoolingTower),
    ("EXCHANG", EquipmentType::HeatExchanger),
    ("PUMP", EquipmentType::Pump),
    ("METER", EquipmentType::Meter),
];

impl EquipmentType {
    pub const ALL: [EquipmentType; 10] = [
        Self::Ahu,
        Self::Vav,
        Self::Rtu,
        Self::Fcu,
        Self::Chiller,
        Self::Boiler,
        Self::Pump,
        Self::CoolingTower,
        Self::HeatExchanger,
        Self::Meter,
    ];

    /// Resolve a free-form equipment label ("AHU-1", "Air Handler 2", "vav").
    ///
    /// Exact labels win; otherwise the first matching substring heuristic.
    pub fn from_hint(hint: &str) -> Option<Self> {
        let upper = hint.trim().to_ascii_uppercase().replace(['-', '_'], " ");
        if upper.is_empty() {
            return None;
        }

        for (eq, labels) in LABELS {
            if labels.iter().any(|l| l.replace('_', " ") == upper) {
                return Some(*eq);
            }
        }

        SUBSTRINGS
            .iter()
            .find(|(needle, _)| upper.contains(needle))
            .map(|(_, eq)| *eq)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ahu => "ahu",
            Self::Vav => "vav",
            Self::Rtu => "rtu",
            Self::Fcu => "fcu",
            Self::Chiller => "chiller",
            Self::Boiler => "boiler",
            Self::Pump => "pump",
            Self::CoolingTower => "cooling_tower",
            Self::HeatExchanger => "heat_exchanger",
            Self::Meter => "meter",
        }
    }

    /// Haystack equipment marker tag.
    pub fn haystack_tag(&self) -> &'static str {
        match self {
            Self::Ahu => "ahu",
            Self::Vav => "vav",
            Self::Rtu => "rtu",
            Self::Fcu => "fcu",
            Self::Chiller => "chiller",
            Self::Boiler => "boiler",
            Self::Pump => "pump",
            Self::CoolingTower => "coolingTower",
            Self::HeatExchanger => "heatExchanger",
            Self::Meter => "meter",
        }
    }

    /// Air-side equipment: untagged temperatures and flows default to air.
    pub fn is_air_side(&self) -> bool {
        matches!(self, Self::Ahu | Self::Vav | Self::Rtu | Self::Fcu)
    }

    /// Hydronic equipment: untagged temperatures and flows default to water.
    pub fn is_water_side(&self) -> bool {
        matches!(
            self,
            Self::Chiller | Self::Boiler | Self::Pump | Self::CoolingTower | Self::HeatExchanger
        )
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
