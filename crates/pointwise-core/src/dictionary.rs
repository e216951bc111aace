//! Acronym dictionaries: one generic table plus one table per equipment type.
//!
//! Controllers abbreviate freely and inconsistently, and the same token can
//! mean different things on different equipment (`RH` is relative humidity
//! on an AHU but reheat on a VAV box). Lookups therefore go equipment table
//! first, generic table second. Adding an equipment type means adding one
//! table to [`EQUIPMENT_TABLES`], not touching the normalizer.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentType;

type Table = &'static [(&'static str, &'static str)];

const GENERIC: Table = &[
    // Quantities
    ("TEMP", "Temperature"),
    ("TMP", "Temperature"),
    ("TEMPS", "Temperature"),
    ("TEMPERATURE", "Temperature"),
    ("TS", "Temperature Sensor"),
    ("RH", "Relative Humidity"),
    ("HUM", "Humidity"),
    ("HUMID", "Humidity"),
    ("HUMIDITY", "Humidity"),
    ("PRES", "Pressure"),
    ("PRESS", "Pressure"),
    ("PRESSURE", "Pressure"),
    ("STC", "Static"),
    ("STATIC", "Static"),
    ("DP", "Differential Pressure"),
    ("FLW", "Flow"),
    ("FLOW", "Flow"),
    ("CFM", "Airflow"),
    ("CO2", "CO2"),
    ("SPD", "Speed"),
    ("SPEED", "Speed"),
    ("PWR", "Power"),
    ("POWER", "Power"),
    ("KW", "Power"),
    ("KWH", "Energy"),
    ("ENRG", "Energy"),
    ("AMPS", "Current"),
    ("AMP", "Current"),
    ("VOLT", "Voltage"),
    ("VOLTS", "Voltage"),
    ("FREQ", "Frequency"),
    ("HZ", "Frequency"),
    ("LVL", "Level"),
    ("POS", "Position"),
    ("POSN", "Position"),
    ("EFF", "Efficiency"),
    // Air streams and locations
    ("SA", "Supply Air"),
    ("SUP", "Supply"),
    ("SUPPLY", "Supply"),
    ("RA", "Return Air"),
    ("RET", "Return"),
    ("RETURN", "Return"),
    ("OA", "Outside Air"),
    ("OSA", "Outside Air"),
    ("OUT", "Outside"),
    ("OUTSIDE", "Outside"),
    ("MA", "Mixed Air"),
    ("MIX", "Mixed"),
    ("MIXED", "Mixed"),
    ("DA", "Discharge Air"),
    ("DISCH", "Discharge"),
    ("DIS", "Discharge"),
    ("EA", "Exhaust Air"),
    ("EXH", "Exhaust"),
    ("EXHAUST", "Exhaust"),
    ("AIR", "Air"),
    ("SAT", "Supply Air Temperature"),
    ("RAT", "Return Air Temperature"),
    ("OAT", "Outside Air Temperature"),
    ("MAT", "Mixed Air Temperature"),
    ("DAT", "Discharge Air Temperature"),
    ("ZNT", "Zone Temperature"),
    ("ZN", "Zone"),
    ("ZONE", "Zone"),
    ("RM", "Room"),
    ("ROOM", "Room"),
    ("SPACE", "Space"),
    ("SPC", "Space"),
    ("BLDG", "Building"),
    ("FLR", "Floor"),
    ("DUCT", "Duct"),
    // Water
    ("HW", "Hot Water"),
    ("CHW", "Chilled Water"),
    ("CW", "Condenser Water"),
    ("WTR", "Water"),
    ("WATER", "Water"),
    ("STM", "Steam"),
    // Components
    ("FAN", "Fan"),
    ("DMPR", "Damper"),
    ("DMP", "Damper"),
    ("DPR", "Damper"),
    ("DAMPER", "Damper"),
    ("VLV", "Valve"),
    ("VALVE", "Valve"),
    ("FLTR", "Filter"),
    ("FILT", "Filter"),
    ("FILTER", "Filter"),
    ("COIL", "Coil"),
    ("VFD", "Variable Frequency Drive"),
    ("MTR", "Motor"),
    ("HTR", "Heater"),
    ("ECON", "Economizer"),
    // Modes and states
    ("HTG", "Heating"),
    ("HEAT", "Heating"),
    ("CLG", "Cooling"),
    ("COOL", "Cooling"),
    ("OCC", "Occupied"),
    ("UNOCC", "Unoccupied"),
    ("ALM", "Alarm"),
    ("ALRM", "Alarm"),
    ("ALARM", "Alarm"),
    ("FLT", "Fault"),
    ("ENA", "Enable"),
    ("ENBL", "Enable"),
    ("EN", "Enable"),
    ("RUN", "Run"),
    ("SS", "Start Stop"),
    ("HOA", "Hand Off Auto"),
    ("OVRD", "Override"),
    ("FB", "Feedback"),
    ("MIN", "Minimum"),
    ("MAX", "Maximum"),
    ("AVG", "Average"),
    ("EFFECT", "Effective"),
    ("DAY", "Day"),
    ("NGT", "Night"),
    // Roles. These never reach a display name; the classifier owns suffixes.
    ("CMD", "Command"),
    ("STS", "Status"),
    ("STAT", "Status"),
    ("SP", "Setpoint"),
    ("STPT", "Setpoint"),
    ("SETPT", "Setpoint"),
    ("SNSR", "Sensor"),
    ("SENS", "Sensor"),
];

const AHU: Table = &[
    ("SF", "Supply Fan"),
    ("RF", "Return Fan"),
    ("EF", "Exhaust Fan"),
    ("CC", "Cooling Coil"),
    ("HC", "Heating Coil"),
    ("PH", "Preheat"),
    ("DSP", "Duct Static Pressure"),
    ("SAF", "Supply Air Flow"),
    ("OAD", "Outside Air Damper"),
    ("RAD", "Return Air Damper"),
    ("EAD", "Exhaust Air Damper"),
    ("MAD", "Mixed Air Damper"),
    ("ECON", "Economizer"),
];

const VAV: Table = &[
    ("RH", "Reheat"),
    ("DMPR", "Damper"),
    ("FLOW", "Airflow"),
    ("FLW", "Airflow"),
    ("ZN", "Zone"),
    ("ZNT", "Zone Temperature"),
    ("OCC", "Occupancy"),
    ("HTG", "Heating"),
    ("CLG", "Cooling"),
    ("BOX", "Box"),
    ("PFAN", "Parallel Fan"),
    ("SFAN", "Series Fan"),
];

const RTU: Table = &[
    ("SF", "Supply Fan"),
    ("CF", "Condenser Fan"),
    ("COMP", "Compressor"),
    ("STG", "Stage"),
    ("HTG", "Heating"),
    ("CLG", "Cooling"),
    ("ECON", "Economizer"),
    ("DSP", "Duct Static Pressure"),
    ("OAD", "Outside Air Damper"),
];

const FCU: Table = &[
    ("CV", "Cooling Valve"),
    ("HV", "Heating Valve"),
    ("FS", "Fan Speed"),
    ("FAN", "Fan"),
    ("SPD", "Speed"),
    ("MODE", "Mode"),
];

const CHILLER: Table = &[
    ("CHWS", "Chilled Water Supply"),
    ("CHWR", "Chilled Water Return"),
    ("CWS", "Condenser Water Supply"),
    ("CWR", "Condenser Water Return"),
    ("LCHWT", "Leaving Chilled Water Temperature"),
    ("ECHWT", "Entering Chilled Water Temperature"),
    ("LCWT", "Leaving Condenser Water Temperature"),
    ("ECWT", "Entering Condenser Water Temperature"),
    ("EVAP", "Evaporator"),
    ("COND", "Condenser"),
    ("COMP", "Compressor"),
    ("KW", "Power"),
    ("RLA", "Running Load Amps"),
    ("LOAD", "Load"),
];

const BOILER: Table = &[
    ("HWS", "Hot Water Supply"),
    ("HWR", "Hot Water Return"),
    ("FIRE", "Firing Rate"),
    ("FR", "Firing Rate"),
    ("FLM", "Flame"),
    ("BURN", "Burner"),
    ("STK", "Stack"),
    ("STM", "Steam"),
    ("LWT", "Leaving Water Temperature"),
    ("EWT", "Entering Water Temperature"),
];

const PUMP: Table = &[
    ("VFD", "Variable Frequency Drive"),
    ("SPD", "Speed"),
    ("DP", "Differential Pressure"),
    ("HZ", "Frequency"),
    ("LEAD", "Lead"),
    ("LAG", "Lag"),
    ("DISCH", "Discharge"),
    ("SUCT", "Suction"),
];

const COOLING_TOWER: Table = &[
    ("BAS", "Basin"),
    ("BSN", "Basin"),
    ("CWS", "Condenser Water Supply"),
    ("CWR", "Condenser Water Return"),
    ("FAN", "Fan"),
    ("MKUP", "Makeup"),
    ("BLWDN", "Blowdown"),
];

const HEAT_EXCHANGER: Table = &[
    ("PRI", "Primary"),
    ("SEC", "Secondary"),
    ("ENT", "Entering"),
    ("LVG", "Leaving"),
    ("HX", "Heat Exchanger"),
];

const METER: Table = &[
    ("KW", "Demand"),
    ("KWH", "Energy"),
    ("KVAR", "Reactive Power"),
    ("PF", "Power Factor"),
    ("PH", "Phase"),
];

/// Explicit equipment type → expansion table mapping.
const EQUIPMENT_TABLES: &[(EquipmentType, Table)] = &[
    (EquipmentType::Ahu, AHU),
    (EquipmentType::Vav, VAV),
    (EquipmentType::Rtu, RTU),
    (EquipmentType::Fcu, FCU),
    (EquipmentType::Chiller, CHILLER),
    (EquipmentType::Boiler, BOILER),
    (EquipmentType::Pump, PUMP),
    (EquipmentType::CoolingTower, COOLING_TOWER),
    (EquipmentType::HeatExchanger, HEAT_EXCHANGER),
    (EquipmentType::Meter, METER),
];

/// Site-specific dictionary additions, loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionaryOverrides {
    pub generic: BTreeMap<String, String>,
    pub equipment: BTreeMap<EquipmentType, BTreeMap<String, String>>,
}

/// Token → expansion tables, generic plus per equipment type.
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    generic: HashMap<String, String>,
    by_equipment: HashMap<EquipmentType, HashMap<String, String>>,
}

/// Entry counts, for `dictionary` listings and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DictionarySummary {
    pub generic_entries: usize,
    pub equipment_tables: usize,
    pub equipment_entries: usize,
}

fn load(table: Table) -> HashMap<String, String> {
    table
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for DictionaryStore {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DictionaryStore {
    /// The built-in tables.
    pub fn builtin() -> Self {
        let by_equipment = EQUIPMENT_TABLES
            .iter()
            .map(|(eq, table)| (*eq, load(table)))
            .collect();

        Self {
            generic: load(GENERIC),
            by_equipment,
        }
    }

    /// Add or replace entries. Keys are upper-cased.
    pub fn with_overrides(mut self, overrides: &DictionaryOverrides) -> Self {
        for (k, v) in &overrides.generic {
            self.generic.insert(k.trim().to_ascii_uppercase(), v.clone());
        }
        for (eq, entries) in &overrides.equipment {
            let table = self.by_equipment.entry(*eq).or_default();
            for (k, v) in entries {
                table.insert(k.trim().to_ascii_uppercase(), v.clone());
            }
        }
        self
    }

    /// Look up a token in one equipment type's table.
    pub fn lookup_equipment(&self, equipment: EquipmentType, token: &str) -> Option<&str> {
        self.by_equipment
            .get(&equipment)?
            .get(&token.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Look up a token in the generic table.
    pub fn lookup_generic(&self, token: &str) -> Option<&str> {
        self.generic
            .get(&token.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// Entries of one table, sorted by abbreviation. `None` selects the generic table.
    pub fn entries(&self, equipment: Option<EquipmentType>) -> Vec<(&str, &str)> {
        let table = match equipment {
            Some(eq) => self.by_equipment.get(&eq),
            None => Some(&self.generic),
        };
        let mut out: Vec<(&str, &str)> = table
            .map(|t| t.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    pub fn summary(&self) -> DictionarySummary {
        DictionarySummary {
            generic_entries: self.generic.len(),
            equipment_tables: self.by_equipment.len(),
            equipment_entries: self.by_equipment.values().map(HashMap::len).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_equipment_type_has_a_table() {
        let store = DictionaryStore::builtin();
        for eq in EquipmentType::ALL {
            assert!(
                !store.entries(Some(eq)).is_empty(),
                "{eq} should have an expansion table"
            );
        }
    }

    #[test]
    fn generic_lookup_is_case_insensitive() {
        let store = DictionaryStore::builtin();
        assert_eq!(store.lookup_generic("temp"), Some("Temperature"));
        assert_eq!(store.lookup_generic("TEMP"), Some("Temperature"));
        assert_eq!(store.lookup_generic("LOBBY"), None);
    }

    #[test]
    fn equipment_table_overrides_generic_meaning() {
        let store = DictionaryStore::builtin();
        assert_eq!(store.lookup_generic("RH"), Some("Relative Humidity"));
        assert_eq!(store.lookup_equipment(EquipmentType::Vav, "RH"), Some("Reheat"));
        assert_eq!(store.lookup_equipment(EquipmentType::Ahu, "RH"), None);
    }

    #[test]
    fn overrides_add_and_replace() {
        let mut overrides = DictionaryOverrides::default();
        overrides.generic.insert("lby".into(), "Lobby".into());
        overrides
            .equipment
            .entry(EquipmentType::Vav)
            .or_default()
            .insert("RH".into(), "Reheat Valve".into());

        let store = DictionaryStore::builtin().with_overrides(&overrides);
        assert_eq!(store.lookup_generic("LBY"), Some("Lobby"));
        assert_eq!(store.lookup_equipment(EquipmentType::Vav, "rh"), Some("Reheat Valve"));
    }

    #[test]
    fn generic_keys_are_upper_case() {
        for (k, _) in GENERIC {
            assert_eq!(*k, k.to_ascii_uppercase(), "generic key {k} must be upper-case");
        }
        for (eq, table) in EQUIPMENT_TABLES {
            for (k, _) in *table {
                assert_eq!(*k, k.to_ascii_uppercase(), "{eq} key {k} must be upper-case");
            }
        }
    }

    #[test]
    fn summary_counts() {
        let store = DictionaryStore::builtin();
        let s = store.summary();
        assert_eq!(s.equipment_tables, EquipmentType::ALL.len());
        assert!(s.generic_entries > 50);
        assert!(s.equipment_entries > s.equipment_tables);
    }
}
