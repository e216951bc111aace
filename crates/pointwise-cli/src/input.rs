//! Point list files.
//!
//! Either a bare JSON array of point records or `{"points": [...]}`. Object
//! types accept vendor codes (`AI`, `analog-input`, `analogInput`).

use std::path::Path;

use anyhow::Context;
use pointwise_core::{NormalizeError, ObjectType, RawPoint};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PointRecord {
    pub identifier: String,
    #[serde(default)]
    pub description: Option<String>,
    pub object_type: String,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub units: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointFile {
    List(Vec<PointRecord>),
    Wrapped { points: Vec<PointRecord> },
}

/// Points ready for normalization, plus records rejected while reading.
pub struct Loaded {
    pub points: Vec<RawPoint>,
    pub rejected: Vec<(String, NormalizeError)>,
}

impl PointRecord {
    fn into_raw(self) -> Result<RawPoint, NormalizeError> {
        let object_type: ObjectType = self.object_type.parse()?;
        Ok(RawPoint {
            identifier: self.identifier,
            description: self.description,
            object_type,
            writable: self.writable,
            units: self.units.filter(|u| !u.trim().is_empty()),
        })
    }
}

pub fn load_points(path: &Path) -> anyhow::Result<Loaded> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read point list: {}", path.display()))?;
    parse_points(&text).with_context(|| format!("invalid point list: {}", path.display()))
}

pub fn parse_points(json: &str) -> anyhow::Result<Loaded> {
    let records = match serde_json::from_str::<PointFile>(json)? {
        PointFile::List(records) | PointFile::Wrapped { points: records } => records,
    };

    let mut points = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        let identifier = record.identifier.clone();
        match record.into_raw() {
            Ok(raw) => points.push(raw),
            Err(e) => rejected.push((identifier, e)),
        }
    }
    Ok(Loaded { points, rejected })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_with_vendor_codes() {
        let loaded = parse_points(
            r#"[
                {"identifier": "ROOM TEMP_4", "object_type": "AI", "units": "°F"},
                {"identifier": "DAMPER POS_5", "object_type": "analogOutput", "writable": true}
            ]"#,
        )
        .unwrap();
        assert_eq!(loaded.points.len(), 2);
        assert!(loaded.rejected.is_empty());
        assert_eq!(loaded.points[0].object_type, ObjectType::AnalogInput);
        assert_eq!(loaded.points[1].object_type, ObjectType::AnalogOutput);
        assert!(loaded.points[1].writable);
    }

    #[test]
    fn wrapped_form_and_rejections() {
        let loaded = parse_points(
            r#"{"points": [
                {"identifier": "SA_TS", "object_type": "analog_input", "units": " "},
                {"identifier": "WEIRD", "object_type": "XYZ"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(loaded.points.len(), 1);
        assert_eq!(loaded.points[0].units, None);
        assert_eq!(loaded.rejected.len(), 1);
        assert_eq!(loaded.rejected[0].0, "WEIRD");
        assert!(matches!(loaded.rejected[0].1, NormalizeError::UnknownObjectType(_)));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_points("{").is_err());
    }
}
