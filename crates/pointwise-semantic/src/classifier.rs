//! Function classification from object type and writability.
//!
//! This table is the only thing that decides a point's role and its
//! description suffix. Naming never overrides it.

use pointwise_core::{ObjectType, PointFunction};

/// Classify a point's functional role.
///
/// | object type        | read-only  | writable  |
/// |--------------------|------------|-----------|
/// | analog input       | Sensor     | Sensor    |
/// | binary input       | Sensor     | Sensor    |
/// | multistate input   | Status     | Status    |
/// | any output         | Command    | Command   |
/// | analog value       | Parameter  | Setpoint  |
/// | binary value       | Parameter  | Command   |
/// | multistate value   | Parameter  | Command   |
pub fn classify(object_type: ObjectType, writable: bool) -> PointFunction {
    use ObjectType::*;

    match (object_type, writable) {
        (AnalogInput | BinaryInput, _) => PointFunction::Sensor,
        (MultiStateInput, _) => PointFunction::Status,
        (AnalogOutput | BinaryOutput | MultiStateOutput, _) => PointFunction::Command,
        (AnalogValue, true) => PointFunction::Setpoint,
        (BinaryValue | MultiStateValue, true) => PointFunction::Command,
        (AnalogValue | BinaryValue | MultiStateValue, false) => PointFunction::Parameter,
    }
}
