//! Arrow schema for normalized, tagged point records.
//!
//! The persistence layer stores these as structured columns plus an
//! embedded JSON tag payload.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float32Builder, ListBuilder, StringBuilder, UInt32Builder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;

use crate::point::NormalizedPoint;
use crate::tags::HaystackTagSet;

/// Schema for point records.
pub fn point_record_schema() -> Schema {
    Schema::new(vec![
        Field::new("original_name", DataType::Utf8, false),
        Field::new("normalized_name", DataType::Utf8, false),
        Field::new("expanded_description", DataType::Utf8, false),
        Field::new("point_function", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("data_type", DataType::Utf8, false),
        Field::new("object_type", DataType::Utf8, false),
        Field::new("writable", DataType::Boolean, false),
        Field::new("units", DataType::Utf8, true),
        Field::new("equipment_type", DataType::Utf8, true),
        Field::new("confidence", DataType::Float32, false),
        Field::new(
            "tags",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            false,
        ),
        Field::new("tag_confidence", DataType::Float32, false),
        Field::new("warning_count", DataType::UInt32, false),
        Field::new("metadata", DataType::Utf8, false),
    ])
}

/// Build one RecordBatch from normalized points and their tag sets.
pub fn point_records_batch(
    records: &[(&NormalizedPoint, &HaystackTagSet)],
) -> Result<RecordBatch, ArrowError> {
    let mut original = StringBuilder::new();
    let mut name = StringBuilder::new();
    let mut description = StringBuilder::new();
    let mut function = StringBuilder::new();
    let mut category = StringBuilder::new();
    let mut data_type = StringBuilder::new();
    let mut object_type = StringBuilder::new();
    let mut writable = BooleanBuilder::new();
    let mut units = StringBuilder::new();
    let mut equipment = StringBuilder::new();
    let mut confidence = Float32Builder::new();
    let mut tags = ListBuilder::new(StringBuilder::new());
    let mut tag_confidence = Float32Builder::new();
    let mut warning_count = UInt32Builder::new();
    let mut metadata = StringBuilder::new();

    for (point, tag_set) in records {
        original.append_value(&point.original_name);
        name.append_value(&point.normalized_name);
        description.append_value(&point.expanded_description);
        function.append_value(point.point_function.as_str());
        category.append_value(point.category.as_str());
        data_type.append_value(point.data_type.as_str());
        object_type.append_value(point.object_type.code());
        writable.append_value(point.writable);
        units.append_option(point.units.as_deref());
        equipment.append_option(point.equipment_type.map(|e| e.as_str()));
        confidence.append_value(point.confidence);

        for tag in tag_set.names() {
            tags.values().append_value(tag);
        }
        tags.append(true);

        tag_confidence.append_value(tag_set.confidence);
        warning_count.append_value(tag_set.warnings.len() as u32);

        let payload = serde_json::json!({
            "tags": tag_set.to_haystack_json(),
            "warnings": tag_set.warnings,
            "applied_rules": point.applied_rules,
        });
        metadata.append_value(payload.to_string());
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(original.finish()),
        Arc::new(name.finish()),
        Arc::new(description.finish()),
        Arc::new(function.finish()),
        Arc::new(category.finish()),
        Arc::new(data_type.finish()),
        Arc::new(object_type.finish()),
        Arc::new(writable.finish()),
        Arc::new(units.finish()),
        Arc::new(equipment.finish()),
        Arc::new(confidence.finish()),
        Arc::new(tags.finish()),
        Arc::new(tag_confidence.finish()),
        Arc::new(warning_count.finish()),
        Arc::new(metadata.finish()),
    ];

    RecordBatch::try_new(Arc::new(point_record_schema()), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{DataType as PointDataType, ObjectType, PointCategory, PointFunction};
    use crate::tags::TagCategory;
    use arrow::array::{Array, ListArray, StringArray};

    fn sample_point() -> NormalizedPoint {
        NormalizedPoint {
            original_name: "ROOM TEMP_4".into(),
            normalized_name: "Room Temperature 4".into(),
            expanded_description: "Room Temperature 4 Sensor".into(),
            point_function: PointFunction::Sensor,
            category: PointCategory::Temperature,
            data_type: PointDataType::Analog,
            object_type: ObjectType::AnalogInput,
            writable: false,
            units: Some("°F".into()),
            equipment_type: None,
            confidence: 0.7,
            applied_rules: vec!["tokenize".into()],
        }
    }

    #[test]
    fn point_record_schema_has_expected_fields() {
        let schema = point_record_schema();
        assert_eq!(schema.fields().len(), 15);
        assert!(schema.field_with_name("normalized_name").is_ok());
        assert!(schema.field_with_name("metadata").is_ok());
    }

    #[test]
    fn batch_carries_tags_and_nulls() {
        let point = sample_point();
        let mut tags = HaystackTagSet::new();
        tags.insert_marker("sensor", TagCategory::Role, 0.3).unwrap();
        tags.insert_marker("temp", TagCategory::Quantity, 0.25).unwrap();

        let batch = point_records_batch(&[(&point, &tags)]).unwrap();
        assert_eq!(batch.num_rows(), 1);

        let equipment = batch.column_by_name("equipment_type").unwrap();
        assert!(equipment.is_null(0));

        let names = batch
            .column_by_name("normalized_name")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(names.value(0), "Room Temperature 4");

        let tag_col = batch
            .column_by_name("tags")
            .unwrap()
            .as_any()
            .downcast_ref::<ListArray>()
            .unwrap();
        let row = tag_col.value(0);
        let row = row.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.value(0), "sensor");
    }

    #[test]
    fn empty_input_gives_empty_batch() {
        let batch = point_records_batch(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
        assert_eq!(batch.num_columns(), 15);
    }
}
