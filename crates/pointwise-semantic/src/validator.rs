//! Consistency checks over a finished tag set.
//!
//! Violations are advisory: they come back as warnings and never remove tags.

use pointwise_core::{HaystackTagSet, Quantity};

/// Check a tag set for conflicting or incomplete combinations.
pub fn validate_tags(set: &HaystackTagSet) -> Vec<String> {
    let mut warnings = Vec::new();

    let roles = set.role_tags();
    if roles.len() > 1 {
        warnings.push(format!("conflicting role tags: {}", roles.join(", ")));
    }

    let substances = set.substance_tags();
    if substances.len() > 1 {
        warnings.push(format!("conflicting substance tags: {}", substances.join(", ")));
    }

    if substances.is_empty() {
        for q in Quantity::ALL.iter().filter(|q| q.needs_substance()) {
            if set.contains(q.tag()) {
                warnings.push(format!("quantity tag `{}` has no substance tag", q.tag()));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointwise_core::TagCategory;

    fn set_of(tags: &[(&str, TagCategory)]) -> HaystackTagSet {
        let mut set = HaystackTagSet::new();
        for (name, category) in tags {
            set.insert_marker(name, *category, 0.1).unwrap();
        }
        set
    }

    #[test]
    fn consistent_set_has_no_warnings() {
        let set = set_of(&[
            ("sensor", TagCategory::Role),
            ("temp", TagCategory::Quantity),
            ("air", TagCategory::Quantity),
        ]);
        assert!(validate_tags(&set).is_empty());
    }

    #[test]
    fn two_roles_warn() {
        let set = set_of(&[("sensor", TagCategory::Role), ("sp", TagCategory::Role)]);
        let warnings = validate_tags(&set);
        assert_eq!(warnings, vec!["conflicting role tags: sensor, sp".to_string()]);
    }

    #[test]
    fn two_substances_warn() {
        let set = set_of(&[
            ("temp", TagCategory::Quantity),
            ("air", TagCategory::Quantity),
            ("water", TagCategory::Quantity),
        ]);
        let warnings = validate_tags(&set);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("air, water"));
    }

    #[test]
    fn temp_and_flow_without_substance_warn() {
        let set = set_of(&[("temp", TagCategory::Quantity), ("flow", TagCategory::Quantity)]);
        let warnings = validate_tags(&set);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("`temp`"));
        assert!(warnings[1].contains("`flow`"));
    }

    #[test]
    fn pressure_alone_is_fine() {
        let set = set_of(&[("pressure", TagCategory::Quantity)]);
        assert!(validate_tags(&set).is_empty());
    }
}
