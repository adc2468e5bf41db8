use super::schema::{AxisTriggerTableDef, CompatibilityTableDef, HazardClassTableDef, HeuristicsDef};
use super::RuleBook;
use std::sync::LazyLock;

const HAZARD_CLASSES_JSON: &str = include_str!("../../../../rules/hazard-classes.json");
const COMPATIBILITY_JSON: &str = include_str!("../../../../rules/compatibility.json");
const AXIS_TRIGGERS_JSON: &str = include_str!("../../../../rules/axis-triggers.json");
const HEURISTICS_JSON: &str = include_str!("../../../../rules/heuristics.json");

/// Names of the embedded tables, as accepted by [`table_json`].
pub const TABLES: &[&str] = &["classes", "compatibility", "axes", "heuristics"];

static BUILTIN: LazyLock<RuleBook> = LazyLock::new(|| {
    let classes: HazardClassTableDef =
        serde_json::from_str(HAZARD_CLASSES_JSON).expect("embedded hazard-classes.json is valid");
    let compatibility: CompatibilityTableDef =
        serde_json::from_str(COMPATIBILITY_JSON).expect("embedded compatibility.json is valid");
    let axes: AxisTriggerTableDef =
        serde_json::from_str(AXIS_TRIGGERS_JSON).expect("embedded axis-triggers.json is valid");
    let heuristics: HeuristicsDef =
        serde_json::from_str(HEURISTICS_JSON).expect("embedded heuristics.json is valid");
    RuleBook::from_defs(classes, compatibility, axes, heuristics)
        .expect("embedded rule tables pass validation")
});

/// Get the built-in rule book.
pub fn builtin() -> &'static RuleBook {
    &BUILTIN
}

/// Raw JSON of an embedded table, for export and inspection.
pub fn table_json(name: &str) -> Option<&'static str> {
    match name {
        "classes" => Some(HAZARD_CLASSES_JSON),
        "compatibility" => Some(COMPATIBILITY_JSON),
        "axes" => Some(AXIS_TRIGGERS_JSON),
        "heuristics" => Some(HEURISTICS_JSON),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axis, HazardClass, Severity};
    use crate::rules::Condition;

    #[test]
    fn test_builtin_loads() {
        let rules = builtin();
        assert!(!rules.compatibility().is_empty());
        assert!(!rules.classes().is_empty());
    }

    #[test]
    fn test_every_hazard_class_has_matchers() {
        let rules = builtin();
        for class in HazardClass::ALL {
            assert!(
                rules.classes().iter().any(|c| c.class == class),
                "hazard class {class} missing from embedded table"
            );
        }
    }

    #[test]
    fn test_every_axis_has_triggers() {
        for axis in Axis::ALL {
            assert!(
                !builtin().axis_triggers(axis).is_empty(),
                "axis {axis} has no triggers"
            );
        }
    }

    #[test]
    fn test_acid_base_rule() {
        let rule = builtin()
            .compatibility()
            .lookup(HazardClass::BaseStrong, HazardClass::AcidStrong)
            .unwrap();
        assert_eq!(rule.severity, Severity::Danger);
        assert_eq!(rule.reaction, "Réaction violente, exothermique");
        assert!(rule.gases.contains("vapeur d'eau"));
    }

    #[test]
    fn test_redox_rule_is_critical() {
        let rule = builtin()
            .compatibility()
            .lookup(HazardClass::Reducer, HazardClass::Oxidizer)
            .unwrap();
        assert_eq!(rule.severity, Severity::Critical);
    }

    #[test]
    fn test_interactions_loaded() {
        let interactions = builtin().interactions();
        assert_eq!(interactions.len(), 3);
        let acid_base = interactions.iter().find(|i| i.name == "acid_base").unwrap();
        assert_eq!(
            acid_base.requires,
            vec![Condition::AcidPresent, Condition::BasePresent]
        );
        assert_eq!(acid_base.bonuses.get(&Axis::Exothermic), Some(&40));
        assert_eq!(acid_base.bonuses.get(&Axis::Gas), Some(&30));
    }

    #[test]
    fn test_thermal_defaults() {
        let thermal = builtin().thermal();
        assert_eq!(thermal.keywords, vec!["peroxyde", "nitro", "azide"]);
        assert_eq!(thermal.h_codes, vec!["H240", "H241"]);
    }

    #[test]
    fn test_table_json_names() {
        for name in TABLES {
            assert!(table_json(name).is_some());
        }
        assert!(table_json("xyz").is_none());
    }
}
