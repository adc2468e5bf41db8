use crate::model::{HazardClass, SubstanceRecord};
use crate::rules::builtin::builtin;
use crate::rules::matcher::MatchReason;
use crate::rules::RuleBook;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Class pairs that cannot both be true of one substance.
///
/// A name like "acide / hydroxyde" can still produce both tags; these pairs
/// are reported as conflicts, never resolved.
const EXCLUSIVE_PAIRS: &[(HazardClass, HazardClass)] = &[
    (HazardClass::AcidStrong, HazardClass::BaseStrong),
    (HazardClass::Oxidizer, HazardClass::Reducer),
];

/// One hazard class assigned to a substance, with the first matcher that fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassMatch {
    pub class: HazardClass,
    pub reason: MatchReason,
}

/// Classify a substance against the built-in tables.
pub fn classify(substance: &SubstanceRecord) -> BTreeSet<HazardClass> {
    classify_with(builtin(), substance)
}

/// Classify a substance against a rule book.
///
/// Every class is tested independently; an empty set means "unclassified".
pub fn classify_with(rules: &RuleBook, substance: &SubstanceRecord) -> BTreeSet<HazardClass> {
    classify_explained(rules, substance)
        .into_iter()
        .map(|m| m.class)
        .collect()
}

/// Classify a substance, keeping the reason each class was assigned.
///
/// Results are in class order, one entry per class.
pub fn classify_explained(rules: &RuleBook, substance: &SubstanceRecord) -> Vec<ClassMatch> {
    let name = substance.normalized_name();
    let mut matches: Vec<ClassMatch> = rules
        .classes()
        .iter()
        .filter_map(|def| {
            def.matcher
                .find_match(&name, substance)
                .map(|reason| ClassMatch {
                    class: def.class,
                    reason,
                })
        })
        .collect();
    matches.sort_by_key(|m| m.class);
    matches
}

/// Mutually exclusive class pairs present in one substance's tag set.
pub fn conflicts(classes: &BTreeSet<HazardClass>) -> Vec<(HazardClass, HazardClass)> {
    EXCLUSIVE_PAIRS
        .iter()
        .filter(|(a, b)| classes.contains(a) && classes.contains(b))
        .copied()
        .collect()
}
