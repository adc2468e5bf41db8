use crate::classify::hazard::classify_with;
use crate::model::{HazardClass, Severity, SubstanceRecord};
use crate::rules::builtin::builtin;
use crate::rules::schema::CompatibilityRule;
use crate::rules::{pair_key, CompatibilityTable, RuleBook};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Aggregated compatibility of two substances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairCompatibility {
    /// Worst severity among the triggered rules, `ok` if none.
    pub severity: Severity,
    /// Every rule hit by the class cross-product, worst first.
    pub triggered_rules: Vec<CompatibilityRule>,
    /// Union of the triggered rules' gases.
    pub gases: BTreeSet<String>,
}

/// One cell of the substance grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatrixCell {
    /// Diagonal; a substance is never scored against itself.
    #[serde(rename = "self")]
    SelfPair,
    Pair(PairCompatibility),
}

impl MatrixCell {
    pub fn pair(&self) -> Option<&PairCompatibility> {
        match self {
            MatrixCell::SelfPair => None,
            MatrixCell::Pair(p) => Some(p),
        }
    }
}

/// Symmetric n×n grid over the input substance order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityMatrix {
    pub cells: Vec<Vec<MatrixCell>>,
}

impl CompatibilityMatrix {
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<&MatrixCell> {
        self.cells.get(i).and_then(|row| row.get(j))
    }

    /// Upper-triangle pairs `(i, j, compatibility)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, &PairCompatibility)> {
        self.cells.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .skip(i + 1)
                .filter_map(move |(j, cell)| cell.pair().map(|p| (i, j, p)))
        })
    }
}

/// Compatibility of two class sets against the built-in table.
pub fn pair_compatibility(
    a: &BTreeSet<HazardClass>,
    b: &BTreeSet<HazardClass>,
) -> PairCompatibility {
    pair_compatibility_with(builtin().compatibility(), a, b)
}

/// Compatibility of two class sets against a table.
///
/// Rules are collected over `a × b`, deduplicated by unordered pair and
/// sorted worst first, so swapping `a` and `b` yields an equal result.
pub fn pair_compatibility_with(
    table: &CompatibilityTable,
    a: &BTreeSet<HazardClass>,
    b: &BTreeSet<HazardClass>,
) -> PairCompatibility {
    let mut hits: BTreeMap<(HazardClass, HazardClass), &CompatibilityRule> = BTreeMap::new();
    for &x in a {
        for &y in b {
            if let Some(rule) = table.lookup(x, y) {
                hits.insert(pair_key(x, y), rule);
            }
        }
    }

    let mut triggered_rules: Vec<CompatibilityRule> = hits.into_values().cloned().collect();
    // Stable sort keeps pair-key order within a severity.
    triggered_rules.sort_by(|r1, r2| r2.severity.cmp(&r1.severity));

    let severity = triggered_rules
        .iter()
        .map(|r| r.severity)
        .max()
        .unwrap_or_default();
    let gases = triggered_rules
        .iter()
        .flat_map(|r| r.gases.iter().cloned())
        .collect();

    PairCompatibility {
        severity,
        triggered_rules,
        gases,
    }
}

/// Full grid for a substance list against the built-in tables.
pub fn matrix(substances: &[SubstanceRecord]) -> CompatibilityMatrix {
    matrix_with(builtin(), substances)
}

/// Full grid for a substance list against a rule book.
pub fn matrix_with(rules: &RuleBook, substances: &[SubstanceRecord]) -> CompatibilityMatrix {
    let classes: Vec<BTreeSet<HazardClass>> = substances
        .iter()
        .map(|s| classify_with(rules, s))
        .collect();
    matrix_from_classes(rules.compatibility(), &classes)
}

/// Grid from precomputed class sets.
///
/// The lower triangle is copied from the upper one, so `cell(i, j) == cell(j, i)`
/// holds by construction.
pub fn matrix_from_classes(
    table: &CompatibilityTable,
    classes: &[BTreeSet<HazardClass>],
) -> CompatibilityMatrix {
    let n = classes.len();
    let mut cells: Vec<Vec<MatrixCell>> = Vec::with_capacity(n);

    for i in 0..n {
        let mut row = Vec::with_capacity(n);
        for j in 0..n {
            let cell = match i.cmp(&j) {
                std::cmp::Ordering::Equal => MatrixCell::SelfPair,
                std::cmp::Ordering::Less => {
                    MatrixCell::Pair(pair_compatibility_with(table, &classes[i], &classes[j]))
                }
                std::cmp::Ordering::Greater => cells[j][i].clone(),
            };
            row.push(cell);
        }
        cells.push(row);
    }

    CompatibilityMatrix { cells }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(classes: &[HazardClass]) -> BTreeSet<HazardClass> {
        classes.iter().copied().collect()
    }

    #[test]
    fn test_acid_base_danger() {
        let p = pair_compatibility(
            &set(&[HazardClass::AcidStrong]),
            &set(&[HazardClass::BaseStrong]),
        );
        assert_eq!(p.severity, Severity::Danger);
        assert_eq!(p.triggered_rules.len(), 1);
        assert_eq!(p.triggered_rules[0].reaction, "Réaction violente, exothermique");
        assert_eq!(p.gases, BTreeSet::from(["vapeur d'eau".to_string()]));
    }

    #[test]
    fn test_no_rule_is_ok() {
        let p = pair_compatibility(
            &set(&[HazardClass::Flammable]),
            &set(&[HazardClass::Flammable]),
        );
        assert_eq!(p.severity, Severity::Ok);
        assert!(p.triggered_rules.is_empty());
        assert!(p.gases.is_empty());
    }

    #[test]
    fn test_unclassified_is_ok() {
        let p = pair_compatibility(&BTreeSet::new(), &set(&[HazardClass::Oxidizer]));
        assert_eq!(p, PairCompatibility::default());
    }

    #[test]
    fn test_max_severity_and_gas_union() {
        // Bleach-like oxidizer against an acidic cyanide solution.
        let p = pair_compatibility(
            &set(&[HazardClass::Hypochlorite, HazardClass::Oxidizer]),
            &set(&[HazardClass::AcidStrong, HazardClass::Cyanide]),
        );
        assert_eq!(p.severity, Severity::Critical);
        assert!(p.gases.contains("chlore (Cl2)"));
        assert!(p.gases.contains("oxydes d'azote (NOx)"));
        // Worst first.
        assert_eq!(p.triggered_rules[0].severity, Severity::Critical);
        assert!(p
            .triggered_rules
            .windows(2)
            .all(|w| w[0].severity >= w[1].severity));
    }

    #[test]
    fn test_pair_symmetric() {
        let a = set(&[HazardClass::Oxidizer, HazardClass::Peroxide]);
        let b = set(&[HazardClass::Reducer, HazardClass::Flammable, HazardClass::AcidStrong]);
        assert_eq!(pair_compatibility(&a, &b), pair_compatibility(&b, &a));
    }

    #[test]
    fn test_shared_classes_not_double_counted() {
        let a = set(&[HazardClass::Oxidizer, HazardClass::Reducer]);
        let p = pair_compatibility(&a, &a);
        assert_eq!(p.triggered_rules.len(), 1);
        assert_eq!(p.severity, Severity::Critical);
    }

    #[test]
    fn test_matrix_diagonal_and_mirror() {
        let subs = vec![
            SubstanceRecord::named("Acide sulfurique"),
            SubstanceRecord::named("Hydroxyde de sodium"),
            SubstanceRecord::named("Cyanure de potassium"),
        ];
        let m = matrix(&subs);
        assert_eq!(m.size(), 3);
        for i in 0..3 {
            assert_eq!(m.cell(i, i), Some(&MatrixCell::SelfPair));
            for j in 0..3 {
                assert_eq!(m.cell(i, j), m.cell(j, i));
            }
        }
        let acid_cyanide = m.cell(2, 0).and_then(MatrixCell::pair).unwrap();
        assert_eq!(acid_cyanide.severity, Severity::Critical);
        assert!(acid_cyanide.gases.contains("cyanure d'hydrogène (HCN)"));
    }

    #[test]
    fn test_matrix_pairs_upper_triangle() {
        let subs = vec![
            SubstanceRecord::named("A"),
            SubstanceRecord::named("B"),
            SubstanceRecord::named("C"),
        ];
        let pairs: Vec<(usize, usize)> = matrix(&subs).pairs().map(|(i, j, _)| (i, j)).collect();
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_matrix_empty_and_singleton() {
        assert_eq!(matrix(&[]).size(), 0);
        let single = matrix(&[SubstanceRecord::named("Acide sulfurique")]);
        assert_eq!(single.size(), 1);
        assert_eq!(single.pairs().count(), 0);
    }

    #[test]
    fn test_self_cell_serializes_as_self() {
        let json = serde_json::to_value(MatrixCell::SelfPair).unwrap();
        assert_eq!(json["kind"], "self");
    }
}
