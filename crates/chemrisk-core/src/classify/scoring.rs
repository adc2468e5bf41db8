use crate::classify::hazard::classify_with;
use crate::classify::heuristics::{acid_strength, base_strength};
use crate::model::{Axis, HazardClass, RiskLevel, SubstanceRecord};
use crate::rules::builtin::builtin;
use crate::rules::matcher::MatchReason;
use crate::rules::{Condition, RuleBook};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Upper bound of every axis and of the global score.
pub const MAX_SCORE: u8 = 100;

/// Points one trigger awarded to one axis for one substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisContribution {
    pub axis: Axis,
    pub substance_index: usize,
    pub substance: String,
    pub points: i32,
    pub reason: MatchReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An interaction rule whose conditions all held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedBonus {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub bonuses: BTreeMap<Axis, i32>,
}

/// Axis scores with everything that went into them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    /// Clamped score of every axis; all eight are always present.
    pub scores: BTreeMap<Axis, u8>,
    pub levels: BTreeMap<Axis, RiskLevel>,
    pub contributions: Vec<AxisContribution>,
    pub bonuses: Vec<AppliedBonus>,
    /// Exact mean of the clamped axis scores.
    pub mean: Decimal,
    /// `mean` rounded half up.
    pub global: u8,
    pub global_level: RiskLevel,
}

impl ScoreCard {
    pub fn axis(&self, axis: Axis) -> u8 {
        self.scores.get(&axis).copied().unwrap_or(0)
    }
}

/// Score a substance list against the built-in tables.
pub fn score(substances: &[SubstanceRecord]) -> BTreeMap<Axis, u8> {
    let rules = builtin();
    let classes: Vec<BTreeSet<HazardClass>> = substances
        .iter()
        .map(|s| classify_with(rules, s))
        .collect();
    score_detailed(rules, substances, &classes).scores
}

/// Score a substance list, keeping contributions and bonuses.
///
/// `classes` holds the hazard classes of each substance (as returned by the
/// classifier); it only feeds the interaction conditions.
pub fn score_detailed(
    rules: &RuleBook,
    substances: &[SubstanceRecord],
    classes: &[BTreeSet<HazardClass>],
) -> ScoreCard {
    let mut raw: BTreeMap<Axis, i32> = Axis::ALL.iter().map(|a| (*a, 0)).collect();
    let mut contributions = Vec::new();

    for (index, s) in substances.iter().enumerate() {
        let name = s.normalized_name();
        for axis in Axis::ALL {
            for t in rules.axis_triggers(axis) {
                let Some(reason) = t.matcher.find_match(&name, s) else {
                    continue;
                };
                trace!(substance = %s.label(), %axis, points = t.points, %reason, "axis trigger fired");
                *raw.entry(axis).or_insert(0) += t.points;
                contributions.push(AxisContribution {
                    axis,
                    substance_index: index,
                    substance: s.label(),
                    points: t.points,
                    reason,
                    note: t.note.clone(),
                });
            }
        }
    }

    let present = PresentConditions::collect(rules, substances, classes);
    let mut bonuses = Vec::new();
    for interaction in rules.interactions() {
        if !interaction.requires.iter().all(|c| present.holds(*c)) {
            continue;
        }
        debug!(interaction = %interaction.name, "interaction bonus applied");
        for (axis, points) in &interaction.bonuses {
            *raw.entry(*axis).or_insert(0) += points;
        }
        bonuses.push(AppliedBonus {
            name: interaction.name.clone(),
            description: interaction.description.clone(),
            bonuses: interaction.bonuses.clone(),
        });
    }

    let scores: BTreeMap<Axis, u8> = raw.into_iter().map(|(a, v)| (a, clamp(v))).collect();
    let levels = scores
        .iter()
        .map(|(a, v)| (*a, RiskLevel::from_score(*v)))
        .collect();
    let mean = mean_score(&scores);
    let global = round_half_up(mean);

    debug!(
        substances = substances.len(),
        %mean,
        global,
        "axis scores computed"
    );

    ScoreCard {
        scores,
        levels,
        contributions,
        bonuses,
        mean,
        global,
        global_level: RiskLevel::from_score(global),
    }
}

/// Clamp a raw point sum into `[0, 100]`.
pub fn clamp(raw: i32) -> u8 {
    raw.clamp(0, i32::from(MAX_SCORE)) as u8
}

/// Exact mean over the eight axes; missing axes count as zero.
pub fn mean_score(scores: &BTreeMap<Axis, u8>) -> Decimal {
    let sum: Decimal = Axis::ALL
        .iter()
        .map(|a| Decimal::from(scores.get(a).copied().unwrap_or(0)))
        .sum();
    sum / Decimal::from(Axis::ALL.len())
}

/// Round to the nearest integer, ties away from zero (half up for non-negative values).
pub fn round_half_up(value: Decimal) -> u8 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u8()
        .map(|v| v.min(MAX_SCORE))
        .unwrap_or(0)
}

/// Which whole-list conditions hold.
struct PresentConditions {
    acid: bool,
    base: bool,
    classes: BTreeSet<HazardClass>,
}

impl PresentConditions {
    fn collect(
        rules: &RuleBook,
        substances: &[SubstanceRecord],
        classes: &[BTreeSet<HazardClass>],
    ) -> Self {
        let classes: BTreeSet<HazardClass> = classes.iter().flatten().copied().collect();
        let ph = rules.ph();
        let mut acid = classes.contains(&HazardClass::AcidStrong);
        let mut base = classes.contains(&HazardClass::BaseStrong);
        for s in substances {
            let name = s.normalized_name();
            match (acid_strength(ph, &name), base_strength(ph, &name)) {
                // A name reading as both only counts for its stronger side; a tie is neither.
                (Some(a), Some(b)) => {
                    acid |= a > b;
                    base |= b > a;
                }
                (a, b) => {
                    acid |= a.is_some();
                    base |= b.is_some();
                }
            }
        }
        Self {
            acid,
            base,
            classes,
        }
    }

    fn holds(&self, condition: Condition) -> bool {
        match condition {
            Condition::AcidPresent => self.acid,
            Condition::BasePresent => self.base,
            Condition::ClassPresent(c) => self.classes.contains(&c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GhsClass;
    use rust_decimal_macros::dec;

    fn detailed(subs: &[SubstanceRecord]) -> ScoreCard {
        let rules = builtin();
        let classes: Vec<_> = subs.iter().map(|s| classify_with(rules, s)).collect();
        score_detailed(rules, subs, &classes)
    }

    #[test]
    fn test_empty_list_all_zero() {
        let card = detailed(&[]);
        assert_eq!(card.scores.len(), 8);
        assert!(card.scores.values().all(|v| *v == 0));
        assert_eq!(card.mean, dec!(0));
        assert_eq!(card.global, 0);
        assert_eq!(card.global_level, RiskLevel::Low);
        assert!(card.bonuses.is_empty());
    }

    #[test]
    fn test_acid_base_scenario() {
        let subs = vec![
            SubstanceRecord::named("Acide sulfurique"),
            SubstanceRecord::named("Hydroxyde de sodium"),
        ];
        let card = detailed(&subs);
        assert_eq!(card.axis(Axis::Exothermic), 70);
        assert_eq!(card.axis(Axis::Gas), 30);
        assert_eq!(card.axis(Axis::Corrosion), 40);
        assert_eq!(card.axis(Axis::Explosion), 0);
        assert_eq!(card.mean, dec!(17.5));
        assert_eq!(card.global, 18);
        assert_eq!(card.levels[&Axis::Exothermic], RiskLevel::Critical);
        assert_eq!(card.bonuses.len(), 1);
        assert_eq!(card.bonuses[0].name, "acid_base");
    }

    #[test]
    fn test_redox_scenario() {
        let subs = vec![
            SubstanceRecord::named("Permanganate de potassium"),
            SubstanceRecord::named("Hydrazine"),
        ];
        let card = detailed(&subs);
        assert_eq!(card.axis(Axis::Exothermic), 50);
        assert_eq!(card.axis(Axis::Explosion), 40);
        assert_eq!(card.axis(Axis::Toxic), 35);
        assert_eq!(card.mean, dec!(15.625));
        assert_eq!(card.global, 16);
        assert_eq!(
            card.bonuses.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
            vec!["redox"]
        );
    }

    #[test]
    fn test_oxidizer_fuel_bonus() {
        let subs = vec![
            SubstanceRecord::named("Nitrate de potassium"),
            SubstanceRecord::named("Éthanol"),
        ];
        let card = detailed(&subs);
        assert!(card.bonuses.iter().any(|b| b.name == "oxidizer_fuel"));
        // 20 (solvent keyword) + 50 (bonus)
        assert_eq!(card.axis(Axis::Fire), 70);
        assert_eq!(card.axis(Axis::Explosion), 40);
    }

    #[test]
    fn test_bonus_needs_both_sides() {
        let card = detailed(&[SubstanceRecord::named("Acide sulfurique")]);
        assert!(card.bonuses.is_empty());
        assert_eq!(card.axis(Axis::Exothermic), 15);
    }

    #[test]
    fn test_weak_acid_counts_as_acid_present() {
        let subs = vec![
            SubstanceRecord::named("Vinaigre"),
            SubstanceRecord::named("Bicarbonate de sodium"),
        ];
        let card = detailed(&subs);
        assert_eq!(card.bonuses.len(), 1);
        assert_eq!(card.axis(Axis::Exothermic), 40);
        assert_eq!(card.axis(Axis::Gas), 30);
    }

    fn fires_acid_base(names: &[&str]) -> bool {
        let subs: Vec<_> = names.iter().map(|n| SubstanceRecord::named(*n)).collect();
        detailed(&subs).bonuses.iter().any(|b| b.name == "acid_base")
    }

    #[test]
    fn test_single_substance_does_not_react_with_itself() {
        assert!(!fires_acid_base(&["Vitamine C (acide ascorbique)"]));
        assert!(!fires_acid_base(&["Triéthanolamine"]));
        // Weak acid and weak base in one name: a buffer, neither side.
        assert!(!fires_acid_base(&["Tampon acide acétique / ammoniaque"]));
    }

    #[test]
    fn test_amine_with_acid_still_reacts() {
        assert!(fires_acid_base(&["Triéthanolamine", "Acide citrique"]));
    }

    #[test]
    fn test_axis_clamped_to_100() {
        let explosive = SubstanceRecord::named("Nitro azide peroxyde")
            .with_h_codes(&["H200", "H240", "H271"])
            .with_ghs(&[GhsClass::Ghs01, GhsClass::Ghs03]);
        let card = detailed(&[explosive.clone(), explosive.clone(), explosive]);
        assert_eq!(card.axis(Axis::Explosion), 100);
        assert!(card.scores.values().all(|v| *v <= 100));
        assert!(card.global <= 100);
    }

    #[test]
    fn test_trigger_fires_once_per_substance() {
        // Both GHS03 and "peroxyde" belong to the same exothermic trigger.
        let s = SubstanceRecord::named("Peroxyde d'hydrogène").with_ghs(&[GhsClass::Ghs03]);
        let card = detailed(&[s]);
        let exo: Vec<_> = card
            .contributions
            .iter()
            .filter(|c| c.axis == Axis::Exothermic)
            .collect();
        assert_eq!(exo.len(), 1);
        assert_eq!(exo[0].points, 30);
    }

    #[test]
    fn test_contributions_summed_across_substances() {
        let subs = vec![
            SubstanceRecord::named("A").with_h_codes(&["H400"]),
            SubstanceRecord::named("B").with_h_codes(&["H410"]),
        ];
        let card = detailed(&subs);
        assert_eq!(card.axis(Axis::Environment), 80);
        assert_eq!(card.contributions.len(), 2);
        assert_eq!(card.contributions[1].substance_index, 1);
    }

    #[test]
    fn test_score_matches_detailed() {
        let subs = vec![SubstanceRecord::named("Acétone").with_h_codes(&["H225"])];
        assert_eq!(score(&subs), detailed(&subs).scores);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(-15), 0);
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(55), 55);
        assert_eq!(clamp(100), 100);
        assert_eq!(clamp(240), 100);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(17.5)), 18);
        assert_eq!(round_half_up(dec!(17.49)), 17);
        assert_eq!(round_half_up(dec!(0.5)), 1);
        assert_eq!(round_half_up(dec!(99.875)), 100);
        assert_eq!(round_half_up(dec!(0)), 0);
    }
}
