use crate::classify::compatibility::matrix_from_classes;
use crate::classify::hazard::{classify_explained, conflicts};
use crate::classify::heuristics::{estimate_ph_with, estimate_thermal_stability_with};
use crate::classify::outcome::{Alerts, Assessment, CriticalPair, SubstanceClassification};
use crate::classify::scoring::score_detailed;
use crate::model::{HazardClass, SubstanceRecord};
use crate::parsing::codes::cas_is_valid;
use crate::rules::builtin::builtin;
use crate::rules::RuleBook;
use crate::trace::{
    build_axis_decisions, build_entry_trace, build_overall_decision, build_pair_decisions,
    TraceBundle, TraceSeverity, TraceVisibility, TraceWarning,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// Knobs for one assessment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssessOptions {
    /// Build the explanation bundle.
    pub include_trace: bool,
    /// Above this many substances a warning is raised; the list is still assessed.
    pub max_substances: usize,
}

impl Default for AssessOptions {
    fn default() -> Self {
        Self {
            include_trace: true,
            max_substances: 10,
        }
    }
}

/// Classify every substance of a list, keeping reasons and conflicts.
pub fn classify_all(
    rules: &RuleBook,
    substances: &[SubstanceRecord],
) -> Vec<SubstanceClassification> {
    substances
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let matches = classify_explained(rules, s);
            let classes: BTreeSet<HazardClass> = matches.iter().map(|m| m.class).collect();
            SubstanceClassification {
                index,
                name: s.label(),
                conflicts: conflicts(&classes),
                classes,
                matches,
            }
        })
        .collect()
}

/// Assess a substance list against the built-in tables with default options.
pub fn assess(substances: &[SubstanceRecord]) -> Assessment {
    assess_with(builtin(), substances, &AssessOptions::default())
}

/// Assess a substance list against a rule book.
///
/// Never fails; an empty or single-substance list yields no pairs.
pub fn assess_with(
    rules: &RuleBook,
    substances: &[SubstanceRecord],
    options: &AssessOptions,
) -> Assessment {
    let mut warnings: Vec<TraceWarning> = Vec::new();

    if substances.len() > options.max_substances {
        warn!(
            count = substances.len(),
            max = options.max_substances,
            "substance list exceeds the supported size"
        );
        warnings.push(TraceWarning {
            substance_index: None,
            message: format!(
                "{} substances submitted; results are only validated up to {}",
                substances.len(),
                options.max_substances
            ),
            severity: TraceSeverity::Important,
            visibility: TraceVisibility::Always,
        });
    }

    let classifications = classify_all(rules, substances);
    warnings.extend(substance_warnings(substances, &classifications));

    let classes: Vec<BTreeSet<HazardClass>> = classifications
        .iter()
        .map(|c| c.classes.clone())
        .collect();

    // Pairs, scores, heuristics
    let matrix = matrix_from_classes(rules.compatibility(), &classes);
    let card = score_detailed(rules, substances, &classes);
    let ph_estimate = estimate_ph_with(rules, substances);
    let thermal_stability = estimate_thermal_stability_with(rules, substances);

    let critical_pairs: Vec<CriticalPair> = matrix
        .pairs()
        .filter(|(_, _, p)| p.severity.is_alarming())
        .map(|(i, j, p)| CriticalPair {
            first: i,
            second: j,
            first_name: classifications[i].name.clone(),
            second_name: classifications[j].name.clone(),
            compatibility: p.clone(),
        })
        .collect();
    let gases_detected: BTreeSet<String> = critical_pairs
        .iter()
        .flat_map(|cp| cp.compatibility.gases.iter().cloned())
        .collect();

    let alerts = Alerts::from_scores(&card.scores);
    let expert_review_required = card.global >= Assessment::EXPERT_REVIEW_THRESHOLD;

    debug!(
        substances = substances.len(),
        critical_pairs = critical_pairs.len(),
        global = card.global,
        expert_review_required,
        "assessment complete"
    );

    let trace = options.include_trace.then(|| {
        let mut bundle = TraceBundle::default();
        bundle.entries = substances
            .iter()
            .zip(&classifications)
            .map(|(s, c)| build_entry_trace(c.index, s, &c.matches, &card))
            .collect();
        bundle.decisions.push(build_overall_decision(
            &card,
            critical_pairs.len(),
            expert_review_required,
        ));
        bundle.decisions.extend(build_pair_decisions(&matrix, substances));
        bundle.decisions.extend(build_axis_decisions(&card));
        bundle.warnings = warnings.clone();
        bundle
    });

    Assessment {
        substances: classifications,
        matrix,
        axis_scores: card.scores,
        axis_levels: card.levels,
        mean_score: card.mean,
        global_score: card.global,
        global_level: card.global_level,
        ph_estimate,
        thermal_stability,
        critical_pairs,
        gases_detected,
        alerts,
        bonuses: card.bonuses,
        expert_review_required,
        warnings: warnings.into_iter().map(|w| w.message).collect(),
        trace,
    }
}

/// Warnings about individual substances: unclassified, contradictory tags, bad CAS, duplicates.
fn substance_warnings(
    substances: &[SubstanceRecord],
    classifications: &[SubstanceClassification],
) -> Vec<TraceWarning> {
    let mut warnings = Vec::new();
    let mut seen_names = HashSet::new();

    for (s, c) in substances.iter().zip(classifications) {
        let mut push = |message: String, severity: TraceSeverity| {
            warnings.push(TraceWarning {
                substance_index: Some(c.index),
                message,
                severity,
                visibility: TraceVisibility::Always,
            });
        };

        if c.classes.is_empty() {
            push(
                format!(
                    "'{}' matched no hazard class; its pairs are reported as ok",
                    c.name
                ),
                TraceSeverity::Important,
            );
        }
        for (a, b) in &c.conflicts {
            push(
                format!("'{}' is tagged both {a} and {b}; check the identification", c.name),
                TraceSeverity::Important,
            );
        }
        if !s.ignored_codes.is_empty() {
            let tokens: Vec<&str> = s.ignored_codes.iter().map(String::as_str).collect();
            push(
                format!(
                    "'{}' lists {} among its hazard codes; not H/EUH statements, ignored",
                    c.name,
                    tokens.join(", ")
                ),
                TraceSeverity::Info,
            );
        }
        if let Some(cas) = &s.cas {
            if !cas_is_valid(cas) {
                push(
                    format!("'{}' has CAS number '{cas}' with an invalid checksum", c.name),
                    TraceSeverity::Info,
                );
            }
        }
        let normalized = s.normalized_name();
        if !normalized.is_empty() && !seen_names.insert(normalized) {
            push(
                format!("'{}' appears more than once in the list", c.name),
                TraceSeverity::Info,
            );
        }
    }

    warnings
}
