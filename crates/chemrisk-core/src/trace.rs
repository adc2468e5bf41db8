use crate::classify::compatibility::CompatibilityMatrix;
use crate::classify::hazard::ClassMatch;
use crate::classify::scoring::ScoreCard;
use crate::model::{HazardClass, RiskLevel, Role, Severity, SubstanceRecord};
use serde::{Deserialize, Serialize};

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceSeverity {
    Critical,
    Important,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceVisibility {
    Always,
    Auto,
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepType {
    NormalizeName,
    ClassMatch,
    AxisTrigger,
    InteractionBonus,
    PairLookup,
    OverallDecision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub step_type: TraceStepType,
    pub message: String,
}

/// How one substance was read, tagged and scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub entry_id: String,
    pub substance_index: usize,
    pub raw_name: String,
    pub normalized_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    pub role: Role,
    pub classes: Vec<HazardClass>,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceDecisionTarget {
    Axis,
    Pair,
    Overall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceDecision {
    pub decision_id: String,
    pub target: TraceDecisionTarget,
    /// Axis name or "first / second" for pair decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Band or severity reached.
    pub outcome: String,
    pub reason: String,
    pub severity: TraceSeverity,
    pub visibility: TraceVisibility,
    pub steps: Vec<TraceStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substance_index: Option<usize>,
    pub message: String,
    pub severity: TraceSeverity,
    pub visibility: TraceVisibility,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceBundle {
    pub trace_schema_version: String,
    pub entries: Vec<TraceEntry>,
    pub decisions: Vec<TraceDecision>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<TraceWarning>,
}

impl Default for TraceBundle {
    fn default() -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            entries: Vec::new(),
            decisions: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

pub fn build_entry_trace(
    index: usize,
    substance: &SubstanceRecord,
    matches: &[ClassMatch],
    card: &ScoreCard,
) -> TraceEntry {
    let normalized_name = substance.normalized_name();
    let mut steps = vec![TraceStep {
        step_type: TraceStepType::NormalizeName,
        message: format!("Normalized '{}' -> '{}'", substance.name, normalized_name),
    }];

    if matches.is_empty() {
        steps.push(TraceStep {
            step_type: TraceStepType::ClassMatch,
            message: "No hazard class matched".into(),
        });
    }
    steps.extend(matches.iter().map(|m| TraceStep {
        step_type: TraceStepType::ClassMatch,
        message: format!("Tagged {}: {}", m.class, m.reason),
    }));

    steps.extend(
        card.contributions
            .iter()
            .filter(|c| c.substance_index == index)
            .map(|c| TraceStep {
                step_type: TraceStepType::AxisTrigger,
                message: match &c.note {
                    Some(note) => format!("{} {:+}: {} ({note})", c.axis, c.points, c.reason),
                    None => format!("{} {:+}: {}", c.axis, c.points, c.reason),
                },
            }),
    );

    TraceEntry {
        entry_id: format!("ent_{index}"),
        substance_index: index,
        raw_name: substance.name.clone(),
        normalized_name,
        cas: substance.cas.clone(),
        role: substance.role,
        classes: matches.iter().map(|m| m.class).collect(),
        steps,
    }
}

/// One decision per axis, in axis order.
pub fn build_axis_decisions(card: &ScoreCard) -> Vec<TraceDecision> {
    card.scores
        .iter()
        .map(|(axis, score)| {
            let level = RiskLevel::from_score(*score);
            let mut steps: Vec<TraceStep> = card
                .contributions
                .iter()
                .filter(|c| c.axis == *axis)
                .map(|c| TraceStep {
                    step_type: TraceStepType::AxisTrigger,
                    message: format!("{} {:+}: {}", c.substance, c.points, c.reason),
                })
                .collect();
            steps.extend(card.bonuses.iter().filter_map(|b| {
                b.bonuses.get(axis).map(|points| TraceStep {
                    step_type: TraceStepType::InteractionBonus,
                    message: format!("Interaction '{}' {points:+}", b.name),
                })
            }));

            TraceDecision {
                decision_id: format!("dec_axis_{axis}"),
                target: TraceDecisionTarget::Axis,
                subject: Some(axis.to_string()),
                outcome: level.to_string(),
                reason: format!("{axis} scored {score}/100"),
                severity: if level >= RiskLevel::High {
                    TraceSeverity::Important
                } else {
                    TraceSeverity::Info
                },
                visibility: if steps.is_empty() {
                    TraceVisibility::OnDemand
                } else {
                    TraceVisibility::Auto
                },
                steps,
            }
        })
        .collect()
}

/// One decision per non-`ok` pair of the matrix.
pub fn build_pair_decisions(
    matrix: &CompatibilityMatrix,
    substances: &[SubstanceRecord],
) -> Vec<TraceDecision> {
    let label = |i: usize| {
        substances
            .get(i)
            .map(SubstanceRecord::label)
            .unwrap_or_else(|| format!("#{i}"))
    };

    matrix
        .pairs()
        .filter(|(_, _, p)| p.severity > Severity::Ok)
        .map(|(i, j, p)| {
            let steps = p
                .triggered_rules
                .iter()
                .map(|r| TraceStep {
                    step_type: TraceStepType::PairLookup,
                    message: format!(
                        "{} + {} -> {}: {}",
                        r.pair[0], r.pair[1], r.severity, r.reaction
                    ),
                })
                .collect();
            let reason = match p.triggered_rules.first() {
                Some(worst) => worst.reaction.clone(),
                None => String::new(),
            };

            TraceDecision {
                decision_id: format!("dec_pair_{i}_{j}"),
                target: TraceDecisionTarget::Pair,
                subject: Some(format!("{} / {}", label(i), label(j))),
                outcome: p.severity.to_string(),
                reason,
                severity: match p.severity {
                    Severity::Critical => TraceSeverity::Critical,
                    Severity::Danger => TraceSeverity::Important,
                    _ => TraceSeverity::Info,
                },
                visibility: if p.severity.is_alarming() {
                    TraceVisibility::Always
                } else {
                    TraceVisibility::Auto
                },
                steps,
            }
        })
        .collect()
}

pub fn build_overall_decision(
    card: &ScoreCard,
    critical_pairs: usize,
    expert_review: bool,
) -> TraceDecision {
    let mut steps = vec![TraceStep {
        step_type: TraceStepType::OverallDecision,
        message: format!(
            "Mean of 8 axes = {} -> global score {}",
            card.mean.normalize(),
            card.global
        ),
    }];
    steps.extend(card.bonuses.iter().map(|b| TraceStep {
        step_type: TraceStepType::InteractionBonus,
        message: match &b.description {
            Some(d) => format!("Interaction '{}' applied: {d}", b.name),
            None => format!("Interaction '{}' applied", b.name),
        },
    }));

    TraceDecision {
        decision_id: "dec_overall".into(),
        target: TraceDecisionTarget::Overall,
        subject: None,
        outcome: card.global_level.to_string(),
        reason: format!(
            "Global score {}/100, {} critical pair(s){}",
            card.global,
            critical_pairs,
            if expert_review {
                ", expert review required"
            } else {
                ""
            }
        ),
        severity: if expert_review || critical_pairs > 0 {
            TraceSeverity::Critical
        } else {
            TraceSeverity::Important
        },
        visibility: TraceVisibility::Always,
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::compatibility::matrix;
    use crate::classify::hazard::classify_explained;
    use crate::classify::scoring::score_detailed;
    use crate::model::Axis;
    use crate::rules::builtin::builtin;

    fn card_for(subs: &[SubstanceRecord]) -> ScoreCard {
        let classes: Vec<_> = subs
            .iter()
            .map(|s| crate::classify::hazard::classify_with(builtin(), s))
            .collect();
        score_detailed(builtin(), subs, &classes)
    }

    #[test]
    fn test_entry_trace_steps() {
        let s = SubstanceRecord::named("  Acide   Sulfurique ");
        let matches = classify_explained(builtin(), &s);
        let card = card_for(std::slice::from_ref(&s));
        let entry = build_entry_trace(0, &s, &matches, &card);

        assert_eq!(entry.entry_id, "ent_0");
        assert_eq!(entry.normalized_name, "acide sulfurique");
        assert_eq!(entry.classes, vec![HazardClass::AcidStrong]);
        assert!(matches!(entry.steps[0].step_type, TraceStepType::NormalizeName));
        assert!(entry
            .steps
            .iter()
            .any(|st| st.message == "Tagged acid_strong: name contains 'acide sulfurique'"));
        assert!(entry
            .steps
            .iter()
            .any(|st| st.message.starts_with("exothermic +15")));
    }

    #[test]
    fn test_unclassified_entry_says_so() {
        let s = SubstanceRecord::named("Eau");
        let card = card_for(std::slice::from_ref(&s));
        let entry = build_entry_trace(0, &s, &[], &card);
        assert!(entry.classes.is_empty());
        assert_eq!(entry.steps[1].message, "No hazard class matched");
    }

    #[test]
    fn test_axis_decisions_cover_every_axis() {
        let subs = vec![
            SubstanceRecord::named("Acide sulfurique"),
            SubstanceRecord::named("Hydroxyde de sodium"),
        ];
        let decisions = build_axis_decisions(&card_for(&subs));
        assert_eq!(decisions.len(), Axis::ALL.len());

        let exo = decisions
            .iter()
            .find(|d| d.subject.as_deref() == Some("exothermic"))
            .unwrap();
        assert_eq!(exo.outcome, "critical");
        assert!(exo
            .steps
            .iter()
            .any(|s| s.message == "Interaction 'acid_base' +40"));
    }

    #[test]
    fn test_pair_decisions_skip_ok_pairs() {
        let subs = vec![
            SubstanceRecord::named("Acide sulfurique"),
            SubstanceRecord::named("Eau"),
            SubstanceRecord::named("Hydroxyde de sodium"),
        ];
        let decisions = build_pair_decisions(&matrix(&subs), &subs);
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].decision_id, "dec_pair_0_2");
        assert_eq!(
            decisions[0].subject.as_deref(),
            Some("Acide sulfurique / Hydroxyde de sodium")
        );
        assert_eq!(decisions[0].outcome, "danger");
        assert_eq!(decisions[0].reason, "Réaction violente, exothermique");
    }

    #[test]
    fn test_overall_decision() {
        let card = card_for(&[]);
        let d = build_overall_decision(&card, 0, false);
        assert_eq!(d.outcome, "low");
        assert_eq!(d.reason, "Global score 0/100, 0 critical pair(s)");
        assert_eq!(d.steps[0].message, "Mean of 8 axes = 0 -> global score 0");
    }

    #[test]
    fn test_bundle_serializes_schema_version() {
        let json = serde_json::to_value(TraceBundle::default()).unwrap();
        assert_eq!(json["trace_schema_version"], "1.0");
        assert!(json.get("warnings").is_none());
    }
}
