use crate::model::SubstanceRecord;
use crate::rules::builtin::builtin;
use crate::rules::matcher::MatchReason;
use crate::rules::schema::{PhKeywordsDef, ThermalDef};
use crate::rules::RuleBook;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// How strongly a substance name reads as an acid or a base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Strong,
}

/// Strongest acid keyword matched by a normalized name.
pub(crate) fn acid_strength(ph: &PhKeywordsDef, normalized_name: &str) -> Option<Strength> {
    strength(normalized_name, &ph.strong_acid, &ph.weak_acid)
}

/// Strongest base keyword matched by a normalized name.
pub(crate) fn base_strength(ph: &PhKeywordsDef, normalized_name: &str) -> Option<Strength> {
    strength(normalized_name, &ph.strong_base, &ph.weak_base)
}

fn strength(name: &str, strong: &[String], weak: &[String]) -> Option<Strength> {
    if name.is_empty() {
        return None;
    }
    if strong.iter().any(|k| name.contains(k.as_str())) {
        Some(Strength::Strong)
    } else if weak.iter().any(|k| name.contains(k.as_str())) {
        Some(Strength::Weak)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhBucket {
    VeryAcidic,
    Acidic,
    Neutral,
    Neutralized,
    Basic,
    VeryBasic,
}

impl PhBucket {
    pub fn label(&self) -> &'static str {
        match self {
            PhBucket::VeryAcidic => "very acidic (<2)",
            PhBucket::Acidic => "acidic (3–5)",
            PhBucket::Neutral => "neutral (~7)",
            PhBucket::Neutralized => "neutralized (~7)",
            PhBucket::Basic => "basic (9–11)",
            PhBucket::VeryBasic => "very basic (>12)",
        }
    }
}

impl fmt::Display for PhBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Qualitative pH of the mixture, from name keywords only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhEstimate {
    pub label: String,
    pub bucket: PhBucket,
    pub acid_weight: u32,
    pub base_weight: u32,
}

pub fn estimate_ph(substances: &[SubstanceRecord]) -> PhEstimate {
    estimate_ph_with(builtin(), substances)
}

/// Weigh acid and base keywords across the list.
///
/// Each substance adds its strongest acid weight and its strongest base
/// weight, at most one of each.
pub fn estimate_ph_with(rules: &RuleBook, substances: &[SubstanceRecord]) -> PhEstimate {
    let ph = rules.ph();
    let mut acid_weight = 0u32;
    let mut base_weight = 0u32;
    let mut strong_acid = false;
    let mut strong_base = false;

    for s in substances {
        let name = s.normalized_name();
        match acid_strength(ph, &name) {
            Some(Strength::Strong) => {
                acid_weight += ph.strong_acid_weight;
                strong_acid = true;
            }
            Some(Strength::Weak) => acid_weight += ph.weak_acid_weight,
            None => {}
        }
        match base_strength(ph, &name) {
            Some(Strength::Strong) => {
                base_weight += ph.strong_base_weight;
                strong_base = true;
            }
            Some(Strength::Weak) => base_weight += ph.weak_base_weight,
            None => {}
        }
    }

    let bucket = if acid_weight == 0 && base_weight == 0 {
        PhBucket::Neutral
    } else if acid_weight > base_weight {
        if strong_acid {
            PhBucket::VeryAcidic
        } else {
            PhBucket::Acidic
        }
    } else if base_weight > acid_weight {
        if strong_base {
            PhBucket::VeryBasic
        } else {
            PhBucket::Basic
        }
    } else {
        PhBucket::Neutralized
    };

    debug!(acid_weight, base_weight, bucket = %bucket, "pH estimated");

    PhEstimate {
        label: bucket.label().to_string(),
        bucket,
        acid_weight,
        base_weight,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThermalStability {
    pub stable: bool,
    /// One line per unstable substance, or the single default line when stable.
    pub reasons: Vec<String>,
}

pub fn estimate_thermal_stability(substances: &[SubstanceRecord]) -> ThermalStability {
    estimate_thermal_stability_with(builtin(), substances)
}

pub fn estimate_thermal_stability_with(
    rules: &RuleBook,
    substances: &[SubstanceRecord],
) -> ThermalStability {
    let thermal = rules.thermal();
    let reasons: Vec<String> = substances
        .iter()
        .filter_map(|s| thermal_reason(thermal, s).map(|r| format!("{}: {r}", s.label())))
        .collect();

    if reasons.is_empty() {
        ThermalStability {
            stable: true,
            reasons: vec![thermal.stable_reason.clone()],
        }
    } else {
        debug!(unstable = reasons.len(), "thermally unstable substances found");
        ThermalStability {
            stable: false,
            reasons,
        }
    }
}

fn thermal_reason(thermal: &ThermalDef, s: &SubstanceRecord) -> Option<MatchReason> {
    let name = s.normalized_name();
    if !name.is_empty() {
        if let Some(k) = thermal.keywords.iter().find(|k| name.contains(k.as_str())) {
            return Some(MatchReason::Keyword(k.clone()));
        }
    }
    thermal
        .h_codes
        .iter()
        .find(|c| s.has_h_code(c.as_str()))
        .map(|c| MatchReason::HCode(c.clone()))
}
