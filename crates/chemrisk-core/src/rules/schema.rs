use crate::model::{Axis, GhsClass, HazardClass, Severity};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Name keywords, H-code prefixes and pictograms shared by class tags and axis triggers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatcherDef {
    /// Case-insensitive substrings tested against the substance name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// H-code prefixes (e.g., "H360" also matches "H360FD").
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub h_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ghs: Vec<GhsClass>,
}

impl MatcherDef {
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.h_codes.is_empty() && self.ghs.is_empty()
    }
}

/// How one hazard class is recognized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardClassDef {
    pub class: HazardClass,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub matcher: MatcherDef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardClassTableDef {
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub classes: Vec<HazardClassDef>,
}

/// A curated incompatibility between two hazard classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityRule {
    /// Unordered pair; stored sorted once loaded into a table.
    pub pair: [HazardClass; 2],
    pub severity: Severity,
    /// Description of the reaction (e.g., "Réaction violente, exothermique").
    pub reaction: String,
    /// Byproduct gases released by the reaction.
    #[serde(default)]
    pub gases: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompatibilityTableDef {
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rules: Vec<CompatibilityRule>,
}

/// A point contribution to one axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisTriggerDef {
    /// Points added when the trigger fires; negative values mitigate.
    pub points: i32,
    #[serde(flatten)]
    pub matcher: MatcherDef,
    #[serde(default)]
    pub note: Option<String>,
}

/// A global bonus applied when every required condition holds for the substance list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Conditions: "acid", "base", or a hazard class name such as "oxidizer".
    pub requires: Vec<String>,
    pub bonuses: BTreeMap<Axis, i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisTriggerTableDef {
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub axes: BTreeMap<Axis, Vec<AxisTriggerDef>>,
    #[serde(default)]
    pub interactions: Vec<InteractionDef>,
}

/// Keyword weights for the pH estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhKeywordsDef {
    pub strong_acid_weight: u32,
    pub weak_acid_weight: u32,
    pub strong_base_weight: u32,
    pub weak_base_weight: u32,
    pub strong_acid: Vec<String>,
    pub weak_acid: Vec<String>,
    pub strong_base: Vec<String>,
    pub weak_base: Vec<String>,
}

/// Triggers for the thermal-stability estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalDef {
    pub keywords: Vec<String>,
    pub h_codes: Vec<String>,
    /// Reason reported when nothing matches.
    pub stable_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsDef {
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    pub ph: PhKeywordsDef,
    pub thermal: ThermalDef,
}
