use crate::classify::compatibility::{CompatibilityMatrix, PairCompatibility};
use crate::classify::hazard::ClassMatch;
use crate::classify::heuristics::{PhEstimate, ThermalStability};
use crate::classify::scoring::AppliedBonus;
use crate::model::{Axis, HazardClass, RiskLevel};
use crate::trace::TraceBundle;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Hazard classes assigned to one input substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstanceClassification {
    /// Position in the input list.
    pub index: usize,
    /// Display label (name, or CAS number when unnamed).
    pub name: String,
    pub classes: BTreeSet<HazardClass>,
    /// First matcher that fired for each class.
    pub matches: Vec<ClassMatch>,
    /// Mutually exclusive class pairs found on this substance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<(HazardClass, HazardClass)>,
}

/// A substance pair whose compatibility is `danger` or `critical`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriticalPair {
    /// Index of the first substance (`first < second`).
    pub first: usize,
    pub second: usize,
    pub first_name: String,
    pub second_name: String,
    pub compatibility: PairCompatibility,
}

/// Threshold alerts on individual axes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alerts {
    /// `explosion >= 40`
    pub explosion: bool,
    /// `toxic >= 50`
    pub toxic: bool,
    /// `gas >= 40`
    pub gas: bool,
}

impl Alerts {
    pub const EXPLOSION_THRESHOLD: u8 = 40;
    pub const TOXIC_THRESHOLD: u8 = 50;
    pub const GAS_THRESHOLD: u8 = 40;

    pub fn from_scores(scores: &BTreeMap<Axis, u8>) -> Self {
        let at = |axis: Axis| scores.get(&axis).copied().unwrap_or(0);
        Self {
            explosion: at(Axis::Explosion) >= Self::EXPLOSION_THRESHOLD,
            toxic: at(Axis::Toxic) >= Self::TOXIC_THRESHOLD,
            gas: at(Axis::Gas) >= Self::GAS_THRESHOLD,
        }
    }

    pub fn any(&self) -> bool {
        self.explosion || self.toxic || self.gas
    }
}

/// Full result for one substance list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub substances: Vec<SubstanceClassification>,
    pub matrix: CompatibilityMatrix,
    pub axis_scores: BTreeMap<Axis, u8>,
    pub axis_levels: BTreeMap<Axis, RiskLevel>,
    /// Exact mean of the eight axis scores.
    pub mean_score: Decimal,
    pub global_score: u8,
    pub global_level: RiskLevel,
    #[serde(rename = "pHEstimate")]
    pub ph_estimate: PhEstimate,
    pub thermal_stability: ThermalStability,
    pub critical_pairs: Vec<CriticalPair>,
    /// Union of the gases of every critical pair.
    pub gases_detected: BTreeSet<String>,
    pub alerts: Alerts,
    /// Interaction rules that fired.
    pub bonuses: Vec<AppliedBonus>,
    /// `global_score >= 50`
    pub expert_review_required: bool,
    /// Plain-text warnings, also present in the trace when it is built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<TraceBundle>,
}

impl Assessment {
    /// Score threshold from which a human expert must review the result.
    pub const EXPERT_REVIEW_THRESHOLD: u8 = 50;

    pub fn axis(&self, axis: Axis) -> u8 {
        self.axis_scores.get(&axis).copied().unwrap_or(0)
    }
}
