pub mod builtin;
pub mod matcher;
pub mod schema;

use crate::error::ChemRiskError;
use crate::model::{Axis, HazardClass};
use crate::parsing::codes::is_h_code;
use crate::parsing::normalize_name;
use schema::{
    AxisTriggerDef, AxisTriggerTableDef, CompatibilityRule, CompatibilityTableDef,
    HazardClassDef, HazardClassTableDef, HeuristicsDef, InteractionDef, MatcherDef,
    PhKeywordsDef, ThermalDef,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Order-independent key for a pair of hazard classes.
pub fn pair_key(a: HazardClass, b: HazardClass) -> (HazardClass, HazardClass) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Validated compatibility rules, keyed by unordered class pair.
#[derive(Debug, Clone)]
pub struct CompatibilityTable {
    version: String,
    rules: BTreeMap<(HazardClass, HazardClass), CompatibilityRule>,
}

impl CompatibilityTable {
    /// Build a table, rejecting pairs listed more than once in either order.
    pub fn from_def(def: CompatibilityTableDef) -> Result<Self, ChemRiskError> {
        let mut rules = BTreeMap::new();
        for mut rule in def.rules {
            let key = pair_key(rule.pair[0], rule.pair[1]);
            if rule.reaction.trim().is_empty() {
                return Err(ChemRiskError::RulesInvalid(format!(
                    "rule {}/{} has an empty reaction description",
                    key.0, key.1
                )));
            }
            if rule.gases.iter().any(|g| g.trim().is_empty()) {
                return Err(ChemRiskError::RulesInvalid(format!(
                    "rule {}/{} lists an empty gas name",
                    key.0, key.1
                )));
            }
            rule.pair = [key.0, key.1];
            if rules.insert(key, rule).is_some() {
                return Err(ChemRiskError::RulesInvalid(format!(
                    "pair {}/{} is listed more than once",
                    key.0, key.1
                )));
            }
        }
        Ok(Self {
            version: def.version,
            rules,
        })
    }

    /// Look up the rule for a pair; `(x, y)` and `(y, x)` resolve to the same entry.
    pub fn lookup(&self, x: HazardClass, y: HazardClass) -> Option<&CompatibilityRule> {
        self.rules.get(&pair_key(x, y))
    }

    pub fn rules(&self) -> impl Iterator<Item = &CompatibilityRule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

/// A whole-list condition used by interaction bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Some substance matched an acid keyword or is tagged `acid_strong`.
    AcidPresent,
    /// Some substance matched a base keyword or is tagged `base_strong`.
    BasePresent,
    ClassPresent(HazardClass),
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "acid" => Ok(Condition::AcidPresent),
            "base" => Ok(Condition::BasePresent),
            other => other
                .parse::<HazardClass>()
                .map(Condition::ClassPresent)
                .map_err(|_| format!("unknown interaction condition '{}'", s.trim())),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::AcidPresent => write!(f, "acid"),
            Condition::BasePresent => write!(f, "base"),
            Condition::ClassPresent(c) => write!(f, "{c}"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRule {
    pub name: String,
    pub description: Option<String>,
    pub requires: Vec<Condition>,
    pub bonuses: BTreeMap<Axis, i32>,
}

/// The complete, validated set of reference tables an assessment runs against.
///
/// Built once and never mutated; the built-in instance lives in [`builtin`].
#[derive(Debug, Clone)]
pub struct RuleBook {
    classes: Vec<HazardClassDef>,
    compatibility: CompatibilityTable,
    axes: BTreeMap<Axis, Vec<AxisTriggerDef>>,
    interactions: Vec<InteractionRule>,
    heuristics: HeuristicsDef,
}

impl RuleBook {
    /// Validate and compile the four table definitions.
    ///
    /// Keywords are normalized like substance names and H-codes uppercased,
    /// so matching never depends on how a table was typed.
    pub fn from_defs(
        classes: HazardClassTableDef,
        compatibility: CompatibilityTableDef,
        axes: AxisTriggerTableDef,
        heuristics: HeuristicsDef,
    ) -> Result<Self, ChemRiskError> {
        let classes = compile_classes(classes)?;
        let compatibility = CompatibilityTable::from_def(compatibility)?;
        let (axes, interactions) = compile_axes(axes)?;
        let heuristics = compile_heuristics(heuristics)?;

        Ok(Self {
            classes,
            compatibility,
            axes,
            interactions,
            heuristics,
        })
    }

    /// Same tables with a different compatibility table.
    pub fn with_compatibility(mut self, table: CompatibilityTable) -> Self {
        self.compatibility = table;
        self
    }

    pub fn classes(&self) -> &[HazardClassDef] {
        &self.classes
    }

    pub fn compatibility(&self) -> &CompatibilityTable {
        &self.compatibility
    }

    pub fn axis_triggers(&self, axis: Axis) -> &[AxisTriggerDef] {
        self.axes.get(&axis).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn interactions(&self) -> &[InteractionRule] {
        &self.interactions
    }

    pub fn ph(&self) -> &PhKeywordsDef {
        &self.heuristics.ph
    }

    pub fn thermal(&self) -> &ThermalDef {
        &self.heuristics.thermal
    }
}

fn compile_matcher(matcher: &mut MatcherDef, context: &str) -> Result<(), ChemRiskError> {
    if matcher.is_empty() {
        return Err(ChemRiskError::RulesInvalid(format!(
            "{context} has no keywords, H-codes or pictograms"
        )));
    }
    normalize_keywords(&mut matcher.keywords, context)?;
    normalize_codes(&mut matcher.h_codes, context)?;
    Ok(())
}

fn normalize_keywords(keywords: &mut [String], context: &str) -> Result<(), ChemRiskError> {
    for k in keywords.iter_mut() {
        *k = normalize_name(k);
        if k.is_empty() {
            return Err(ChemRiskError::RulesInvalid(format!(
                "{context} has an empty keyword"
            )));
        }
    }
    Ok(())
}

fn normalize_codes(codes: &mut [String], context: &str) -> Result<(), ChemRiskError> {
    for code in codes.iter_mut() {
        *code = code.trim().to_uppercase();
        if !is_h_code(code) {
            return Err(ChemRiskError::RulesInvalid(format!(
                "{context} has invalid H-code '{code}'"
            )));
        }
    }
    Ok(())
}

fn compile_classes(def: HazardClassTableDef) -> Result<Vec<HazardClassDef>, ChemRiskError> {
    let mut seen = BTreeSet::new();
    let mut classes = def.classes;
    for c in &mut classes {
        if !seen.insert(c.class) {
            return Err(ChemRiskError::RulesInvalid(format!(
                "hazard class '{}' is defined more than once",
                c.class
            )));
        }
        compile_matcher(&mut c.matcher, &format!("hazard class '{}'", c.class))?;
    }
    Ok(classes)
}

type CompiledAxes = (BTreeMap<Axis, Vec<AxisTriggerDef>>, Vec<InteractionRule>);

fn compile_axes(def: AxisTriggerTableDef) -> Result<CompiledAxes, ChemRiskError> {
    let mut axes = def.axes;
    for (axis, triggers) in axes.iter_mut() {
        for (i, t) in triggers.iter_mut().enumerate() {
            if t.points == 0 {
                return Err(ChemRiskError::RulesInvalid(format!(
                    "axis '{axis}' trigger #{i} awards 0 points"
                )));
            }
            compile_matcher(&mut t.matcher, &format!("axis '{axis}' trigger #{i}"))?;
        }
    }
    if let Some(axis) = Axis::ALL.iter().find(|a| !axes.contains_key(*a)) {
        return Err(ChemRiskError::RulesInvalid(format!(
            "axis '{axis}' has no trigger table"
        )));
    }

    let interactions = def
        .interactions
        .into_iter()
        .map(compile_interaction)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((axes, interactions))
}

fn compile_interaction(def: InteractionDef) -> Result<InteractionRule, ChemRiskError> {
    if def.requires.is_empty() {
        return Err(ChemRiskError::RulesInvalid(format!(
            "interaction '{}' has no conditions",
            def.name
        )));
    }
    if def.bonuses.is_empty() {
        return Err(ChemRiskError::RulesInvalid(format!(
            "interaction '{}' awards no bonus",
            def.name
        )));
    }
    let requires = def
        .requires
        .iter()
        .map(|r| r.parse::<Condition>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ChemRiskError::RulesInvalid(format!("interaction '{}': {e}", def.name)))?;

    Ok(InteractionRule {
        name: def.name,
        description: def.description,
        requires,
        bonuses: def.bonuses,
    })
}

fn compile_heuristics(mut def: HeuristicsDef) -> Result<HeuristicsDef, ChemRiskError> {
    let ph = &mut def.ph;
    if [
        ph.strong_acid_weight,
        ph.weak_acid_weight,
        ph.strong_base_weight,
        ph.weak_base_weight,
    ]
    .contains(&0)
    {
        return Err(ChemRiskError::RulesInvalid(
            "pH keyword weights must be positive".into(),
        ));
    }
    normalize_keywords(&mut ph.strong_acid, "pH strong-acid list")?;
    normalize_keywords(&mut ph.weak_acid, "pH weak-acid list")?;
    normalize_keywords(&mut ph.strong_base, "pH strong-base list")?;
    normalize_keywords(&mut ph.weak_base, "pH weak-base list")?;

    normalize_keywords(&mut def.thermal.keywords, "thermal keyword list")?;
    normalize_codes(&mut def.thermal.h_codes, "thermal H-code list")?;
    if def.thermal.stable_reason.trim().is_empty() {
        return Err(ChemRiskError::RulesInvalid(
            "thermal stable_reason must not be empty".into(),
        ));
    }
    Ok(def)
}

/// Load a compatibility table from a JSON file.
pub fn load_compatibility(path: &Path) -> Result<CompatibilityTable, ChemRiskError> {
    let content = std::fs::read_to_string(path).map_err(|e| ChemRiskError::RulesLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_compatibility(&content, path)
}

/// Parse a compatibility table from a JSON string.
pub fn parse_compatibility(json: &str, source: &Path) -> Result<CompatibilityTable, ChemRiskError> {
    let def: CompatibilityTableDef =
        serde_json::from_str(json).map_err(|e| ChemRiskError::RulesLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    CompatibilityTable::from_def(def)
}

/// Parse a compatibility table from a JSON string (no file path context).
pub fn parse_compatibility_str(json: &str) -> Result<CompatibilityTable, ChemRiskError> {
    let def: CompatibilityTableDef = serde_json::from_str(json).map_err(ChemRiskError::Json)?;
    CompatibilityTable::from_def(def)
}
