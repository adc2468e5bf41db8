pub mod codes;

use crate::error::ChemRiskError;
use crate::model::{GhsClass, Role, SubstanceRecord};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Substance record as it arrives from the identification step, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubstance {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    cas: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default, alias = "h_codes")]
    h_codes: Option<Vec<String>>,
    #[serde(default, alias = "ghs_classes")]
    ghs_classes: Option<Vec<String>>,
}

/// Accepted document shapes: a bare array or `{"substances": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubstanceDocument {
    List(Vec<RawSubstance>),
    Wrapped { substances: Vec<RawSubstance> },
}

/// Parse and validate a JSON substance list.
///
/// Missing fields default to empty collections. Hazard-code entries that are
/// not H/EUH statements are set aside in `ignored_codes`; unknown pictograms
/// are rejected with the index of the offending record.
pub fn parse_substances(json: &str) -> Result<Vec<SubstanceRecord>, ChemRiskError> {
    let doc: SubstanceDocument = serde_json::from_str(json)?;
    let raws = match doc {
        SubstanceDocument::List(list) => list,
        SubstanceDocument::Wrapped { substances } => substances,
    };

    let records = raws
        .into_iter()
        .enumerate()
        .map(|(index, raw)| validate_substance(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = records.len(), "parsed substance list");
    Ok(records)
}

fn validate_substance(index: usize, raw: RawSubstance) -> Result<SubstanceRecord, ChemRiskError> {
    let name = raw.name.unwrap_or_default().trim().to_string();

    let cas = raw
        .cas
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty());

    let role = match raw.role.as_deref() {
        None => Role::Other,
        Some(r) => parse_role(r).unwrap_or_else(|| {
            warn!(index, role = r, "unknown substance role, using 'other'");
            Role::Other
        }),
    };

    let mut h_codes = BTreeSet::new();
    let mut ignored_codes = BTreeSet::new();
    for entry in raw.h_codes.unwrap_or_default() {
        let parsed = codes::normalize_h_codes(&entry);
        for token in &parsed.ignored {
            warn!(index, token = %token, "not a hazard statement code, ignoring");
        }
        h_codes.extend(parsed.codes);
        ignored_codes.extend(parsed.ignored);
    }

    let mut ghs_classes = BTreeSet::new();
    for entry in raw.ghs_classes.unwrap_or_default() {
        if entry.trim().is_empty() {
            continue;
        }
        let class: GhsClass = entry
            .parse()
            .map_err(|reason| ChemRiskError::InvalidSubstance { index, reason })?;
        ghs_classes.insert(class);
    }

    Ok(SubstanceRecord {
        name,
        cas,
        role,
        h_codes,
        ghs_classes,
        ignored_codes,
    })
}

/// Parse a role, accepting English and French spellings.
pub fn parse_role(s: &str) -> Option<Role> {
    match normalize_name(s).as_str() {
        "reactant" | "reagent" | "réactif" | "reactif" => Some(Role::Reactant),
        "product" | "produit" => Some(Role::Product),
        "solvent" | "solvant" => Some(Role::Solvent),
        "catalyst" | "catalyseur" => Some(Role::Catalyst),
        "other" | "autre" | "" => Some(Role::Other),
        _ => None,
    }
}

/// Normalize a substance name for keyword matching.
///
/// Trims, lowercases, turns non-breaking spaces and underscores into spaces
/// and collapses runs of whitespace: "  Acide\u{a0}Sulfurique " -> "acide sulfurique".
pub fn normalize_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut result = String::with_capacity(lower.len());
    let mut prev_space = true; // start true to skip leading spaces
    for c in lower.chars() {
        let c = match c {
            '\u{a0}' | '_' => ' ',
            // Typographic apostrophe, as in "chlorure d’ammonium".
            '\u{2019}' => '\'',
            other => other,
        };
        if c.is_whitespace() {
            if !prev_space {
                result.push(' ');
            }
            prev_space = true;
        } else {
            result.push(c);
            prev_space = false;
        }
    }
    if result.ends_with(' ') {
        result.pop();
    }
    result
}
