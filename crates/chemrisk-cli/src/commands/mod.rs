pub mod assess;
pub mod classify;
pub mod matrix;
pub mod rules;

use chemrisk_core::error::ChemRiskError;
use chemrisk_core::model::SubstanceRecord;
use chemrisk_core::rules::builtin::builtin;
use chemrisk_core::rules::{load_compatibility, RuleBook};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Read and validate a JSON substance list from disk.
fn read_substances(path: &Path) -> Result<Vec<SubstanceRecord>, ChemRiskError> {
    let json = std::fs::read_to_string(path)?;
    let substances = chemrisk_core::parsing::parse_substances(&json)?;
    debug!(path = %path.display(), count = substances.len(), "loaded substance list");
    Ok(substances)
}

/// The built-in rule book, with its compatibility table swapped when a file is given.
fn rule_book(compat_file: Option<&PathBuf>) -> Result<Cow<'static, RuleBook>, ChemRiskError> {
    match compat_file {
        None => Ok(Cow::Borrowed(builtin())),
        Some(path) => {
            let table = load_compatibility(path)?;
            Ok(Cow::Owned(builtin().clone().with_compatibility(table)))
        }
    }
}
