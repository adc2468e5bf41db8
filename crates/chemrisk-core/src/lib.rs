pub mod classify;
pub mod error;
pub mod model;
pub mod parsing;
pub mod rules;
pub mod trace;

pub use classify::{assess, assess_with, AssessOptions, Assessment};

use error::ChemRiskError;
use rules::builtin::builtin;
use rules::RuleBook;

/// Main API entry point: assess a JSON substance list against the built-in tables.
///
/// Only input parsing can fail; the assessment itself is total.
pub fn assess_json(json: &str, options: &AssessOptions) -> Result<Assessment, ChemRiskError> {
    assess_json_with(builtin(), json, options)
}

/// Assess a JSON substance list against an explicit rule book.
pub fn assess_json_with(
    rules: &RuleBook,
    json: &str,
    options: &AssessOptions,
) -> Result<Assessment, ChemRiskError> {
    let substances = parsing::parse_substances(json)?;
    Ok(assess_with(rules, &substances, options))
}
