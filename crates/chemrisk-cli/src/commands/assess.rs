use chemrisk_core::{assess_with, AssessOptions};
use std::path::PathBuf;

use super::{read_substances, rule_book};
use crate::output;

pub fn run(
    input_file: PathBuf,
    compat_file: Option<PathBuf>,
    output_format: &str,
    verbose: bool,
) -> Result<(), chemrisk_core::error::ChemRiskError> {
    let substances = read_substances(&input_file)?;
    let rules = rule_book(compat_file.as_ref())?;

    // The trace is only shown in verbose tables, but JSON always carries it.
    let options = AssessOptions {
        include_trace: verbose || output_format == "json",
        ..AssessOptions::default()
    };
    let assessment = assess_with(&rules, &substances, &options);

    match output_format {
        "json" => output::json::print(&assessment)?,
        _ => output::table::print_assessment(&assessment, verbose),
    }

    Ok(())
}
