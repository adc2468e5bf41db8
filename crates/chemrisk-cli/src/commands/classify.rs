use chemrisk_core::classify::classify_all;
use chemrisk_core::rules::builtin::builtin;
use std::path::PathBuf;

use super::read_substances;
use crate::output;

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    verbose: bool,
) -> Result<(), chemrisk_core::error::ChemRiskError> {
    let substances = read_substances(&input_file)?;
    let classifications = classify_all(builtin(), &substances);

    match output_format {
        "json" => output::json::print(&classifications)?,
        _ => output::table::print_classifications(&classifications, verbose),
    }

    Ok(())
}
