use chemrisk_core::classify::compatibility::matrix_with;
use std::path::PathBuf;

use super::{read_substances, rule_book};
use crate::output;

pub fn run(
    input_file: PathBuf,
    compat_file: Option<PathBuf>,
    output_format: &str,
) -> Result<(), chemrisk_core::error::ChemRiskError> {
    let substances = read_substances(&input_file)?;
    let rules = rule_book(compat_file.as_ref())?;
    let matrix = matrix_with(&rules, &substances);

    match output_format {
        "json" => output::json::print(&matrix)?,
        _ => {
            let labels: Vec<String> = substances.iter().map(|s| s.label()).collect();
            output::table::print_matrix(&matrix, &labels);
        }
    }

    Ok(())
}
