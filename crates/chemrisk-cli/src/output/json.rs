use chemrisk_core::error::ChemRiskError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), ChemRiskError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
