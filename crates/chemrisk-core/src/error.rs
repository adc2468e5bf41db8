use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ChemRiskError {
    #[error("invalid substance at index {index}: {reason}")]
    InvalidSubstance { index: usize, reason: String },

    #[error("failed to load rules from {path}: {reason}")]
    RulesLoad { path: PathBuf, reason: String },

    #[error("invalid rules: {0}")]
    RulesInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
