pub mod compatibility;
pub mod engine;
pub mod hazard;
pub mod heuristics;
pub mod outcome;
pub mod scoring;

pub use compatibility::{matrix, pair_compatibility, CompatibilityMatrix, MatrixCell, PairCompatibility};
pub use engine::{assess, assess_with, classify_all, AssessOptions};
pub use hazard::{classify, classify_with, conflicts, ClassMatch};
pub use heuristics::{estimate_ph, estimate_thermal_stability, PhBucket, PhEstimate, ThermalStability};
pub use outcome::{Alerts, Assessment, CriticalPair, SubstanceClassification};
pub use scoring::{score, score_detailed, ScoreCard};
