use crate::parsing::codes::normalize_h_codes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Role of a substance in the described manipulation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reactant,
    Product,
    Solvent,
    Catalyst,
    #[default]
    Other,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Reactant => write!(f, "reactant"),
            Role::Product => write!(f, "product"),
            Role::Solvent => write!(f, "solvent"),
            Role::Catalyst => write!(f, "catalyst"),
            Role::Other => write!(f, "other"),
        }
    }
}

/// GHS hazard pictogram class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GhsClass {
    Ghs01,
    Ghs02,
    Ghs03,
    Ghs04,
    Ghs05,
    Ghs06,
    Ghs07,
    Ghs08,
    Ghs09,
}

impl GhsClass {
    pub const ALL: [GhsClass; 9] = [
        GhsClass::Ghs01,
        GhsClass::Ghs02,
        GhsClass::Ghs03,
        GhsClass::Ghs04,
        GhsClass::Ghs05,
        GhsClass::Ghs06,
        GhsClass::Ghs07,
        GhsClass::Ghs08,
        GhsClass::Ghs09,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            GhsClass::Ghs01 => "GHS01",
            GhsClass::Ghs02 => "GHS02",
            GhsClass::Ghs03 => "GHS03",
            GhsClass::Ghs04 => "GHS04",
            GhsClass::Ghs05 => "GHS05",
            GhsClass::Ghs06 => "GHS06",
            GhsClass::Ghs07 => "GHS07",
            GhsClass::Ghs08 => "GHS08",
            GhsClass::Ghs09 => "GHS09",
        }
    }
}

impl fmt::Display for GhsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for GhsClass {
    type Err = String;

    /// Accepts "GHS05", "ghs05", "GHS5" and the French "SGH05".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let digits = upper
            .strip_prefix("GHS")
            .or_else(|| upper.strip_prefix("SGH"))
            .ok_or_else(|| format!("'{}' is not a GHS pictogram code", s.trim()))?;
        let n: usize = digits
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a GHS pictogram code", s.trim()))?;
        match n {
            1..=9 => Ok(GhsClass::ALL[n - 1]),
            _ => Err(format!("GHS pictogram '{}' out of range 01..09", s.trim())),
        }
    }
}

impl TryFrom<String> for GhsClass {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GhsClass> for String {
    fn from(value: GhsClass) -> Self {
        value.code().to_string()
    }
}

/// A substance as identified upstream.
///
/// Names are kept verbatim; all matching is done on [`SubstanceRecord::normalized_name`].
/// Hazard codes are normalized on the way in, whichever way the record is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SubstanceWire")]
pub struct SubstanceRecord {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,
    pub role: Role,
    pub h_codes: BTreeSet<String>,
    pub ghs_classes: BTreeSet<GhsClass>,
    /// Entries given as hazard codes that are not H/EUH statements (e.g. "P280").
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub ignored_codes: BTreeSet<String>,
}

/// Serialized form of [`SubstanceRecord`], with hazard codes still raw.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubstanceWire {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cas: Option<String>,
    #[serde(default)]
    role: Role,
    #[serde(default, alias = "h_codes")]
    h_codes: Vec<String>,
    #[serde(default, alias = "ghs_classes")]
    ghs_classes: BTreeSet<GhsClass>,
    #[serde(default, alias = "ignored_codes")]
    ignored_codes: BTreeSet<String>,
}

impl From<SubstanceWire> for SubstanceRecord {
    fn from(wire: SubstanceWire) -> Self {
        let mut record = SubstanceRecord {
            name: wire.name,
            cas: wire.cas,
            role: wire.role,
            ghs_classes: wire.ghs_classes,
            ignored_codes: wire.ignored_codes,
            ..SubstanceRecord::default()
        };
        record.add_h_codes(wire.h_codes.as_slice());
        record
    }
}

impl SubstanceRecord {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_h_codes(mut self, codes: &[&str]) -> Self {
        self.h_codes.clear();
        self.ignored_codes.clear();
        self.add_h_codes(codes);
        self
    }

    /// Normalize raw hazard-statement entries and add them to the record.
    ///
    /// Tokens that are not H/EUH codes go to `ignored_codes`.
    pub fn add_h_codes<S: AsRef<str>>(&mut self, entries: &[S]) {
        for entry in entries {
            let parsed = normalize_h_codes(entry.as_ref());
            self.h_codes.extend(parsed.codes);
            self.ignored_codes.extend(parsed.ignored);
        }
    }

    pub fn with_ghs(mut self, classes: &[GhsClass]) -> Self {
        self.ghs_classes = classes.iter().copied().collect();
        self
    }

    /// Lowercased, trimmed name with inner whitespace collapsed.
    pub fn normalized_name(&self) -> String {
        crate::parsing::normalize_name(&self.name)
    }

    /// Check if this substance has an H-code starting with `prefix` (e.g., "H360" matches "H360FD").
    /// Case-insensitive.
    pub fn has_h_code_prefix(&self, prefix: &str) -> bool {
        self.h_codes.iter().any(|c| {
            c.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    /// Check for an exact H-code, ignoring case.
    pub fn has_h_code(&self, code: &str) -> bool {
        self.h_codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    /// Display label, falling back to the CAS number for unnamed records.
    pub fn label(&self) -> String {
        if !self.name.trim().is_empty() {
            self.name.trim().to_string()
        } else if let Some(cas) = &self.cas {
            format!("CAS {cas}")
        } else {
            "(unnamed)".to_string()
        }
    }
}

/// Internal hazard tag derived from a substance's name and codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HazardClass {
    AcidStrong,
    BaseStrong,
    Oxidizer,
    Reducer,
    Flammable,
    ReactiveMetal,
    Cyanide,
    Sulfide,
    Hypochlorite,
    Peroxide,
    Ammonium,
    OrganicMatter,
}

impl HazardClass {
    pub const ALL: [HazardClass; 12] = [
        HazardClass::AcidStrong,
        HazardClass::BaseStrong,
        HazardClass::Oxidizer,
        HazardClass::Reducer,
        HazardClass::Flammable,
        HazardClass::ReactiveMetal,
        HazardClass::Cyanide,
        HazardClass::Sulfide,
        HazardClass::Hypochlorite,
        HazardClass::Peroxide,
        HazardClass::Ammonium,
        HazardClass::OrganicMatter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardClass::AcidStrong => "acid_strong",
            HazardClass::BaseStrong => "base_strong",
            HazardClass::Oxidizer => "oxidizer",
            HazardClass::Reducer => "reducer",
            HazardClass::Flammable => "flammable",
            HazardClass::ReactiveMetal => "reactive_metal",
            HazardClass::Cyanide => "cyanide",
            HazardClass::Sulfide => "sulfide",
            HazardClass::Hypochlorite => "hypochlorite",
            HazardClass::Peroxide => "peroxide",
            HazardClass::Ammonium => "ammonium",
            HazardClass::OrganicMatter => "organic_matter",
        }
    }
}

impl fmt::Display for HazardClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        HazardClass::ALL
            .iter()
            .find(|c| c.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("unknown hazard class '{}'", s.trim()))
    }
}

/// Outcome of a pairwise compatibility lookup, ordered `ok < warning < danger < critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Ok,
    Warning,
    Danger,
    Critical,
}

impl Severity {
    /// Pairs at or above this severity are reported as critical pairs.
    pub fn is_alarming(&self) -> bool {
        *self >= Severity::Danger
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Ok => write!(f, "ok"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One of the eight independent risk axes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Exothermic,
    Gas,
    Explosion,
    Corrosion,
    Toxic,
    Fire,
    Polymerization,
    Environment,
}

impl Axis {
    pub const ALL: [Axis; 8] = [
        Axis::Exothermic,
        Axis::Gas,
        Axis::Explosion,
        Axis::Corrosion,
        Axis::Toxic,
        Axis::Fire,
        Axis::Polymerization,
        Axis::Environment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Exothermic => "exothermic",
            Axis::Gas => "gas",
            Axis::Explosion => "explosion",
            Axis::Corrosion => "corrosion",
            Axis::Toxic => "toxic",
            Axis::Fire => "fire",
            Axis::Polymerization => "polymerization",
            Axis::Environment => "environment",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Axis::ALL
            .iter()
            .find(|a| a.as_str() == lower)
            .copied()
            .ok_or_else(|| format!("unknown axis '{}'", s.trim()))
    }
}

/// Severity band of a 0..=100 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,      // [0, 20)
    Moderate, // [20, 40)
    High,     // [40, 70)
    Critical, // [70, 100]
}

impl RiskLevel {
    pub fn from_score(score: u8) -> RiskLevel {
        match score {
            0..=19 => RiskLevel::Low,
            20..=39 => RiskLevel::Moderate,
            40..=69 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_total_order() {
        assert!(Severity::Ok < Severity::Warning);
        assert!(Severity::Warning < Severity::Danger);
        assert!(Severity::Danger < Severity::Critical);
        assert_eq!(
            [Severity::Warning, Severity::Critical, Severity::Ok]
                .into_iter()
                .max(),
            Some(Severity::Critical)
        );
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
    }

    #[test]
    fn test_ghs_parse_variants() {
        assert_eq!("GHS05".parse::<GhsClass>(), Ok(GhsClass::Ghs05));
        assert_eq!("ghs03".parse::<GhsClass>(), Ok(GhsClass::Ghs03));
        assert_eq!("SGH09".parse::<GhsClass>(), Ok(GhsClass::Ghs09));
        assert_eq!("GHS1".parse::<GhsClass>(), Ok(GhsClass::Ghs01));
        assert!("GHS10".parse::<GhsClass>().is_err());
        assert!("flame".parse::<GhsClass>().is_err());
    }

    #[test]
    fn test_substance_deserialize_defaults() {
        let s: SubstanceRecord = serde_json::from_str(r#"{"name": "Acétone"}"#).unwrap();
        assert_eq!(s.role, Role::Other);
        assert!(s.h_codes.is_empty());
        assert!(s.ghs_classes.is_empty());
        assert!(s.cas.is_none());
    }

    #[test]
    fn test_substance_deserialize_camel_case() {
        let s: SubstanceRecord = serde_json::from_str(
            r#"{"name": "Acétone", "cas": "67-64-1", "role": "solvent",
                "hCodes": ["H225"], "ghsClasses": ["GHS02", "GHS07"]}"#,
        )
        .unwrap();
        assert_eq!(s.role, Role::Solvent);
        assert!(s.h_codes.contains("H225"));
        assert!(s.ghs_classes.contains(&GhsClass::Ghs02));
    }

    #[test]
    fn test_substance_deserialize_normalizes_codes() {
        let s: SubstanceRecord =
            serde_json::from_str(r#"{"name": "X", "hCodes": ["h240", "h225, P210"]}"#).unwrap();
        let codes: Vec<&str> = s.h_codes.iter().map(String::as_str).collect();
        assert_eq!(codes, vec!["H225", "H240"]);
        assert!(s.ignored_codes.contains("P210"));
    }

    #[test]
    fn test_with_h_codes_normalizes() {
        let s = SubstanceRecord::named("X").with_h_codes(&[" h314 ", "H300+H310", "P280"]);
        let codes: Vec<&str> = s.h_codes.iter().map(String::as_str).collect();
        assert_eq!(codes, vec!["H300", "H310", "H314"]);
        assert_eq!(s.ignored_codes.len(), 1);
    }

    #[test]
    fn test_h_code_lookup_ignores_case() {
        let mut s = SubstanceRecord::named("X");
        s.h_codes.insert("h360fd".into());
        assert!(s.has_h_code_prefix("H360"));
        assert!(s.has_h_code("H360FD"));
        assert!(!s.has_h_code("H360"));
        assert!(!s.has_h_code_prefix("H3600"));
    }

    #[test]
    fn test_hazard_class_roundtrip_names() {
        for class in HazardClass::ALL {
            assert_eq!(class.as_str().parse::<HazardClass>(), Ok(class));
        }
    }

    #[test]
    fn test_label_fallbacks() {
        assert_eq!(SubstanceRecord::named("  Eau ").label(), "Eau");
        let mut s = SubstanceRecord::default();
        assert_eq!(s.label(), "(unnamed)");
        s.cas = Some("7732-18-5".into());
        assert_eq!(s.label(), "CAS 7732-18-5");
    }
}
