use super::schema::MatcherDef;
use crate::model::{GhsClass, SubstanceRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a matcher fired for a substance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MatchReason {
    Keyword(String),
    HCode(String),
    Pictogram(GhsClass),
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::Keyword(k) => write!(f, "name contains '{k}'"),
            MatchReason::HCode(c) => write!(f, "H-code {c}"),
            MatchReason::Pictogram(g) => write!(f, "pictogram {g}"),
        }
    }
}

impl MatcherDef {
    /// First reason this matcher fires for a substance, if any.
    ///
    /// `normalized_name` must come from [`crate::parsing::normalize_name`]; keywords
    /// are normalized the same way when a rule book is built.
    pub fn find_match(
        &self,
        normalized_name: &str,
        substance: &SubstanceRecord,
    ) -> Option<MatchReason> {
        if !normalized_name.is_empty() {
            if let Some(k) = self
                .keywords
                .iter()
                .find(|k| normalized_name.contains(k.as_str()))
            {
                return Some(MatchReason::Keyword(k.clone()));
            }
        }

        if let Some(code) = self
            .h_codes
            .iter()
            .find(|prefix| substance.has_h_code_prefix(prefix))
        {
            return Some(MatchReason::HCode(code.clone()));
        }

        self.ghs
            .iter()
            .find(|g| substance.ghs_classes.contains(g))
            .map(|g| MatchReason::Pictogram(*g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> MatcherDef {
        MatcherDef {
            keywords: vec!["peroxyde".into()],
            h_codes: vec!["H360".into()],
            ghs: vec![GhsClass::Ghs03],
        }
    }

    #[test]
    fn test_keyword_match() {
        let s = SubstanceRecord::named("Peroxyde d'hydrogène");
        assert_eq!(
            matcher().find_match(&s.normalized_name(), &s),
            Some(MatchReason::Keyword("peroxyde".into()))
        );
    }

    #[test]
    fn test_h_code_prefix_match() {
        let s = SubstanceRecord::named("X").with_h_codes(&["H360FD"]);
        assert_eq!(
            matcher().find_match(&s.normalized_name(), &s),
            Some(MatchReason::HCode("H360".into()))
        );
    }

    #[test]
    fn test_pictogram_match() {
        let s = SubstanceRecord::named("X").with_ghs(&[GhsClass::Ghs03]);
        assert_eq!(
            matcher().find_match(&s.normalized_name(), &s),
            Some(MatchReason::Pictogram(GhsClass::Ghs03))
        );
    }

    #[test]
    fn test_no_match() {
        let s = SubstanceRecord::named("Eau").with_h_codes(&["H36"]);
        assert_eq!(matcher().find_match(&s.normalized_name(), &s), None);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(
            MatchReason::Keyword("nitro".into()).to_string(),
            "name contains 'nitro'"
        );
        assert_eq!(MatchReason::HCode("H240".into()).to_string(), "H-code H240");
        assert_eq!(
            MatchReason::Pictogram(GhsClass::Ghs01).to_string(),
            "pictogram GHS01"
        );
    }
}
