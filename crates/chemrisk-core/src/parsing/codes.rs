/// Codes extracted from one raw hazard-statement entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedCodes {
    /// Canonical H/EUH codes, uppercased.
    pub codes: Vec<String>,
    /// Tokens that are not hazard statement codes (P-codes, free text), as given.
    pub ignored: Vec<String>,
}

/// Normalize one raw hazard-statement entry into canonical codes.
///
/// Handles formats like:
/// - "H225" -> ["H225"]
/// - " h314 " -> ["H314"]
/// - "H300+H310+H330" -> ["H300", "H310", "H330"]
/// - "H314, H290" or "H314; H290" -> ["H314", "H290"]
/// - "EUH031" -> ["EUH031"]
/// - "H350i" -> ["H350I"]
/// - "H314: Provoque des brûlures" -> ["H314"]
///
/// Anything else ("P280", "H31", "toxique") lands in `ignored`.
pub fn normalize_h_codes(raw: &str) -> NormalizedCodes {
    let mut out = NormalizedCodes::default();
    for piece in raw.split(['+', ',', ';']) {
        // Drop the statement text that sometimes follows the code.
        let token = piece
            .split(':')
            .next()
            .and_then(|head| head.split_whitespace().next())
            .unwrap_or("");
        if token.is_empty() {
            continue;
        }
        let code = token.to_uppercase();
        if is_h_code(&code) {
            out.codes.push(code);
        } else {
            out.ignored.push(token.to_string());
        }
    }
    out
}

/// Check that a string is a well-formed (uppercase) H or EUH statement code.
pub fn is_h_code(s: &str) -> bool {
    let rest = match s.strip_prefix("EUH").or_else(|| s.strip_prefix('H')) {
        Some(rest) => rest,
        None => return false,
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() != 3 {
        return false;
    }
    rest[digits.len()..].chars().all(|c| c.is_ascii_alphabetic())
}

/// Validate a CAS registry number's format and check digit.
///
/// The check digit is the weighted sum of the other digits (weights 1, 2, 3...
/// from the right) modulo 10.
pub fn cas_is_valid(cas: &str) -> bool {
    let parts: Vec<&str> = cas.trim().split('-').collect();
    if parts.len() != 3 {
        return false;
    }
    let (head, mid, check) = (parts[0], parts[1], parts[2]);
    if !(2..=7).contains(&head.len()) || mid.len() != 2 || check.len() != 1 {
        return false;
    }
    if !parts
        .iter()
        .all(|p| p.chars().all(|c| c.is_ascii_digit()))
    {
        return false;
    }

    let body: Vec<u32> = head
        .chars()
        .chain(mid.chars())
        .filter_map(|c| c.to_digit(10))
        .collect();
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| (i as u32 + 1) * d)
        .sum();

    check.chars().next().and_then(|c| c.to_digit(10)) == Some(sum % 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(raw: &str) -> Vec<String> {
        normalize_h_codes(raw).codes
    }

    #[test]
    fn test_plain_code() {
        assert_eq!(codes("H225"), vec!["H225"]);
    }

    #[test]
    fn test_lowercase_and_whitespace() {
        assert_eq!(codes("  h314 "), vec!["H314"]);
    }

    #[test]
    fn test_combined_statement_split() {
        assert_eq!(codes("H300+H310+H330"), vec!["H300", "H310", "H330"]);
        assert_eq!(codes("H300 + H310"), vec!["H300", "H310"]);
    }

    #[test]
    fn test_comma_and_semicolon_lists_split() {
        assert_eq!(codes("H314, H290"), vec!["H314", "H290"]);
        assert_eq!(codes("H225;H319 ; H336"), vec!["H225", "H319", "H336"]);
        assert_eq!(
            codes("H314: Provoque des brûlures, H290: Peut être corrosif"),
            vec!["H314", "H290"]
        );
    }

    #[test]
    fn test_statement_text_dropped() {
        assert_eq!(codes("H314: Provoque de graves brûlures"), vec!["H314"]);
    }

    #[test]
    fn test_eu_code_and_suffix() {
        assert_eq!(codes("EUH031"), vec!["EUH031"]);
        assert_eq!(codes("H360FD"), vec!["H360FD"]);
        assert_eq!(codes("H350i"), vec!["H350I"]);
    }

    #[test]
    fn test_non_hazard_tokens_set_aside() {
        let parsed = normalize_h_codes("H314+P280");
        assert_eq!(parsed.codes, vec!["H314"]);
        assert_eq!(parsed.ignored, vec!["P280"]);

        for raw in ["toxique", "H31", "P280", "H3140"] {
            let parsed = normalize_h_codes(raw);
            assert!(parsed.codes.is_empty(), "{raw} should not yield a code");
            assert_eq!(parsed.ignored.len(), 1);
        }
    }

    #[test]
    fn test_empty_entry_yields_nothing() {
        assert_eq!(normalize_h_codes(""), NormalizedCodes::default());
        assert_eq!(normalize_h_codes(" , ;+"), NormalizedCodes::default());
    }

    #[test]
    fn test_cas_check_digit() {
        assert!(cas_is_valid("7664-93-9")); // sulfuric acid
        assert!(cas_is_valid("1310-73-2")); // sodium hydroxide
        assert!(cas_is_valid("7732-18-5")); // water
        assert!(!cas_is_valid("7664-93-8"));
        assert!(!cas_is_valid("7664939"));
        assert!(!cas_is_valid("ab-cd-e"));
    }
}
