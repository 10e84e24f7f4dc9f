//! Name canonicalization used by every matching tier past the exact one.

const HONORIFICS: &[&str] = &["dr", "mr", "mrs", "ms", "prof", "sir", "smt", "kumari"];

/// Lowercase, turn dots into spaces, drop honorific tokens and collapse
/// whitespace. `normalize("Dr. A. Sharma") == "a sharma"`.
pub fn normalize(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('.', " ");
    lowered
        .split_whitespace()
        .filter(|token| !HONORIFICS.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Header comparison key: case and spacing do not matter.
pub fn header_key(label: &str) -> String {
    label
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_honorifics_and_punctuation() {
        assert_eq!(normalize("Dr. A. Sharma"), "a sharma");
        assert_eq!(normalize("Dr. A. Sharma"), normalize("a sharma"));
        assert_eq!(normalize("  MRS.   Chandana   Das "), "chandana das");
        assert_eq!(normalize("Smt Kumari Bora"), "bora");
    }

    #[test]
    fn blank_input_is_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \t "), "");
        assert_eq!(normalize("Dr."), "");
    }

    #[test]
    fn keeps_honorific_lookalikes_inside_words() {
        assert_eq!(normalize("Drishti Mrinal"), "drishti mrinal");
    }

    #[test]
    fn header_key_ignores_case_and_spacing() {
        assert_eq!(header_key("Sl No"), header_key("SLNO"));
        assert_eq!(header_key(" Sl_No "), "slno");
        assert_eq!(header_key("Name"), header_key("NAME"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_normalize_is_idempotent(raw in "[A-Za-z. ]{0,30}") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_normalize_ignores_case(raw in "[A-Za-z. ]{0,30}") {
            prop_assert_eq!(normalize(&raw.to_uppercase()), normalize(&raw.to_lowercase()));
        }
    }
}
