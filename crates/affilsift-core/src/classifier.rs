use crate::config::FilterConfig;

/// Decide whether an affiliation string names a company rather than an
/// academic or governmental body.
///
/// - No company keyword: not a company.
/// - Company keyword(s) and no academic keyword: company.
/// - Both: company only if company matches strictly outnumber academic
///   matches, so "Department of Oncology; Pfizer Inc." (1 vs 1) is academic.
pub fn is_company(affiliation: &str) -> bool {
    is_company_with_config(affiliation, FilterConfig::builtin())
}

/// Config-aware version of [`is_company`].
pub fn is_company_with_config(affiliation: &str, config: &FilterConfig) -> bool {
    if !config.company_re.is_match(affiliation) {
        return false;
    }
    if !config.academic_re.is_match(affiliation) {
        return true;
    }
    company_match_count(affiliation, config) > academic_match_count(affiliation, config)
}

/// Number of non-overlapping company keyword matches.
pub fn company_match_count(affiliation: &str, config: &FilterConfig) -> usize {
    config.company_re.find_iter(affiliation).count()
}

/// Number of non-overlapping academic keyword matches.
pub fn academic_match_count(affiliation: &str, config: &FilterConfig) -> usize {
    config.academic_re.find_iter(affiliation).count()
}

/// Pull a display name out of a company affiliation.
///
/// Takes the text within the context window around the first company match,
/// trims it and drops a leading "... of "/"at "/"from "/"with " phrase. This
/// is a fixed window, so neighbouring text such as a city may stay attached.
/// Returns the input unchanged when no company keyword is present.
pub fn extract_company_name(affiliation: &str) -> String {
    extract_company_name_with_config(affiliation, FilterConfig::builtin())
}

/// Config-aware version of [`extract_company_name`].
pub fn extract_company_name_with_config(affiliation: &str, config: &FilterConfig) -> String {
    let Some(m) = config.company_re.find(affiliation) else {
        return affiliation.to_string();
    };

    let start = char_offset_before(affiliation, m.start(), config.context_window);
    let end = char_offset_after(affiliation, m.end(), config.context_window);
    let window = affiliation[start..end].trim();

    config.prefix_strip_re.replace(window, "").into_owned()
}

/// Byte offset `n` characters before `pos`, clamped to 0.
fn char_offset_before(text: &str, pos: usize, n: usize) -> usize {
    if n == 0 {
        return pos;
    }
    text[..pos]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset `n` characters after `pos`, clamped to the end of `text`.
fn char_offset_after(text: &str, pos: usize, n: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(n)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfigBuilder;

    #[test]
    fn test_company_affiliations() {
        for aff in [
            "Acme Pharmaceuticals Inc., New York, USA",
            "BioTech Labs Ltd., London, UK",
            "Gene Therapeutics Corp., Boston, MA",
            "XYZ Pharma GmbH, Berlin, Germany",
        ] {
            assert!(is_company(aff), "{aff}");
        }
    }

    #[test]
    fn test_academic_affiliations() {
        for aff in [
            "Department of Biology, Harvard University, Cambridge, MA",
            "School of Medicine, Johns Hopkins University, Baltimore, MD",
            "National Institute of Health, Bethesda, MD",
            "Memorial Hospital, New York, NY",
        ] {
            assert!(!is_company(aff), "{aff}");
        }
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert!(!is_company(""));
        assert!(!is_company("   \t"));
    }

    #[test]
    fn test_mixed_tie_is_academic() {
        // "Department" vs "Inc": one each.
        let aff = "Department of Oncology; Acme Inc.";
        let config = FilterConfig::builtin();
        assert_eq!(company_match_count(aff, config), 1);
        assert_eq!(academic_match_count(aff, config), 1);
        assert!(!is_company(aff));
    }

    #[test]
    fn test_mixed_company_majority() {
        // pharma, biotech, ltd vs institute
        let aff = "Institute Spinout: Acme Pharma Biotech Ltd, Oxford";
        assert!(is_company(aff));
    }

    #[test]
    fn test_mixed_academic_majority() {
        let aff = "Stanford University School of Medicine; Genentech Inc., South San Francisco, CA";
        // university, school vs inc
        assert!(!is_company(aff));
    }

    #[test]
    fn test_keywords_need_word_boundaries() {
        // "incorporated", "sample", "agency" contain keywords only as substrings
        assert!(!is_company("Sample Agency Incorporated"));
        assert!(is_company("Roche AG, Basel"));
    }

    #[test]
    fn test_extract_company_name() {
        let cases = [
            ("Acme Pharmaceuticals Inc., New York, USA", "Acme Pharmaceuticals Inc."),
            (
                "Department of Biology, BioTech Labs Ltd., London, UK",
                "BioTech Labs Ltd.",
            ),
            ("Gene Therapeutics Corp., Boston, MA", "Gene Therapeutics Corp."),
        ];
        for (aff, expected) in cases {
            let name = extract_company_name(aff);
            assert!(name.contains(expected), "{name:?} should contain {expected:?}");
        }
    }

    #[test]
    fn test_extract_strips_leading_of_phrase() {
        assert_eq!(extract_company_name("Department of Acme Inc."), "Acme Inc.");
        assert_eq!(extract_company_name("Scientist at Acme Labs"), "Acme Labs");
    }

    #[test]
    fn test_extract_window_is_thirty_chars() {
        let aff = "Some very long prefix that will be cut here Acme Inc trailing text that goes on and on";
        // 30 chars before "Inc" and 30 after.
        assert_eq!(
            extract_company_name(aff),
            "ix that will be cut here Acme Inc trailing text that goes on an"
        );
    }

    #[test]
    fn test_extract_no_match_passthrough() {
        let aff = "Department of Biology, Harvard University";
        assert_eq!(extract_company_name(aff), aff);
        assert_eq!(extract_company_name(""), "");
    }

    #[test]
    fn test_extract_idempotent() {
        for aff in [
            "Department of Acme Inc.",
            "Acme Pharmaceuticals Inc., New York, USA",
            "Gene Therapeutics Corp., Boston, MA",
        ] {
            let once = extract_company_name(aff);
            assert_eq!(extract_company_name(&once), once);
        }
    }

    #[test]
    fn test_extract_multibyte_text() {
        // Window arithmetic counts characters; this must not split a code point.
        let aff = "Département de Recherche, Société Générale Biotech SA, Île-de-France, Paris";
        let name = extract_company_name(aff);
        assert!(name.contains("Biotech"));
    }

    #[test]
    fn test_custom_window() {
        let config = FilterConfigBuilder::new().context_window(0).build().unwrap();
        assert_eq!(
            extract_company_name_with_config("Made by Acme Inc in Boston", &config),
            "Inc"
        );
    }
}
