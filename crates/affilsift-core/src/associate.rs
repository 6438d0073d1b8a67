use crate::{AffiliationText, AuthorAffiliationLink};

/// Split affiliation text into trimmed, non-empty affiliation strings.
///
/// A single string is split on `;`; a list is used entry by entry.
pub fn normalize_affiliations(text: &AffiliationText) -> Vec<String> {
    let parts: Vec<&str> = match text {
        AffiliationText::Joined(s) => s.split(';').collect(),
        AffiliationText::List(v) => v.iter().map(String::as_str).collect(),
    };
    parts
        .into_iter()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect()
}

/// The part of an author name used for matching: everything before the first
/// comma ("Smith, J" → "Smith"), or the whole name when there is no comma.
pub fn surname(author_name: &str) -> &str {
    author_name.split(',').next().unwrap_or(author_name)
}

/// Attach affiliations to authors by surname containment.
///
/// An affiliation belongs to an author when the author's surname appears in it
/// (case-insensitive substring). An author with no such affiliation gets every
/// affiliation of the record instead. This fallback trades precision for
/// recall: an author whose surname is never mentioned inherits academic and
/// company affiliations alike.
pub fn associate(
    author_names: &[String],
    affiliation_text: &AffiliationText,
) -> Vec<AuthorAffiliationLink> {
    let affiliations = normalize_affiliations(affiliation_text);
    let lowered: Vec<String> = affiliations.iter().map(|a| a.to_lowercase()).collect();

    author_names
        .iter()
        .map(|name| {
            let needle = surname(name).to_lowercase();
            let mut matched: Vec<String> = affiliations
                .iter()
                .zip(&lowered)
                .filter(|(_, lower)| lower.contains(needle.as_str()))
                .map(|(aff, _)| aff.clone())
                .collect();

            if matched.is_empty() && !affiliations.is_empty() {
                tracing::trace!(author = %name, "no surname match, using all affiliations");
                matched = affiliations.clone();
            }

            AuthorAffiliationLink {
                author_name: name.clone(),
                affiliations: matched,
            }
        })
        .collect()
}
