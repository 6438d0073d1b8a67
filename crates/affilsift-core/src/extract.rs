use crate::{AffiliationText, DateFields};

/// Characters stripped from either end of an email token.
const EMAIL_PUNCT: &[char] = &['.', ',', ';', '(', ')', '[', ']', '{', '}', '"', '\''];

/// The first date field present, verbatim, in priority order
/// primary → electronic → revision → history. Empty if none is present.
pub fn publication_date(dates: &DateFields) -> String {
    [
        &dates.primary,
        &dates.electronic,
        &dates.revision,
        &dates.history,
    ]
    .into_iter()
    .find_map(|field| field.clone())
    .unwrap_or_default()
}

/// Best-effort corresponding-author email from affiliation text.
///
/// Returns the first whitespace-delimited token containing `@`, with
/// surrounding punctuation removed, or an empty string.
pub fn corresponding_email(affiliation_text: &AffiliationText) -> String {
    let text = affiliation_text.joined();
    text.split_whitespace()
        .find(|token| token.contains('@'))
        .map(|token| token.trim_matches(EMAIL_PUNCT).to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_primary() {
        let dates = DateFields {
            primary: Some("2023 Jan".into()),
            electronic: Some("20221215".into()),
            ..Default::default()
        };
        assert_eq!(publication_date(&dates), "2023 Jan");
    }

    #[test]
    fn test_date_priority_order() {
        let dates = DateFields {
            revision: Some("20230301".into()),
            history: Some("2023/01/01 00:00 [received]".into()),
            ..Default::default()
        };
        assert_eq!(publication_date(&dates), "20230301");

        let dates = DateFields {
            history: Some("2023/01/01 00:00 [received]".into()),
            ..Default::default()
        };
        assert_eq!(publication_date(&dates), "2023/01/01 00:00 [received]");
    }

    #[test]
    fn test_date_none() {
        assert_eq!(publication_date(&DateFields::default()), "");
    }

    #[test]
    fn test_date_present_but_empty_wins() {
        let dates = DateFields {
            primary: Some(String::new()),
            electronic: Some("20221215".into()),
            ..Default::default()
        };
        assert_eq!(publication_date(&dates), "");
    }

    #[test]
    fn test_email_trailing_period() {
        let text = AffiliationText::from("Dept of X, foo@bar.com.");
        assert_eq!(corresponding_email(&text), "foo@bar.com");
    }

    #[test]
    fn test_email_wrapped_in_punctuation() {
        let text = AffiliationText::from("Acme Inc. (contact: \"jane.doe@acme.com\");");
        assert_eq!(corresponding_email(&text), "jane.doe@acme.com");
    }

    #[test]
    fn test_email_first_token_wins() {
        let text = AffiliationText::List(vec![
            "Acme Inc., Boston. a@acme.com".into(),
            "Harvard University. b@harvard.edu".into(),
        ]);
        assert_eq!(corresponding_email(&text), "a@acme.com");
    }

    #[test]
    fn test_email_split_across_list_entries() {
        // List entries are joined with spaces before tokenizing.
        let text = AffiliationText::List(vec!["Acme Inc.".into(), "x@y.org.".into()]);
        assert_eq!(corresponding_email(&text), "x@y.org");
    }

    #[test]
    fn test_email_missing() {
        assert_eq!(corresponding_email(&AffiliationText::from("Acme Inc.")), "");
        assert_eq!(corresponding_email(&AffiliationText::default()), "");
    }
}
