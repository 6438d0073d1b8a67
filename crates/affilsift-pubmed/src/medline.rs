use std::path::Path;

use affilsift_core::{AffiliationText, DateFields, RawRecord};

use crate::PubMedError;

/// One record of MEDLINE-format text, as returned by
/// `efetch.fcgi?db=pubmed&rettype=medline&retmode=text`.
///
/// Tags keep their order of appearance; repeated tags (AU, AD, PHST, ...)
/// appear once per value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedlineRecord {
    fields: Vec<(String, String)>,
}

impl MedlineRecord {
    /// All values for `tag`, in order.
    pub fn values(&self, tag: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The first value for `tag`, if present.
    pub fn first(&self, tag: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Map MEDLINE tags onto the filter's input record.
    ///
    /// PMID → id, TI → title, AU → authors, AD → affiliations (one per line),
    /// DP/DEP/DA → dates, PHST lines joined with `"; "` → history date.
    pub fn to_raw_record(&self) -> RawRecord {
        let history = self.values("PHST");
        RawRecord {
            id: self.first("PMID").unwrap_or_default().to_string(),
            title: self.first("TI").unwrap_or_default().to_string(),
            dates: DateFields {
                primary: self.first("DP").map(str::to_string),
                electronic: self.first("DEP").map(str::to_string),
                revision: self.first("DA").map(str::to_string),
                history: (!history.is_empty()).then(|| history.join("; ")),
            },
            author_names: self.values("AU").into_iter().map(str::to_string).collect(),
            affiliation_text: AffiliationText::List(
                self.values("AD").into_iter().map(str::to_string).collect(),
            ),
        }
    }
}

/// Parse MEDLINE-format text into records.
///
/// Lines look like `TAG - value` with the tag padded to four columns.
/// Lines indented by six spaces continue the previous value; blank lines
/// separate records.
pub fn parse_medline(text: &str) -> Vec<MedlineRecord> {
    let mut records = Vec::new();
    let mut current = MedlineRecord::default();

    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                records.push(std::mem::take(&mut current));
            }
            continue;
        }

        if line.starts_with("      ") {
            if let Some((_, value)) = current.fields.last_mut() {
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(line.trim());
            } else {
                tracing::debug!(line = line_no + 1, "continuation line without a tag");
            }
            continue;
        }

        match split_tag_line(line) {
            Some((tag, value)) => current.fields.push((tag.to_string(), value.to_string())),
            None => tracing::debug!(line = line_no + 1, "ignoring non-MEDLINE line"),
        }
    }

    if !current.is_empty() {
        records.push(current);
    }

    records
}

/// Read and parse a MEDLINE file into filter input records.
pub fn read_medline_file(path: &Path) -> Result<Vec<RawRecord>, PubMedError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_medline(&content)
        .iter()
        .map(MedlineRecord::to_raw_record)
        .collect())
}

/// Split `"AU  - Smith J"` into `("AU", "Smith J")`.
fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let head = line.get(..4)?;
    let rest = line.get(4..)?.strip_prefix('-')?;
    let tag = head.trim_end();
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()) {
        return None;
    }
    Some((tag, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
PMID- 36912345
OWN - NLM
DP  - 2023 Jan
TI  - A randomized trial of something rather long that wraps onto the
      next line of the record.
AU  - Smith J
AD  - Smith Pharmaceuticals Inc., Boston, MA, USA. js@smithpharma.com.
AU  - Doe A
AD  - Department of Biology, Harvard University, Cambridge, MA,
      USA.
PHST- 2022/10/01 00:00 [received]
PHST- 2022/12/01 00:00 [accepted]

PMID- 36954321
TI  - Second paper.
AU  - Roe B
";

    #[test]
    fn test_parse_two_records() {
        let records = parse_medline(SAMPLE);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].first("PMID"), Some("36912345"));
        assert_eq!(records[1].first("PMID"), Some("36954321"));
    }

    #[test]
    fn test_continuation_lines_joined() {
        let records = parse_medline(SAMPLE);
        assert_eq!(
            records[0].first("TI"),
            Some("A randomized trial of something rather long that wraps onto the next line of the record.")
        );
        assert_eq!(
            records[0].values("AD")[1],
            "Department of Biology, Harvard University, Cambridge, MA, USA."
        );
    }

    #[test]
    fn test_repeated_tags_in_order() {
        let records = parse_medline(SAMPLE);
        assert_eq!(records[0].values("AU"), ["Smith J", "Doe A"]);
        assert_eq!(records[0].values("PHST").len(), 2);
        assert!(records[0].values("FAU").is_empty());
    }

    #[test]
    fn test_to_raw_record() {
        let raw = parse_medline(SAMPLE)[0].to_raw_record();
        assert_eq!(raw.id, "36912345");
        assert_eq!(raw.author_names, ["Smith J", "Doe A"]);
        assert_eq!(raw.dates.primary.as_deref(), Some("2023 Jan"));
        assert_eq!(raw.dates.electronic, None);
        assert_eq!(
            raw.dates.history.as_deref(),
            Some("2022/10/01 00:00 [received]; 2022/12/01 00:00 [accepted]")
        );
        match &raw.affiliation_text {
            AffiliationText::List(v) => assert_eq!(v.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_tags_are_empty() {
        let raw = parse_medline(SAMPLE)[1].to_raw_record();
        assert_eq!(raw.title, "Second paper.");
        assert!(raw.affiliation_text.is_empty());
        assert_eq!(raw.dates, DateFields::default());
    }

    #[test]
    fn test_split_tag_line() {
        assert_eq!(split_tag_line("PMID- 123"), Some(("PMID", "123")));
        assert_eq!(split_tag_line("AU  - Smith J"), Some(("AU", "Smith J")));
        assert_eq!(split_tag_line("AD  -"), Some(("AD", "")));
        assert_eq!(split_tag_line("random text"), None);
        assert_eq!(split_tag_line("ab  - lowercase"), None);
        assert_eq!(split_tag_line("AU"), None);
    }

    #[test]
    fn test_garbage_is_ignored() {
        let records = parse_medline("<html>\nnot medline\n");
        assert!(records.is_empty());
    }

    #[test]
    fn test_read_medline_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pubmed.txt");
        std::fs::write(&path, SAMPLE).unwrap();
        let records = read_medline_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].author_names, ["Roe B"]);
    }
}
