//! MEDLINE text through the affiliation filter, the way `affilsift classify`
//! runs on a saved efetch download.

use affilsift_core::AffiliationFilter;
use affilsift_pubmed::{parse_medline, read_medline_file};

const DOWNLOAD: &str = "\
PMID- 100
OWN - NLM
DP  - 2024 Mar 5
TI  - Kinase inhibitors in practice.
AU  - Novak P
AD  - Novak Pharma Inc., Prague, Czech Republic. p.novak@novakpharma.com.
AU  - Brown T
AD  - Department of Medicine, University of Leeds, Leeds, UK.

PMID- 101
DEP - 20240102
TI  - Cell biology of the fruit fly.
AU  - Green S
AD  - Department of Biology, Stanford University, Stanford, CA, USA.

PMID- 102
TI  - A paper without affiliations.
AU  - Black R
";

#[test]
fn company_records_survive_the_filter() {
    let records: Vec<_> = parse_medline(DOWNLOAD)
        .iter()
        .map(|r| r.to_raw_record())
        .collect();
    assert_eq!(records.len(), 3);

    let result = AffiliationFilter::new().filter_records(&records);
    assert_eq!(result.stats.total, 3);
    assert_eq!(result.stats.classified, 1);
    assert_eq!(result.stats.no_company, 2);

    let paper = &result.records[0];
    assert_eq!(paper.id, "100");
    assert_eq!(paper.title, "Kinase inhibitors in practice.");
    assert_eq!(paper.publication_date, "2024 Mar 5");
    assert_eq!(paper.corresponding_email, "p.novak@novakpharma.com");
    assert_eq!(paper.non_academic_authors[0], "Novak P");
    assert_eq!(paper.company_affiliations.len(), 1);
    assert!(paper.company_affiliations[0].contains("Novak Pharma Inc."));
}

#[test]
fn medline_file_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pubmed-export.txt");
    std::fs::write(&path, DOWNLOAD).unwrap();

    let records = read_medline_file(&path).unwrap();
    assert_eq!(records[1].dates.electronic.as_deref(), Some("20240102"));

    let out = AffiliationFilter::new().classify(&records);
    let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["100"]);
}

#[test]
fn missing_file_is_io_error() {
    let err = read_medline_file(std::path::Path::new("/nonexistent/pubmed.txt")).unwrap_err();
    assert!(matches!(err, affilsift_pubmed::PubMedError::Io(_)));
}
