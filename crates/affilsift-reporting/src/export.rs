use std::io::Write;
use std::path::Path;

use affilsift_core::ClassifiedRecord;

const HEADER: [&str; 6] = [
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Shown in place of a missing corresponding-author email.
pub const EMAIL_PLACEHOLDER: &str = "Not Available";

/// Always quote; double any embedded quotes.
fn csv_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn push_row<'a>(out: &mut String, cells: impl IntoIterator<Item = &'a str>) {
    let row: Vec<String> = cells.into_iter().map(csv_quote).collect();
    out.push_str(&row.join(","));
    out.push('\n');
}

/// Render classified records as CSV, one row per record.
///
/// Multi-valued cells are joined with `"; "`. Returns an empty string when
/// there is nothing to export.
pub fn export_csv(records: &[ClassifiedRecord]) -> String {
    if records.is_empty() {
        tracing::warn!("no papers to export");
        return String::new();
    }

    let mut out = String::new();
    push_row(&mut out, HEADER);

    for r in records {
        let authors = r.non_academic_authors.join("; ");
        let companies = r.company_affiliations.join("; ");
        let email = if r.corresponding_email.is_empty() {
            EMAIL_PLACEHOLDER
        } else {
            r.corresponding_email.as_str()
        };
        push_row(
            &mut out,
            [
                r.id.as_str(),
                r.title.as_str(),
                r.publication_date.as_str(),
                authors.as_str(),
                companies.as_str(),
                email,
            ],
        );
    }

    tracing::debug!(rows = records.len(), "generated CSV");
    out
}

/// Write [`export_csv`] output to `path`. Nothing is written for an empty
/// record list.
pub fn write_csv(records: &[ClassifiedRecord], path: &Path) -> std::io::Result<()> {
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "no papers to export, not creating file");
        return Ok(());
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(export_csv(records).as_bytes())?;
    tracing::info!(count = records.len(), path = %path.display(), "exported papers");
    Ok(())
}
