use std::io::Write;

use affilsift_core::{ClassifiedRecord, FilterStats};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

fn write_field(w: &mut dyn Write, label: &str, value: &str, color: ColorMode) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "  {} {}", format!("{label}:").dimmed(), value)
    } else {
        writeln!(w, "  {label}: {value}")
    }
}

fn or_na(s: &str) -> &str {
    if s.is_empty() { "N/A" } else { s }
}

/// Print classified records in a readable block per paper.
pub fn print_records(
    w: &mut dyn Write,
    records: &[ClassifiedRecord],
    color: ColorMode,
) -> std::io::Result<()> {
    if records.is_empty() {
        writeln!(w, "No papers found matching the criteria.")?;
        return Ok(());
    }

    let heading = format!(
        "Found {} papers with pharmaceutical/biotech company affiliations:",
        records.len()
    );
    writeln!(w)?;
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{heading}")?;
    }
    writeln!(w)?;

    for (i, r) in records.iter().enumerate() {
        let title = format!("Paper {}:", i + 1);
        if color.enabled() {
            writeln!(w, "{}", title.cyan().bold())?;
        } else {
            writeln!(w, "{title}")?;
        }

        write_field(w, "PubMed ID", or_na(&r.id), color)?;
        write_field(w, "Title", or_na(&r.title), color)?;
        write_field(w, "Publication Date", or_na(&r.publication_date), color)?;
        write_field(
            w,
            "Non-academic Authors",
            or_na(&r.non_academic_authors.join(", ")),
            color,
        )?;

        let companies = r.company_affiliations.join(", ");
        if color.enabled() {
            writeln!(w, "  {} {}", "Company Affiliations:".dimmed(), companies.green())?;
        } else {
            writeln!(w, "  Company Affiliations: {companies}")?;
        }

        let email = if r.corresponding_email.is_empty() {
            affilsift_reporting::export::EMAIL_PLACEHOLDER
        } else {
            r.corresponding_email.as_str()
        };
        write_field(w, "Corresponding Email", email, color)?;
        writeln!(w)?;
    }
    Ok(())
}

/// One-line summary of what the filter did.
pub fn print_summary(w: &mut dyn Write, stats: &FilterStats, color: ColorMode) -> std::io::Result<()> {
    let kept = format!("{} with company affiliations", stats.classified);
    let failed = format!("{} failed", stats.failed);

    if color.enabled() {
        let failed = if stats.failed > 0 {
            failed.red().to_string()
        } else {
            failed.dimmed().to_string()
        };
        writeln!(
            w,
            "{} records checked: {}, {} academic only, {}",
            stats.total,
            kept.green(),
            stats.no_company,
            failed
        )
    } else {
        writeln!(
            w,
            "{} records checked: {}, {} academic only, {}",
            stats.total, kept, stats.no_company, failed
        )
    }
}
