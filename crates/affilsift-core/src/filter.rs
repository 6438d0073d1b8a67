use std::panic::{self, AssertUnwindSafe};

use crate::config::FilterConfig;
use crate::{associate, classifier, extract};
use crate::{ClassifiedRecord, FilterResult, FilterStats, RawRecord};

/// A configurable affiliation filter.
///
/// Holds a [`FilterConfig`] and exposes each step as a method. The default
/// constructor uses the built-in keyword lists; use
/// [`AffiliationFilter::with_config`] to supply custom patterns.
#[derive(Debug, Clone)]
pub struct AffiliationFilter {
    config: FilterConfig,
}

impl Default for AffiliationFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Classified(ClassifiedRecord),
    Skipped(SkipReason),
}

/// Reason a record was not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// None of the record's affiliations were classified as a company.
    NoCompanyAffiliation,
    /// Processing the record failed; the message is for logs only.
    Failed(String),
}

impl AffiliationFilter {
    /// Create a filter with the default configuration.
    pub fn new() -> Self {
        Self {
            config: FilterConfig::default(),
        }
    }

    /// Create a filter with a custom configuration.
    pub fn with_config(config: FilterConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn is_company(&self, affiliation: &str) -> bool {
        classifier::is_company_with_config(affiliation, &self.config)
    }

    pub fn extract_company_name(&self, affiliation: &str) -> String {
        classifier::extract_company_name_with_config(affiliation, &self.config)
    }

    /// Classify one record. Never panics: a failure inside the record is
    /// reported as [`SkipReason::Failed`].
    pub fn classify_record(&self, record: &RawRecord) -> RecordOutcome {
        isolated(record, &|r: &RawRecord| self.classify_record_inner(r))
    }

    fn classify_record_inner(&self, record: &RawRecord) -> RecordOutcome {
        let links = associate::associate(&record.author_names, &record.affiliation_text);

        let mut non_academic_authors: Vec<String> = Vec::new();
        let mut company_affiliations: Vec<String> = Vec::new();

        for link in &links {
            for affiliation in &link.affiliations {
                if !self.is_company(affiliation) {
                    continue;
                }

                if !link.author_name.is_empty() && !non_academic_authors.contains(&link.author_name)
                {
                    non_academic_authors.push(link.author_name.clone());
                }

                let company = self.extract_company_name(affiliation);
                if !company.is_empty() && !company_affiliations.contains(&company) {
                    company_affiliations.push(company);
                }
            }
        }

        if company_affiliations.is_empty() {
            return RecordOutcome::Skipped(SkipReason::NoCompanyAffiliation);
        }

        RecordOutcome::Classified(ClassifiedRecord {
            id: record.id.clone(),
            title: record.title.clone(),
            publication_date: extract::publication_date(&record.dates),
            non_academic_authors,
            company_affiliations,
            corresponding_email: extract::corresponding_email(&record.affiliation_text),
        })
    }

    /// Classify a batch, keeping only records with a company affiliation.
    ///
    /// Output order is input order minus the dropped records. With more than
    /// one worker configured, contiguous chunks are classified on scoped
    /// threads and reassembled in order.
    pub fn filter_records(&self, records: &[RawRecord]) -> FilterResult {
        self.filter_with(records, |r| self.classify_record_inner(r))
    }

    /// Run `classify` over every record, each one isolated, and tally the
    /// outcomes.
    fn filter_with<F>(&self, records: &[RawRecord], classify: F) -> FilterResult
    where
        F: Fn(&RawRecord) -> RecordOutcome + Sync,
    {
        let outcomes = self.outcomes_with(records, &classify);

        let mut stats = FilterStats {
            total: records.len(),
            ..Default::default()
        };
        let mut kept = Vec::new();

        for (record, outcome) in records.iter().zip(outcomes) {
            match outcome {
                RecordOutcome::Classified(c) => {
                    tracing::debug!(
                        id = %c.id,
                        companies = c.company_affiliations.len(),
                        "record has company affiliation"
                    );
                    stats.classified += 1;
                    kept.push(c);
                }
                RecordOutcome::Skipped(SkipReason::NoCompanyAffiliation) => {
                    tracing::trace!(id = %record.id, "no company affiliation");
                    stats.no_company += 1;
                }
                RecordOutcome::Skipped(SkipReason::Failed(msg)) => {
                    tracing::warn!(id = %record.id, error = %msg, "skipping record");
                    stats.failed += 1;
                }
            }
        }

        tracing::debug!(
            total = stats.total,
            classified = stats.classified,
            failed = stats.failed,
            "filtered records"
        );

        FilterResult {
            records: kept,
            stats,
        }
    }

    /// Shorthand for [`filter_records`](Self::filter_records) without the stats.
    pub fn classify(&self, records: &[RawRecord]) -> Vec<ClassifiedRecord> {
        self.filter_records(records).records
    }

    fn outcomes_with<F>(&self, records: &[RawRecord], classify: &F) -> Vec<RecordOutcome>
    where
        F: Fn(&RawRecord) -> RecordOutcome + Sync,
    {
        let workers = self.config.num_workers.min(records.len());
        if workers <= 1 {
            return records.iter().map(|r| isolated(r, classify)).collect();
        }

        let chunk_size = records.len().div_ceil(workers);
        std::thread::scope(|scope| {
            let handles: Vec<_> = records
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .map(|r| isolated(r, classify))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            // Joining in spawn order keeps input order.
            handles
                .into_iter()
                .zip(records.chunks(chunk_size))
                .flat_map(|(handle, chunk)| match handle.join() {
                    Ok(outcomes) => outcomes,
                    Err(payload) => {
                        let msg = panic_message(&*payload);
                        vec![RecordOutcome::Skipped(SkipReason::Failed(msg)); chunk.len()]
                    }
                })
                .collect()
        })
    }
}

/// Run `classify` on one record, turning a panic into [`SkipReason::Failed`].
fn isolated<F>(record: &RawRecord, classify: &F) -> RecordOutcome
where
    F: Fn(&RawRecord) -> RecordOutcome + ?Sized,
{
    match panic::catch_unwind(AssertUnwindSafe(|| classify(record))) {
        Ok(outcome) => outcome,
        Err(payload) => RecordOutcome::Skipped(SkipReason::Failed(panic_message(&*payload))),
    }
}

/// Classify records with the built-in configuration.
pub fn classify(records: &[RawRecord]) -> Vec<ClassifiedRecord> {
    AffiliationFilter::new().classify(records)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
