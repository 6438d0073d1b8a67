use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod associate;
pub mod classifier;
pub mod config;
pub mod config_file;
pub mod extract;
pub mod filter;

// Re-export for convenience
pub use associate::associate;
pub use classifier::{extract_company_name, is_company};
pub use config::{FilterConfig, FilterConfigBuilder, ListOverride};
pub use extract::{corresponding_email, publication_date};
pub use filter::{AffiliationFilter, RecordOutcome, SkipReason, classify};

/// Affiliation text as supplied by the source: either one string with
/// `;`-separated affiliations, or one entry per affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AffiliationText {
    Joined(String),
    List(Vec<String>),
}

impl Default for AffiliationText {
    fn default() -> Self {
        AffiliationText::Joined(String::new())
    }
}

impl AffiliationText {
    /// The whole text as one string; list entries are joined with single spaces.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            AffiliationText::Joined(s) => Cow::Borrowed(s.as_str()),
            AffiliationText::List(v) => Cow::Owned(v.join(" ")),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            AffiliationText::Joined(s) => s.is_empty(),
            AffiliationText::List(v) => v.is_empty(),
        }
    }
}

impl From<&str> for AffiliationText {
    fn from(s: &str) -> Self {
        AffiliationText::Joined(s.to_string())
    }
}

impl From<String> for AffiliationText {
    fn from(s: String) -> Self {
        AffiliationText::Joined(s)
    }
}

impl From<Vec<String>> for AffiliationText {
    fn from(v: Vec<String>) -> Self {
        AffiliationText::List(v)
    }
}

/// Raw date fields of a record, in the order they are consulted.
///
/// For MEDLINE input these are DP, DEP, DA and PHST.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFields {
    pub primary: Option<String>,
    pub electronic: Option<String>,
    pub revision: Option<String>,
    pub history: Option<String>,
}

/// A bibliographic record as handed over by a fetch collaborator.
///
/// Missing fields deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub id: String,
    pub title: String,
    pub dates: DateFields,
    pub author_names: Vec<String>,
    pub affiliation_text: AffiliationText,
}

/// One author and the affiliation strings attributed to them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorAffiliationLink {
    pub author_name: String,
    pub affiliations: Vec<String>,
}

/// A record with at least one company affiliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedRecord {
    pub id: String,
    pub title: String,
    pub publication_date: String,
    /// Authors with at least one company affiliation, first-seen order.
    pub non_academic_authors: Vec<String>,
    /// Extracted company names, first-seen order, no duplicates.
    pub company_affiliations: Vec<String>,
    /// Empty when no email could be found.
    pub corresponding_email: String,
}

/// Counts of what happened to each record in a filter run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total: usize,
    pub classified: usize,
    pub no_company: usize,
    pub failed: usize,
}

/// Result of filtering a batch of records.
#[derive(Debug, Clone, Default)]
pub struct FilterResult {
    pub records: Vec<ClassifiedRecord>,
    pub stats: FilterStats,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid keyword pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config file: {0}")]
    ConfigFile(#[from] toml::de::Error),
}
