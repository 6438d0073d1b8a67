use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword groups marking an organizational/legal suffix or industry term.
pub const DEFAULT_COMPANY_KEYWORDS: &[&str] = &[
    r"inc|llc|ltd|corp|corporation|company|co\.|pharmaceuticals|pharma|biotech|therapeutics|biosciences",
    r"gmbh|ag|sa|bv|nv|plc|pty|pte",
    r"laboratories|labs",
];

/// Keyword groups marking an academic, clinical or governmental body.
pub const DEFAULT_ACADEMIC_KEYWORDS: &[&str] = &[
    r"university|college|institute|school|academy|faculty",
    r"hospital|clinic|medical center|health center",
    r"department|division|school",
    r"national|federal|government|ministry",
];

/// Leading text removed from an extracted company name ("Department of ...").
pub const DEFAULT_PREFIX_STRIP: &str = r"^.*?\b(?:at|from|with|of)\s+";

/// Characters kept on each side of the first company match.
pub const DEFAULT_CONTEXT_WINDOW: usize = 30;

static DEFAULT_CONFIG: Lazy<FilterConfig> = Lazy::new(|| {
    FilterConfigBuilder::new()
        .build()
        .expect("built-in keyword patterns compile")
});

/// Controls how a list of keyword groups is overridden from its defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Compiled keyword patterns and thresholds for the affiliation filter.
///
/// Built once at startup (see [`FilterConfigBuilder`]) and shared by reference;
/// nothing in here changes after construction.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub(crate) company_re: Regex,
    pub(crate) academic_re: Regex,
    pub(crate) prefix_strip_re: Regex,
    pub(crate) context_window: usize,
    pub(crate) num_workers: usize,
    company_keywords: Vec<String>,
    academic_keywords: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl FilterConfig {
    /// Shared instance built from the defaults.
    pub fn builtin() -> &'static FilterConfig {
        &DEFAULT_CONFIG
    }

    pub fn company_keywords(&self) -> &[String] {
        &self.company_keywords
    }

    pub fn academic_keywords(&self) -> &[String] {
        &self.academic_keywords
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

/// Builder for [`FilterConfig`].
///
/// Keyword groups are regex fragments; each group is wrapped in word
/// boundaries and all groups are joined into one case-insensitive
/// alternation. Fails fast with `regex::Error` if any pattern is invalid.
#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    company_keywords: ListOverride<String>,
    academic_keywords: ListOverride<String>,
    prefix_strip_re: Option<String>,
    context_window: Option<usize>,
    num_workers: Option<usize>,
}

impl FilterConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Company keywords ──

    pub fn set_company_keywords(mut self, groups: Vec<String>) -> Self {
        self.company_keywords = ListOverride::Replace(groups);
        self
    }

    pub fn add_company_keyword(mut self, group: String) -> Self {
        match &mut self.company_keywords {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(group),
            ListOverride::Default => self.company_keywords = ListOverride::Extend(vec![group]),
        }
        self
    }

    // ── Academic keywords ──

    pub fn set_academic_keywords(mut self, groups: Vec<String>) -> Self {
        self.academic_keywords = ListOverride::Replace(groups);
        self
    }

    pub fn add_academic_keyword(mut self, group: String) -> Self {
        match &mut self.academic_keywords {
            ListOverride::Extend(v) | ListOverride::Replace(v) => v.push(group),
            ListOverride::Default => self.academic_keywords = ListOverride::Extend(vec![group]),
        }
        self
    }

    // ── Extraction ──

    pub fn prefix_strip_regex(mut self, pattern: &str) -> Self {
        self.prefix_strip_re = Some(pattern.to_string());
        self
    }

    pub fn context_window(mut self, chars: usize) -> Self {
        self.context_window = Some(chars);
        self
    }

    // ── Concurrency ──

    pub fn num_workers(mut self, n: usize) -> Self {
        self.num_workers = Some(n);
        self
    }

    /// Compile all keyword groups and produce a [`FilterConfig`].
    pub fn build(self) -> Result<FilterConfig, regex::Error> {
        let defaults = |groups: &[&str]| -> Vec<String> {
            groups.iter().map(|g| g.to_string()).collect()
        };

        let company_keywords = self
            .company_keywords
            .resolve(&defaults(DEFAULT_COMPANY_KEYWORDS));
        let academic_keywords = self
            .academic_keywords
            .resolve(&defaults(DEFAULT_ACADEMIC_KEYWORDS));

        Ok(FilterConfig {
            company_re: compile_keyword_groups(&company_keywords)?,
            academic_re: compile_keyword_groups(&academic_keywords)?,
            prefix_strip_re: Regex::new(
                self.prefix_strip_re.as_deref().unwrap_or(DEFAULT_PREFIX_STRIP),
            )?,
            context_window: self.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW),
            num_workers: self.num_workers.unwrap_or(1).max(1),
            company_keywords,
            academic_keywords,
        })
    }
}

/// Join keyword groups into `(?i)\b(?:g1)\b|\b(?:g2)\b|...`.
///
/// An empty list compiles to a pattern that never matches.
fn compile_keyword_groups(groups: &[String]) -> Result<Regex, regex::Error> {
    if groups.is_empty() {
        return Regex::new(r"\b\B");
    }
    let alternation = groups
        .iter()
        .map(|g| format!(r"\b(?:{})\b", g))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation))
}
