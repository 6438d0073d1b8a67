use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Used when a query cleans down to nothing.
pub const FALLBACK_BASE_NAME: &str = "search_results";

const MAX_BASE_CHARS: usize = 50;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").unwrap());

/// Turn a search query into a filename stem.
///
/// Drops everything but word characters, whitespace and hyphens, collapses
/// runs of hyphens/whitespace into `_`, keeps the first 50 characters, trims
/// underscores and lowercases.
pub fn clean_search_query(query: &str) -> String {
    let cleaned = DISALLOWED.replace_all(query, "");
    let cleaned = SEPARATORS.replace_all(&cleaned, "_");
    let truncated: String = cleaned.chars().take(MAX_BASE_CHARS).collect();
    truncated.trim_matches('_').to_lowercase()
}

/// Pick an unused filename in `dir` for results of `query`.
///
/// Returns `<base>.<ext>` when no file named `<base>.<ext>` or
/// `<base>_<N>.<ext>` exists (compared case-insensitively), otherwise
/// `<base>_<max N + 1>.<ext>`. Only the name is returned, not the full path.
///
/// `N` is read from the same anchored, case-insensitive pattern that selects
/// the file. A base that itself ends in digits (`covid_19`) therefore numbers
/// from `covid_19_1.csv`, and `Name_7.CSV` counts toward the next number for
/// base `name`. Both are intentional.
pub fn generate_filename(dir: &Path, query: &str, ext: &str) -> std::io::Result<String> {
    let mut base = clean_search_query(query);
    if base.is_empty() {
        base = FALLBACK_BASE_NAME.to_string();
    }

    let pattern = format!(
        r"(?i)^{}(?:_(\d+))?\.{}$",
        regex::escape(&base),
        regex::escape(ext)
    );
    let existing = Regex::new(&pattern)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let mut highest: Option<u64> = None;
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(caps) = name.to_str().and_then(|n| existing.captures(n)) else {
            continue;
        };
        let n = match caps.get(1) {
            Some(m) => match m.as_str().parse::<u64>() {
                Ok(n) => n,
                Err(_) => continue,
            },
            None => 0,
        };
        highest = Some(highest.map_or(n, |h| h.max(n)));
    }

    let filename = match highest {
        None => format!("{base}.{ext}"),
        Some(n) => format!("{base}_{}.{ext}", n + 1),
    };
    tracing::debug!(dir = %dir.display(), %filename, "generated output filename");
    Ok(filename)
}
