use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::config::{FilterConfig, FilterConfigBuilder};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub keywords: Option<KeywordsConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
    pub pubmed: Option<PubMedConfig>,
}

/// Keyword groups. `company`/`academic` replace the built-ins,
/// `extra_company`/`extra_academic` are appended to whatever is in effect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordsConfig {
    pub company: Option<Vec<String>>,
    pub academic: Option<Vec<String>>,
    pub extra_company: Option<Vec<String>>,
    pub extra_academic: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub context_window: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub num_workers: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PubMedConfig {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub max_results: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Platform config directory path: `<config_dir>/affilsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("affilsift").join("config.toml"))
}

/// Load config by cascading CWD `.affilsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".affilsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    match try_load_from_path(path) {
        Ok(config) => Some(config),
        Err(CoreError::Io(_)) => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config file");
            None
        }
    }
}

/// Load a config from a path the user named explicitly; errors are surfaced.
pub fn try_load_from_path(path: &Path) -> Result<ConfigFile, CoreError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_kw = base.keywords.unwrap_or_default();
    let over_kw = overlay.keywords.unwrap_or_default();
    let base_ex = base.extraction.unwrap_or_default();
    let over_ex = overlay.extraction.unwrap_or_default();
    let base_cc = base.concurrency.unwrap_or_default();
    let over_cc = overlay.concurrency.unwrap_or_default();
    let base_pm = base.pubmed.unwrap_or_default();
    let over_pm = overlay.pubmed.unwrap_or_default();

    ConfigFile {
        keywords: Some(KeywordsConfig {
            company: over_kw.company.or(base_kw.company),
            academic: over_kw.academic.or(base_kw.academic),
            extra_company: over_kw.extra_company.or(base_kw.extra_company),
            extra_academic: over_kw.extra_academic.or(base_kw.extra_academic),
        }),
        extraction: Some(ExtractionConfig {
            context_window: over_ex.context_window.or(base_ex.context_window),
        }),
        concurrency: Some(ConcurrencyConfig {
            num_workers: over_cc.num_workers.or(base_cc.num_workers),
        }),
        pubmed: Some(PubMedConfig {
            email: over_pm.email.or(base_pm.email),
            api_key: over_pm.api_key.or(base_pm.api_key),
            max_results: over_pm.max_results.or(base_pm.max_results),
            timeout_secs: over_pm.timeout_secs.or(base_pm.timeout_secs),
        }),
    }
}

impl ConfigFile {
    /// Builder pre-loaded with this file's filter settings.
    pub fn to_builder(&self) -> FilterConfigBuilder {
        let mut builder = FilterConfigBuilder::new();

        if let Some(kw) = &self.keywords {
            if let Some(company) = &kw.company {
                builder = builder.set_company_keywords(company.clone());
            }
            if let Some(academic) = &kw.academic {
                builder = builder.set_academic_keywords(academic.clone());
            }
            for group in kw.extra_company.iter().flatten() {
                builder = builder.add_company_keyword(group.clone());
            }
            for group in kw.extra_academic.iter().flatten() {
                builder = builder.add_academic_keyword(group.clone());
            }
        }
        if let Some(window) = self.extraction.as_ref().and_then(|e| e.context_window) {
            builder = builder.context_window(window);
        }
        if let Some(n) = self.concurrency.as_ref().and_then(|c| c.num_workers) {
            builder = builder.num_workers(n);
        }
        builder
    }

    /// Compile this file's filter settings.
    pub fn to_filter_config(&self) -> Result<FilterConfig, CoreError> {
        Ok(self.to_builder().build()?)
    }
}
