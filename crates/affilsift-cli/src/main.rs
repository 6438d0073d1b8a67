use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use affilsift_core::config_file::{self, ConfigFile};
use affilsift_core::{AffiliationFilter, FilterResult, RawRecord};
use affilsift_pubmed::PubMedClient;
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

const DEFAULT_MAX_RESULTS: usize = 100;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Find PubMed papers with at least one author affiliated with a
/// pharmaceutical or biotech company
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Path to a TOML config file (skips the default config lookup)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search PubMed and keep papers with company-affiliated authors
    Search {
        /// PubMed search query
        query: String,

        /// Contact email sent to NCBI (required by PubMed)
        #[arg(long)]
        email: Option<String>,

        /// Maximum number of results to fetch
        #[arg(short, long)]
        max_results: Option<usize>,

        /// Output CSV file, or a directory to pick a name in
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Classify records from a saved MEDLINE file (or a .json array of records)
    Classify {
        /// Path to the MEDLINE text or JSON file
        path: PathBuf,

        /// Output CSV file, or a directory to pick a name in
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let file_config = match &cli.config {
        Some(path) => config_file::try_load_from_path(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => config_file::load_config(),
    };
    let filter_config = file_config
        .to_filter_config()
        .context("invalid keyword pattern in config")?;
    let filter = AffiliationFilter::with_config(filter_config);

    match cli.command {
        Command::Search {
            query,
            email,
            max_results,
            file,
            no_color,
        } => search(&query, email, max_results, file, no_color, &file_config, &filter).await,
        Command::Classify {
            path,
            file,
            no_color,
        } => classify(&path, file, no_color, &filter),
    }
}

/// `RUST_LOG` wins; otherwise our crates log at info (debug with `--debug`)
/// and dependencies only warn.
fn init_tracing(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,affilsift={level},affilsift_core={level},affilsift_pubmed={level},affilsift_reporting={level}"
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn search(
    query: &str,
    email: Option<String>,
    max_results: Option<usize>,
    file: Option<PathBuf>,
    no_color: bool,
    file_config: &ConfigFile,
    filter: &AffiliationFilter,
) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let pubmed = file_config.pubmed.clone().unwrap_or_default();
    let email = email
        .or_else(|| std::env::var("NCBI_EMAIL").ok())
        .or(pubmed.email)
        .filter(|e| !e.trim().is_empty())
        .context("NCBI requires a contact email: pass --email, set NCBI_EMAIL, or add [pubmed] email to the config file")?;
    let api_key = std::env::var("NCBI_API_KEY").ok().or(pubmed.api_key);
    let max_results = max_results
        .or(pubmed.max_results)
        .unwrap_or(DEFAULT_MAX_RESULTS);
    let timeout = Duration::from_secs(pubmed.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

    tracing::debug!(query, max_results, %email, "search settings");

    let client = PubMedClient::new(email)
        .with_api_key(api_key)
        .with_timeout(timeout);

    tracing::info!(query, "searching PubMed");
    let records = client
        .fetch_records(query, max_results)
        .await
        .context("PubMed request failed")?;

    let result = filter.filter_records(&records);
    tracing::info!(
        count = result.records.len(),
        "found papers with company affiliations"
    );
    emit(&result, file, query, no_color)
}

fn classify(
    path: &Path,
    file: Option<PathBuf>,
    no_color: bool,
    filter: &AffiliationFilter,
) -> anyhow::Result<()> {
    let records = read_records(path)?;
    tracing::info!(count = records.len(), path = %path.display(), "loaded records");

    let result = filter.filter_records(&records);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    emit(&result, file, stem, no_color)
}

/// MEDLINE text, or a JSON array of raw records when the extension is `.json`.
fn read_records(path: &Path) -> anyhow::Result<Vec<RawRecord>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON array of records", path.display()))
    } else {
        affilsift_pubmed::read_medline_file(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Write results to a CSV file, or print them when no file was requested.
fn emit(
    result: &FilterResult,
    file: Option<PathBuf>,
    naming_query: &str,
    no_color: bool,
) -> anyhow::Result<()> {
    let Some(file) = file else {
        let color = ColorMode(!no_color);
        let stdout = std::io::stdout();
        let mut w = stdout.lock();
        output::print_records(&mut w, &result.records, color)?;
        output::print_summary(&mut w, &result.stats, color)?;
        w.flush()?;
        return Ok(());
    };

    if result.records.is_empty() {
        tracing::info!("no papers found with company affiliations");
        return Ok(());
    }

    let path = resolve_output_path(&file, naming_query)
        .with_context(|| format!("cannot choose an output file in {}", file.display()))?;
    affilsift_reporting::write_csv(&result.records, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "results exported");
    Ok(())
}

/// A directory or an extension-less path gets a generated name derived from
/// the query; anything else is used as given.
fn resolve_output_path(file: &Path, naming_query: &str) -> std::io::Result<PathBuf> {
    let dir = if file.is_dir() {
        file.to_path_buf()
    } else if file.extension().is_some() {
        return Ok(file.to_path_buf());
    } else {
        match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir()?,
        }
    };

    let name = affilsift_reporting::generate_filename(&dir, naming_query, "csv")?;
    Ok(dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_search() {
        let cli = Cli::try_parse_from([
            "affilsift",
            "-d",
            "search",
            "cancer therapy",
            "--email",
            "me@example.org",
            "-m",
            "20",
            "-f",
            "out.csv",
        ])
        .unwrap();
        assert!(cli.debug);
        match cli.command {
            Command::Search {
                query,
                email,
                max_results,
                file,
                no_color,
            } => {
                assert_eq!(query, "cancer therapy");
                assert_eq!(email.as_deref(), Some("me@example.org"));
                assert_eq!(max_results, Some(20));
                assert_eq!(file, Some(PathBuf::from("out.csv")));
                assert!(!no_color);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "affilsift",
            "classify",
            "pubmed.txt",
            "--no-color",
            "-c",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(matches!(cli.command, Command::Classify { no_color: true, .. }));
    }

    #[test]
    fn test_resolve_explicit_file() {
        let path = resolve_output_path(Path::new("results/out.csv"), "q").unwrap();
        assert_eq!(path, PathBuf::from("results/out.csv"));
    }

    #[test]
    fn test_resolve_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cancer_therapy.csv"), "").unwrap();
        let path = resolve_output_path(dir.path(), "cancer therapy").unwrap();
        assert_eq!(path, dir.path().join("cancer_therapy_1.csv"));
    }

    #[test]
    fn test_resolve_extensionless_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_output_path(&dir.path().join("results"), "cancer therapy").unwrap();
        assert_eq!(path, dir.path().join("cancer_therapy.csv"));
    }

    #[test]
    fn test_read_records_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.JSON");
        std::fs::write(
            &path,
            r#"[{"id": "1", "author_names": ["A, B"], "affiliation_text": ["Acme Inc."]}]"#,
        )
        .unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
    }

    #[test]
    fn test_read_records_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_records(&path).is_err());
    }
}
