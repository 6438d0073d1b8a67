use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use affilsift_core::RawRecord;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use serde::Deserialize;

use crate::PubMedError;
use crate::medline::parse_medline;

const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
const TOOL_NAME: &str = "affilsift";
/// NCBI asks for POST above ~200 ids; batching GETs keeps URLs short instead.
const FETCH_BATCH: usize = 200;
/// NCBI request limits without and with an API key.
const REQUESTS_PER_SECOND: u32 = 3;
const REQUESTS_PER_SECOND_WITH_KEY: u32 = 10;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// A limiter that spaces requests evenly at `n` per second.
fn limiter_per_second(n: u32) -> Arc<DirectLimiter> {
    let period = Duration::from_millis(1000 / u64::from(n.max(1)));
    let quota = Quota::with_period(period).unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

#[derive(Debug, Default, Deserialize)]
struct EsearchResponse {
    #[serde(default)]
    esearchresult: EsearchResult,
}

#[derive(Debug, Default, Deserialize)]
struct EsearchResult {
    #[serde(default)]
    idlist: Vec<String>,
}

/// Client for the NCBI E-utilities `esearch`/`efetch` endpoints.
///
/// NCBI requires a contact email on every request; an API key raises the
/// rate limit from 3 to 10 requests per second. Every request waits for the
/// limiter first, so batched fetches stay under that limit. No retries are
/// attempted.
#[derive(Clone)]
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
    email: String,
    api_key: Option<String>,
    timeout: Duration,
    requests_per_second: u32,
    limiter: Arc<DirectLimiter>,
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_key", &self.api_key.as_ref().map(|_| "<set>"))
            .field("timeout", &self.timeout)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}

impl PubMedClient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: EUTILS_BASE.to_string(),
            email: email.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
            requests_per_second: REQUESTS_PER_SECOND,
            limiter: limiter_per_second(REQUESTS_PER_SECOND),
        }
    }

    /// Set the API key; with a key the client may send 10 requests per second.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.requests_per_second = if api_key.is_some() {
            REQUESTS_PER_SECOND_WITH_KEY
        } else {
            REQUESTS_PER_SECOND
        };
        self.limiter = limiter_per_second(self.requests_per_second);
        self.api_key = api_key;
        self
    }

    pub fn requests_per_second(&self) -> u32 {
        self.requests_per_second
    }

    /// Wait until the limiter allows the next request.
    async fn wait_turn(&self) {
        self.limiter.until_ready().await;
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point the client at another E-utilities host (a mirror or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Parameters sent with every request.
    fn common_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("tool", TOOL_NAME.to_string()),
            ("email", self.email.clone()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Search PubMed and return matching PMIDs, most relevant first.
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, PubMedError> {
        tracing::debug!(query, max_results, "esearch");

        let mut params = self.common_params();
        params.extend([
            ("term", query.to_string()),
            ("retmax", max_results.to_string()),
            ("sort", "relevance".to_string()),
            ("retmode", "json".to_string()),
        ]);

        self.wait_turn().await;
        let resp = self
            .client
            .get(format!("{}/esearch.fcgi", self.base_url))
            .query(&params)
            .timeout(self.timeout)
            .send()
            .await?;
        let resp = check_status(resp)?;

        let body = resp.text().await?;
        let data: EsearchResponse = serde_json::from_str(&body)
            .map_err(|e| PubMedError::InvalidResponse(format!("esearch: {e}")))?;

        tracing::debug!(found = data.esearchresult.idlist.len(), "esearch complete");
        Ok(data.esearchresult.idlist)
    }

    /// Fetch MEDLINE-format text for the given PMIDs.
    ///
    /// An empty id list returns an empty string without contacting NCBI.
    pub async fn fetch_medline(&self, ids: &[String]) -> Result<String, PubMedError> {
        let mut out = String::new();

        for batch in ids.chunks(FETCH_BATCH) {
            tracing::debug!(count = batch.len(), "efetch");

            let mut params = self.common_params();
            params.extend([
                ("id", batch.join(",")),
                ("rettype", "medline".to_string()),
                ("retmode", "text".to_string()),
            ]);

            self.wait_turn().await;
            let resp = self
                .client
                .get(format!("{}/efetch.fcgi", self.base_url))
                .query(&params)
                .timeout(self.timeout)
                .send()
                .await?;
            let resp = check_status(resp)?;

            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&resp.text().await?);
        }

        Ok(out)
    }

    /// Search, fetch and parse in one go.
    pub async fn fetch_records(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<RawRecord>, PubMedError> {
        let ids = self.search(query, max_results).await?;
        if ids.is_empty() {
            tracing::info!(query, "no papers found matching the query");
            return Ok(Vec::new());
        }

        let text = self.fetch_medline(&ids).await?;
        let records: Vec<RawRecord> = parse_medline(&text)
            .iter()
            .map(|r| r.to_raw_record())
            .collect();

        tracing::info!(count = records.len(), "fetched papers from PubMed");
        Ok(records)
    }
}

fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, PubMedError> {
    let status = resp.status();
    if status.as_u16() == 429 {
        return Err(PubMedError::RateLimited);
    }
    if !status.is_success() {
        return Err(PubMedError::Status(status));
    }
    Ok(resp)
}
