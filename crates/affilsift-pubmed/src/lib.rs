use thiserror::Error;

pub mod client;
pub mod medline;

pub use client::PubMedClient;
pub use medline::{MedlineRecord, parse_medline, read_medline_file};

#[derive(Error, Debug)]
pub enum PubMedError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("rate limited by NCBI (429)")]
    RateLimited,
    #[error("HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
