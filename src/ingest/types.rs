// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Local};

/// One extracted news article. `url` is the sole identity key; a record is
/// immutable once created and persists forever once written to the store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArticleRecord {
    pub time: DateTime<Local>,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub sentiment: f64,
}

/// Outcome of one (keyword, page) fetch. Failures stay visible to the
/// orchestrator instead of disappearing at the fetch site.
#[derive(Debug)]
pub enum PageOutcome {
    /// Page fetched and parsed; at least one block survived extraction.
    Fetched(Vec<ArticleRecord>),
    /// Page fetched cleanly but no block survived extraction.
    Empty,
    /// Transport error, timeout, or non-success status.
    Failed,
}

/// Source of raw search-result pages. The HTTP implementation lives in
/// `ingest::provider`; tests substitute fixture-backed mocks.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String>;
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlStatus {
    /// Interval gate still closed; nothing was fetched.
    TooSoon,
    /// Fetch phase produced zero candidates.
    NothingFetched,
    /// Candidates fetched, but every URL was already durable.
    NoNewContent,
    /// Candidates fetched but the store write failed; results were dropped.
    PersistFailed,
    /// New records appended to the store.
    Added,
}

/// What one crawl pass did, in both machine and human form.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CrawlReport {
    pub status: CrawlStatus,
    pub message: String,
    pub new_count: usize,
}
