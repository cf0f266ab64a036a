// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod ingest;
pub mod market;
pub mod metrics;
pub mod sentiment;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::ingest::run_crawl;
pub use crate::ingest::types::{ArticleRecord, CrawlReport, CrawlStatus};
