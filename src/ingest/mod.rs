// src/ingest/mod.rs
pub mod config;
pub mod extract;
pub mod normalize;
pub mod provider;
pub mod scheduler;
pub mod store;
pub mod timeparse;
pub mod types;

use chrono::Local;
use metrics::{counter, describe_counter, describe_gauge, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashMap;

use crate::ingest::config::CrawlConfig;
use crate::ingest::store::NewsStore;
use crate::ingest::types::{ArticleRecord, CrawlReport, CrawlStatus, PageOutcome, SearchProvider};
use crate::sentiment::SentimentModel;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("crawl_pages_fetched_total", "Search pages fetched and parsed.");
        describe_counter!(
            "crawl_pages_empty_total",
            "Fetched pages where no block survived extraction."
        );
        describe_counter!("crawl_pages_failed_total", "Search page fetches that errored out.");
        describe_counter!(
            "crawl_candidates_total",
            "Candidate records extracted across all pages."
        );
        describe_counter!("crawl_dedup_total", "Candidates dropped as in-crawl duplicates.");
        describe_counter!("crawl_records_added_total", "Records newly persisted to the store.");
        describe_gauge!(
            "crawl_last_success_ts",
            "Unix ts of the last crawl that persisted rows."
        );
    });
}

/// Deduplicate candidates by URL, keeping the last occurrence (order is
/// keyword-major, page-minor, so later keywords win). Records without a URL
/// cannot be identified across crawls and are dropped here. Returns the
/// surviving records and the number removed.
pub fn dedup_by_url(candidates: Vec<ArticleRecord>) -> (Vec<ArticleRecord>, usize) {
    let before = candidates.len();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ArticleRecord> = Vec::new();
    for rec in candidates {
        if rec.url.is_empty() {
            continue;
        }
        match index.get(&rec.url) {
            Some(&i) => out[i] = rec,
            None => {
                index.insert(rec.url.clone(), out.len());
                out.push(rec);
            }
        }
    }
    let removed = before - out.len();
    (out, removed)
}

/// Run one crawl pass: gate check, keyword × page fetch loop, in-crawl
/// dedup, merge into the store.
///
/// Strictly sequential and non-retrying; a failed page degrades to an empty
/// one and the next scheduled crawl is the retry mechanism. Never returns
/// an error to the caller — every failure mode ends in a soft report.
pub async fn run_crawl(
    cfg: &CrawlConfig,
    provider: &dyn SearchProvider,
    store: &NewsStore,
    model: &dyn SentimentModel,
) -> CrawlReport {
    ensure_metrics_described();

    let now = Local::now();
    if let Some(last) = store.last_write_time() {
        let elapsed = now - last;
        let interval = cfg.crawl_interval();
        if elapsed < interval {
            let remaining = interval - elapsed;
            let hours = remaining.num_hours();
            let minutes = remaining.num_minutes() % 60;
            return CrawlReport {
                status: CrawlStatus::TooSoon,
                message: format!("crawl interval not elapsed; retry in {hours}h {minutes}m"),
                new_count: 0,
            };
        }
    }

    // Fetch phase. Failures are page-local: log, count, move on.
    let mut candidates: Vec<ArticleRecord> = Vec::new();
    let mut pages_failed = 0usize;
    for keyword in &cfg.keywords {
        tracing::info!(provider = provider.name(), keyword = %keyword, "crawling keyword");
        for page in 1..=cfg.page_limit {
            let outcome = match provider.fetch_page(keyword, page).await {
                Ok(html) => {
                    let records = extract::extract(&html, now, &cfg.keywords, model);
                    if records.is_empty() {
                        PageOutcome::Empty
                    } else {
                        PageOutcome::Fetched(records)
                    }
                }
                Err(e) => {
                    tracing::warn!(error = ?e, keyword = %keyword, page, "page fetch failed");
                    PageOutcome::Failed
                }
            };
            match outcome {
                PageOutcome::Fetched(records) => {
                    counter!("crawl_pages_fetched_total").increment(1);
                    counter!("crawl_candidates_total").increment(records.len() as u64);
                    candidates.extend(records);
                }
                PageOutcome::Empty => {
                    counter!("crawl_pages_fetched_total").increment(1);
                    counter!("crawl_pages_empty_total").increment(1);
                }
                PageOutcome::Failed => {
                    counter!("crawl_pages_failed_total").increment(1);
                    pages_failed += 1;
                }
            }
            if cfg.page_delay_ms > 0 {
                tokio::time::sleep(cfg.page_delay()).await;
            }
        }
    }

    if candidates.is_empty() {
        return CrawlReport {
            status: CrawlStatus::NothingFetched,
            message: format!("no articles fetched ({pages_failed} page(s) failed)"),
            new_count: 0,
        };
    }

    // Merge phase: URL is the identity key within this crawl too.
    let (unique, dup_count) = dedup_by_url(candidates);
    counter!("crawl_dedup_total").increment(dup_count as u64);

    // Persist phase. An I/O error costs this run's results, nothing more.
    match store.merge(&unique) {
        Ok(0) => CrawlReport {
            status: CrawlStatus::NoNewContent,
            message: "crawl complete, no new articles".to_string(),
            new_count: 0,
        },
        Ok(n) => {
            counter!("crawl_records_added_total").increment(n as u64);
            gauge!("crawl_last_success_ts").set(Local::now().timestamp() as f64);
            tracing::info!(added = n, total_candidates = unique.len(), "crawl persisted new articles");
            CrawlReport {
                status: CrawlStatus::Added,
                message: format!("crawl complete, added {n} new article(s)"),
                new_count: n,
            }
        }
        Err(e) => {
            tracing::error!(error = ?e, path = %store.path().display(), "persisting crawl results failed");
            CrawlReport {
                status: CrawlStatus::PersistFailed,
                message: "crawl complete, but persisting results failed".to_string(),
                new_count: 0,
            }
        }
    }
}
