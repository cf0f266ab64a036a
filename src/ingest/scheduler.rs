// src/ingest/scheduler.rs
use std::sync::Arc;

use metrics::counter;
use tokio::task::JoinHandle;

use crate::ingest::config::CrawlConfig;
use crate::ingest::store::NewsStore;
use crate::ingest::types::SearchProvider;
use crate::sentiment::SentimentModel;

/// Spawn a background task that triggers a crawl every `interval_secs`.
///
/// The crawl's own interval gate decides whether anything is fetched, so
/// the tick period only bounds how quickly an elapsed gate is noticed.
/// Ticks are serialized with the manual trigger through `crawl_lock`.
pub fn spawn_crawl_scheduler(
    cfg: Arc<CrawlConfig>,
    provider: Arc<dyn SearchProvider>,
    store: Arc<NewsStore>,
    model: Arc<dyn SentimentModel>,
    crawl_lock: Arc<tokio::sync::Mutex<()>>,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(std::time::Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let report = {
                let _guard = crawl_lock.lock().await;
                crate::ingest::run_crawl(&cfg, provider.as_ref(), &store, model.as_ref()).await
            };
            counter!("crawl_runs_total").increment(1);
            tracing::info!(
                target: "crawl",
                status = ?report.status,
                new_count = report.new_count,
                message = %report.message,
                "scheduled crawl tick"
            );
        }
    })
}
