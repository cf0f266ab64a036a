//! Gold-market insight service — binary entrypoint.
//! Boots the Axum HTTP server around the crawl pipeline: config, tracing,
//! Prometheus recorder, optional scheduled crawling.

use std::sync::Arc;

use gold_insight::api::{self, AppState};
use gold_insight::ingest::config::CrawlConfig;
use gold_insight::ingest::provider::HttpSearchProvider;
use gold_insight::ingest::scheduler::spawn_crawl_scheduler;
use gold_insight::ingest::store::NewsStore;
use gold_insight::market::{SinaSpotSource, YahooFxSource, YahooHistorySource};
use gold_insight::metrics::{install_recorder, metrics_router};
use gold_insight::sentiment::LexiconModel;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("gold_insight=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op elsewhere.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = Arc::new(CrawlConfig::load_default()?);
    let provider: Arc<HttpSearchProvider> = Arc::new(HttpSearchProvider::new(
        &cfg.search_url_template,
        &cfg.user_agent,
        cfg.fetch_timeout(),
    )?);
    let store = Arc::new(NewsStore::new(cfg.data_path.clone()));
    let model = Arc::new(LexiconModel::new());
    let crawl_lock = Arc::new(tokio::sync::Mutex::new(()));

    let market_client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()?;

    let metrics_handle = install_recorder()?;
    metrics::gauge!("crawl_interval_hours").set(cfg.crawl_interval_hours as f64);

    if let Some(secs) = cfg.schedule_interval_secs {
        spawn_crawl_scheduler(
            cfg.clone(),
            provider.clone(),
            store.clone(),
            model.clone(),
            crawl_lock.clone(),
            secs,
        );
    }

    let state = AppState {
        cfg: cfg.clone(),
        store,
        provider,
        model,
        spot: Arc::new(SinaSpotSource::new(market_client.clone())),
        fx: Arc::new(YahooFxSource::new(market_client.clone())),
        history: Arc::new(YahooHistorySource::new(market_client)),
        crawl_lock,
    };
    let router = api::create_router(state).merge(metrics_router(metrics_handle));

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    tracing::info!(addr = %cfg.listen_addr, "gold-insight listening");
    axum::serve(listener, router).await?;
    Ok(())
}
