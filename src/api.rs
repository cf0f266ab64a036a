use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::ingest::config::CrawlConfig;
use crate::ingest::store::NewsStore;
use crate::ingest::types::{ArticleRecord, CrawlReport, SearchProvider};
use crate::market::{forward_fill, gram_price_cny, DailyGramPrice, FxSource, HistorySource, SpotSource};
use crate::sentiment::{SentimentLabel, SentimentModel};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CrawlConfig>,
    pub store: Arc<NewsStore>,
    pub provider: Arc<dyn SearchProvider>,
    pub model: Arc<dyn SentimentModel>,
    pub spot: Arc<dyn SpotSource>,
    pub fx: Arc<dyn FxSource>,
    pub history: Arc<dyn HistorySource>,
    /// Single-flight guard: at most one crawl at a time, manual or scheduled.
    pub crawl_lock: Arc<tokio::sync::Mutex<()>>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/crawl", post(trigger_crawl))
        .route("/articles", get(list_articles))
        .route("/market/spot", get(market_spot))
        .route("/market/history", get(market_history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// "Run a crawl now." The interval gate inside `run_crawl` decides whether
/// anything is actually fetched; callers always get a soft status back.
async fn trigger_crawl(State(state): State<AppState>) -> Json<CrawlReport> {
    let _guard = state.crawl_lock.lock().await;
    let report = crate::ingest::run_crawl(
        &state.cfg,
        state.provider.as_ref(),
        &state.store,
        state.model.as_ref(),
    )
    .await;
    Json(report)
}

#[derive(serde::Deserialize)]
struct ArticlesQuery {
    category: Option<SentimentLabel>,
    keyword: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(serde::Serialize)]
struct ArticleView {
    #[serde(flatten)]
    record: ArticleRecord,
    category: SentimentLabel,
}

/// Read surface over the persisted store: newest first, with the polarity
/// category attached and optional keyword/category filters.
async fn list_articles(
    State(state): State<AppState>,
    Query(q): Query<ArticlesQuery>,
) -> Json<Vec<ArticleView>> {
    let mut rows = state.store.load();
    rows.sort_by(|a, b| b.time.cmp(&a.time));

    let out = rows
        .into_iter()
        .filter(|r| {
            q.keyword
                .as_deref()
                .map_or(true, |kw| r.title.contains(kw) || r.summary.contains(kw))
        })
        .map(|r| ArticleView {
            category: SentimentLabel::from_score(r.sentiment),
            record: r,
        })
        .filter(|v| q.category.map_or(true, |c| v.category == c))
        .take(q.limit)
        .collect();
    Json(out)
}

#[derive(serde::Serialize)]
struct SpotView {
    spot_usd: Option<f64>,
    usd_cny: Option<f64>,
    gram_price_cny: Option<f64>,
}

/// Live quotes with the troy-ounce-to-gram conversion applied; each side is
/// independently optional when its source is unavailable.
async fn market_spot(State(state): State<AppState>) -> Json<SpotView> {
    let spot = state.spot.spot_usd().await;
    let fx = state.fx.usd_cny().await;
    Json(SpotView {
        spot_usd: spot,
        usd_cny: fx,
        gram_price_cny: gram_price_cny(spot, fx),
    })
}

#[derive(serde::Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    90
}

/// Forward-filled daily gram-price series over the trailing day range. An
/// unavailable history source degrades to an empty list.
async fn market_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<DailyGramPrice>> {
    let rows = match state.history.daily_quotes(q.days).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = ?e, days = q.days, "history source unavailable");
            Vec::new()
        }
    };
    Json(forward_fill(&rows))
}
