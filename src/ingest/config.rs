// src/ingest/config.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "GOLD_INSIGHT_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/ingest.toml";

/// Runtime configuration for the crawl pipeline and service surface.
/// Defaults mirror the tracked gold-market keyword set and the 4-hour
/// crawl interval; any field can be overridden from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Tracked keyword set, shared by search queries and retention filtering.
    pub keywords: Vec<String>,
    /// Search URL template with `{keyword}` and `{page}` placeholders.
    pub search_url_template: String,
    /// User agent passed into the fetch client at construction time.
    pub user_agent: String,
    /// CSV store location; the gate metadata lives next to it.
    pub data_path: PathBuf,
    pub crawl_interval_hours: u64,
    /// Pages fetched per keyword, 1..=page_limit.
    pub page_limit: u32,
    pub fetch_timeout_secs: u64,
    /// Pacing delay between page fetches (politeness, not correctness).
    pub page_delay_ms: u64,
    pub listen_addr: String,
    /// When set, a background task triggers a crawl this often. The gate
    /// still applies, so short intervals are safe.
    pub schedule_interval_secs: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            keywords: [
                "沪金",
                "黄金期货",
                "COMEX黄金",
                "实物黄金",
                "黄金ETF",
                "美联储",
                "利率",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            search_url_template:
                "https://search.sina.com.cn/?q={keyword}&range=all&c=news&sort=time&page={page}"
                    .to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) gold-insight/0.1".to_string(),
            data_path: PathBuf::from("data/news_data.csv"),
            crawl_interval_hours: 4,
            page_limit: 2,
            fetch_timeout_secs: 10,
            page_delay_ms: 1000,
            listen_addr: "0.0.0.0:8000".to_string(),
            schedule_interval_secs: None,
        }
    }
}

impl CrawlConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: CrawlConfig =
            toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    /// Load using $GOLD_INSIGHT_CONFIG, then config/ingest.toml, then
    /// built-in defaults when neither exists.
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("GOLD_INSIGHT_CONFIG points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(default);
        }
        Ok(Self::default())
    }

    pub fn crawl_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.crawl_interval_hours as i64)
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn page_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.page_delay_ms)
    }
}
