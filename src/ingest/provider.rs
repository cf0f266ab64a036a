// src/ingest/provider.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;

use crate::ingest::types::SearchProvider;

/// HTTP search-results provider. The user agent and timeout are injected at
/// construction time; nothing here lives in global header state.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    url_template: String,
}

impl HttpSearchProvider {
    pub fn new(url_template: &str, user_agent: &str, timeout: std::time::Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("building search http client")?;
        Ok(Self {
            client,
            url_template: url_template.to_string(),
        })
    }

    fn page_url(&self, keyword: &str, page: u32) -> String {
        self.url_template
            .replace("{keyword}", &urlencoding::encode(keyword))
            .replace("{page}", &page.to_string())
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn fetch_page(&self, keyword: &str, page: u32) -> Result<String> {
        let url = self.page_url(keyword, page);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?;
        if !resp.status().is_success() {
            return Err(anyhow!("search page {url} returned {}", resp.status()));
        }
        resp.text()
            .await
            .with_context(|| format!("reading body of {url}"))
    }

    fn name(&self) -> &'static str {
        "sina-search"
    }
}
