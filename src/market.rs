//! Interface boundary to the market-data collaborators.
//!
//! Live quotes and historical series come from external sources that may be
//! unavailable at any time; everything here degrades to `None` rather than
//! erroring. Only the gram-price arithmetic and the forward-fill are owned
//! by this crate.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Grams per troy ounce, used to restate the COMEX USD/oz quote in CNY/g.
pub const TROY_OUNCE_GRAMS: f64 = 31.1035;

#[async_trait]
pub trait SpotSource: Send + Sync {
    /// Latest gold quote in USD per troy ounce, or `None` when unavailable.
    async fn spot_usd(&self) -> Option<f64>;
}

#[async_trait]
pub trait FxSource: Send + Sync {
    /// Latest USD/CNY rate, or `None` when unavailable.
    async fn usd_cny(&self) -> Option<f64>;
}

/// Daily closes as delivered by a historical source; either side may be
/// missing for any given day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyQuote {
    pub date: NaiveDate,
    pub spot_usd: Option<f64>,
    pub usd_cny: Option<f64>,
}

#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Daily closing values over the trailing `days` range.
    async fn daily_quotes(&self, days: u32) -> Result<Vec<DailyQuote>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyGramPrice {
    pub date: NaiveDate,
    pub spot_usd: f64,
    pub usd_cny: f64,
    pub gram_price_cny: f64,
}

/// Theoretical CNY-per-gram price; `None` unless both inputs are present.
pub fn gram_price_cny(spot_usd: Option<f64>, usd_cny: Option<f64>) -> Option<f64> {
    match (spot_usd, usd_cny) {
        (Some(spot), Some(fx)) => Some(spot / TROY_OUNCE_GRAMS * fx),
        _ => None,
    }
}

/// Forward-fill missing daily values from the most recent prior close, then
/// drop rows still incomplete after fill (typically a leading gap before
/// the first quote).
pub fn forward_fill(rows: &[DailyQuote]) -> Vec<DailyGramPrice> {
    let mut last_spot = None;
    let mut last_fx = None;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        if row.spot_usd.is_some() {
            last_spot = row.spot_usd;
        }
        if row.usd_cny.is_some() {
            last_fx = row.usd_cny;
        }
        if let (Some(spot), Some(fx)) = (last_spot, last_fx) {
            out.push(DailyGramPrice {
                date: row.date,
                spot_usd: spot,
                usd_cny: fx,
                gram_price_cny: spot / TROY_OUNCE_GRAMS * fx,
            });
        }
    }
    out
}

/// Spot quotes from the Sina `hq` endpoint (`hf_GC` symbol). The payload is
/// a comma-separated quote line; the current price sits in the second field.
pub struct SinaSpotSource {
    client: reqwest::Client,
    url: String,
    referer: String,
}

impl SinaSpotSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: "http://hq.sinajs.cn/list=hf_GC".to_string(),
            referer: "http://finance.sina.com.cn/".to_string(),
        }
    }
}

#[async_trait]
impl SpotSource for SinaSpotSource {
    async fn spot_usd(&self) -> Option<f64> {
        let resp = self
            .client
            .get(&self.url)
            .header("Referer", &self.referer)
            .send()
            .await;
        let body = match resp {
            Ok(r) => match r.text().await {
                Ok(t) => t,
                Err(e) => {
                    tracing::warn!(error = ?e, "reading spot quote body failed");
                    return None;
                }
            },
            Err(e) => {
                tracing::warn!(error = ?e, "fetching spot quote failed");
                return None;
            }
        };
        parse_hq_quote(&body)
    }
}

fn parse_hq_quote(body: &str) -> Option<f64> {
    body.split(',').nth(1)?.trim().parse().ok()
}

/// USD/CNY rate from the Yahoo Finance chart API (the `CNY=X` symbol).
pub struct YahooFxSource {
    client: reqwest::Client,
    url: String,
}

impl YahooFxSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: "https://query1.finance.yahoo.com/v8/finance/chart/CNY=X?range=1d&interval=1m"
                .to_string(),
        }
    }
}

#[async_trait]
impl FxSource for YahooFxSource {
    async fn usd_cny(&self) -> Option<f64> {
        let resp = self.client.get(&self.url).send().await;
        let json: serde_json::Value = match resp {
            Ok(r) => match r.json().await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = ?e, "decoding fx chart json failed");
                    return None;
                }
            },
            Err(e) => {
                tracing::warn!(error = ?e, "fetching fx rate failed");
                return None;
            }
        };
        parse_chart_price(&json)
    }
}

fn parse_chart_price(json: &serde_json::Value) -> Option<f64> {
    json.pointer("/chart/result/0/meta/regularMarketPrice")?
        .as_f64()
}

/// Daily GC=F / CNY=X closes from the same Yahoo chart API, one symbol per
/// request, joined on date.
pub struct YahooHistorySource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooHistorySource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
        }
    }

    async fn fetch_closes(&self, symbol: &str, days: u32) -> Result<Vec<(NaiveDate, Option<f64>)>> {
        let url = format!(
            "{}/{}?range={}d&interval=1d",
            self.base_url,
            urlencoding::encode(symbol),
            days
        );
        let json: serde_json::Value = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .json()
            .await
            .with_context(|| format!("decoding chart json for {symbol}"))?;
        Ok(parse_chart_closes(&json))
    }
}

#[async_trait]
impl HistorySource for YahooHistorySource {
    async fn daily_quotes(&self, days: u32) -> Result<Vec<DailyQuote>> {
        let spot = self.fetch_closes("GC=F", days).await?;
        let fx = self.fetch_closes("CNY=X", days).await?;
        Ok(align_daily(spot, fx))
    }
}

/// Per-day closes from one chart payload. Null closes are kept as `None`
/// so the forward-fill sees the gap.
fn parse_chart_closes(json: &serde_json::Value) -> Vec<(NaiveDate, Option<f64>)> {
    let timestamps = json
        .pointer("/chart/result/0/timestamp")
        .and_then(|v| v.as_array());
    let closes = json
        .pointer("/chart/result/0/indicators/quote/0/close")
        .and_then(|v| v.as_array());
    let (Some(timestamps), Some(closes)) = (timestamps, closes) else {
        return Vec::new();
    };
    timestamps
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let secs = ts.as_i64()?;
            let date = chrono::DateTime::from_timestamp(secs, 0)?.date_naive();
            Some((date, close.as_f64()))
        })
        .collect()
}

/// Join the two close series on date: union of trading days, ascending,
/// missing sides left for the forward-fill to resolve.
fn align_daily(
    spot: Vec<(NaiveDate, Option<f64>)>,
    fx: Vec<(NaiveDate, Option<f64>)>,
) -> Vec<DailyQuote> {
    let mut by_date: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for (date, close) in spot {
        by_date.entry(date).or_default().0 = close;
    }
    for (date, close) in fx {
        by_date.entry(date).or_default().1 = close;
    }
    by_date
        .into_iter()
        .map(|(date, (spot_usd, usd_cny))| DailyQuote {
            date,
            spot_usd,
            usd_cny,
        })
        .collect()
}
