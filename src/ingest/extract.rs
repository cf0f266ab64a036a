// src/ingest/extract.rs
use chrono::{DateTime, Local};
use scraper::{Html, Selector};

use crate::ingest::types::ArticleRecord;
use crate::ingest::{normalize, timeparse};
use crate::sentiment::SentimentModel;

/// Extract candidate records from one search-result page.
///
/// Every structural element is optional: a missing title, summary, link or
/// time tag yields an empty value, never a failure. A block survives only
/// if both its cleaned title and summary are non-empty and the combined
/// text mentions at least one tracked keyword — regardless of which keyword
/// drove the query that found the page. Re-parsing the same input yields
/// the same records.
pub fn extract(
    page_html: &str,
    now: DateTime<Local>,
    keywords: &[String],
    model: &dyn SentimentModel,
) -> Vec<ArticleRecord> {
    let block_sel = Selector::parse("div.box-result").unwrap();
    let title_sel = Selector::parse("h2").unwrap();
    let link_sel = Selector::parse("h2 a[href]").unwrap();
    let summary_sel = Selector::parse("p.content").unwrap();
    let time_sel = Selector::parse("span.fgray_time").unwrap();

    let document = Html::parse_document(page_html);
    let mut out = Vec::new();

    for block in document.select(&block_sel) {
        let title = block
            .select(&title_sel)
            .next()
            .map(|el| normalize::clean(&el.text().collect::<String>()))
            .unwrap_or_default();
        let summary = block
            .select(&summary_sel)
            .next()
            .map(|el| normalize::clean(&el.text().collect::<String>()))
            .unwrap_or_default();
        if title.is_empty() || summary.is_empty() {
            continue;
        }

        let combined = format!("{title}{summary}");
        if !keywords.iter().any(|kw| combined.contains(kw.as_str())) {
            continue;
        }

        let url = block
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
            .unwrap_or_default()
            .to_string();
        let raw_time = block
            .select(&time_sel)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default();
        let time = timeparse::parse_article_time(raw_time.trim(), now);
        let sentiment = model.score(&combined);

        out.push(ArticleRecord {
            time,
            title,
            summary,
            url,
            sentiment,
        });
    }
    out
}
